// Parsed-statement records. The parser in front of the engine produces
// these fixed-shape nodes; the binder resolves them against the catalog.

use crate::core::value::Value;
use crate::kernel::ObjectKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    CreateTable(CreateTableStmt),
    AlterTable(AlterTableStmt),
    Rename(RenameStmt),
    CreateIndex(CreateIndexStmt),
    CreateSequence(CreateSequenceStmt),
    Insert(InsertStmt),
    Delete(DeleteStmt),
    Update(UpdateStmt),
    Copy(CopyStmt),
    Set(SetStmt),
    Show(ShowStmt),
    Drop(DropStmt),
    Transaction(TransactionStmt),
}

/// Scalar expression as parsed. Only the shapes the engine binds.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// Possibly qualified column reference: `[table.]column`.
    Column(Vec<String>),
    Function { name: String, args: Vec<Expr> },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnConflict {
    #[default]
    Error,
    /// `IF NOT EXISTS` / `INSERT OR IGNORE`.
    Ignore,
    Replace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNameAst {
    pub name: String,
    /// Width or precision/scale arguments, e.g. `varchar(20)`, `decimal(10, 2)`.
    pub modifiers: Vec<i64>,
}

impl TypeNameAst {
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_modifiers(name: impl Into<String>, modifiers: Vec<i64>) -> Self {
        Self {
            name: name.into(),
            modifiers,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraintAst {
    NotNull,
    Null,
    Default(Expr),
    PrimaryKey,
    Unique,
    AutoIncrement,
    Comment(Expr),
    Check(Expr),
    References { table: String, column: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefAst {
    pub name: String,
    pub type_name: TypeNameAst,
    pub constraints: Vec<ColumnConstraintAst>,
    pub collate: Option<String>,
    pub generated: bool,
}

impl ColumnDefAst {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: TypeNameAst) -> Self {
        Self {
            name: name.into(),
            type_name,
            constraints: Vec::new(),
            collate: None,
            generated: false,
        }
    }

    #[must_use]
    pub fn with(mut self, constraint: ColumnConstraintAst) -> Self {
        self.constraints.push(constraint);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefActionAst {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraintAst {
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        ref_schema: Option<String>,
        ref_table: String,
        ref_columns: Vec<String>,
        on_update: RefActionAst,
        on_delete: RefActionAst,
    },
    Check(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStrategy {
    Range,
    List,
    Hash,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSpecAst {
    pub strategy: PartitionStrategy,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub schema: Option<String>,
    pub name: String,
    pub on_conflict: OnConflict,
    pub temporary: bool,
    pub inherits: bool,
    pub columns: Vec<ColumnDefAst>,
    pub constraints: Vec<TableConstraintAst>,
    pub partition_by: Option<PartitionSpecAst>,
    pub timescale: bool,
    pub interval: Option<String>,
    pub retention: Option<String>,
    pub auto_addpart: bool,
    pub crosspart: bool,
    pub comment: Option<String>,
}

impl CreateTableStmt {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            on_conflict: OnConflict::Error,
            temporary: false,
            inherits: false,
            columns: Vec::new(),
            constraints: Vec::new(),
            partition_by: None,
            timescale: false,
            interval: None,
            retention: None,
            auto_addpart: false,
            crosspart: false,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlterCommand {
    AddColumn(ColumnDefAst),
    DropColumn(String),
    SetDefault {
        column: String,
        default: Option<Expr>,
    },
    AlterColumnType {
        column: String,
        def: ColumnDefAst,
    },
    AddConstraint(TableConstraintAst),
    AttachPartition(String),
    DetachPartition(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterTarget {
    Table,
    View,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStmt {
    pub schema: Option<String>,
    pub table: String,
    pub target: AlterTarget,
    pub commands: Vec<AlterCommand>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenameTarget {
    Table { new_name: String },
    Column { old_name: String, new_name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameStmt {
    pub schema: Option<String>,
    pub table: String,
    pub target: RenameTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub schema: Option<String>,
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub on_conflict: OnConflict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeqOptionAst {
    pub name: String,
    pub value: Option<i64>,
    /// `NO MINVALUE` / `NO MAXVALUE` / `NO CYCLE`.
    pub no_value: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSequenceStmt {
    pub schema: Option<String>,
    pub name: String,
    pub temporary: bool,
    pub on_conflict: OnConflict,
    pub options: Vec<SeqOptionAst>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub schema: Option<String>,
    pub table: String,
    /// Empty means "all columns in definition order".
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Expr>>,
    pub on_conflict: OnConflict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub schema: Option<String>,
    pub table: String,
    pub filter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub schema: Option<String>,
    pub table: String,
    pub assignments: Vec<(String, Expr)>,
    pub filter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyOptionAst {
    pub name: String,
    pub arg: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyStmt {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    /// `COPY .. FROM` when true, `COPY .. TO` otherwise.
    pub is_from: bool,
    pub filename: Option<String>,
    pub options: Vec<CopyOptionAst>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VarScope {
    #[default]
    Default,
    Session,
    Global,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetStmt {
    pub name: String,
    pub scope: VarScope,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShowKind {
    Variable(String),
    /// `DESCRIBE <table>` / `SHOW COLUMNS FROM <table>`.
    Table {
        schema: Option<String>,
        table: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShowStmt {
    pub kind: ShowKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropStmt {
    pub schema: Option<String>,
    pub name: String,
    pub kind: ObjectKind,
    pub if_exists: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnKind {
    Begin,
    Commit,
    Rollback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStmt {
    pub kind: TxnKind,
}
