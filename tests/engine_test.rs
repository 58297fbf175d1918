// End-to-end statement tests over the in-memory kernel: bind, then
// execute, then check what the kernel ended up with.
use std::sync::Arc;

use emberdb::ast::{
    AlterCommand, AlterTableStmt, AlterTarget, BinaryOp, ColumnConstraintAst, ColumnDefAst,
    CopyOptionAst, CopyStmt, CreateIndexStmt, CreateSequenceStmt, CreateTableStmt, DropStmt,
    Expr, InsertStmt,
    OnConflict, PartitionSpecAst, PartitionStrategy, RefActionAst, RenameStmt, RenameTarget,
    SetStmt, ShowKind, ShowStmt, Statement, TableConstraintAst, TypeNameAst, UpdateStmt,
    VarScope,
};
use emberdb::ast::DeleteStmt;
use emberdb::binder::statement::{BoundNode, BoundStatement};
use emberdb::binder::Binder;
use emberdb::catalog::Catalog;
use emberdb::core::constraints::ConstraintType;
use emberdb::core::error::EngineError;
use emberdb::core::value::Value;
use emberdb::executor::{QueryExecutor, RecordBatch, SessionVars};
use emberdb::kernel::{MemoryKernel, ObjectKind, StorageKernel};

fn session() -> (Arc<MemoryKernel>, Catalog<MemoryKernel>) {
    let kernel = Arc::new(MemoryKernel::new());
    let catalog = Catalog::new(Arc::clone(&kernel), "sys");
    (kernel, catalog)
}

fn bind(catalog: &Catalog<MemoryKernel>, stmt: &Statement) -> Result<BoundStatement, EngineError> {
    Binder::new(catalog).bind(stmt)
}

fn run(
    catalog: &Catalog<MemoryKernel>,
    vars: &mut SessionVars,
    stmt: &Statement,
) -> Result<RecordBatch, EngineError> {
    let bound = bind(catalog, stmt)?;
    QueryExecutor::execute(catalog, vars, &bound)
}

/// `items(id bigint primary key auto_increment, name varchar(40), qty int default 1)`
fn items_table() -> Statement {
    let mut t = CreateTableStmt::new("items");
    t.columns.push(
        ColumnDefAst::new("id", TypeNameAst::plain("bigint"))
            .with(ColumnConstraintAst::PrimaryKey)
            .with(ColumnConstraintAst::AutoIncrement),
    );
    t.columns.push(ColumnDefAst::new(
        "name",
        TypeNameAst::with_modifiers("varchar", vec![40]),
    ));
    t.columns.push(
        ColumnDefAst::new("qty", TypeNameAst::plain("integer"))
            .with(ColumnConstraintAst::Default(Expr::Literal(Value::Int(1)))),
    );
    Statement::CreateTable(t)
}

/// Timescale table `metrics(ts timestamp, val double)` partitioned by day
/// or hour, with automatic partition creation.
fn metrics_table(interval: &str) -> Statement {
    let mut t = CreateTableStmt::new("metrics");
    t.columns
        .push(ColumnDefAst::new("ts", TypeNameAst::plain("timestamp")));
    t.columns
        .push(ColumnDefAst::new("val", TypeNameAst::plain("double")));
    t.timescale = true;
    t.interval = Some(interval.to_string());
    t.auto_addpart = true;
    t.partition_by = Some(PartitionSpecAst {
        strategy: PartitionStrategy::Range,
        columns: vec!["ts".to_string()],
    });
    Statement::CreateTable(t)
}

fn insert_names(names: &[&str]) -> Statement {
    Statement::Insert(InsertStmt {
        schema: None,
        table: "items".to_string(),
        columns: vec!["name".to_string()],
        rows: names
            .iter()
            .map(|n| vec![Expr::Literal(Value::Text((*n).to_string()))])
            .collect(),
        on_conflict: OnConflict::Error,
    })
}

fn insert_metric(ts: &str, val: f64) -> Statement {
    Statement::Insert(InsertStmt {
        schema: None,
        table: "metrics".to_string(),
        columns: vec!["ts".to_string(), "val".to_string()],
        rows: vec![vec![
            Expr::Literal(Value::Text(ts.to_string())),
            Expr::Literal(Value::Real(val)),
        ]],
        on_conflict: OnConflict::Error,
    })
}

fn attach_partition(part_name: &str) -> Statement {
    Statement::AlterTable(AlterTableStmt {
        schema: None,
        table: "metrics".to_string(),
        target: AlterTarget::Table,
        commands: vec![AlterCommand::AttachPartition(part_name.to_string())],
        comment: None,
    })
}

#[test]
fn create_table_then_describe() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Show(ShowStmt {
            kind: ShowKind::Table {
                schema: None,
                table: "items".to_string(),
            },
        }),
    )
    .unwrap();
    assert_eq!(batch.rows.len(), 3);
    let type_slot = batch.schema.slot_of("type").unwrap() as usize;
    assert_eq!(batch.rows[0][0], Value::Text("id".to_string()));
    assert_eq!(batch.rows[0][type_slot], Value::Text("BIGINT".to_string()));
    assert_eq!(batch.rows[1][type_slot], Value::Text("VARCHAR(40)".to_string()));
}

#[test]
fn timescale_table_gets_default_retention() {
    let (_, catalog) = session();
    let bound = bind(&catalog, &metrics_table("1d")).unwrap();
    assert!(bound.props.touches_timescale());
    let BoundNode::CreateTable(s) = &bound.node else {
        panic!("expected a create table statement");
    };
    assert_eq!(s.retention(), "7d");
    assert!(s.is_timescale);
}

#[test]
fn column_level_primary_key_becomes_a_constraint() {
    let (_, catalog) = session();
    let bound = bind(&catalog, &items_table()).unwrap();
    let BoundNode::CreateTable(s) = &bound.node else {
        panic!("expected a create table statement");
    };
    let primaries: Vec<_> = s
        .constraints
        .iter()
        .filter(|c| c.ctype == ConstraintType::Primary)
        .collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].columns, vec!["id".to_string()]);
}

#[test]
fn a_second_primary_key_is_rejected() {
    let (_, catalog) = session();
    let mut t = CreateTableStmt::new("twice");
    t.columns.push(
        ColumnDefAst::new("a", TypeNameAst::plain("bigint"))
            .with(ColumnConstraintAst::PrimaryKey),
    );
    t.columns.push(ColumnDefAst::new("b", TypeNameAst::plain("bigint")));
    t.constraints.push(TableConstraintAst::PrimaryKey {
        name: None,
        columns: vec!["b".to_string()],
    });
    assert!(bind(&catalog, &Statement::CreateTable(t)).is_err());
}

#[test]
fn second_auto_increment_column_is_rejected() {
    let (_, catalog) = session();
    let mut t = CreateTableStmt::new("twice");
    t.columns.push(
        ColumnDefAst::new("a", TypeNameAst::plain("bigint"))
            .with(ColumnConstraintAst::AutoIncrement),
    );
    t.columns.push(
        ColumnDefAst::new("b", TypeNameAst::plain("bigint"))
            .with(ColumnConstraintAst::AutoIncrement),
    );
    assert!(bind(&catalog, &Statement::CreateTable(t)).is_err());
}

#[test]
fn timescale_table_rejects_primary_key() {
    let (_, catalog) = session();
    let Statement::CreateTable(mut t) = metrics_table("1d") else {
        unreachable!()
    };
    t.columns[0] = ColumnDefAst::new("ts", TypeNameAst::plain("timestamp"))
        .with(ColumnConstraintAst::PrimaryKey);
    assert!(bind(&catalog, &Statement::CreateTable(t)).is_err());
}

#[test]
fn foreign_key_actions_are_restricted() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    let fk = |on_update: RefActionAst, on_delete: RefActionAst| {
        let mut t = CreateTableStmt::new("orders");
        t.columns
            .push(ColumnDefAst::new("item_id", TypeNameAst::plain("bigint")));
        t.constraints.push(TableConstraintAst::ForeignKey {
            name: None,
            columns: vec!["item_id".to_string()],
            ref_schema: None,
            ref_table: "items".to_string(),
            ref_columns: vec!["id".to_string()],
            on_update,
            on_delete,
        });
        Statement::CreateTable(t)
    };

    assert!(bind(&catalog, &fk(RefActionAst::NoAction, RefActionAst::Cascade)).is_ok());
    assert!(bind(&catalog, &fk(RefActionAst::SetNull, RefActionAst::NoAction)).is_err());
    assert!(bind(&catalog, &fk(RefActionAst::NoAction, RefActionAst::SetDefault)).is_err());
}

#[test]
fn add_partition_suffix_must_match_interval() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1d")).unwrap();

    run(&catalog, &mut vars, &attach_partition("metrics_20240601")).unwrap();
    let info = kernel.get_table_info("sys", "metrics").unwrap();
    let parts = &info.partition.as_ref().unwrap().partitions;
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "metrics_20240601");

    // hour-length suffix on a day-interval table
    assert!(bind(&catalog, &attach_partition("metrics_2024060112")).is_err());
    // wrong prefix
    assert!(bind(&catalog, &attach_partition("other_20240601")).is_err());
}

#[test]
fn detach_partition_needs_the_exact_name() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1d")).unwrap();
    run(&catalog, &mut vars, &attach_partition("metrics_20240601")).unwrap();

    let detach = |part_name: &str| {
        Statement::AlterTable(AlterTableStmt {
            schema: None,
            table: "metrics".to_string(),
            target: AlterTarget::Table,
            commands: vec![AlterCommand::DetachPartition(part_name.to_string())],
            comment: None,
        })
    };
    // a proper prefix of an existing name is not a match
    assert!(bind(&catalog, &detach("metrics_2024060")).is_err());
    run(&catalog, &mut vars, &detach("METRICS_20240601")).unwrap();
    let info = kernel.get_table_info("sys", "metrics").unwrap();
    assert!(info.partition.as_ref().unwrap().partitions.is_empty());
}

#[test]
fn hour_interval_takes_ten_digit_suffixes() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1h")).unwrap();
    run(&catalog, &mut vars, &attach_partition("metrics_2024060112")).unwrap();
    assert!(bind(&catalog, &attach_partition("metrics_20240601")).is_err());
}

#[test]
fn auto_increment_fills_and_advances() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    let batch = run(&catalog, &mut vars, &insert_names(&["a", "b", "c"])).unwrap();
    assert_eq!(batch.affected_rows, 3);
    assert_eq!(batch.last_insert_rowid, 3);

    // an explicit id moves the watermark forward
    let explicit = Statement::Insert(InsertStmt {
        schema: None,
        table: "items".to_string(),
        columns: vec!["id".to_string(), "name".to_string()],
        rows: vec![vec![
            Expr::Literal(Value::Int(10)),
            Expr::Literal(Value::Text("d".to_string())),
        ]],
        on_conflict: OnConflict::Error,
    });
    run(&catalog, &mut vars, &explicit).unwrap();

    let batch = run(&catalog, &mut vars, &insert_names(&["e"])).unwrap();
    assert_eq!(batch.last_insert_rowid, 11);
}

#[test]
fn large_insert_is_split_at_the_row_cap() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    let names: Vec<String> = (0..300).map(|i| format!("n{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let batch = run(&catalog, &mut vars, &insert_names(&refs)).unwrap();

    assert_eq!(batch.affected_rows, 300);
    // 255 rows in the first kernel call, 45 in the second
    assert_eq!(kernel.batch_insert_calls(), 2);
    assert_eq!(kernel.row_count("items").unwrap(), 300);
}

/// `docs(id integer, body clob)`
fn docs_table() -> Statement {
    let mut t = CreateTableStmt::new("docs");
    t.columns
        .push(ColumnDefAst::new("id", TypeNameAst::plain("integer")));
    t.columns
        .push(ColumnDefAst::new("body", TypeNameAst::plain("clob")));
    Statement::CreateTable(t)
}

#[test]
fn lob_rows_are_submitted_one_per_batch() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &docs_table()).unwrap();

    let insert = Statement::Insert(InsertStmt {
        schema: None,
        table: "docs".to_string(),
        columns: vec!["id".to_string(), "body".to_string()],
        rows: (0..3)
            .map(|i| {
                vec![
                    Expr::Literal(Value::Int(i)),
                    Expr::Literal(Value::Text(format!("chapter {i}"))),
                ]
            })
            .collect(),
        on_conflict: OnConflict::Error,
    });
    let batch = run(&catalog, &mut vars, &insert).unwrap();
    assert_eq!(batch.affected_rows, 3);
    assert_eq!(kernel.batch_insert_calls(), 3);
    assert_eq!(kernel.row_count("docs").unwrap(), 3);
}

#[test]
fn index_on_a_lob_column_is_rejected() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &docs_table()).unwrap();

    let index = |column: &str| {
        Statement::CreateIndex(CreateIndexStmt {
            schema: None,
            name: "docs_idx".to_string(),
            table: "docs".to_string(),
            columns: vec![column.to_string()],
            unique: false,
            on_conflict: OnConflict::Error,
        })
    };
    assert!(bind(&catalog, &index("body")).is_err());
    run(&catalog, &mut vars, &index("id")).unwrap();
}

#[test]
fn batch_insert_retries_once_on_stale_metadata() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1d")).unwrap();
    run(&catalog, &mut vars, &attach_partition("metrics_20240601")).unwrap();

    kernel.inject_batch_error(743);
    let batch = run(&catalog, &mut vars, &insert_metric("2024-06-01 10:00:00", 1.5)).unwrap();
    assert_eq!(batch.affected_rows, 1);
    assert_eq!(kernel.batch_insert_calls(), 2);
    assert_eq!(kernel.row_count("metrics").unwrap(), 1);
}

#[test]
fn insert_creates_missing_partitions() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1d")).unwrap();

    run(&catalog, &mut vars, &insert_metric("2024-06-01 10:00:00", 0.5)).unwrap();
    let info = kernel.get_table_info("sys", "metrics").unwrap();
    let parts = &info.partition.as_ref().unwrap().partitions;
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].name, "metrics_20240601");
    assert_eq!(kernel.row_count("metrics").unwrap(), 1);
}

#[test]
fn insert_tolerates_a_partition_added_elsewhere() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1d")).unwrap();
    run(&catalog, &mut vars, &attach_partition("metrics_20240601")).unwrap();

    // bind against a snapshot that cannot see the partition yet
    kernel.hide_partition("metrics_20240601");
    let bound = bind(&catalog, &insert_metric("2024-06-01 10:00:00", 2.0)).unwrap();
    kernel.reveal_partitions();

    let batch = QueryExecutor::execute(&catalog, &mut vars, &bound).unwrap();
    assert_eq!(batch.affected_rows, 1);
    assert_eq!(kernel.row_count("metrics").unwrap(), 1);
}

#[test]
fn rename_table_round_trip() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    run(
        &catalog,
        &mut vars,
        &Statement::Rename(RenameStmt {
            schema: None,
            table: "items".to_string(),
            target: RenameTarget::Table {
                new_name: "stock".to_string(),
            },
        }),
    )
    .unwrap();

    let describe = |table: &str| {
        Statement::Show(ShowStmt {
            kind: ShowKind::Table {
                schema: None,
                table: table.to_string(),
            },
        })
    };
    assert!(bind(&catalog, &describe("items")).is_err());
    let batch = run(&catalog, &mut vars, &describe("stock")).unwrap();
    assert_eq!(batch.rows.len(), 3);
}

#[test]
fn rename_column_round_trip() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    let rename = |old: &str, new: &str| {
        Statement::Rename(RenameStmt {
            schema: None,
            table: "items".to_string(),
            target: RenameTarget::Column {
                old_name: old.to_string(),
                new_name: new.to_string(),
            },
        })
    };
    // the target must exist and the new name must be free
    assert!(bind(&catalog, &rename("label", "tag")).is_err());
    assert!(bind(&catalog, &rename("name", "qty")).is_err());

    run(&catalog, &mut vars, &rename("name", "label")).unwrap();

    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Show(ShowStmt {
            kind: ShowKind::Table {
                schema: None,
                table: "items".to_string(),
            },
        }),
    )
    .unwrap();
    assert_eq!(batch.rows[1][0], Value::Text("label".to_string()));
    assert_eq!(batch.rows[1][1], Value::Text("VARCHAR(40)".to_string()));
}

#[test]
fn update_and_delete_with_filters() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();
    run(&catalog, &mut vars, &insert_names(&["a", "b", "c"])).unwrap();

    let name_is = |n: &str| Expr::Binary {
        op: BinaryOp::Eq,
        left: Box::new(Expr::Column(vec!["name".to_string()])),
        right: Box::new(Expr::Literal(Value::Text(n.to_string()))),
    };

    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Update(UpdateStmt {
            schema: None,
            table: "items".to_string(),
            assignments: vec![("qty".to_string(), Expr::Literal(Value::Int(9)))],
            filter: Some(name_is("b")),
        }),
    )
    .unwrap();
    assert_eq!(batch.affected_rows, 1);

    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Delete(DeleteStmt {
            schema: None,
            table: "items".to_string(),
            filter: Some(name_is("a")),
        }),
    )
    .unwrap();
    assert_eq!(batch.affected_rows, 1);
    assert_eq!(kernel.row_count("items").unwrap(), 2);
}

#[test]
fn delete_walks_every_partition() {
    let (kernel, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &metrics_table("1d")).unwrap();
    run(&catalog, &mut vars, &insert_metric("2024-06-01 10:00:00", 1.0)).unwrap();
    run(&catalog, &mut vars, &insert_metric("2024-06-02 10:00:00", 2.0)).unwrap();
    run(&catalog, &mut vars, &insert_metric("2024-06-02 11:00:00", 3.0)).unwrap();

    let info = kernel.get_table_info("sys", "metrics").unwrap();
    assert_eq!(info.partition.as_ref().unwrap().partitions.len(), 2);

    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Delete(DeleteStmt {
            schema: None,
            table: "metrics".to_string(),
            filter: None,
        }),
    )
    .unwrap();
    assert_eq!(batch.affected_rows, 3);
    assert_eq!(kernel.row_count("metrics").unwrap(), 0);
}

#[test]
fn sequence_defaults_feed_inserts() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(
        &catalog,
        &mut vars,
        &Statement::CreateSequence(CreateSequenceStmt {
            schema: None,
            name: "item_seq".to_string(),
            temporary: false,
            on_conflict: OnConflict::Error,
            options: Vec::new(),
        }),
    )
    .unwrap();

    let mut t = CreateTableStmt::new("tagged");
    t.columns.push(
        ColumnDefAst::new("id", TypeNameAst::plain("bigint")).with(ColumnConstraintAst::Default(
            Expr::Function {
                name: "nextval".to_string(),
                args: vec![Expr::Literal(Value::Text("item_seq".to_string()))],
            },
        )),
    );
    t.columns.push(ColumnDefAst::new(
        "tag",
        TypeNameAst::with_modifiers("varchar", vec![10]),
    ));
    run(&catalog, &mut vars, &Statement::CreateTable(t)).unwrap();

    run(
        &catalog,
        &mut vars,
        &Statement::Insert(InsertStmt {
            schema: None,
            table: "tagged".to_string(),
            columns: vec!["tag".to_string()],
            rows: vec![
                vec![Expr::Literal(Value::Text("x".to_string()))],
                vec![Expr::Literal(Value::Text("y".to_string()))],
            ],
            on_conflict: OnConflict::Error,
        }),
    )
    .unwrap();

    // second row took sequence value 2
    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Delete(DeleteStmt {
            schema: None,
            table: "tagged".to_string(),
            filter: Some(Expr::Binary {
                op: BinaryOp::Eq,
                left: Box::new(Expr::Column(vec!["id".to_string()])),
                right: Box::new(Expr::Literal(Value::Int(2))),
            }),
        }),
    )
    .unwrap();
    assert_eq!(batch.affected_rows, 1);
}

#[test]
fn set_and_show_session_variables() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();

    run(
        &catalog,
        &mut vars,
        &Statement::Set(SetStmt {
            name: "auto_commit".to_string(),
            scope: VarScope::Session,
            args: vec![Value::Text("off".to_string())],
        }),
    )
    .unwrap();
    assert!(!vars.auto_commit);

    let batch = run(
        &catalog,
        &mut vars,
        &Statement::Show(ShowStmt {
            kind: ShowKind::Variable("auto_commit".to_string()),
        }),
    )
    .unwrap();
    assert_eq!(batch.rows[0][1], Value::Boolean(false));

    // out of range
    let err = run(
        &catalog,
        &mut vars,
        &Statement::Set(SetStmt {
            name: "max_connections".to_string(),
            scope: VarScope::Global,
            args: vec![Value::Int(5000)],
        }),
    );
    assert!(err.is_err());

    // wrong scope
    let err = run(
        &catalog,
        &mut vars,
        &Statement::Set(SetStmt {
            name: "max_connections".to_string(),
            scope: VarScope::Session,
            args: vec![Value::Int(64)],
        }),
    );
    assert!(err.is_err());
}

#[test]
fn drop_honors_if_exists() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();

    let drop = |if_exists: bool| {
        Statement::Drop(DropStmt {
            schema: None,
            name: "ghost".to_string(),
            kind: ObjectKind::Table,
            if_exists,
        })
    };
    run(&catalog, &mut vars, &drop(true)).unwrap();
    assert!(run(&catalog, &mut vars, &drop(false)).is_err());
}

#[test]
fn copy_binds_paths_and_rejects_other_formats() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    run(&catalog, &mut vars, &items_table()).unwrap();

    let copy = |filename: Option<&str>, options: Vec<CopyOptionAst>| {
        Statement::Copy(CopyStmt {
            schema: None,
            table: "items".to_string(),
            columns: Vec::new(),
            is_from: true,
            filename: filename.map(String::from),
            options,
        })
    };

    let bound = bind(&catalog, &copy(None, Vec::new())).unwrap();
    let BoundNode::Copy(s) = &bound.node else {
        panic!("expected a copy statement");
    };
    assert_eq!(s.file_path, "/dev/stdin");
    assert_eq!(s.format, "csv");

    let json = vec![CopyOptionAst {
        name: "format".to_string(),
        arg: Some(Value::Text("json".to_string())),
    }];
    assert!(bind(&catalog, &copy(None, json)).is_err());

    let twice = vec![
        CopyOptionAst {
            name: "delimiter".to_string(),
            arg: Some(Value::Text(";".to_string())),
        },
        CopyOptionAst {
            name: "delimiter".to_string(),
            arg: Some(Value::Text(",".to_string())),
        },
    ];
    assert!(bind(&catalog, &copy(None, twice)).is_err());
}

#[test]
fn insert_without_required_column_fails_at_bind_time() {
    let (_, catalog) = session();
    let mut vars = SessionVars::default();
    let mut t = CreateTableStmt::new("strict");
    t.columns.push(
        ColumnDefAst::new("a", TypeNameAst::plain("integer")).with(ColumnConstraintAst::NotNull),
    );
    t.columns
        .push(ColumnDefAst::new("b", TypeNameAst::plain("integer")));
    run(&catalog, &mut vars, &Statement::CreateTable(t)).unwrap();

    let err = bind(
        &catalog,
        &Statement::Insert(InsertStmt {
            schema: None,
            table: "strict".to_string(),
            columns: vec!["b".to_string()],
            rows: vec![vec![Expr::Literal(Value::Int(1))]],
            on_conflict: OnConflict::Error,
        }),
    );
    assert!(matches!(err, Err(EngineError::Binder(_))));
}
