// Catalog: name resolution and DDL entry points over the storage kernel.
// One instance per session; the dictionary-cache lock is shared with every
// data source the session opens.

use std::sync::{Arc, Mutex};

use crate::core::alter::AlterTableInfo;
use crate::core::error::EngineError;
use crate::core::index::Index;
use crate::core::table_info::TableInfo;
use crate::kernel::{
    CreateTableDef, KernelError, ObjectKind, ObjectPrivilege, SequenceDef, StorageKernel,
    SysPrivilege, err_code,
};

/// Guards kernel dictionary-cache refreshes. Held across DDL that other
/// sessions may be racing, and across batch-insert retries.
pub type DcLock = Arc<Mutex<()>>;

pub struct Catalog<K: StorageKernel> {
    kernel: Arc<K>,
    user: String,
    dc_lock: DcLock,
}

impl<K: StorageKernel> Catalog<K> {
    pub fn new(kernel: Arc<K>, user: impl Into<String>) -> Self {
        Self {
            kernel,
            user: user.into(),
            dc_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn kernel(&self) -> &Arc<K> {
        &self.kernel
    }

    #[must_use]
    pub fn dc_lock(&self) -> DcLock {
        Arc::clone(&self.dc_lock)
    }

    /// Resolves `schema` to the session user when absent.
    #[must_use]
    pub fn schema_or_session<'a>(&'a self, schema: Option<&'a str>) -> &'a str {
        schema.unwrap_or(&self.user)
    }

    /// Looks a table up, resolving synonyms. `Ok(None)` when the name does
    /// not exist; other kernel failures surface as errors.
    pub fn get_table(
        &self,
        schema: Option<&str>,
        name: &str,
    ) -> Result<Option<TableInfo>, EngineError> {
        let user = self.schema_or_session(schema);
        match self.kernel.get_table_info(user, name) {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.code == err_code::OBJECT_NOT_FOUND => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn create_table(
        &self,
        schema: Option<&str>,
        def: &CreateTableDef,
        ignore_conflict: bool,
    ) -> Result<(), EngineError> {
        let user = self.schema_or_session(schema).to_string();
        let _guard = self.dc_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match self.kernel.create_table(&user, def) {
            Ok(()) => Ok(()),
            Err(e) => self.downgrade_duplicate(e, ignore_conflict, "table", &def.name),
        }
    }

    pub fn create_index(
        &self,
        schema: Option<&str>,
        index: &Index,
        ignore_conflict: bool,
    ) -> Result<(), EngineError> {
        let user = self.schema_or_session(schema).to_string();
        let _guard = self.dc_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match self.kernel.create_index(&user, index) {
            Ok(()) => Ok(()),
            Err(e) => self.downgrade_duplicate(e, ignore_conflict, "index", &index.name),
        }
    }

    pub fn create_sequence(
        &self,
        schema: Option<&str>,
        def: &SequenceDef,
        ignore_conflict: bool,
    ) -> Result<(), EngineError> {
        let user = self.schema_or_session(schema).to_string();
        match self.kernel.create_sequence(&user, def) {
            Ok(()) => Ok(()),
            Err(e) => self.downgrade_duplicate(e, ignore_conflict, "sequence", &def.name),
        }
    }

    pub fn create_view(
        &self,
        schema: Option<&str>,
        name: &str,
        columns: &[crate::core::column::Column],
        query_text: &str,
        ignore_conflict: bool,
    ) -> Result<(), EngineError> {
        let user = self.schema_or_session(schema).to_string();
        match self.kernel.create_view(&user, name, columns, query_text) {
            Ok(()) => Ok(()),
            Err(e) => self.downgrade_duplicate(e, ignore_conflict, "view", name),
        }
    }

    pub fn alter_table(
        &self,
        schema: Option<&str>,
        table: &str,
        info: &AlterTableInfo,
    ) -> Result<(), EngineError> {
        let user = self.schema_or_session(schema).to_string();
        let _guard = self.dc_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        self.kernel.alter_table(&user, table, info)?;
        Ok(())
    }

    pub fn drop_object(
        &self,
        schema: Option<&str>,
        name: &str,
        kind: ObjectKind,
        if_exists: bool,
    ) -> Result<(), EngineError> {
        let user = self.schema_or_session(schema).to_string();
        let _guard = self.dc_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match self.kernel.drop_object(&user, name, kind) {
            Ok(()) => Ok(()),
            Err(e) if e.code == err_code::OBJECT_NOT_FOUND && if_exists => {
                tracing::info!("{:?} {} not found, skipped by IF EXISTS", kind, name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn sequence_exists(&self, schema: Option<&str>, name: &str) -> Result<bool, EngineError> {
        let user = self.schema_or_session(schema);
        Ok(self.kernel.sequence_exists(user, name)?)
    }

    pub fn seq_next_value(&self, schema: Option<&str>, name: &str) -> Result<i64, EngineError> {
        let user = self.schema_or_session(schema);
        Ok(self.kernel.seq_next_value(user, name)?)
    }

    /// Current sequence value. A sequence never advanced in this session
    /// has no current value; the caller decides whether to fall back to
    /// `seq_next_value`.
    pub fn seq_curr_value(&self, schema: Option<&str>, name: &str) -> Result<i64, EngineError> {
        let user = self.schema_or_session(schema);
        Ok(self.kernel.seq_curr_value(user, name)?)
    }

    pub fn has_sys_privilege(&self, privilege: SysPrivilege) -> Result<bool, EngineError> {
        Ok(self.kernel.check_sys_privilege(&self.user, privilege)?)
    }

    /// Object-privilege check with the owner short-circuit: a user always
    /// holds every privilege on their own objects. When `bound_name`
    /// differs from the table's real name the lookup went through a
    /// synonym, and the check is repeated against the real owner and name.
    pub fn verify_table_privilege(
        &self,
        info: &TableInfo,
        bound_name: &str,
        privilege: ObjectPrivilege,
    ) -> Result<bool, EngineError> {
        if self.user == info.user {
            return Ok(true);
        }
        let owner = info.user.clone();
        if !self
            .kernel
            .check_privilege(&self.user, &owner, bound_name, privilege)?
        {
            return Ok(false);
        }
        if !info.name.eq_ignore_ascii_case(bound_name) {
            let real_owner = self.kernel.user_name(info.user_id)?;
            return Ok(self
                .kernel
                .check_privilege(&self.user, &real_owner, &info.name, privilege)?);
        }
        Ok(true)
    }

    fn downgrade_duplicate(
        &self,
        e: KernelError,
        ignore_conflict: bool,
        kind: &str,
        name: &str,
    ) -> Result<(), EngineError> {
        if e.code == err_code::DUPLICATE_OBJECT && ignore_conflict {
            tracing::info!("{} {} already exists, skipped by IF NOT EXISTS", kind, name);
            return Ok(());
        }
        Err(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::column::Column;
    use crate::core::data_type::LogicalType;
    use crate::kernel::MemoryKernel;

    fn catalog_for(user: &str) -> (Arc<MemoryKernel>, Catalog<MemoryKernel>) {
        let kernel = Arc::new(MemoryKernel::new());
        (Arc::clone(&kernel), Catalog::new(kernel, user))
    }

    fn simple_table(name: &str) -> CreateTableDef {
        CreateTableDef {
            name: name.to_string(),
            columns: vec![Column::new("id", LogicalType::integer())],
            constraints: Vec::new(),
            indexes: Vec::new(),
            partition: None,
            is_timescale: false,
            retention: None,
            comment: None,
        }
    }

    #[test]
    fn missing_table_is_none_not_an_error() {
        let (_, catalog) = catalog_for("sys");
        assert!(catalog.get_table(None, "nope").unwrap().is_none());
    }

    #[test]
    fn duplicate_table_downgrades_only_with_ignore() {
        let (_, catalog) = catalog_for("sys");
        let def = simple_table("t");
        catalog.create_table(None, &def, false).unwrap();
        assert!(catalog.create_table(None, &def, false).is_err());
        catalog.create_table(None, &def, true).unwrap();
    }

    #[test]
    fn view_lifecycle() {
        let (_, catalog) = catalog_for("sys");
        catalog
            .create_view(None, "v", &[], "select id from t", false)
            .unwrap();
        assert!(catalog
            .create_view(None, "v", &[], "select id from t", false)
            .is_err());
        catalog
            .create_view(None, "v", &[], "select id from t", true)
            .unwrap();
        catalog
            .drop_object(None, "v", ObjectKind::View, false)
            .unwrap();
        // gone now, IF EXISTS downgrades
        assert!(catalog
            .drop_object(None, "v", ObjectKind::View, false)
            .is_err());
        catalog.drop_object(None, "v", ObjectKind::View, true).unwrap();
    }

    #[test]
    fn owner_short_circuits_privilege_checks() {
        let (kernel, catalog) = catalog_for("sys");
        catalog.create_table(None, &simple_table("t"), false).unwrap();
        kernel.deny_privilege("sys", "sys", "t", ObjectPrivilege::Select);
        let info = catalog.get_table(None, "t").unwrap().unwrap();
        // denial is ignored for the owner
        assert!(catalog
            .verify_table_privilege(&info, "t", ObjectPrivilege::Select)
            .unwrap());
    }

    #[test]
    fn synonym_access_rechecks_the_real_owner() {
        let kernel = Arc::new(MemoryKernel::new());
        let owner_catalog = Catalog::new(Arc::clone(&kernel), "owner");
        owner_catalog
            .create_table(None, &simple_table("secrets"), false)
            .unwrap();
        kernel.create_synonym("guest", "s", "owner", "secrets");

        let guest_catalog = Catalog::new(Arc::clone(&kernel), "guest");
        let info = guest_catalog.get_table(None, "s").unwrap().unwrap();
        assert!(guest_catalog
            .verify_table_privilege(&info, "s", ObjectPrivilege::Select)
            .unwrap());

        // denied on the real owner and name, even if the synonym is open
        kernel.deny_privilege("guest", "owner", "secrets", ObjectPrivilege::Select);
        assert!(!guest_catalog
            .verify_table_privilege(&info, "s", ObjectPrivilege::Select)
            .unwrap());
    }
}
