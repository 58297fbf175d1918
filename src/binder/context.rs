use crate::core::column::Column;
use crate::core::error::EngineError;

/// One table visible to column resolution, under its alias.
#[derive(Debug, Clone)]
pub struct TableBinding {
    pub alias: String,
    pub columns: Vec<Column>,
}

/// Name-resolution scope of one statement. Nested statements chain to
/// their parent scope, so a correlated reference that misses every local
/// binding walks outward before failing.
#[derive(Debug, Default)]
pub struct BinderContext {
    bindings: Vec<TableBinding>,
    parent: Option<Box<BinderContext>>,
}

impl BinderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn nested(parent: Self) -> Self {
        Self {
            bindings: Vec::new(),
            parent: Some(Box::new(parent)),
        }
    }

    pub fn into_parent(self) -> Option<Self> {
        self.parent.map(|p| *p)
    }

    pub fn add_table_binding(
        &mut self,
        alias: impl Into<String>,
        columns: Vec<Column>,
    ) -> Result<(), EngineError> {
        let alias = alias.into();
        if self.bindings.iter().any(|b| b.alias.eq_ignore_ascii_case(&alias)) {
            return Err(EngineError::Binder(format!(
                "duplicate table alias: {alias}"
            )));
        }
        self.bindings.push(TableBinding { alias, columns });
        Ok(())
    }

    #[must_use]
    pub fn binding(&self, alias: &str) -> Option<&TableBinding> {
        self.bindings
            .iter()
            .find(|b| b.alias.eq_ignore_ascii_case(alias))
            .or_else(|| self.parent.as_ref().and_then(|p| p.binding(alias)))
    }

    /// Finds the unique binding holding `column`. Ambiguity across local
    /// bindings is an error; parent scopes are consulted only when no
    /// local binding matches.
    pub fn binding_by_column(&self, column: &str) -> Result<Option<&TableBinding>, EngineError> {
        let mut hit: Option<&TableBinding> = None;
        for b in &self.bindings {
            if b.columns.iter().any(|c| c.name.eq_ignore_ascii_case(column)) {
                if hit.is_some() {
                    return Err(EngineError::Binder(format!(
                        "column reference '{column}' is ambiguous"
                    )));
                }
                hit = Some(b);
            }
        }
        if hit.is_some() {
            return Ok(hit);
        }
        match &self.parent {
            Some(p) => p.binding_by_column(column),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data_type::LogicalType;

    fn cols(names: &[&str]) -> Vec<Column> {
        names
            .iter()
            .map(|n| Column::new(*n, LogicalType::integer()))
            .collect()
    }

    #[test]
    fn duplicate_alias_is_rejected() {
        let mut ctx = BinderContext::new();
        ctx.add_table_binding("t", cols(&["a"])).unwrap();
        assert!(ctx.add_table_binding("T", cols(&["b"])).is_err());
    }

    #[test]
    fn ambiguous_column_across_bindings_errors() {
        let mut ctx = BinderContext::new();
        ctx.add_table_binding("t1", cols(&["id", "x"])).unwrap();
        ctx.add_table_binding("t2", cols(&["id", "y"])).unwrap();
        assert!(ctx.binding_by_column("id").is_err());
        assert_eq!(ctx.binding_by_column("y").unwrap().unwrap().alias, "t2");
    }

    #[test]
    fn lookup_falls_back_to_parent_scope() {
        let mut outer = BinderContext::new();
        outer.add_table_binding("outer_t", cols(&["k"])).unwrap();
        let inner = BinderContext::nested(outer);
        let hit = inner.binding_by_column("k").unwrap().unwrap();
        assert_eq!(hit.alias, "outer_t");

        let outer = inner.into_parent().unwrap();
        assert!(outer.binding("outer_t").is_some());
        assert!(outer.into_parent().is_none());
    }
}
