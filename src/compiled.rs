use serde::Serialize;

use crate::ast::Value;

/// Statement text plus the values bound to its placeholders, in order.
///
/// Produced only by the compiler; there is no way to change either part
/// afterwards short of taking it apart with [`CompiledQuery::into_parts`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    sql: String,
    bindings: Vec<Value>,
}

impl CompiledQuery {
    pub(crate) fn new(sql: String, bindings: Vec<Value>) -> Self {
        Self { sql, bindings }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.bindings)
    }
}

impl std::fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}
