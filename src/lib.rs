//! # opsql
//!
//! Compiles operation-node query trees into SQL text with positional
//! placeholders and an ordered list of bound values.
//!
//! ## Quick Example
//!
//! ```
//! use opsql::prelude::*;
//!
//! let query = QueryNode::new(vec![Node::table("t")])
//!     .with_select(SelectNode::new(vec![Node::SelectAll]))
//!     .with_where(Node::filter(Node::reference("t", "a"), "=", Node::value(1)));
//!
//! let compiled = query.to_sql().unwrap();
//! assert_eq!(compiled.sql(), r#"select * from "t" where "t"."a" = $0"#);
//! assert_eq!(compiled.bindings(), &[Value::Int(1)]);
//! ```
//!
//! ## Node kinds
//!
//! | Node                 | Output                         |
//! |----------------------|--------------------------------|
//! | `Identifier`         | `"name"`                       |
//! | `Reference`          | `"table"."column"`             |
//! | `Alias`              | `<node> as "alias"`            |
//! | `Filter`             | `<lhs> <op> <rhs>`             |
//! | `And` / `Or`         | `<lhs> and <rhs>`, no grouping |
//! | `Parens`             | `(<node>)`                     |
//! | `Value`              | `$n`, value bound at index `n` |
//! | `Query` (nested)     | `(select ... from ...)`        |

pub mod ast;
pub mod compiled;
pub mod compiler;
pub mod config;
pub mod dialect;
pub mod error;
pub mod parser;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::compiled::CompiledQuery;
    pub use crate::compiler::{QueryCompiler, ToSql};
    pub use crate::config::CompilerConfig;
    pub use crate::dialect::{DefaultDialect, Dialect};
    pub use crate::error::*;
}

/// Compile a root query with the default dialect.
///
/// # Example
///
/// ```
/// use opsql::ast::{Node, QueryNode};
///
/// let compiled = opsql::compile(&QueryNode::new(vec![Node::table("users")])).unwrap();
/// assert_eq!(compiled.sql(), r#"from "users""#);
/// ```
pub fn compile(query: &ast::QueryNode) -> Result<compiled::CompiledQuery, error::OpsqlError> {
    compiler::QueryCompiler::new().compile(query)
}
