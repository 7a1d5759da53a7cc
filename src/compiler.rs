//! Query compiler.
//!
//! Walks a [`QueryNode`] tree depth-first and produces statement text with
//! positional placeholders plus the matching list of bound values.
//!
//! Scratch state (text buffer, bindings, subquery depth) is created for one
//! call to [`QueryCompiler::compile`] and dropped when it returns, so a
//! compiler can be shared freely.

use crate::ast::*;
use crate::compiled::CompiledQuery;
use crate::dialect::{DefaultDialect, Dialect};
use crate::error::{OpsqlError, OpsqlResult};

/// Trait for compiling a tree to SQL.
pub trait ToSql {
    /// Compile with the default dialect (`"` identifiers, `$0` placeholders).
    fn to_sql(&self) -> OpsqlResult<CompiledQuery> {
        self.to_sql_with_dialect(DefaultDialect)
    }

    fn to_sql_with_dialect<D: Dialect>(&self, dialect: D) -> OpsqlResult<CompiledQuery>;
}

impl ToSql for QueryNode {
    fn to_sql_with_dialect<D: Dialect>(&self, dialect: D) -> OpsqlResult<CompiledQuery> {
        QueryCompiler::with_dialect(dialect).compile(self)
    }
}

/// Compiles query trees. Holds only the dialect; cheap to build.
#[derive(Debug, Clone, Default)]
pub struct QueryCompiler<D = DefaultDialect> {
    dialect: D,
}

impl QueryCompiler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<D: Dialect> QueryCompiler<D> {
    pub fn with_dialect(dialect: D) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Compile a root query. Nothing is returned unless the whole tree compiled.
    pub fn compile(&self, query: &QueryNode) -> OpsqlResult<CompiledQuery> {
        let mut ctx = CompileContext::new(&self.dialect);
        ctx.visit_query(query)?;

        let compiled = ctx.finish();
        tracing::debug!(
            sql_len = compiled.sql().len(),
            bindings = compiled.bindings().len(),
            "compiled query"
        );
        Ok(compiled)
    }
}

/// Per-compilation state.
struct CompileContext<'d, D> {
    dialect: &'d D,
    sql: String,
    bindings: Vec<Value>,
    depth: usize,
}

impl<'d, D: Dialect> CompileContext<'d, D> {
    fn new(dialect: &'d D) -> Self {
        Self {
            dialect,
            sql: String::new(),
            bindings: Vec::new(),
            depth: 0,
        }
    }

    fn finish(self) -> CompiledQuery {
        debug_assert_eq!(self.depth, 0);
        CompiledQuery::new(self.sql, self.bindings)
    }

    fn visit_node(&mut self, node: &Node) -> OpsqlResult<()> {
        match node {
            Node::Identifier(n) => {
                self.visit_identifier(n);
                Ok(())
            }
            Node::Reference(n) => self.visit_reference(n),
            Node::Table(n) => {
                self.visit_table(n);
                Ok(())
            }
            Node::Alias(n) => self.visit_alias(n),
            Node::Selection(n) => self.visit_node(&n.selection),
            Node::SelectAll => {
                self.append("*");
                Ok(())
            }
            Node::Select(n) => self.visit_select(n),
            Node::Query(n) => self.visit_query(n),
            Node::Filter(n) => self.visit_filter(n),
            Node::And(n) => self.visit_logical(n, " and "),
            Node::Or(n) => self.visit_logical(n, " or "),
            Node::Parens(n) => self.visit_parens(n),
            Node::Value(n) => {
                self.append_value(&n.value);
                Ok(())
            }
            Node::ValueList(n) => self.visit_value_list(n),
            Node::PrimitiveValueList(n) => {
                self.visit_primitive_value_list(n);
                Ok(())
            }
            Node::Join(n) => self.visit_join(n),
            Node::Operator(n) => {
                self.append(&n.operator);
                Ok(())
            }
            Node::Raw(n) => self.visit_raw(n),
        }
    }

    fn visit_query(&mut self, node: &QueryNode) -> OpsqlResult<()> {
        if node.from.is_empty() {
            return Err(OpsqlError::missing("Query", "from"));
        }

        let needs_parens = self.depth > 0;
        self.depth += 1;
        if needs_parens {
            tracing::trace!(depth = self.depth, "entering subquery");
            self.append("(");
        }

        let result = self.compile_query_body(node);

        if needs_parens {
            self.append(")");
        }
        self.depth -= 1;
        result
    }

    fn compile_query_body(&mut self, node: &QueryNode) -> OpsqlResult<()> {
        if let Some(select) = &node.select {
            self.visit_select(select)?;
            self.append(" ");
        }

        self.append("from ");
        self.compile_list(&node.from)?;

        for join in &node.joins {
            self.append(" ");
            self.visit_join(join)?;
        }

        if let Some(filter) = &node.where_clause {
            self.append(" where ");
            self.visit_node(filter)?;
        }

        if let Some(modifier) = node.modifier {
            self.append(" ");
            self.append(modifier.as_sql());
        }

        Ok(())
    }

    fn visit_select(&mut self, node: &SelectNode) -> OpsqlResult<()> {
        if node.selections.is_empty() {
            return Err(OpsqlError::missing("Select", "selections"));
        }

        self.append("select ");

        if !node.distinct_on_selections.is_empty() {
            self.append("distinct on (");
            self.compile_list(&node.distinct_on_selections)?;
            self.append(") ");
        }

        if let Some(modifier) = node.modifier {
            self.append(modifier.as_sql());
            self.append(" ");
        }

        self.compile_list(&node.selections)
    }

    /// Comma-separated, no trailing separator.
    fn compile_list(&mut self, nodes: &[Node]) -> OpsqlResult<()> {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.visit_node(node)?;
        }
        Ok(())
    }

    fn visit_alias(&mut self, node: &AliasNode) -> OpsqlResult<()> {
        self.visit_node(&node.node)?;
        self.append(" as ");
        self.visit_identifier(&node.alias);
        Ok(())
    }

    fn visit_reference(&mut self, node: &ReferenceNode) -> OpsqlResult<()> {
        self.visit_node(&node.table)?;
        self.append(".");
        self.visit_node(&node.column)
    }

    fn visit_identifier(&mut self, node: &IdentifierNode) {
        let wrapper = self.dialect.identifier_wrapper();
        self.sql.push(wrapper);
        self.sql.push_str(&node.identifier);
        self.sql.push(wrapper);
    }

    fn visit_table(&mut self, node: &TableNode) {
        if let Some(schema) = &node.schema {
            self.visit_identifier(schema);
            self.append(".");
        }
        self.visit_identifier(&node.table);
    }

    fn visit_filter(&mut self, node: &FilterNode) -> OpsqlResult<()> {
        if let Some(lhs) = &node.lhs {
            self.visit_node(lhs)?;
            self.append(" ");
        }

        self.visit_node(&node.op)?;
        self.append(" ");
        self.visit_node(&node.rhs)
    }

    /// `and` / `or` never add grouping; only `Parens` does.
    fn visit_logical(&mut self, node: &LogicalNode, keyword: &str) -> OpsqlResult<()> {
        self.visit_node(&node.lhs)?;
        self.append(keyword);
        self.visit_node(&node.rhs)
    }

    fn visit_parens(&mut self, node: &ParensNode) -> OpsqlResult<()> {
        self.append("(");
        self.visit_node(&node.node)?;
        self.append(")");
        Ok(())
    }

    fn visit_value_list(&mut self, node: &ValueListNode) -> OpsqlResult<()> {
        self.append("(");
        self.compile_list(&node.values)?;
        self.append(")");
        Ok(())
    }

    fn visit_primitive_value_list(&mut self, node: &PrimitiveValueListNode) {
        self.append("(");
        for (i, value) in node.values.iter().enumerate() {
            if i > 0 {
                self.append(", ");
            }
            self.append_value(value);
        }
        self.append(")");
    }

    fn visit_join(&mut self, node: &JoinNode) -> OpsqlResult<()> {
        self.append(node.join_type.as_sql());
        self.append(" ");
        self.visit_node(&node.table)?;

        // Condition-less joins get no dangling `on`.
        if let Some(on) = &node.on {
            self.append(" on ");
            self.visit_node(on)?;
        }
        Ok(())
    }

    fn visit_raw(&mut self, node: &RawNode) -> OpsqlResult<()> {
        node.check_arity()?;

        for (i, fragment) in node.sql_fragments.iter().enumerate() {
            self.append(fragment);
            if let Some(param) = node.params.get(i) {
                self.visit_node(param)?;
            }
        }
        Ok(())
    }

    fn append(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// The placeholder encodes the binding's index at the time it is pushed.
    fn append_value(&mut self, value: &Value) {
        let placeholder = self.dialect.placeholder(self.bindings.len());
        self.sql.push_str(&placeholder);
        self.bindings.push(value.clone());
    }
}
