//! Operation nodes.
//!
//! A query is a tree of [`Node`] values. Each variant's shape is fixed by its
//! kind, and trees are never mutated once handed to the compiler.

use serde::{Deserialize, Serialize};

use super::values::Value;
use crate::error::{OpsqlError, OpsqlResult};
use crate::parser;

/// Any query fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Node {
    Identifier(IdentifierNode),
    Reference(ReferenceNode),
    Table(TableNode),
    Alias(AliasNode),
    Selection(SelectionNode),
    SelectAll,
    Select(SelectNode),
    Query(Box<QueryNode>),
    Filter(FilterNode),
    And(LogicalNode),
    Or(LogicalNode),
    Parens(ParensNode),
    Value(ValueNode),
    ValueList(ValueListNode),
    PrimitiveValueList(PrimitiveValueListNode),
    Join(JoinNode),
    Operator(OperatorNode),
    Raw(RawNode),
}

/// A raw name, quoted by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierNode {
    pub identifier: String,
}

/// `table.column`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub table: Box<Node>,
    pub column: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<IdentifierNode>,
    pub table: IdentifierNode,
}

/// `<node> as <alias>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasNode {
    pub node: Box<Node>,
    pub alias: IdentifierNode,
}

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionNode {
    pub selection: Box<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectModifier {
    Distinct,
}

impl SelectModifier {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SelectModifier::Distinct => "distinct",
        }
    }
}

/// `select [distinct on (...)] [distinct] <selections>`
///
/// `selections` must not be empty; the compiler rejects an empty list with
/// [`OpsqlError::MissingChild`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectNode {
    pub selections: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distinct_on_selections: Vec<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<SelectModifier>,
}

/// Trailing row-locking / wait directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryModifier {
    ForKeyShare,
    ForNoKeyUpdate,
    ForUpdate,
    ForShare,
    NoWait,
    SkipLocked,
}

impl QueryModifier {
    pub const ALL: [QueryModifier; 6] = [
        QueryModifier::ForKeyShare,
        QueryModifier::ForNoKeyUpdate,
        QueryModifier::ForUpdate,
        QueryModifier::ForShare,
        QueryModifier::NoWait,
        QueryModifier::SkipLocked,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            QueryModifier::ForKeyShare => "for key share",
            QueryModifier::ForNoKeyUpdate => "for no key update",
            QueryModifier::ForUpdate => "for update",
            QueryModifier::ForShare => "for share",
            QueryModifier::NoWait => "no wait",
            QueryModifier::SkipLocked => "skip locked",
        }
    }
}

/// A complete statement: the root of a tree, or a subquery inside one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<SelectNode>,
    pub from: Vec<Node>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<JoinNode>,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Box<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<QueryModifier>,
}

/// `[lhs] op rhs`. A missing `lhs` gives unary predicates such as `exists (...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lhs: Option<Box<Node>>,
    pub op: Box<Node>,
    pub rhs: Box<Node>,
}

/// Operands of an `And` or `Or` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalNode {
    pub lhs: Box<Node>,
    pub rhs: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParensNode {
    pub node: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueNode {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueListNode {
    pub values: Vec<Node>,
}

/// Flat scalar list, bound without visiting a node per element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveValueListNode {
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinType {
    InnerJoin,
    LeftJoin,
    RightJoin,
    FullJoin,
}

impl JoinType {
    pub const ALL: [JoinType; 4] = [
        JoinType::InnerJoin,
        JoinType::LeftJoin,
        JoinType::RightJoin,
        JoinType::FullJoin,
    ];

    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::InnerJoin => "inner join",
            JoinType::LeftJoin => "left join",
            JoinType::RightJoin => "right join",
            JoinType::FullJoin => "full join",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    pub join_type: JoinType,
    pub table: Box<Node>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Box<Node>>,
}

/// Operator text, emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNode {
    pub operator: String,
}

/// Alternating SQL text and parameters: `sql_fragments[0] params[0] sql_fragments[1] ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub sql_fragments: Vec<String>,
    #[serde(default)]
    pub params: Vec<Node>,
}

impl RawNode {
    /// Build a raw node, checking that there is exactly one more fragment
    /// than there are parameters.
    pub fn new(sql_fragments: Vec<String>, params: Vec<Node>) -> OpsqlResult<Self> {
        let node = Self {
            sql_fragments,
            params,
        };
        node.check_arity()?;
        Ok(node)
    }

    /// Build a raw node from a `?` template, e.g. `"a = ? and b = ?"`.
    /// `??` stands for a literal question mark.
    pub fn from_template(template: &str, params: Vec<Node>) -> OpsqlResult<Self> {
        Self::new(parser::parse_raw_template(template)?, params)
    }

    pub fn check_arity(&self) -> OpsqlResult<()> {
        if self.sql_fragments.len() != self.params.len() + 1 {
            return Err(OpsqlError::RawArity {
                fragments: self.sql_fragments.len(),
                params: self.params.len(),
            });
        }
        Ok(())
    }
}

impl IdentifierNode {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

impl TableNode {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: IdentifierNode::new(table),
        }
    }

    pub fn with_schema(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: Some(IdentifierNode::new(schema)),
            table: IdentifierNode::new(table),
        }
    }
}

impl SelectNode {
    pub fn new(selections: Vec<Node>) -> Self {
        Self {
            selections,
            ..Default::default()
        }
    }

    pub fn distinct(mut self) -> Self {
        self.modifier = Some(SelectModifier::Distinct);
        self
    }

    pub fn distinct_on(mut self, selections: Vec<Node>) -> Self {
        self.distinct_on_selections = selections;
        self
    }
}

impl QueryNode {
    pub fn new(from: Vec<Node>) -> Self {
        Self {
            from,
            ..Default::default()
        }
    }

    pub fn with_select(mut self, select: SelectNode) -> Self {
        self.select = Some(select);
        self
    }

    pub fn with_join(mut self, join: JoinNode) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_where(mut self, filter: Node) -> Self {
        self.where_clause = Some(Box::new(filter));
        self
    }

    pub fn with_modifier(mut self, modifier: QueryModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }
}

impl JoinNode {
    pub fn new(join_type: JoinType, table: Node) -> Self {
        Self {
            join_type,
            table: Box::new(table),
            on: None,
        }
    }

    pub fn on(mut self, predicate: Node) -> Self {
        self.on = Some(Box::new(predicate));
        self
    }
}

impl Node {
    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier(IdentifierNode::new(name))
    }

    pub fn table(name: impl Into<String>) -> Self {
        Node::Table(TableNode::new(name))
    }

    pub fn schema_table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Node::Table(TableNode::with_schema(schema, table))
    }

    /// `"table"."column"`
    pub fn reference(table: impl Into<String>, column: impl Into<String>) -> Self {
        Node::Reference(ReferenceNode {
            table: Box::new(Node::table(table)),
            column: Box::new(Node::identifier(column)),
        })
    }

    pub fn alias(node: Node, alias: impl Into<String>) -> Self {
        Node::Alias(AliasNode {
            node: Box::new(node),
            alias: IdentifierNode::new(alias),
        })
    }

    pub fn selection(node: Node) -> Self {
        Node::Selection(SelectionNode {
            selection: Box::new(node),
        })
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Node::Value(ValueNode {
            value: value.into(),
        })
    }

    pub fn value_list(values: Vec<Node>) -> Self {
        Node::ValueList(ValueListNode { values })
    }

    pub fn primitive_values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Node::PrimitiveValueList(PrimitiveValueListNode {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn operator(op: impl Into<String>) -> Self {
        Node::Operator(OperatorNode {
            operator: op.into(),
        })
    }

    pub fn filter(lhs: Node, op: impl Into<String>, rhs: Node) -> Self {
        Node::Filter(FilterNode {
            lhs: Some(Box::new(lhs)),
            op: Box::new(Node::operator(op)),
            rhs: Box::new(rhs),
        })
    }

    /// Filter without a left operand, e.g. `exists (select ...)`.
    pub fn unary_filter(op: impl Into<String>, rhs: Node) -> Self {
        Node::Filter(FilterNode {
            lhs: None,
            op: Box::new(Node::operator(op)),
            rhs: Box::new(rhs),
        })
    }

    pub fn and(lhs: Node, rhs: Node) -> Self {
        Node::And(LogicalNode {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn or(lhs: Node, rhs: Node) -> Self {
        Node::Or(LogicalNode {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn parens(node: Node) -> Self {
        Node::Parens(ParensNode {
            node: Box::new(node),
        })
    }

    /// The node's kind name, as used in the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Identifier(_) => "Identifier",
            Node::Reference(_) => "Reference",
            Node::Table(_) => "Table",
            Node::Alias(_) => "Alias",
            Node::Selection(_) => "Selection",
            Node::SelectAll => "SelectAll",
            Node::Select(_) => "Select",
            Node::Query(_) => "Query",
            Node::Filter(_) => "Filter",
            Node::And(_) => "And",
            Node::Or(_) => "Or",
            Node::Parens(_) => "Parens",
            Node::Value(_) => "Value",
            Node::ValueList(_) => "ValueList",
            Node::PrimitiveValueList(_) => "PrimitiveValueList",
            Node::Join(_) => "Join",
            Node::Operator(_) => "Operator",
            Node::Raw(_) => "Raw",
        }
    }
}

impl From<QueryNode> for Node {
    fn from(query: QueryNode) -> Self {
        Node::Query(Box::new(query))
    }
}

impl From<SelectNode> for Node {
    fn from(select: SelectNode) -> Self {
        Node::Select(select)
    }
}

impl From<JoinNode> for Node {
    fn from(join: JoinNode) -> Self {
        Node::Join(join)
    }
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        Node::Raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_arity() {
        assert!(RawNode::new(vec!["a = ".into(), "".into()], vec![Node::value(5)]).is_ok());

        let err = RawNode::new(vec!["a = ".into()], vec![Node::value(5)]).unwrap_err();
        assert!(matches!(
            err,
            OpsqlError::RawArity {
                fragments: 1,
                params: 1
            }
        ));
    }

    #[test]
    fn test_raw_from_template() {
        let raw = RawNode::from_template("a = ? and b = ?", vec![Node::value(1), Node::value(2)])
            .unwrap();
        assert_eq!(raw.sql_fragments, vec!["a = ", " and b = ", ""]);

        assert!(RawNode::from_template("a = ?", vec![]).is_err());
    }

    #[test]
    fn test_keyword_tables_are_distinct() {
        let mut keywords: Vec<_> = QueryModifier::ALL.iter().map(|m| m.as_sql()).collect();
        keywords.sort();
        keywords.dedup();
        assert_eq!(keywords.len(), 6);
        assert_eq!(JoinType::LeftJoin.as_sql(), "left join");
    }

    #[test]
    fn test_node_json_uses_kind_tag() {
        let node = Node::filter(Node::reference("t", "a"), "=", Node::value(1));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "Filter");
        assert_eq!(json["lhs"]["kind"], "Reference");
        assert_eq!(json["rhs"]["value"], 1);

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_query_json_where_field() {
        let json = r#"{
            "from": [{"kind": "Table", "table": {"identifier": "t"}}],
            "where": {"kind": "Raw", "sql_fragments": ["true"]},
            "modifier": "SkipLocked"
        }"#;
        let query: QueryNode = serde_json::from_str(json).unwrap();
        assert_eq!(query.from, vec![Node::table("t")]);
        assert!(query.where_clause.is_some());
        assert_eq!(query.modifier, Some(QueryModifier::SkipLocked));
    }
}
