//! The `Where` predicate tree.
//!
//! On the wire a filter is a JSON object whose keys are field paths (mapping
//! to `{ operator: value }`) or the combinators `and` / `or` (mapping to
//! arrays of nested filters). Sibling keys are AND-ed:
//!
//! ```json
//! {
//!   "version.status": { "equals": "published" },
//!   "or": [
//!     { "version.title": { "like": "launch" } },
//!     { "createdAt": { "greater_than": "2024-01-01" } }
//!   ]
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::QueryError;

/// Comparison operators accepted in a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Like,
    Contains,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::In,
        Operator::NotIn,
        Operator::Exists,
        Operator::GreaterThan,
        Operator::GreaterThanEqual,
        Operator::LessThan,
        Operator::LessThanEqual,
        Operator::Like,
        Operator::Contains,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Exists => "exists",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterThanEqual => "greater_than_equal",
            Operator::LessThan => "less_than",
            Operator::LessThanEqual => "less_than_equal",
            Operator::Like => "like",
            Operator::Contains => "contains",
        }
    }

    /// Operators comparing against an ordered value.
    pub fn is_range(self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanEqual
                | Operator::LessThan
                | Operator::LessThanEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::InvalidOperator(s.to_string()))
    }
}

/// A single `path operator value` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub path: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
        }
    }
}

/// A filter predicate: a tree of AND/OR groups over field conditions.
///
/// `Where::And(vec![])` is the always-true filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Where {
    And(Vec<Where>),
    Or(Vec<Where>),
    Condition(Condition),
}

impl Where {
    /// The always-true filter.
    pub fn all() -> Self {
        Where::And(Vec::new())
    }

    /// Shorthand for a single condition.
    pub fn field(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Where::Condition(Condition::new(path, operator, value))
    }

    /// `true` when the filter matches every row.
    pub fn is_always_true(&self) -> bool {
        match self {
            Where::And(children) => children.iter().all(Where::is_always_true),
            Where::Or(_) | Where::Condition(_) => false,
        }
    }

    /// Every condition path in the tree, depth first.
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Where::And(children) | Where::Or(children) => {
                for child in children {
                    child.collect_paths(out);
                }
            }
            Where::Condition(c) => out.push(&c.path),
        }
    }

    /// Rebuild the tree by passing every condition through `f`.
    pub fn try_map_conditions<E>(
        self,
        f: &mut impl FnMut(Condition) -> Result<Condition, E>,
    ) -> Result<Where, E> {
        Ok(match self {
            Where::And(children) => Where::And(
                children
                    .into_iter()
                    .map(|c| c.try_map_conditions(f))
                    .collect::<Result<_, _>>()?,
            ),
            Where::Or(children) => Where::Or(
                children
                    .into_iter()
                    .map(|c| c.try_map_conditions(f))
                    .collect::<Result<_, _>>()?,
            ),
            Where::Condition(c) => Where::Condition(f(c)?),
        })
    }
}

impl Default for Where {
    fn default() -> Self {
        Where::all()
    }
}

/// AND-combine a caller filter with an access-derived constraint.
///
/// No constraint leaves the filter untouched. An always-true filter yields the
/// constraint alone.
pub fn combine_queries(filter: Where, constraint: Option<Where>) -> Where {
    match constraint {
        None => filter,
        Some(constraint) if filter.is_always_true() => constraint,
        Some(constraint) => Where::And(vec![filter, constraint]),
    }
}

impl TryFrom<Value> for Where {
    type Error = QueryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(QueryError::MalformedWhere("expected an object".into()));
        };

        let mut clauses = Vec::with_capacity(map.len());
        for (key, val) in map {
            match key.as_str() {
                "and" | "or" => {
                    let Value::Array(items) = val else {
                        return Err(QueryError::MalformedWhere(format!("`{key}` expects an array")));
                    };
                    let children = items
                        .into_iter()
                        .map(Where::try_from)
                        .collect::<Result<Vec<_>, _>>()?;
                    clauses.push(if key == "and" {
                        Where::And(children)
                    } else {
                        Where::Or(children)
                    });
                }
                path => {
                    let Value::Object(ops) = val else {
                        return Err(QueryError::MalformedWhere(format!(
                            "`{path}` expects an object of operators"
                        )));
                    };
                    if ops.is_empty() {
                        return Err(QueryError::MalformedWhere(format!(
                            "`{path}` has no operators"
                        )));
                    }
                    for (op, operand) in ops {
                        clauses.push(Where::Condition(Condition {
                            path: path.to_string(),
                            operator: op.parse()?,
                            value: operand,
                        }));
                    }
                }
            }
        }

        if clauses.len() == 1 {
            if let Some(only) = clauses.pop() {
                return Ok(only);
            }
        }
        Ok(Where::And(clauses))
    }
}

impl From<Where> for Value {
    fn from(filter: Where) -> Self {
        match filter {
            Where::And(children) => combinator("and", children),
            Where::Or(children) => combinator("or", children),
            Where::Condition(c) => {
                let mut ops = Map::new();
                ops.insert(c.operator.as_str().to_string(), c.value);
                let mut map = Map::new();
                map.insert(c.path, Value::Object(ops));
                Value::Object(map)
            }
        }
    }
}

fn combinator(key: &str, children: Vec<Where>) -> Value {
    let mut map = Map::new();
    map.insert(
        key.to_string(),
        Value::Array(children.into_iter().map(Value::from).collect()),
    );
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_nested_filters() {
        let filter: Where = serde_json::from_value(json!({
            "or": [
                { "version.title": { "like": "launch" } },
                { "createdAt": { "greater_than": "2024-01-01" } }
            ]
        }))
        .unwrap();

        assert_eq!(
            filter,
            Where::Or(vec![
                Where::field("version.title", Operator::Like, "launch"),
                Where::field("createdAt", Operator::GreaterThan, "2024-01-01"),
            ])
        );
        assert_eq!(filter.paths(), vec!["version.title", "createdAt"]);
    }

    #[test]
    fn sibling_keys_are_anded() {
        let filter: Where = serde_json::from_value(json!({
            "parent": { "equals": "42" },
            "version.views": { "greater_than": 10, "less_than": 100 }
        }))
        .unwrap();

        let Where::And(children) = filter else {
            panic!("expected an AND group");
        };
        assert_eq!(children.len(), 3);
    }

    #[test]
    fn rejects_unknown_operators_and_bad_shapes() {
        let err = serde_json::from_value::<Where>(json!({ "title": { "near": "x" } })).unwrap_err();
        assert!(err.to_string().contains("Invalid operator"));

        let err = Where::try_from(json!({ "and": { "title": {} } })).unwrap_err();
        assert!(matches!(err, QueryError::MalformedWhere(_)));

        let err = Where::try_from(json!(["title"])).unwrap_err();
        assert!(matches!(err, QueryError::MalformedWhere(_)));
    }

    #[test]
    fn rejects_path_without_operators() {
        let err = Where::try_from(json!({ "version.secret": {} })).unwrap_err();
        assert!(matches!(err, QueryError::MalformedWhere(ref msg) if msg.contains("version.secret")));

        let err = Where::try_from(json!({ "or": [{ "title": { "equals": "a" } }, { "views": {} }] }))
            .unwrap_err();
        assert!(matches!(err, QueryError::MalformedWhere(_)));

        let err = serde_json::from_value::<Where>(json!({ "title": {} })).unwrap_err();
        assert!(err.to_string().contains("has no operators"));
    }

    #[test]
    fn empty_object_is_always_true() {
        let filter = Where::try_from(json!({})).unwrap();
        assert!(filter.is_always_true());
        assert!(!Where::Or(vec![]).is_always_true());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let filter = Where::And(vec![Where::field("parent", Operator::Equals, "7")]);
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "and": [ { "parent": { "equals": "7" } } ] })
        );
    }

    #[test]
    fn combine_without_constraint_is_identity() {
        let filter = Where::field("version.title", Operator::Equals, "a");
        assert_eq!(combine_queries(filter.clone(), None), filter);
    }

    #[test]
    fn combine_ands_filter_and_constraint() {
        let filter = Where::field("version.title", Operator::Equals, "a");
        let constraint = Where::field("version.owner", Operator::Equals, "u1");
        assert_eq!(
            combine_queries(filter.clone(), Some(constraint.clone())),
            Where::And(vec![filter, constraint])
        );
    }

    #[test]
    fn combine_with_empty_filter_yields_constraint() {
        let constraint = Where::field("version.owner", Operator::Equals, "u1");
        assert_eq!(combine_queries(Where::all(), Some(constraint.clone())), constraint);
    }
}
