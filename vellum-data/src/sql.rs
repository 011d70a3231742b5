//! Compiles a sanitized [`Where`] into a parameterized `SELECT COUNT(*)`.
//!
//! # Example
//!
//! ```ignore
//! let (sql, params) = QueryBuilder::new(&versions_table("posts"))
//!     .dialect(Dialect::Postgres)
//!     .identifier_policy(IdentifierPolicy::Quote)
//!     .filter(filter)
//!     .build_count()?;
//! ```
use serde_json::Value;

use crate::error::QueryError;
use crate::filter::{Condition, Operator, Where};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Do not validate or quote identifiers.
    Raw,
    /// Validate identifiers against a conservative pattern (default).
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

/// A typed bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<&Value> for BindValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(s) => BindValue::Text(s.clone()),
            Value::Bool(b) => BindValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => BindValue::Integer(i),
                None => BindValue::Float(n.as_f64().unwrap_or_default()),
            },
            other => BindValue::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    filter: Where,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: Where::all(),
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Validate,
        }
    }

    /// Create a new builder with an explicit SQL dialect.
    pub fn new_with_dialect(table: &str, dialect: Dialect) -> Self {
        Self::new(table).dialect(dialect)
    }

    /// Set the SQL dialect (affects placeholder style and quoting).
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Configure identifier validation/quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn filter(mut self, filter: Where) -> Self {
        self.filter = filter;
        self
    }

    /// Build a COUNT query returning `(sql, bind_values)`.
    pub fn build_count(&self) -> Result<(String, Vec<BindValue>), QueryError> {
        let table = self.format_identifier(&self.table, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let mut params = Vec::new();
        let mut placeholder_idx = 1usize;

        if !self.filter.is_always_true() {
            sql.push_str(" WHERE ");
            self.append_where(&self.filter, true, &mut sql, &mut params, &mut placeholder_idx)?;
        }
        Ok((sql, params))
    }

    fn append_where(
        &self,
        filter: &Where,
        top_level: bool,
        sql: &mut String,
        params: &mut Vec<BindValue>,
        placeholder_idx: &mut usize,
    ) -> Result<(), QueryError> {
        let (children, joiner, empty) = match filter {
            Where::Condition(cond) => {
                return self.append_condition(cond, sql, params, placeholder_idx);
            }
            Where::And(children) => (children, " AND ", "1 = 1"),
            Where::Or(children) => (children, " OR ", "1 = 0"),
        };

        match children.as_slice() {
            [] => sql.push_str(empty),
            [only] => self.append_where(only, top_level, sql, params, placeholder_idx)?,
            _ => {
                if !top_level {
                    sql.push('(');
                }
                for (idx, child) in children.iter().enumerate() {
                    if idx > 0 {
                        sql.push_str(joiner);
                    }
                    self.append_where(child, false, sql, params, placeholder_idx)?;
                }
                if !top_level {
                    sql.push(')');
                }
            }
        }
        Ok(())
    }

    fn append_condition(
        &self,
        cond: &Condition,
        sql: &mut String,
        params: &mut Vec<BindValue>,
        placeholder_idx: &mut usize,
    ) -> Result<(), QueryError> {
        let col = self.format_identifier(&column_for_path(&cond.path), "column")?;
        let mut next_placeholder = || {
            let placeholder = self.dialect.placeholder(*placeholder_idx);
            *placeholder_idx += 1;
            placeholder
        };

        match cond.operator {
            Operator::Equals | Operator::NotEquals if cond.value.is_null() => {
                let not = if cond.operator == Operator::NotEquals { " NOT" } else { "" };
                sql.push_str(&format!("{col} IS{not} NULL"));
            }
            Operator::NotEquals => {
                // SQL `!=` never matches NULL, but a missing value is not equal either.
                let placeholder = next_placeholder();
                sql.push_str(&format!("({col} != {placeholder} OR {col} IS NULL)"));
                params.push(BindValue::from(&cond.value));
            }
            Operator::Equals
            | Operator::GreaterThan
            | Operator::GreaterThanEqual
            | Operator::LessThan
            | Operator::LessThanEqual => {
                let op = match cond.operator {
                    Operator::Equals => "=",
                    Operator::GreaterThan => ">",
                    Operator::GreaterThanEqual => ">=",
                    Operator::LessThan => "<",
                    _ => "<=",
                };
                let placeholder = next_placeholder();
                sql.push_str(&format!("{col} {op} {placeholder}"));
                params.push(BindValue::from(&cond.value));
            }
            Operator::In | Operator::NotIn => {
                let values = as_list(&cond.value);
                let negate = cond.operator == Operator::NotIn;
                if values.is_empty() {
                    sql.push_str(if negate { "1 = 1" } else { "1 = 0" });
                } else {
                    let placeholders: Vec<_> = values.iter().map(|_| next_placeholder()).collect();
                    let not = if negate { " NOT" } else { "" };
                    sql.push_str(&format!("{col}{not} IN ({})", placeholders.join(", ")));
                    params.extend(values.iter().map(|v| BindValue::from(*v)));
                }
            }
            Operator::Exists => {
                let not = if cond.value == Value::Bool(true) { " NOT" } else { "" };
                sql.push_str(&format!("{col} IS{not} NULL"));
            }
            Operator::Like => {
                let text = as_text(&cond.value).to_lowercase();
                let words: Vec<_> = text.split_whitespace().collect();
                if words.is_empty() {
                    sql.push_str("1 = 1");
                } else {
                    let clauses: Vec<_> = words
                        .iter()
                        .map(|word| {
                            params.push(BindValue::Text(format!("%{word}%")));
                            format!("LOWER({col}) LIKE {}", next_placeholder())
                        })
                        .collect();
                    if clauses.len() == 1 {
                        sql.push_str(&clauses.join(""));
                    } else {
                        sql.push_str(&format!("({})", clauses.join(" AND ")));
                    }
                }
            }
            Operator::Contains => {
                let placeholder = next_placeholder();
                sql.push_str(&format!("LOWER({col}) LIKE {placeholder}"));
                params.push(BindValue::Text(format!(
                    "%{}%",
                    as_text(&cond.value).to_lowercase()
                )));
            }
        }
        Ok(())
    }

    fn format_identifier(&self, ident: &str, kind: &'static str) -> Result<String, QueryError> {
        if self.identifier_policy == IdentifierPolicy::Raw {
            return Ok(ident.to_string());
        }
        if !is_valid_identifier(ident) {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect)),
            IdentifierPolicy::Raw | IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Name of the versions table of a collection: `_<slug>_v`.
pub fn versions_table(slug: &str) -> String {
    format!("_{}_v", collection_table(slug))
}

/// Name of the documents table of a collection.
pub fn collection_table(slug: &str) -> String {
    slug.replace('-', "_")
}

/// Column holding a dotted field path: each segment in snake_case, joined by `_`.
///
/// `version.publishedAt` → `version_published_at`.
pub fn column_for_path(path: &str) -> String {
    path.split('.')
        .map(to_snake_case)
        .collect::<Vec<_>>()
        .join("_")
}

fn to_snake_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    for (idx, c) in segment.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if idx > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '-' {
            out.push('_');
        } else {
            out.push(c);
        }
    }
    out
}

fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect) -> String {
    let quote = dialect.quote_char();
    format!("{quote}{ident}{quote}")
}
