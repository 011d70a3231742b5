//! Operator and value normalization of a `Where` against a field schema.
//!
//! Sanitizing rejects paths the schema does not know, operators the target
//! field type does not support, and values that cannot be coerced. Accepted
//! values are normalized so adapters see one representation per field type:
//! numbers as JSON numbers, checkboxes as booleans, dates as RFC 3339 UTC
//! strings, and `in` / `not_in` operands as arrays.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Number, Value};

use crate::error::QueryError;
use crate::fields::{FieldSchema, FieldType};
use crate::filter::{Condition, Operator, Where};

use Operator::*;

const TEXT_OPERATORS: &[Operator] = &[
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    Like,
    Contains,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
];
const ORDERED_OPERATORS: &[Operator] = &[
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
];
const CHECKBOX_OPERATORS: &[Operator] = &[Equals, NotEquals, Exists];
const REFERENCE_OPERATORS: &[Operator] = &[Equals, NotEquals, In, NotIn, Exists];
const JSON_OPERATORS: &[Operator] = &[Equals, NotEquals, In, NotIn, Exists, Like, Contains];
const CONTAINER_OPERATORS: &[Operator] = &[Exists];

/// Operators a field type can be filtered with.
pub fn allowed_operators(field_type: FieldType) -> &'static [Operator] {
    match field_type {
        FieldType::Text | FieldType::Email | FieldType::Textarea => TEXT_OPERATORS,
        FieldType::Id | FieldType::Number | FieldType::Date => ORDERED_OPERATORS,
        FieldType::Checkbox => CHECKBOX_OPERATORS,
        FieldType::Select | FieldType::Relationship => REFERENCE_OPERATORS,
        FieldType::Json => JSON_OPERATORS,
        FieldType::Group | FieldType::Array => CONTAINER_OPERATORS,
    }
}

/// Normalize every condition of `filter` against `schema`.
pub fn sanitize_where_query(filter: Where, schema: &FieldSchema) -> Result<Where, QueryError> {
    filter.try_map_conditions(&mut |condition| sanitize_condition(condition, schema))
}

fn sanitize_condition(condition: Condition, schema: &FieldSchema) -> Result<Condition, QueryError> {
    let Condition {
        path,
        operator,
        value,
    } = condition;

    let field_type = schema
        .resolve(&path)
        .map(|resolved| resolved.field_type)
        .ok_or_else(|| QueryError::UnknownPath(path.clone()))?;

    if !allowed_operators(field_type).contains(&operator) {
        return Err(QueryError::OperatorNotAllowed {
            path,
            operator,
            field_type,
        });
    }

    let value = coerce(field_type, operator, value)
        .map_err(|reason| QueryError::InvalidValue {
            path: path.clone(),
            operator,
            reason,
        })?;

    Ok(Condition {
        path,
        operator,
        value,
    })
}

fn coerce(field_type: FieldType, operator: Operator, value: Value) -> Result<Value, String> {
    match operator {
        Exists => coerce_bool(value),
        In | NotIn => {
            let items = match value {
                Value::Array(items) => items,
                Value::String(s) => s
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
                Value::Null => Vec::new(),
                other => vec![other],
            };
            items
                .into_iter()
                .map(|item| coerce_scalar(field_type, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        Like | Contains => match value {
            Value::String(s) => Ok(Value::String(s)),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(format!("`{operator}` expects a string")),
        },
        Equals | NotEquals if value.is_null() => Ok(Value::Null),
        _ if value.is_null() => Err(format!("`{operator}` does not accept null")),
        _ => coerce_scalar(field_type, value),
    }
}

fn coerce_scalar(field_type: FieldType, value: Value) -> Result<Value, String> {
    match field_type {
        FieldType::Number => coerce_number(value),
        FieldType::Checkbox => coerce_bool(value),
        FieldType::Date => coerce_date(value),
        FieldType::Text
        | FieldType::Email
        | FieldType::Textarea
        | FieldType::Select => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err("expected a string".into()),
        },
        FieldType::Id | FieldType::Relationship => match value {
            Value::String(_) | Value::Number(_) => Ok(value),
            _ => Err("expected an id".into()),
        },
        FieldType::Json | FieldType::Group | FieldType::Array => Ok(value),
    }
}

fn coerce_number(value: Value) -> Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(int) = s.parse::<i64>() {
                return Ok(Value::Number(int.into()));
            }
            s.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("`{s}` is not a number"))
        }
        _ => Err("expected a number".into()),
    }
}

fn coerce_bool(value: Value) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value),
        Value::String(s) => match s.as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(format!("`{s}` is not a boolean")),
        },
        _ => Err("expected a boolean".into()),
    }
}

fn coerce_date(value: Value) -> Result<Value, String> {
    let Value::String(s) = value else {
        return Err("expected a date string".into());
    };

    let parsed = DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        })
        .map_err(|_| format!("`{s}` is not a valid date"))?;

    Ok(Value::String(
        parsed.to_rfc3339_opts(SecondsFormat::Millis, true),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;
    use serde_json::json;

    fn schema() -> FieldSchema {
        FieldSchema::new(vec![
            Field::text("title"),
            Field::number("views"),
            Field::checkbox("featured"),
            Field::date("publishedAt"),
            Field::relationship("author"),
            Field::group("meta", vec![Field::text("description")]),
            Field::json("payload"),
        ])
    }

    fn sanitize_one(path: &str, operator: Operator, value: Value) -> Result<Value, QueryError> {
        let out = sanitize_where_query(Where::field(path, operator, value), &schema())?;
        match out {
            Where::Condition(c) => Ok(c.value),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn coerces_numeric_strings() {
        assert_eq!(sanitize_one("views", GreaterThan, json!("10")).unwrap(), json!(10));
        assert_eq!(sanitize_one("views", LessThan, json!("2.5")).unwrap(), json!(2.5));
        assert!(matches!(
            sanitize_one("views", Equals, json!("ten")),
            Err(QueryError::InvalidValue { .. })
        ));
    }

    #[test]
    fn coerces_booleans() {
        assert_eq!(sanitize_one("featured", Equals, json!("true")).unwrap(), json!(true));
        assert_eq!(sanitize_one("title", Exists, json!("false")).unwrap(), json!(false));
        assert!(sanitize_one("title", Exists, json!(1)).is_err());
    }

    #[test]
    fn splits_comma_separated_in_values() {
        assert_eq!(
            sanitize_one("views", In, json!("1, 2,3")).unwrap(),
            json!([1, 2, 3])
        );
        assert_eq!(
            sanitize_one("author", NotIn, json!(["a", "b"])).unwrap(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn normalizes_dates() {
        assert_eq!(
            sanitize_one("publishedAt", GreaterThanEqual, json!("2024-03-01")).unwrap(),
            json!("2024-03-01T00:00:00.000Z")
        );
        assert_eq!(
            sanitize_one("publishedAt", LessThan, json!("2024-03-01T12:30:00+02:00")).unwrap(),
            json!("2024-03-01T10:30:00.000Z")
        );
        assert!(sanitize_one("publishedAt", Equals, json!("yesterday")).is_err());
    }

    #[test]
    fn null_only_for_equality() {
        assert_eq!(sanitize_one("title", Equals, Value::Null).unwrap(), Value::Null);
        assert!(sanitize_one("views", GreaterThan, Value::Null).is_err());
    }

    #[test]
    fn rejects_operator_not_allowed_for_type() {
        let err = sanitize_one("featured", Like, json!("x")).unwrap_err();
        assert_eq!(
            err,
            QueryError::OperatorNotAllowed {
                path: "featured".into(),
                operator: Like,
                field_type: FieldType::Checkbox,
            }
        );
        assert!(sanitize_one("meta", Equals, json!("x")).is_err());
        assert_eq!(sanitize_one("meta", Exists, json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn rejects_unknown_paths_anywhere_in_tree() {
        let filter = Where::Or(vec![
            Where::field("title", Equals, "a"),
            Where::And(vec![Where::field("nope", Equals, "b")]),
        ]);
        assert_eq!(
            sanitize_where_query(filter, &schema()).unwrap_err(),
            QueryError::UnknownPath("nope".into())
        );
    }

    #[test]
    fn keeps_tree_shape() {
        let filter = Where::And(vec![
            Where::field("meta.description", Contains, "intro"),
            Where::Or(vec![Where::field("payload.tags", Equals, json!({"a": 1}))]),
        ]);
        let out = sanitize_where_query(filter.clone(), &schema()).unwrap();
        assert_eq!(out, filter);
    }
}
