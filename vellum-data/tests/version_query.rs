use serde_json::json;
use vellum_core::{Identity, RequestContext};
use vellum_data::{
    build_version_collection_fields, combine_queries, sanitize_where_query, validate_query_paths,
    versions_table, BindValue, Field, Operator, QueryBuilder, QueryError, VersionsConfig, Where,
};

struct Author(&'static str);

impl Identity for Author {
    fn sub(&self) -> &str {
        self.0
    }
}

fn post_fields() -> Vec<Field> {
    vec![
        Field::text("title"),
        Field::number("views"),
        Field::relationship("owner"),
        Field::text("apiKey").hidden(),
        Field::text("reviewNotes").read_access(|ctx| {
            ctx.identity().is_some_and(|i| i.has_role("reviewer"))
        }),
    ]
}

#[test]
fn caller_filter_with_access_constraint_compiles_to_sql() {
    let schema = build_version_collection_fields(&post_fields(), &VersionsConfig::with_drafts(false));
    let ctx = RequestContext::new().with_identity(Author("u1"));

    let caller: Where = serde_json::from_value(json!({
        "version.views": { "greater_than": "100" },
        "latest": { "equals": "true" }
    }))
    .unwrap();
    validate_query_paths(&caller, &schema, &ctx, false).unwrap();

    let constraint = Where::field("version.owner", Operator::Equals, "u1");
    let merged = combine_queries(caller, Some(constraint));
    let sanitized = sanitize_where_query(merged, &schema).unwrap();

    let (sql, params) = QueryBuilder::new(&versions_table("posts"))
        .filter(sanitized)
        .build_count()
        .unwrap();

    assert_eq!(
        sql,
        "SELECT COUNT(*) FROM _posts_v WHERE (latest = ? AND version_views > ?) AND version_owner = ?"
    );
    assert_eq!(
        params,
        vec![
            BindValue::Bool(true),
            BindValue::Integer(100),
            BindValue::Text("u1".into()),
        ]
    );
}

#[test]
fn hidden_version_field_is_not_queryable() {
    let schema = build_version_collection_fields(&post_fields(), &VersionsConfig::default());
    let filter = Where::field("version.apiKey", Operator::Exists, true);

    let err = validate_query_paths(&filter, &schema, &RequestContext::new(), true).unwrap_err();
    assert_eq!(err, QueryError::InvalidPaths(vec!["version.apiKey".into()]));
}

#[test]
fn draft_markers_require_drafts() {
    let schema = build_version_collection_fields(&post_fields(), &VersionsConfig::default());
    let filter = Where::field("latest", Operator::Equals, true);

    assert_eq!(
        sanitize_where_query(filter, &schema).unwrap_err(),
        QueryError::UnknownPath("latest".into())
    );
}

#[test]
fn document_level_paths_are_not_version_paths() {
    let schema = build_version_collection_fields(&post_fields(), &VersionsConfig::default());
    let filter = Where::field("title", Operator::Equals, "x");

    let err = validate_query_paths(&filter, &schema, &RequestContext::new(), false).unwrap_err();
    assert!(err.to_string().contains("title"));
}
