mod common;

use std::sync::Arc;

use common::{ctx_with_tx, CountingTx, MockAdapter, User};
use vellum_collections::prelude::*;
use vellum_collections::{BeforeOperationArgs, Operation};
use vellum_core::RequestContext;
use vellum_data::QueryError;

fn articles() -> CollectionConfig {
    CollectionConfig::new("articles").fields(vec![
        Field::text("title"),
        Field::checkbox("published"),
        Field::text("editorNotes").read_access(|ctx| {
            ctx.identity().is_some_and(|user| user.has_role("editor"))
        }),
    ])
}

fn published_only() -> vellum_collections::AccessRule {
    access::rule(|args: AccessArgs| async move {
        Ok(if args.ctx.is_authenticated() {
            AccessResult::Allowed
        } else {
            AccessResult::AllowedWithFilter(Where::field("published", Operator::Equals, true))
        })
    })
}

#[tokio::test]
async fn test_count_uses_read_rule_and_document_fields() {
    let db = MockAdapter::returning(9);
    let collection = articles().read(published_only()).build();

    let total = count_operation(
        &db,
        CountArgs::new(collection, RequestContext::new())
            .filter(Where::field("title", Operator::Like, "rust")),
    )
    .await
    .unwrap();

    assert_eq!(total.total_docs, 9);
    let calls = db.calls();
    assert_eq!(calls[0].0, "count");
    assert_eq!(
        calls[0].1.filter,
        Where::And(vec![
            Where::field("title", Operator::Like, "rust"),
            Where::field("published", Operator::Equals, true),
        ])
    );
}

#[tokio::test]
async fn test_read_versions_rule_does_not_apply_to_count() {
    let db = MockAdapter::returning(1);
    let collection = articles()
        .read(access::public())
        .read_versions(access::rule(|_| async { Ok(AccessResult::Denied) }))
        .build();

    let total = count_operation(&db, CountArgs::new(collection, RequestContext::new()))
        .await
        .unwrap();
    assert_eq!(total.total_docs, 1);
}

#[tokio::test]
async fn test_timestamps_are_queryable() {
    let db = MockAdapter::returning(1);
    let collection = articles().read(access::public()).build();

    count_operation(
        &db,
        CountArgs::new(collection, RequestContext::new())
            .filter(Where::field("updatedAt", Operator::LessThan, "2024-01-01")),
    )
    .await
    .unwrap();

    assert_eq!(
        db.calls()[0].1.filter,
        Where::field("updatedAt", Operator::LessThan, "2024-01-01T00:00:00.000Z")
    );
}

#[tokio::test]
async fn test_field_read_access_guards_filter_paths() {
    let db = MockAdapter::returning(1);
    let tx = Arc::new(CountingTx::default());
    let collection = articles().read(access::public()).build();
    let filter = Where::field("editorNotes", Operator::Exists, true);

    let reader = RequestContext::new()
        .with_identity(User::new("r1", &["reader"]))
        .with_transaction(tx.clone());
    let err = count_operation(&db, CountArgs::new(collection.clone(), reader).filter(filter.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Query(QueryError::InvalidPaths(_))));
    assert_eq!(tx.rollbacks(), 1);

    let editor = ctx_with_tx(&Arc::default());
    count_operation(&db, CountArgs::new(collection.clone(), editor).filter(filter.clone()))
        .await
        .unwrap();

    let overridden = RequestContext::new().with_identity(User::new("r1", &["reader"]));
    count_operation(
        &db,
        CountArgs::new(collection, overridden)
            .override_access(true)
            .filter(filter),
    )
    .await
    .unwrap();

    assert_eq!(db.calls().len(), 2);
}

#[tokio::test]
async fn test_hooks_see_count_operation() {
    let db = MockAdapter::returning(1);
    let collection = articles()
        .read(access::public())
        .before_operation(before_operation(|input: BeforeOperationArgs| async move {
            assert_eq!(input.operation, Operation::Count);
            Ok(None)
        }))
        .build();

    count_operation(&db, CountArgs::new(collection, RequestContext::new()))
        .await
        .unwrap();
}
