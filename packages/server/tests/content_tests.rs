//! Draft/published lifecycle and the two-phase synchronizer.

mod common;

use crate::common::{id, TestHarness};
use agora_core::common::{ForumError, Viewer};
use agora_core::domains::content::{
    create_document, delete_document, fetch_for_viewer, fetch_public_document, list_published,
    publish_document, sync_mutation, update_document, CreateDocument, DocumentKind,
    DocumentPatch, ListDocuments, PublishedWrite, Relation, UpdateDocument, Variant,
};
use test_context::test_context;

fn trade(symbol: &str) -> CreateDocument {
    CreateDocument {
        kind: DocumentKind::Trade,
        title: None,
        symbol: Some(symbol.to_string()),
        body: "long".to_string(),
        category_ids: vec![],
        tags: vec!["equities".to_string()],
        author: None,
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn draft_only_documents_never_appear_publicly(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let category = ctx.category("Markets").await;
    let draft = ctx.draft_post(&author, "Work in progress", &[category]).await;
    let live = ctx.published_post(&author, "Live", &[category]).await;

    let listed = list_published(&ctx.deps, ListDocuments::default()).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|d| d.document_id.clone()).collect();
    assert!(ids.contains(&live.document_id));
    assert!(!ids.contains(&draft.document_id));

    let by_category = list_published(
        &ctx.deps,
        ListDocuments {
            category_id: Some(category),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(by_category.len(), 1);

    let public = fetch_public_document(&ctx.deps, &draft.document_id).await;
    assert!(matches!(public, Err(ForumError::NotFound(_))));

    // The owner still sees their draft.
    let own = fetch_for_viewer(&ctx.deps, &author, &draft.document_id).await.unwrap();
    assert_eq!(own.variant, Variant::Draft);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_applies_author_and_tags_after_the_draft(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let doc = create_document(&ctx.deps, &author, trade("TSLA")).await.unwrap();

    assert_eq!(doc.variant, Variant::Draft);
    assert_eq!(doc.author_id, Some(id(&author)));
    assert_eq!(doc.tags, vec!["equities".to_string()]);
    assert!(ctx
        .deps
        .documents
        .find_one(&doc.document_id, Variant::Published)
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn create_validates_before_touching_the_store(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;

    let no_category = create_document(
        &ctx.deps,
        &author,
        CreateDocument {
            kind: DocumentKind::Post,
            title: Some("Orphan".to_string()),
            symbol: None,
            body: String::new(),
            category_ids: vec![],
            tags: vec![],
            author: None,
        },
    )
    .await;
    assert!(matches!(no_category, Err(ForumError::BadRequest(_))));

    let no_symbol = create_document(
        &ctx.deps,
        &author,
        CreateDocument {
            symbol: None,
            ..trade("X")
        },
    )
    .await;
    assert!(matches!(no_symbol, Err(ForumError::BadRequest(_))));

    let anonymous = create_document(&ctx.deps, &Viewer::anonymous(), trade("TSLA")).await;
    assert!(matches!(anonymous, Err(ForumError::Unauthenticated)));

    let someone_else = ctx.member("someone").await;
    let impersonation = create_document(
        &ctx.deps,
        &author,
        CreateDocument {
            author: Some(Relation::Id(id(&someone_else))),
            ..trade("TSLA")
        },
    )
    .await;
    assert!(matches!(impersonation, Err(ForumError::Forbidden(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn admin_may_create_on_behalf_of_a_member(ctx: &mut TestHarness) {
    let admin = ctx.admin("admin").await;
    let member = ctx.member("member").await;

    let doc = create_document(
        &ctx.deps,
        &admin,
        CreateDocument {
            author: Some(Relation::Id(id(&member))),
            ..trade("NVDA")
        },
    )
    .await
    .unwrap();
    assert_eq!(doc.author_id, Some(id(&member)));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn updates_are_mirrored_to_the_published_variant(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let post = ctx
        .published_post(&author, "Rates", &[ctx.category("Markets").await])
        .await;
    ctx.search.clear();

    let updated = update_document(
        &ctx.deps,
        &author,
        &post.document_id,
        UpdateDocument {
            title: Some("Rates, revised".to_string()),
            tags: Some(vec!["fed".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.title.as_deref(), Some("Rates, revised"));
    assert_eq!(updated.tags, vec!["fed".to_string()]);

    let published = ctx
        .deps
        .documents
        .find_one(&post.document_id, Variant::Published)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.title.as_deref(), Some("Rates, revised"));
    assert_eq!(published.tags, vec!["fed".to_string()]);
    assert!(ctx.search.was_upserted(&post.document_id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn update_before_publish_only_touches_the_draft(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let draft = ctx.draft_post(&author, "Draft", &[ctx.category("Markets").await]).await;

    let outcome = sync_mutation(
        &ctx.deps,
        &draft.document_id,
        DocumentPatch {
            body: Some("more".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.draft.body, "more");
    assert!(matches!(outcome.published, PublishedWrite::Missing));
    assert!(ctx.search.calls().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn failed_published_write_does_not_fail_the_update(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let post = ctx
        .published_post(&author, "Rates", &[ctx.category("Markets").await])
        .await;
    ctx.store.set_fail_published_writes(true);

    let outcome = sync_mutation(
        &ctx.deps,
        &post.document_id,
        DocumentPatch {
            body: Some("draft wins".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome.draft.body, "draft wins");
    assert!(matches!(outcome.published, PublishedWrite::Failed(_)));

    let published = ctx
        .deps
        .documents
        .find_one(&post.document_id, Variant::Published)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(published.body, "Rates body");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_patch_is_rejected(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let draft = ctx.draft_post(&author, "Draft", &[ctx.category("Markets").await]).await;

    let result = update_document(
        &ctx.deps,
        &author,
        &draft.document_id,
        UpdateDocument::default(),
    )
    .await;
    assert!(matches!(result, Err(ForumError::BadRequest(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_owner_may_edit(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let stranger = ctx.member("stranger").await;
    let draft = ctx.draft_post(&author, "Draft", &[ctx.category("Markets").await]).await;

    let result = update_document(
        &ctx.deps,
        &stranger,
        &draft.document_id,
        UpdateDocument {
            body: Some("vandalised".to_string()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ForumError::Forbidden(_))));

    let unchanged = ctx
        .deps
        .documents
        .find_one(&draft.document_id, Variant::Draft)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.body, "Draft body");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn republishing_keeps_the_first_publish_time(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let post = ctx
        .published_post(&author, "Rates", &[ctx.category("Markets").await])
        .await;

    let again = publish_document(&ctx.deps, &author, &post.document_id)
        .await
        .unwrap();
    assert_eq!(again.published_at, post.published_at);
    assert_eq!(again.id, post.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_removes_both_variants_and_the_index_entry(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let post = ctx
        .published_post(&author, "Rates", &[ctx.category("Markets").await])
        .await;

    delete_document(&ctx.deps, &author, &post.document_id)
        .await
        .unwrap();

    for variant in [Variant::Draft, Variant::Published] {
        assert!(ctx
            .deps
            .documents
            .find_one(&post.document_id, variant)
            .await
            .unwrap()
            .is_none());
    }
    assert!(ctx.search.was_removed(&post.document_id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn search_outage_does_not_fail_publish(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let draft = ctx.draft_post(&author, "Rates", &[ctx.category("Markets").await]).await;
    ctx.search.set_failing(true);

    let published = publish_document(&ctx.deps, &author, &draft.document_id)
        .await
        .unwrap();
    assert_eq!(published.variant, Variant::Published);
    assert!(ctx.search.was_upserted(&draft.document_id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn listing_pages_over_posts_and_trades_only(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let reader = ctx.member("reader").await;
    let post = ctx
        .published_post(&author, "Rates", &[ctx.category("Markets").await])
        .await;
    for n in 0..20 {
        ctx.comment(&reader, &post.document_id, &format!("comment {n}"))
            .await;
    }

    let listed = list_published(&ctx.deps, ListDocuments::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].document_id, post.document_id);

    let comments = list_published(
        &ctx.deps,
        ListDocuments {
            kind: Some(DocumentKind::Comment),
            limit: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(comments.len(), 5);
}
