//! Ban gate on content-creating actions.

mod common;

use chrono::{Duration, Utc};

use crate::common::{id, TestHarness};
use agora_core::common::ForumError;
use agora_core::domains::comments::{create_comment, CreateComment};
use agora_core::domains::content::{create_document, CreateDocument, DocumentKind};
use agora_core::domains::members::{Member, MemberRole};
use agora_core::domains::reports::{submit_report, SubmitReport};
use agora_core::domains::toggles::{ActionType, TargetType};
use test_context::test_context;

fn banned(name: &str, until: Option<chrono::DateTime<Utc>>) -> Member {
    let mut member = Member::new(name, MemberRole::Member);
    member.banned = true;
    member.banned_until = until;
    member.ban_reason = Some("spam".to_string());
    member
}

fn trade(symbol: &str) -> CreateDocument {
    CreateDocument {
        kind: DocumentKind::Trade,
        title: None,
        symbol: Some(symbol.to_string()),
        body: "long".to_string(),
        category_ids: vec![],
        tags: vec![],
        author: None,
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn active_ban_blocks_posting_commenting_and_reporting(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;
    let mallory = ctx
        .insert_member(banned("mallory", Some(Utc::now() + Duration::days(2))))
        .await;

    let created = create_document(&ctx.deps, &mallory, trade("TSLA")).await;
    match created {
        Err(ForumError::Forbidden(message)) => {
            assert!(message.starts_with("You are banned for another"));
            assert!(message.ends_with("(reason: spam)"));
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }

    let comment = create_comment(
        &ctx.deps,
        &mallory,
        CreateComment {
            content: "hi".to_string(),
            target_id: post.document_id.clone(),
            parent_id: None,
        },
    )
    .await;
    assert!(matches!(comment, Err(ForumError::Forbidden(_))));

    let report = submit_report(
        &ctx.deps,
        &mallory,
        SubmitReport {
            target_type: "post".to_string(),
            target_id: post.document_id.clone(),
            reason: "spam".to_string(),
            detail: None,
        },
    )
    .await;
    assert!(matches!(report, Err(ForumError::Forbidden(_))));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn permanent_ban_blocks(ctx: &mut TestHarness) {
    let mallory = ctx.insert_member(banned("mallory", None)).await;

    let created = create_document(&ctx.deps, &mallory, trade("TSLA")).await;
    match created {
        Err(ForumError::Forbidden(message)) => {
            assert!(message.starts_with("You are permanently banned"))
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn expired_ban_is_cleared_on_next_action(ctx: &mut TestHarness) {
    let mallory = ctx
        .insert_member(banned("mallory", Some(Utc::now() - Duration::minutes(1))))
        .await;

    let created = create_document(&ctx.deps, &mallory, trade("TSLA")).await.unwrap();
    assert_eq!(created.author_id, Some(id(&mallory)));

    let stored = ctx.deps.members.find_member(id(&mallory)).await.unwrap().unwrap();
    assert!(!stored.banned);
    assert!(stored.banned_until.is_none());
    assert!(stored.ban_reason.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn banned_members_can_still_toggle(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;
    let mallory = ctx.insert_member(banned("mallory", None)).await;

    let result = ctx
        .toggle(&mallory, ActionType::Like, TargetType::Post, post.document_id.to_string())
        .await;
    assert!(result.active);
}
