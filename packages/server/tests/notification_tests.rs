//! Follow-graph fan-out: recipient rules, dedup, delivery and failure
//! isolation.

mod common;

use std::sync::Arc;

use crate::common::{id, TestHarness};
use agora_core::common::{ForumError, Viewer};
use agora_core::domains::categories::GrantStatus;
use agora_core::domains::comments::{create_comment, CreateComment};
use agora_core::domains::content::{fetch_for_viewer, fetch_public_document, publish_document, ModerationStatus};
use agora_core::domains::moderation::{moderate, ModerationAction};
use agora_core::domains::notifications::{
    list_notifications, mark_read, unread_count, FanOutDispatcher, NotificationType,
    NOTIFICATION_EVENT,
};
use agora_core::domains::toggles::{toggle, ActionType, TargetType, ToggleRequest};
use agora_core::kernel::{InMemoryStore, MockRealtimeChannel, MockSearchIndexer, ServerDeps, StreamHub};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn follow_comment_reply_and_hide_scenario(ctx: &mut TestHarness) {
    let a = ctx.member("ana").await;
    let b = ctx.member("ben").await;
    let c = ctx.member("cleo").await;
    let m = ctx.member("mod").await;
    let c1 = ctx.category("Markets").await;
    ctx.grant(c1, &m, GrantStatus::Active).await;

    let draft = ctx.draft_post(&a, "P1", &[c1]).await;
    ctx.follow_category(&b, c1).await;
    publish_document(&ctx.deps, &a, &draft.document_id).await.unwrap();

    let for_b = ctx.notifications_for(id(&b)).await;
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].kind, NotificationType::Follow);
    assert_eq!(for_b[0].message, "ana published \"P1\"");

    let b_comment = ctx.comment(&b, &draft.document_id, "nice").await;
    let for_a = ctx.notifications_for(id(&a)).await;
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].kind, NotificationType::Comment);

    create_comment(
        &ctx.deps,
        &c,
        CreateComment {
            content: "agreed".to_string(),
            target_id: draft.document_id.clone(),
            parent_id: Some(b_comment.document_id.clone()),
        },
    )
    .await
    .unwrap();

    let for_b = ctx.notifications_for(id(&b)).await;
    assert_eq!(for_b.len(), 2);
    assert_eq!(for_b[0].kind, NotificationType::Comment);
    assert_eq!(for_b[0].message, "cleo replied to your comment on \"P1\"");
    // Replies only go to the parent author.
    assert_eq!(ctx.notifications_for(id(&a)).await.len(), 1);

    moderate(&ctx.deps, &m, &draft.document_id, ModerationAction::Hide)
        .await
        .unwrap();
    let public = fetch_public_document(&ctx.deps, &draft.document_id).await;
    assert!(matches!(public, Err(ForumError::NotFound(_))));
    let as_moderator = fetch_for_viewer(&ctx.deps, &m, &draft.document_id).await.unwrap();
    assert_eq!(as_moderator.moderation_status, Some(ModerationStatus::Delete));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn a_member_reached_through_several_paths_hears_once(ctx: &mut TestHarness) {
    let owner = ctx.member("owner").await;
    let fan = ctx.member("fan").await;
    let admin = ctx.admin("admin").await;
    let markets = ctx.category("Markets").await;
    let macro_ = ctx.category("Macro").await;

    ctx.follow_category(&owner, markets).await;
    ctx.follow_category(&owner, macro_).await;
    ctx.follow_category(&fan, markets).await;
    ctx.follow_category(&fan, macro_).await;
    ctx.toggle(&fan, ActionType::Follow, TargetType::User, id(&owner).to_string())
        .await;
    let before_fan = ctx.notifications_for(id(&fan)).await.len();

    let draft = ctx.draft_post(&owner, "Rates", &[markets, macro_]).await;
    publish_document(&ctx.deps, &admin, &draft.document_id).await.unwrap();

    let for_owner: Vec<_> = ctx
        .notifications_for(id(&owner))
        .await
        .into_iter()
        .filter(|n| n.data["documentId"] == draft.document_id.as_str())
        .collect();
    assert_eq!(for_owner.len(), 1);
    assert_eq!(ctx.notifications_for(id(&fan)).await.len(), before_fan + 1);
    assert!(ctx.notifications_for(id(&admin)).await.is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn the_actor_never_notifies_themselves(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let category = ctx.category("Markets").await;
    ctx.follow_category(&author, category).await;
    let post = ctx.published_post(&author, "Rates", &[category]).await;

    ctx.toggle(&author, ActionType::Follow, TargetType::Post, post.document_id.to_string())
        .await;
    ctx.comment(&author, &post.document_id, "bump").await;

    assert!(ctx.notifications_for(id(&author)).await.is_empty());
    assert!(ctx.realtime.pushed().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn post_followers_hear_about_comments(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let follower = ctx.member("follower").await;
    let commenter = ctx.member("commenter").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;

    ctx.toggle(&follower, ActionType::Follow, TargetType::Post, post.document_id.to_string())
        .await;
    ctx.comment(&commenter, &post.document_id, "hi").await;

    let for_follower = ctx.notifications_for(id(&follower)).await;
    assert_eq!(for_follower.len(), 1);
    assert_eq!(for_follower[0].message, "commenter commented on \"Rates\"");
    assert!(for_follower[0].data["commentId"].is_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn downvotes_are_silent(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let reader = ctx.member("reader").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;
    let target = post.document_id.to_string();

    ctx.toggle(&reader, ActionType::Downvote, TargetType::Post, &target).await;
    assert!(ctx.notifications_for(id(&author)).await.is_empty());

    ctx.toggle(&reader, ActionType::Upvote, TargetType::Post, &target).await;
    let for_author = ctx.notifications_for(id(&author)).await;
    assert_eq!(for_author.len(), 1);
    assert_eq!(for_author[0].kind, NotificationType::Upvote);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deactivating_a_toggle_sends_nothing(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let reader = ctx.member("reader").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;
    let target = post.document_id.to_string();

    ctx.toggle(&reader, ActionType::Like, TargetType::Post, &target).await;
    ctx.toggle(&reader, ActionType::Like, TargetType::Post, &target).await;

    assert_eq!(ctx.notifications_for(id(&author)).await.len(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn following_a_member_notifies_them(ctx: &mut TestHarness) {
    let star = ctx.member("star").await;
    let fan = ctx.member("fan").await;

    ctx.toggle(&fan, ActionType::Follow, TargetType::User, id(&star).to_string())
        .await;

    let for_star = ctx.notifications_for(id(&star)).await;
    assert_eq!(for_star.len(), 1);
    assert_eq!(for_star[0].message, "fan started following you");
    assert_eq!(ctx.realtime.pushed_to(id(&star)).len(), 1);
    assert_eq!(ctx.realtime.pushed_to(id(&star))[0].event, NOTIFICATION_EVENT);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn persistence_failure_does_not_fail_the_toggle(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let reader = ctx.member("reader").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;

    ctx.store.set_fail_notification_inserts(true);
    let result = toggle(
        &ctx.deps,
        &reader,
        ToggleRequest::new(ActionType::Like, TargetType::Post, post.document_id.to_string()),
    )
    .await
    .unwrap();

    assert!(result.active);
    assert_eq!(result.count, 1);
    ctx.store.set_fail_notification_inserts(false);
    assert!(ctx.notifications_for(id(&author)).await.is_empty());
    assert!(ctx.realtime.pushed().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn realtime_failure_keeps_the_persisted_notification(ctx: &mut TestHarness) {
    let author = ctx.member("author").await;
    let commenter = ctx.member("commenter").await;
    let post = ctx.published_post(&author, "Rates", &[ctx.category("Markets").await]).await;

    ctx.realtime.set_failing(true);
    let comment = create_comment(
        &ctx.deps,
        &commenter,
        CreateComment {
            content: "hi".to_string(),
            target_id: post.document_id.clone(),
            parent_id: None,
        },
    )
    .await;

    assert!(comment.is_ok());
    assert_eq!(ctx.notifications_for(id(&author)).await.len(), 1);
    assert!(ctx.realtime.pushed().is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn only_the_recipient_can_mark_a_notification_read(ctx: &mut TestHarness) {
    let star = ctx.member("star").await;
    let fan = ctx.member("fan").await;
    ctx.toggle(&fan, ActionType::Follow, TargetType::User, id(&star).to_string())
        .await;

    let listed = list_notifications(&ctx.deps, &star, None, None).await.unwrap();
    let notification = &listed[0];
    assert_eq!(unread_count(&ctx.deps, &star).await.unwrap(), 1);

    let stolen = mark_read(&ctx.deps, &fan, notification.id).await;
    assert!(matches!(stolen, Err(ForumError::NotFound(_))));
    assert_eq!(unread_count(&ctx.deps, &star).await.unwrap(), 1);

    let read = mark_read(&ctx.deps, &star, notification.id).await.unwrap();
    assert!(read.read);
    assert_eq!(unread_count(&ctx.deps, &star).await.unwrap(), 0);

    let anonymous = list_notifications(&ctx.deps, &Viewer::anonymous(), None, None).await;
    assert!(matches!(anonymous, Err(ForumError::Unauthenticated)));
}

#[tokio::test]
async fn background_fan_out_completes_before_shutdown_returns() {
    let store = Arc::new(InMemoryStore::new());
    let deps = Arc::new(ServerDeps::new(
        store.clone(),
        Arc::new(MockSearchIndexer::new()),
        Arc::new(MockRealtimeChannel::new()),
        StreamHub::new(),
        FanOutDispatcher::background(),
    ));
    let ctx = TestHarness {
        deps,
        store,
        search: MockSearchIndexer::new(),
        realtime: MockRealtimeChannel::new(),
        jwt_service: TestHarness::new().jwt_service,
    };

    let star = ctx.member("star").await;
    for i in 0..5 {
        let fan = ctx.member(&format!("fan-{i}")).await;
        ctx.toggle(&fan, ActionType::Follow, TargetType::User, id(&star).to_string())
            .await;
    }

    ctx.deps.fanout.shutdown().await;
    assert_eq!(ctx.deps.fanout.in_flight(), 0);
    assert_eq!(ctx.notifications_for(id(&star)).await.len(), 5);
}
