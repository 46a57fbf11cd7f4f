use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use optimistic_rust::{CommentParent, EntityId, MutationOutcome, RemoteError, RemoteErrorKind};
use serde_json::json;

use crate::support::{comment, context, id, messages};

fn goal() -> CommentParent {
    CommentParent::Goal("42".into())
}

#[tokio::test]
async fn create_shows_pending_comment_then_confirms() {
    let (ctx, notices) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    let release = ctx.api().hold_next();

    let (outcome, ()) = tokio::join!(thread.handle_create_comment(json!("hello")), async {
        tokio::task::yield_now().await;
        let pending = thread.comments().unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending.as_slice()[0].is_pending());
        assert_eq!(pending.as_slice()[0].content, json!("hello"));
        assert_eq!(pending.as_slice()[0].author, ctx.viewer().clone());
        release.send(()).unwrap();
    });

    assert_eq!(
        outcome.unwrap(),
        MutationOutcome::Confirmed { id: id("c1") }
    );
    let comments = thread.comments().unwrap();
    assert_eq!(comments.ids(), vec![id("c1")]);
    assert!(!comments.as_slice()[0].is_pending());
    assert_eq!(comments.as_slice()[0].content, json!("hello"));
    assert!(messages(&notices).is_empty());
    assert_eq!(ctx.api().calls(), vec!["create_comment goal 42".to_string()]);
}

#[tokio::test]
async fn create_takes_server_normalized_content() {
    let (ctx, _) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    ctx.api()
        .normalize_content_to(json!({ "type": "doc", "content": ["hello"] }));

    let outcome = thread.handle_create_comment(json!("hello")).await.unwrap();

    assert!(outcome.is_confirmed());
    let confirmed = thread.store().find(&id("c1")).unwrap().unwrap();
    assert_eq!(
        confirmed.content,
        json!({ "type": "doc", "content": ["hello"] })
    );
}

#[tokio::test]
async fn failed_create_removes_pending_comment() {
    let (ctx, notices) = context();
    let existing = comment("c9", json!("first"));
    let thread = ctx.comment_thread(goal(), vec![existing.clone()]).unwrap();
    ctx.api().fail_all();

    let outcome = thread.handle_create_comment(json!("second")).await.unwrap();

    match outcome {
        MutationOutcome::RolledBack { error } => {
            assert_eq!(error.kind, RemoteErrorKind::Network)
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(thread.comments().unwrap().into_vec(), vec![existing]);
    assert_eq!(messages(&notices), vec!["Failed to add comment.".to_string()]);
}

#[tokio::test]
async fn failed_edit_restores_previous_content() {
    let (ctx, notices) = context();
    let thread = ctx
        .comment_thread(goal(), vec![comment("c1", json!("A"))])
        .unwrap();
    let before = thread.comments().unwrap();
    ctx.api().fail_all();
    let release = ctx.api().hold_next();
    let c1 = id("c1");

    let (outcome, ()) = tokio::join!(thread.handle_edit_comment(&c1, json!("B")), async {
        tokio::task::yield_now().await;
        let edited = thread.store().find(&c1).unwrap().unwrap();
        assert_eq!(edited.content, json!("B"));
        release.send(()).unwrap();
    });

    assert!(outcome.unwrap().is_rolled_back());
    assert_eq!(thread.comments().unwrap(), before);
    assert_eq!(messages(&notices), vec!["Failed to edit comment.".to_string()]);
    assert_eq!(ctx.api().calls(), vec!["edit_comment c1 goal".to_string()]);
}

#[tokio::test]
async fn failed_delete_reinserts_at_original_position() {
    let (ctx, notices) = context();
    let thread = ctx
        .comment_thread(
            goal(),
            vec![
                comment("c1", json!("a")),
                comment("c2", json!("b")),
                comment("c3", json!("c")),
            ],
        )
        .unwrap();
    let before = thread.comments().unwrap();
    ctx.api().fail_all();

    let outcome = thread.handle_delete_comment(&id("c2")).await.unwrap();

    assert!(outcome.is_rolled_back());
    assert_eq!(thread.comments().unwrap(), before);
    assert_eq!(messages(&notices), vec!["Failed to delete comment.".to_string()]);
}

#[tokio::test]
async fn edit_after_delete_is_stale_and_skips_remote() {
    let (ctx, notices) = context();
    let thread = ctx
        .comment_thread(goal(), vec![comment("c1", json!("A"))])
        .unwrap();
    let release = ctx.api().hold_next();
    let c1 = id("c1");

    let (deleted, edited) = tokio::join!(thread.handle_delete_comment(&c1), async {
        tokio::task::yield_now().await;
        let edited = thread.handle_edit_comment(&c1, json!("X")).await;
        release.send(()).unwrap();
        edited
    });

    assert_eq!(deleted.unwrap(), MutationOutcome::Confirmed { id: id("c1") });
    assert_eq!(edited.unwrap(), MutationOutcome::Stale { id: id("c1") });
    assert!(thread.comments().unwrap().is_empty());
    assert_eq!(ctx.api().calls(), vec!["delete_comment c1 goal".to_string()]);
    assert!(messages(&notices).is_empty());
}

#[tokio::test]
async fn confirmed_id_already_loaded_is_not_duplicated() {
    let (ctx, _) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    let release = ctx.api().hold_next();

    let (outcome, ()) = tokio::join!(thread.handle_create_comment(json!("hi")), async {
        tokio::task::yield_now().await;
        // A reload delivered the confirmed comment before the response did.
        thread
            .store()
            .transition(|list| Ok((list.insert(comment("c1", json!("hi")))?, ())))
            .unwrap();
        assert_eq!(thread.comments().unwrap().len(), 2);
        release.send(()).unwrap();
    });

    assert!(outcome.unwrap().is_confirmed());
    let comments = thread.comments().unwrap();
    assert_eq!(comments.ids(), vec![id("c1")]);
}

#[tokio::test]
async fn detached_thread_is_left_alone() {
    let (ctx, notices) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    let release = ctx.api().hold_next();

    let (outcome, ()) = tokio::join!(thread.handle_create_comment(json!("bye")), async {
        tokio::task::yield_now().await;
        thread.detach();
        release.send(()).unwrap();
    });

    assert_eq!(
        outcome.unwrap(),
        MutationOutcome::Detached { confirmed: true }
    );
    let comments = thread.comments().unwrap();
    assert_eq!(comments.len(), 1);
    assert!(comments.as_slice()[0].is_pending());
    assert!(thread.is_stale());
    assert!(messages(&notices).is_empty());
}

#[tokio::test]
async fn detached_thread_is_not_rolled_back_on_failure() {
    let (ctx, notices) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    ctx.api().fail_all();
    let release = ctx.api().hold_next();

    let (outcome, ()) = tokio::join!(thread.handle_create_comment(json!("bye")), async {
        tokio::task::yield_now().await;
        thread.detach();
        release.send(()).unwrap();
    });

    assert_eq!(
        outcome.unwrap(),
        MutationOutcome::Detached { confirmed: false }
    );
    let comments = thread.comments().unwrap();
    assert_eq!(comments.len(), 1);
    assert!(comments.as_slice()[0].is_pending());
    assert!(!thread.is_stale());
    assert_eq!(messages(&notices), vec!["Failed to add comment.".to_string()]);
}

#[tokio::test]
async fn mutations_invalidate_every_view_of_the_parent() {
    let (ctx, _) = context();
    let first = ctx.comment_thread(goal(), vec![]).unwrap();
    let second = ctx.comment_thread(goal(), vec![]).unwrap();
    let other = ctx
        .comment_thread(CommentParent::Project("7".into()), vec![])
        .unwrap();

    let seen = Arc::new(AtomicUsize::new(0));
    let _a = first.on_stale({
        let seen = seen.clone();
        move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });
    let _b = second.on_stale({
        let seen = seen.clone();
        move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });
    let _c = other.on_stale(|key| panic!("unrelated key invalidated: {}", key));

    assert!(first.handle_create_comment(json!("x")).await.unwrap().is_confirmed());

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert!(second.is_stale());
    assert!(!other.is_stale());
}

#[tokio::test]
async fn refresh_replaces_contents_and_clears_staleness() {
    let (ctx, _) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    thread.handle_create_comment(json!("mine")).await.unwrap();
    assert!(thread.is_stale());

    thread
        .refresh(|| async {
            Ok(vec![
                comment("c1", json!("mine")),
                comment("c5", json!("theirs")),
            ])
        })
        .await
        .unwrap();

    assert!(!thread.is_stale());
    assert_eq!(thread.comments().unwrap().ids(), vec![id("c1"), id("c5")]);
}

#[tokio::test]
async fn failed_refresh_keeps_store() {
    let (ctx, _) = context();
    let thread = ctx
        .comment_thread(goal(), vec![comment("c1", json!("A"))])
        .unwrap();
    let before = thread.comments().unwrap();

    let err = thread
        .refresh(|| async { Err(RemoteError::unauthorized("session expired")) })
        .await
        .unwrap_err();

    assert!(err.to_string().contains("session expired"));
    assert_eq!(thread.comments().unwrap(), before);
}

#[tokio::test]
async fn temp_ids_are_never_reused() {
    let (ctx, _) = context();
    let thread = ctx.comment_thread(goal(), vec![]).unwrap();
    let release = ctx.api().hold_next();

    let (_, ()) = tokio::join!(thread.handle_create_comment(json!("one")), async {
        tokio::task::yield_now().await;
        let pending: Vec<EntityId> = thread.comments().unwrap().ids();
        let next = ctx.executor().allocate_temp_id();
        assert!(next.is_temporary());
        assert!(!pending.contains(&next));
        release.send(()).unwrap();
    });
}
