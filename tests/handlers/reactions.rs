use optimistic_rust::{CommentParentType, MutationOutcome, PersonRef, Reaction, ReactionTarget};

use crate::support::{context, id, messages};

fn on_comment() -> ReactionTarget {
    ReactionTarget::Comment {
        id: id("c1"),
        parent: CommentParentType::GoalUpdate,
    }
}

#[tokio::test]
async fn add_reaction_swaps_temp_id_for_remote_id() {
    let (ctx, notices) = context();
    let list = ctx.reaction_list(on_comment(), vec![]).unwrap();
    let release = ctx.api().hold_next();

    let (outcome, ()) = tokio::join!(list.handle_add_reaction("👍"), async {
        tokio::task::yield_now().await;
        let pending = list.reactions().unwrap();
        assert_eq!(pending.len(), 1);
        assert!(pending.as_slice()[0].id.is_temporary());
        assert_eq!(pending.as_slice()[0].emoji, "👍");
        release.send(()).unwrap();
    });

    assert_eq!(outcome.unwrap(), MutationOutcome::Confirmed { id: id("r1") });
    let reactions = list.reactions().unwrap();
    assert_eq!(reactions.ids(), vec![id("r1")]);
    assert_eq!(reactions.as_slice()[0].person, ctx.viewer().clone());
    assert!(messages(&notices).is_empty());
    assert_eq!(
        ctx.api().calls(),
        vec!["add_reaction comment c1 goal_update 👍".to_string()]
    );
}

#[tokio::test]
async fn failed_add_reaction_is_discarded() {
    let (ctx, notices) = context();
    let list = ctx
        .reaction_list(ReactionTarget::Message("m1".into()), vec![])
        .unwrap();
    ctx.api().fail_all();

    let outcome = list.handle_add_reaction("🎉").await.unwrap();

    assert!(outcome.is_rolled_back());
    assert!(list.reactions().unwrap().is_empty());
    assert_eq!(messages(&notices), vec!["Failed to add reaction.".to_string()]);
    assert_eq!(
        ctx.api().calls(),
        vec!["add_reaction message m1 - 🎉".to_string()]
    );
}

#[tokio::test]
async fn failed_remove_reaction_restores_it() {
    let (ctx, notices) = context();
    let existing = vec![
        Reaction::new(id("r1"), "👍", PersonRef::new("person-2", "Grace Hopper")),
        Reaction::new(id("r2"), "❤️", ctx.viewer().clone()),
    ];
    let list = ctx.reaction_list(on_comment(), existing).unwrap();
    let before = list.reactions().unwrap();
    ctx.api().fail_all();
    let release = ctx.api().hold_next();
    let r2 = id("r2");

    let (outcome, ()) = tokio::join!(list.handle_remove_reaction(&r2), async {
        tokio::task::yield_now().await;
        assert_eq!(list.reactions().unwrap().ids(), vec![id("r1")]);
        release.send(()).unwrap();
    });

    assert!(outcome.unwrap().is_rolled_back());
    assert_eq!(list.reactions().unwrap(), before);
    assert_eq!(
        messages(&notices),
        vec!["Failed to remove reaction.".to_string()]
    );
}

#[tokio::test]
async fn remove_reaction_invalidates_target() {
    let (ctx, _) = context();
    let existing = vec![Reaction::new(id("r1"), "👍", ctx.viewer().clone())];
    let list = ctx.reaction_list(on_comment(), existing).unwrap();

    let outcome = list.handle_remove_reaction(&id("r1")).await.unwrap();

    assert!(outcome.is_confirmed());
    assert!(list.reactions().unwrap().is_empty());
    assert!(ctx.signal().is_stale(&list.cache_key()));
    assert_eq!(list.cache_key().as_str(), "comment-c1");
}

#[tokio::test]
async fn removing_unknown_reaction_is_stale() {
    let (ctx, _) = context();
    let list = ctx.reaction_list(on_comment(), vec![]).unwrap();

    let outcome = list.handle_remove_reaction(&id("r7")).await.unwrap();

    assert_eq!(outcome, MutationOutcome::Stale { id: id("r7") });
    assert!(ctx.api().calls().is_empty());
}
