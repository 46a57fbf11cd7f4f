use optimistic_rust::{
    ClientConfig, MutationOutcome, PersonRef, Subscriber, SubscriptionType,
};

use crate::support::{context, context_with, id, messages, viewer};

fn colleague() -> Subscriber {
    Subscriber::for_person(PersonRef::new("person-2", "Grace Hopper")).unwrap()
}

#[tokio::test]
async fn subscribe_adds_viewer_to_list() {
    let (ctx, notices) = context();
    let panel = ctx
        .subscription_panel("list-1", SubscriptionType::GoalUpdate, vec![colleague()])
        .unwrap();
    assert!(!panel.is_subscribed().unwrap());

    let outcome = panel.handle_subscribe().await.unwrap();

    assert_eq!(outcome, MutationOutcome::Confirmed { id: id("person-1") });
    assert!(panel.is_subscribed().unwrap());
    assert_eq!(
        panel.subscribers().unwrap().ids(),
        vec![id("person-2"), id("person-1")]
    );
    assert!(messages(&notices).is_empty());
    assert_eq!(
        ctx.api().calls(),
        vec!["subscribe goal_update list-1".to_string()]
    );
    assert!(ctx.signal().is_stale(&panel.cache_key()));
}

#[tokio::test]
async fn subscribe_twice_does_not_call_backend_again() {
    let (ctx, _) = context();
    let me = Subscriber::for_person(viewer()).unwrap();
    let panel = ctx
        .subscription_panel("list-1", SubscriptionType::Goal, vec![me])
        .unwrap();

    let outcome = panel.handle_subscribe().await.unwrap();

    assert!(outcome.is_stale());
    assert!(ctx.api().calls().is_empty());
}

#[tokio::test]
async fn failed_unsubscribe_keeps_subscription() {
    let (ctx, notices) = context();
    let me = Subscriber::for_person(viewer()).unwrap();
    let panel = ctx
        .subscription_panel("list-1", SubscriptionType::Message, vec![colleague(), me])
        .unwrap();
    let before = panel.subscribers().unwrap();
    ctx.api().fail_all();
    let release = ctx.api().hold_next();

    let (outcome, ()) = tokio::join!(panel.handle_unsubscribe(), async {
        tokio::task::yield_now().await;
        assert!(!panel.is_subscribed().unwrap());
        release.send(()).unwrap();
    });

    assert!(outcome.unwrap().is_rolled_back());
    assert_eq!(panel.subscribers().unwrap(), before);
    assert_eq!(
        messages(&notices),
        vec!["Failed to unsubscribe from notifications.".to_string()]
    );
}

#[tokio::test]
async fn unsubscribe_when_not_subscribed_is_stale() {
    let (ctx, _) = context();
    let panel = ctx
        .subscription_panel("list-1", SubscriptionType::Goal, vec![])
        .unwrap();

    let outcome = panel.handle_unsubscribe().await.unwrap();

    assert_eq!(outcome, MutationOutcome::Stale { id: id("person-1") });
    assert!(ctx.api().calls().is_empty());
}

#[tokio::test]
async fn failure_notices_can_be_disabled() {
    let config = ClientConfig {
        notify_failures: false,
        ..ClientConfig::default()
    };
    let (ctx, notices) = context_with(config);
    let panel = ctx
        .subscription_panel("list-1", SubscriptionType::Goal, vec![])
        .unwrap();
    ctx.api().fail_all();

    let outcome = panel.handle_subscribe().await.unwrap();

    assert!(outcome.is_rolled_back());
    assert!(!panel.is_subscribed().unwrap());
    assert!(messages(&notices).is_empty());
}
