use std::cell::Cell;

use optimistic_rust::{
    ClientConfig, ClientContext, LogNotifier, PanelError, PersonRef, RemoteError,
    SubscriptionType,
};

use crate::support::{context, ScriptedApi};

fn features(list: &[&str]) -> Vec<String> {
    list.iter().map(|f| f.to_string()).collect()
}

#[tokio::test]
async fn enabled_features_are_cached_until_invalidated() {
    let (ctx, _) = context();
    let loads = Cell::new(0);
    let load = || {
        let loads = &loads;
        async move {
            loads.set(loads.get() + 1);
            Ok::<_, RemoteError>(features(&["comments", "reactions"]))
        }
    };

    assert!(!ctx.has_feature("acme", "comments"));
    let first = ctx.enabled_features("acme", load).await.unwrap();
    let second = ctx.enabled_features("acme", load).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(loads.get(), 1);
    assert!(ctx.has_feature("acme", "reactions"));
    assert!(!ctx.has_feature("acme", "ai"));
    assert!(!ctx.has_feature("globex", "comments"));

    ctx.invalidate_features("acme");
    assert!(!ctx.has_feature("acme", "comments"));
    ctx.enabled_features("acme", load).await.unwrap();
    assert_eq!(loads.get(), 2);
}

#[tokio::test]
async fn failed_feature_load_is_retried() {
    let (ctx, _) = context();

    let err = ctx
        .enabled_features("acme", || async { Err(RemoteError::network("offline")) })
        .await
        .unwrap_err();
    assert_eq!(err, RemoteError::network("offline"));

    let loaded = ctx
        .enabled_features("acme", || async { Ok(features(&["comments"])) })
        .await
        .unwrap();
    assert_eq!(loaded, features(&["comments"]));
}

#[tokio::test]
async fn zero_ttl_always_reloads() {
    let config = ClientConfig::from_json(r#"{ "feature_ttl_secs": 0 }"#).unwrap();
    let ctx = ClientContext::new(
        ScriptedApi::new(),
        LogNotifier::new(),
        PersonRef::new("person-1", "Ada Lovelace"),
        &config,
    );
    let loads = Cell::new(0);
    let load = || {
        let loads = &loads;
        async move {
            loads.set(loads.get() + 1);
            Ok::<_, RemoteError>(features(&["comments"]))
        }
    };

    ctx.enabled_features("acme", load).await.unwrap();
    ctx.enabled_features("acme", load).await.unwrap();

    assert_eq!(loads.get(), 2);
}

#[test]
fn viewer_with_reserved_id_cannot_open_subscription_panel() {
    let ctx = ClientContext::new(
        ScriptedApi::new(),
        LogNotifier::new(),
        PersonRef::new("temp-1", "Not Yet Saved"),
        &ClientConfig::default(),
    );

    let err = ctx
        .subscription_panel("list-1", SubscriptionType::Goal, vec![])
        .err()
        .unwrap();

    assert!(matches!(err, PanelError::Viewer(_)));
}
