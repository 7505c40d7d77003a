//! Tests for registration, removal, generation and environment wiring.

mod common;
use common::*;

use std::collections::HashMap;
use std::time::Duration;

use oxide_navigator::{
    Handler, HookSet, Match, MemoryHistory, NavigateOptions, Resolution, RouteMap, RouteSpec,
    Router, RouterError, RouterOptions,
};
use regex::Regex;

fn noop(_: &Match) {}

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn route_names(router: &Router) -> Vec<String> {
    router.routes().map(|r| r.name().to_string()).collect()
}

#[test]
fn test_on_accepts_every_registration_shape() {
    let mut router = router();
    router
        .on_root(noop)
        .unwrap()
        .on("/foo/bar", noop)
        .unwrap()
        .on(Regex::new(r"^rock/(\w+)").unwrap(), noop)
        .unwrap()
        .on_map(
            RouteMap::new()
                .route("/a", noop)
                .named("/b/:id", "b", noop, None),
        )
        .unwrap();

    assert_eq!(route_names(&router), ["", "foo/bar", "/^rock/(\\w+)/", "a", "b"]);
}

#[test]
fn test_register_route_spec_with_map_hooks() {
    let mut router = router();
    router
        .register(
            RouteSpec::map(RouteMap::new().route("/a", noop).route("/b", noop))
                .hooks(HookSet::new().after(noop)),
        )
        .unwrap();

    assert!(router.routes().all(|r| r.hooks().is_some_and(|h| h.after.is_some())));
}

#[test]
fn test_off_removes_by_pattern_and_by_handler() {
    let handler = Handler::new(noop);
    let mut router = router();
    router
        .on("/foo", handler.clone())
        .unwrap()
        .on("/bar", noop)
        .unwrap()
        .on(Regex::new("^baz").unwrap(), handler.clone())
        .unwrap();

    router.off("/bar/");
    assert_eq!(route_names(&router), ["foo", "/^baz/"]);

    router.off(&handler);
    assert!(router.routes().next().is_none());
}

#[test]
fn test_off_with_root_prefix() {
    let mut router = Router::new(RouterOptions::new().root("/app"));
    router.on("/foo", noop).unwrap().on("/bar", noop).unwrap();

    router.off("foo");
    assert_eq!(route_names(&router), ["app/bar"]);
}

#[test]
fn test_generate_named_routes() {
    let mut router = router();
    router
        .on_map(
            RouteMap::new()
                .named("/foo/:id/:action", "name", noop, None)
                .named(Regex::new("^x").unwrap(), "regex", noop, None),
        )
        .unwrap();

    assert_eq!(
        router
            .generate("name", &values(&[("id", "xxx"), ("action", "save")]))
            .unwrap(),
        "/foo/xxx/save"
    );
    assert_eq!(
        router.generate("name", &values(&[("id", "xxx")])),
        Err(RouterError::MissingParameter {
            route: "foo/:id/:action".to_string(),
            param: "action".to_string(),
        })
    );
    assert!(matches!(
        router.generate("regex", &HashMap::new()),
        Err(RouterError::NotGeneratable(_))
    ));
    assert_eq!(
        router.generate("missing", &HashMap::new()),
        Err(RouterError::UnknownRouteName("missing".to_string()))
    );
}

#[test]
fn test_link_joins_root_and_path() {
    let router = Router::new(RouterOptions::new().root("/my/root"));
    assert_eq!(router.link("something/else"), "/my/root/something/else");
    assert_eq!(router.link("/something/else/"), "/my/root/something/else");
    assert_eq!(router.link(""), "/my/root");
}

#[tokio::test]
async fn test_navigate_resolves_under_the_root() {
    let calls = Calls::new();
    let history = MemoryHistory::new("/");
    let mut router =
        Router::with_environment(RouterOptions::new().root("/app"), history.clone());
    router.on("/users/:id", calls.record("user")).unwrap();

    let resolution = router
        .navigate("users/7", &NavigateOptions::new().replace())
        .await;

    assert_eq!(resolution.committed().unwrap().param("id"), Some("7"));
    assert_eq!(history.len(), 1);
    assert_eq!(history.location(), "/app/users/7");
}

#[tokio::test]
async fn test_unmatched_navigation_is_still_recorded() {
    let (mut router, history) = router_with_history("/");
    router.on("/foo", noop).unwrap();

    let resolution = router.navigate("/elsewhere", &NavigateOptions::new()).await;

    assert!(matches!(resolution, Resolution::Unmatched));
    assert_eq!(history.location(), "/elsewhere");
}

#[tokio::test]
async fn test_history_changes_trigger_resolution() {
    let calls = Calls::new();
    let (mut router, history) = router_with_history("/");
    router
        .on("/a", calls.record("a"))
        .unwrap()
        .on("/b", calls.record("b"))
        .unwrap();

    let options = NavigateOptions::new();
    router.navigate("/a", &options).await;
    router.navigate("/b", &options).await;
    assert_eq!(router.process_location_changes().await, 0);

    assert!(history.back());
    assert_eq!(router.process_location_changes().await, 1);

    assert_eq!(calls.tags(), ["a", "b", "a"]);
    assert_eq!(router.last_resolved().unwrap().url, "a");
}

#[tokio::test]
async fn test_listen_resolves_each_change() {
    let calls = Calls::new();
    let (mut router, history) = router_with_history("/");
    router
        .on("/a", calls.record("a"))
        .unwrap()
        .on("/b", calls.record("b"))
        .unwrap();

    let options = NavigateOptions::new();
    router.navigate("/a", &options).await;
    router.navigate("/b", &options).await;
    history.back();

    let listening = tokio::time::timeout(Duration::from_millis(50), router.listen()).await;

    assert!(listening.is_err());
    assert_eq!(calls.tags(), ["a", "b", "a"]);
}

#[tokio::test]
async fn test_queued_changes_resolve_the_current_location() {
    let calls = Calls::new();
    let (mut router, history) = router_with_history("/");
    router
        .on("/a", calls.record("a"))
        .unwrap()
        .on("/b", calls.record("b"))
        .unwrap();

    let options = NavigateOptions::new();
    router.navigate("/a", &options).await;
    router.navigate("/b", &options).await;
    history.back();
    history.forward();

    assert_eq!(router.process_location_changes().await, 2);
    assert_eq!(calls.tags(), ["a", "b", "b", "b"]);
    assert_eq!(router.last_resolved().unwrap().url, "b");
    assert_eq!(router.process_location_changes().await, 0);
}

#[tokio::test]
async fn test_undriven_router_keeps_changes_queued() {
    let calls = Calls::new();
    let history = MemoryHistory::new("/a");
    let mut router = Router::with_environment(RouterOptions::new().root("/"), history.clone());
    router.on("/a", calls.record("a")).unwrap();
    let _idle = Router::with_environment(RouterOptions::new().root("/").listen(false), history.clone());
    assert_eq!(history.subscriber_count(), 1);

    router.navigate("/x", &NavigateOptions::new()).await;
    history.back();
    history.forward();
    history.back();
    assert!(calls.is_empty());

    assert_eq!(router.process_location_changes().await, 3);
    assert_eq!(calls.tags(), ["a", "a", "a"]);
}

#[test]
fn test_destroy_clears_routes_and_unsubscribes() {
    let (mut router, history) = router_with_history("/");
    router.on("foo", noop).unwrap().on("bar", noop).unwrap();
    assert_eq!(history.subscriber_count(), 1);

    router.destroy();

    assert!(router.is_destroyed());
    assert!(router.routes().next().is_none());
    assert_eq!(history.subscriber_count(), 0);
}

#[tokio::test]
async fn test_destroyed_router_ignores_history() {
    let calls = Calls::new();
    let (mut router, history) = router_with_history("/");
    router.on("/a", calls.record("a")).unwrap();
    router.navigate("/a", &NavigateOptions::new()).await;
    router.navigate("/b", &NavigateOptions::new()).await;

    router.destroy();
    history.back();

    assert_eq!(router.process_location_changes().await, 0);
    assert_eq!(calls.count("a"), 1);
}

#[test]
fn test_options_from_json() {
    let options: RouterOptions =
        serde_json::from_str(r#"{"root": "/app/", "listen": false}"#).unwrap();
    let history = MemoryHistory::new("/");
    let router = Router::with_environment(options, history.clone());

    assert_eq!(router.root(), "app");
    assert_eq!(history.subscriber_count(), 0);
}

#[test]
fn test_missing_root_logs_a_warning() {
    let logs = LogBuffer::default();

    let router = tracing::subscriber::with_default(logs.subscriber(), || {
        Router::new(RouterOptions::new())
    });

    assert_eq!(router.root(), "");
    assert!(logs.contents().contains("no root path configured"));
}

#[test]
fn test_unmatched_resolution_logs_a_warning() {
    let logs = LogBuffer::default();
    let mut router = router();
    router.on("/foo", noop).unwrap();

    let resolution = tracing::subscriber::with_default(logs.subscriber(), || {
        router.resolve_now(Some("/missing?x=1"))
    });

    assert!(matches!(resolution, Some(Resolution::Unmatched)));
    let output = logs.contents();
    assert!(output.contains("WARN"));
    assert!(output.contains("\"/missing?x=1\" didn't match any of the registered routes"));
}
