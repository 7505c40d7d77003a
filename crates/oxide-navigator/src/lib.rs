//! # oxide-navigator
//!
//! A client-side URL router.
//!
//! This crate provides:
//! - Path templates with `:name` parameters and `*` wildcards
//! - Regex routes with positional captures
//! - Query string parsing
//! - Lifecycle hooks (`before`, `after`, `leave`, `already`), per route or
//!   as router-wide defaults
//! - A not-found handler
//! - Named routes for reverse URL generation
//! - An [`Environment`] abstraction for location reads, navigation and
//!   change notifications, with an in-memory [`MemoryHistory`]
//!
//! ## Quick Start
//!
//! ```
//! use oxide_navigator::{Match, Resolution, Router, RouterOptions};
//!
//! # futures::executor::block_on(async {
//! let mut router = Router::new(RouterOptions::new().root("/"));
//! router
//!     .on_root(|_: &Match| println!("home"))
//!     .unwrap()
//!     .on("/users/:id/:action", |m: &Match| {
//!         println!("{} user {}", m.param("action").unwrap(), m.param("id").unwrap());
//!     })
//!     .unwrap();
//!
//! let resolution = router.resolve_to("/users/42/save?draft=1").await;
//! let m = resolution.committed().unwrap();
//! assert_eq!(m.param("id"), Some("42"));
//! assert_eq!(m.query("draft"), Some("1"));
//!
//! // Resolving the same location again only re-runs the handler.
//! assert!(matches!(
//!     router.resolve_to("/users/42/save?draft=1").await,
//!     Resolution::Repeat(_)
//! ));
//! # });
//! ```
//!
//! ## Hooks
//!
//! ```
//! use oxide_navigator::{Flow, HookSet, Match, Resolution, Router, RouterOptions};
//!
//! # futures::executor::block_on(async {
//! let mut router = Router::new(RouterOptions::new().root("/"));
//! router
//!     .on_with(
//!         "/admin",
//!         |_: &Match| {},
//!         HookSet::new().before(|_| async { Flow::Abort }),
//!     )
//!     .unwrap();
//!
//! assert!(router.resolve_to("/admin").await.is_aborted());
//! assert!(router.last_resolved().is_none());
//! # });
//! ```
//!
//! ## Named Routes
//!
//! ```
//! use std::collections::HashMap;
//! use oxide_navigator::{Match, RouteMap, Router, RouterOptions};
//!
//! let mut router = Router::new(RouterOptions::new().root("/"));
//! router
//!     .on_map(RouteMap::new().named("/users/:id", "user", |_: &Match| {}, None))
//!     .unwrap();
//!
//! let data = HashMap::from([("id".to_string(), "7".to_string())]);
//! assert_eq!(router.generate("user", &data).unwrap(), "/users/7");
//! ```

mod error;
mod history;
mod hooks;
mod options;
mod path;
mod pipeline;
mod query;
mod registry;
mod resolve;
mod route;
mod route_match;
mod router;

pub use error::{Result, RouterError};
pub use history::{
    Environment, HistoryEntry, HistoryMethod, LocationChange, LocationChanges, MemoryHistory,
    NavigateOptions, Subscription, SubscriptionId,
};
pub use hooks::{GuardHook, HookSet, NotifyHook};
pub use options::RouterOptions;
pub use path::{clean, match_route, split_location, CompiledPattern, RoutePattern};
pub use pipeline::{BoxFuture, Flow, Pipeline, Step};
pub use query::{QueryParams, QueryValue};
pub use registry::RouteRegistry;
pub use resolve::{synthetic_match, AbortStage, NotFound, Resolution};
pub use route::{with_root, Handler, Route, RouteFilter, RouteMap, RouteSpec, RouteTarget};
pub use route_match::{Match, MatchData};
pub use router::Router;
