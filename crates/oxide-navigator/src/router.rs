//! Main router implementation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::{FutureExt, StreamExt};
use tracing::{debug, trace, warn};

use crate::error::{Result, RouterError};
use crate::history::{Environment, LocationChanges, MemoryHistory, NavigateOptions, SubscriptionId};
use crate::hooks::HookSet;
use crate::options::RouterOptions;
use crate::path::{clean, RoutePattern};
use crate::pipeline::Pipeline;
use crate::registry::RouteRegistry;
use crate::resolve::{resolution_pipeline, synthetic_match, NotFound, Resolution, ResolveContext};
use crate::route::{with_root, Handler, Route, RouteFilter, RouteMap, RouteSpec};
use crate::route_match::Match;

/// A client-side router.
///
/// Owns the registered routes, the current match and the subscription to
/// its [`Environment`]. All state is per instance.
pub struct Router {
    /// Cleaned root prefix.
    root: String,
    /// Registered routes.
    registry: RouteRegistry,
    /// Last committed match.
    current: Option<Match>,
    /// Hooks applied to every route lacking its own of the same kind.
    default_hooks: HookSet,
    /// Handler for unmatched locations.
    not_found: Option<NotFound>,
    environment: Box<dyn Environment>,
    subscription: Option<SubscriptionId>,
    changes: Option<LocationChanges>,
    pipeline: Pipeline<ResolveContext>,
    destroyed: bool,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterOptions::new().root("/"))
    }
}

impl Router {
    /// Creates a router backed by an in-memory history.
    pub fn new(options: RouterOptions) -> Self {
        Self::with_environment(options, MemoryHistory::new("/"))
    }

    /// Creates a router backed by the given environment.
    pub fn with_environment(options: RouterOptions, environment: impl Environment + 'static) -> Self {
        let root = match options.root.as_deref() {
            Some(root) => clean(root).to_string(),
            None => {
                warn!("no root path configured, using \"/\"");
                String::new()
            }
        };

        let mut environment: Box<dyn Environment> = Box::new(environment);
        let (subscription, changes) = if options.listen {
            environment
                .subscribe()
                .map_or((None, None), |sub| (Some(sub.id), Some(sub.changes)))
        } else {
            (None, None)
        };

        Self {
            root,
            registry: RouteRegistry::new(),
            current: None,
            default_hooks: HookSet::new(),
            not_found: None,
            environment,
            subscription,
            changes,
            pipeline: resolution_pipeline(),
            destroyed: false,
        }
    }

    /// Registers routes from any registration shape.
    pub fn register(&mut self, spec: RouteSpec) -> Result<&mut Self> {
        let map = spec.into_map(&self.root);
        self.registry.register_batch(map)?;
        Ok(self)
    }

    /// Adds a route.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_navigator::{Match, Router, RouterOptions};
    ///
    /// let mut router = Router::new(RouterOptions::new().root("/"));
    /// router
    ///     .on("/users/:id", |m: &Match| println!("user {:?}", m.param("id")))
    ///     .unwrap()
    ///     .on("/about", |_: &Match| {})
    ///     .unwrap();
    /// assert_eq!(router.routes().count(), 2);
    /// ```
    pub fn on(
        &mut self,
        pattern: impl Into<RoutePattern>,
        handler: impl Into<Handler>,
    ) -> Result<&mut Self> {
        self.register(RouteSpec::single(pattern, handler))
    }

    /// Adds a route with hooks.
    pub fn on_with(
        &mut self,
        pattern: impl Into<RoutePattern>,
        handler: impl Into<Handler>,
        hooks: HookSet,
    ) -> Result<&mut Self> {
        self.register(RouteSpec::single(pattern, handler).hooks(hooks))
    }

    /// Adds a route at the router root.
    pub fn on_root(&mut self, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.register(RouteSpec::root(handler))
    }

    /// Adds a route at the router root with hooks.
    pub fn on_root_with(&mut self, handler: impl Into<Handler>, hooks: HookSet) -> Result<&mut Self> {
        self.register(RouteSpec::root(handler).hooks(hooks))
    }

    /// Adds every route of an ordered map.
    pub fn on_map(&mut self, map: RouteMap) -> Result<&mut Self> {
        self.register(RouteSpec::map(map))
    }

    /// Removes routes by pattern or by handler.
    ///
    /// Template patterns are rooted the same way as on registration.
    pub fn off(&mut self, filter: impl Into<RouteFilter>) -> &mut Self {
        let filter = match filter.into() {
            RouteFilter::Pattern(pattern) => RouteFilter::Pattern(with_root(&self.root, pattern)),
            handler @ RouteFilter::Handler(_) => handler,
        };
        let removed = self.registry.remove(&filter);
        debug!(removed, "routes removed");
        self
    }

    /// Sets the handler for unmatched locations.
    pub fn not_found(&mut self, handler: impl Into<Handler>, hooks: Option<HookSet>) -> &mut Self {
        self.not_found = Some(NotFound {
            handler: handler.into(),
            hooks,
        });
        self
    }

    /// Sets the hooks applied to every route and the not-found handler.
    ///
    /// A route hook of a given kind replaces the default of that kind.
    pub fn hooks(&mut self, hooks: HookSet) -> &mut Self {
        self.default_hooks = hooks;
        self
    }

    /// Returns the registered routes in order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.registry.iter()
    }

    /// Returns the route registry.
    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Returns the cleaned root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the last committed match.
    pub fn last_resolved(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    /// Matches a location against the routes without running anything.
    pub fn match_location(&self, location: &str) -> Option<Match> {
        self.registry.find_match(location)
    }

    /// Builds the match used for a location that no route claims.
    pub fn path_to_match(&self, location: &str) -> Match {
        synthetic_match(location)
    }

    /// Resolves the environment's current location.
    pub async fn resolve(&mut self) -> Resolution {
        let location = self.environment.current_location();
        self.run_resolution(location).await
    }

    /// Resolves the given location.
    pub async fn resolve_to(&mut self, location: &str) -> Resolution {
        self.run_resolution(location.to_string()).await
    }

    /// Resolves without awaiting.
    ///
    /// Routes whose hooks complete immediately resolve on the spot. If a hook
    /// is still pending, the resolution is dropped, nothing changes and
    /// `None` is returned.
    pub fn resolve_now(&mut self, location: Option<&str>) -> Option<Resolution> {
        let location = location.map_or_else(|| self.environment.current_location(), str::to_string);
        self.run_resolution(location).now_or_never()
    }

    async fn run_resolution(&mut self, location: String) -> Resolution {
        trace!(location = %location, "resolving");
        let candidate = self.registry.find_match(&location);
        let mut ctx = ResolveContext::new(
            location,
            candidate,
            self.current.clone(),
            self.default_hooks.clone(),
            self.not_found.clone(),
        );

        self.pipeline.run(&mut ctx).await;

        self.current = ctx.current().cloned();
        ctx.into_resolution()
    }

    /// Resolves `to` under the root and records it in the environment.
    ///
    /// Nothing is recorded when a hook aborts the transition.
    pub async fn navigate(&mut self, to: &str, options: &NavigateOptions) -> Resolution {
        let location = self.link(to);
        let resolution = self.run_resolution(location.clone()).await;
        if resolution.is_aborted() {
            debug!(location = %location, "navigation blocked");
        } else {
            self.environment.navigate(&location, options);
        }
        resolution
    }

    /// Joins the root and `path` into an absolute location.
    ///
    /// ```
    /// use oxide_navigator::{Router, RouterOptions};
    ///
    /// let router = Router::new(RouterOptions::new().root("/my/root"));
    /// assert_eq!(router.link("something/else"), "/my/root/something/else");
    /// ```
    pub fn link(&self, path: &str) -> String {
        let path = clean(path);
        match (self.root.is_empty(), path.is_empty()) {
            (true, _) => format!("/{path}"),
            (false, true) => format!("/{}", self.root),
            (false, false) => format!("/{}/{path}", self.root),
        }
    }

    /// Generates a location for a named route.
    ///
    /// # Errors
    ///
    /// [`RouterError::UnknownRouteName`] if no route has that name, or the
    /// pattern's own errors (missing value, regex route).
    pub fn generate(&self, name: &str, data: &HashMap<String, String>) -> Result<String> {
        let route = self
            .registry
            .find_by_name(name)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;
        route.compiled().generate(data)
    }

    /// Resolves once for every location change already reported by the
    /// environment, re-reading the current location each time.
    ///
    /// Changes queue up until drained here or by [`Router::listen`].
    ///
    /// Returns how many resolutions ran.
    pub async fn process_location_changes(&mut self) -> usize {
        let mut processed = 0;
        loop {
            let Some(changes) = self.changes.as_mut() else {
                break;
            };
            let Some(Some(change)) = changes.next().now_or_never() else {
                break;
            };
            trace!(location = %change.location, "location change");
            self.resolve().await;
            processed += 1;
        }
        processed
    }

    /// Resolves on every location change until the subscription ends.
    pub async fn listen(&mut self) {
        loop {
            let Some(changes) = self.changes.as_mut() else {
                break;
            };
            let Some(change) = changes.next().await else {
                break;
            };
            trace!(location = %change.location, "location change");
            self.resolve().await;
        }
    }

    /// Clears every route and stops listening to the environment.
    pub fn destroy(&mut self) {
        self.registry.clear();
        self.unsubscribe();
        self.destroyed = true;
        debug!("router destroyed");
    }

    /// Returns true once [`Router::destroy`] has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn unsubscribe(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.environment.unsubscribe(id);
        }
        self.changes = None;
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("root", &self.root)
            .field("routes", &self.registry.len())
            .field("current", &self.current)
            .field("default_hooks", &self.default_hooks)
            .field("listening", &self.subscription.is_some())
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
