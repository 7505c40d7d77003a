//! Ordered route storage.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::path::match_route;
use crate::route::{Route, RouteFilter, RouteMap};
use crate::route_match::Match;

/// Registered routes in insertion order.
#[derive(Debug, Default, Clone)]
pub struct RouteRegistry {
    routes: Vec<Arc<Route>>,
}

impl RouteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route.
    pub fn register(&mut self, route: Route) -> Arc<Route> {
        let route = Arc::new(route);
        debug!(name = route.name(), pattern = %route.pattern(), "route registered");
        self.routes.push(Arc::clone(&route));
        route
    }

    /// Appends every entry of `map`, in map order.
    ///
    /// Nothing is registered if any pattern fails to compile.
    pub fn register_batch(&mut self, map: RouteMap) -> Result<usize> {
        let routes = map.into_routes()?;
        let count = routes.len();
        for route in routes {
            self.register(route);
        }
        Ok(count)
    }

    /// Removes every route selected by `filter`, returning how many went.
    pub fn remove(&mut self, filter: &RouteFilter) -> usize {
        let before = self.routes.len();
        self.routes.retain(|route| !filter.matches(route));
        before - self.routes.len()
    }

    /// Removes every route.
    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// Finds the first route with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|route| route.name() == name)
    }

    /// Matches `location` against each route in order, stopping at the first hit.
    pub fn find_match(&self, location: &str) -> Option<Match> {
        self.routes
            .iter()
            .find_map(|route| match_route(location, route))
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Handler;
    use regex::Regex;

    fn noop(_: &Match) {}

    fn route(pattern: &str) -> Route {
        Route::new(pattern, noop).unwrap()
    }

    #[test]
    fn test_first_registered_match_wins() {
        let mut registry = RouteRegistry::new();
        registry.register(route("foo/:id"));
        registry.register(route("foo/xxx-yyy-zzz"));

        let m = registry.find_match("/foo/xxx-yyy-zzz").unwrap();
        assert_eq!(m.route_name(), Some("foo/:id"));
        assert_eq!(m.param("id"), Some("xxx-yyy-zzz"));
    }

    #[test]
    fn test_no_match() {
        let mut registry = RouteRegistry::new();
        registry.register(route("foo"));
        assert!(registry.find_match("/nope").is_none());
    }

    #[test]
    fn test_register_batch_preserves_order() {
        let mut registry = RouteRegistry::new();
        let map = RouteMap::new()
            .route("b", noop)
            .named("a", "first a", noop, None);
        assert_eq!(registry.register_batch(map).unwrap(), 2);

        let names: Vec<_> = registry.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(names, ["b", "first a"]);
        assert!(registry.find_by_name("first a").is_some());
        assert!(registry.find_by_name("a").is_none());
    }

    #[test]
    fn test_remove_by_pattern_and_handler() {
        let mut registry = RouteRegistry::new();
        let h = Handler::new(noop);
        registry.register(route("/foo"));
        registry.register(Route::new("/bar", h.clone()).unwrap());
        registry.register(Route::new("/baz", h.clone()).unwrap());
        assert_eq!(registry.len(), 3);

        assert_eq!(registry.remove(&"foo".into()), 1);
        assert_eq!(registry.remove(&RouteFilter::from(&h)), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_regex_routes() {
        let mut registry = RouteRegistry::new();
        let h = Handler::new(noop);
        registry.register(Route::new(Regex::new("foo").unwrap(), noop).unwrap());
        registry.register(Route::new(Regex::new("bar").unwrap(), h.clone()).unwrap());

        registry.remove(&Regex::new("foo").unwrap().into());
        registry.remove(&h.into());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut registry = RouteRegistry::new();
        registry.register(route("a"));
        registry.register(route("b"));
        registry.clear();
        assert_eq!(registry.len(), 0);
    }
}
