//! Route definitions and the registration shapes accepted by the router.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::Result;
use crate::hooks::HookSet;
use crate::path::{clean, CompiledPattern, RoutePattern};
use crate::route_match::Match;

/// A route handler.
///
/// Cloning shares the underlying callback; [`Handler::ptr_eq`] tells clones
/// apart from other handlers, which is how routes are removed by handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&Match) + Send + Sync>);

impl Handler {
    /// Wraps a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Match) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the handler.
    pub fn call(&self, m: &Match) {
        (self.0)(m);
    }

    /// Returns true if both handlers share the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&Match) + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// A single route definition.
pub struct Route {
    name: String,
    compiled: CompiledPattern,
    handler: Handler,
    hooks: Option<HookSet>,
}

impl Route {
    /// Creates a new route named after its pattern.
    pub fn new(pattern: impl Into<RoutePattern>, handler: impl Into<Handler>) -> Result<Self> {
        let pattern = pattern.into();
        let compiled = CompiledPattern::compile(&pattern)?;
        Ok(Self {
            name: pattern.to_string(),
            compiled,
            handler: handler.into(),
            hooks: None,
        })
    }

    /// Sets the route name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the route hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: Option<HookSet>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Returns the route name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the pattern the route was registered with.
    pub fn pattern(&self) -> &RoutePattern {
        self.compiled.pattern()
    }

    /// Returns the route handler.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Returns the hooks attached to this route.
    pub fn hooks(&self) -> Option<&HookSet> {
        self.hooks.as_ref()
    }

    pub(crate) fn compiled(&self) -> &CompiledPattern {
        &self.compiled
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("pattern", &self.pattern().to_string())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

/// What a [`RouteMap`] entry points at.
#[derive(Debug, Clone)]
pub enum RouteTarget {
    /// A bare handler; the route is named after its pattern.
    Handler(Handler),
    /// A handler registered under an explicit name.
    Named {
        /// Overrides the computed route name.
        name: String,
        /// The route handler.
        uses: Handler,
        /// Hooks for this entry.
        hooks: Option<HookSet>,
    },
}

/// An ordered list of pattern → target entries.
///
/// # Example
///
/// ```
/// use oxide_navigator::{Match, RouteMap};
///
/// let map = RouteMap::new()
///     .route("/about", |_: &Match| {})
///     .named("/users/:id", "user", |_: &Match| {}, None);
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteMap {
    entries: Vec<(RoutePattern, RouteTarget)>,
}

impl RouteMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern → handler entry.
    #[must_use]
    pub fn route(mut self, pattern: impl Into<RoutePattern>, handler: impl Into<Handler>) -> Self {
        self.entries
            .push((pattern.into(), RouteTarget::Handler(handler.into())));
        self
    }

    /// Adds a pattern → named handler entry.
    #[must_use]
    pub fn named(
        mut self,
        pattern: impl Into<RoutePattern>,
        name: impl Into<String>,
        handler: impl Into<Handler>,
        hooks: Option<HookSet>,
    ) -> Self {
        self.entries.push((
            pattern.into(),
            RouteTarget::Named {
                name: name.into(),
                uses: handler.into(),
                hooks,
            },
        ));
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(RoutePattern, RouteTarget)> {
        self.entries.iter()
    }

    /// Prefixes every template pattern with `root`.
    #[must_use]
    pub fn with_root(self, root: &str) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(pattern, target)| (with_root(root, pattern), target))
                .collect(),
        }
    }

    /// Attaches `hooks` to every entry that carries none.
    #[must_use]
    pub fn with_hooks(self, hooks: Option<&HookSet>) -> Self {
        let Some(hooks) = hooks else {
            return self;
        };
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(pattern, target)| {
                    let target = match target {
                        RouteTarget::Handler(uses) => RouteTarget::Named {
                            name: pattern.to_string(),
                            uses,
                            hooks: Some(hooks.clone()),
                        },
                        RouteTarget::Named {
                            name,
                            uses,
                            hooks: None,
                        } => RouteTarget::Named {
                            name,
                            uses,
                            hooks: Some(hooks.clone()),
                        },
                        named @ RouteTarget::Named { .. } => named,
                    };
                    (pattern, target)
                })
                .collect(),
        }
    }

    /// Builds the routes in insertion order.
    pub fn into_routes(self) -> Result<Vec<Route>> {
        self.entries
            .into_iter()
            .map(|(pattern, target)| match target {
                RouteTarget::Handler(handler) => Route::new(pattern, handler),
                RouteTarget::Named { name, uses, hooks } => {
                    Ok(Route::new(pattern, uses)?.with_name(name).with_hooks(hooks))
                }
            })
            .collect()
    }
}

/// The registration shapes, normalized before they reach the registry.
#[derive(Debug, Clone)]
pub enum RouteSpec {
    /// A handler for the router root.
    Root {
        handler: Handler,
        hooks: Option<HookSet>,
    },
    /// A pattern and its handler.
    Single {
        pattern: RoutePattern,
        handler: Handler,
        hooks: Option<HookSet>,
    },
    /// Several routes at once; `hooks` apply to entries without their own.
    Map {
        map: RouteMap,
        hooks: Option<HookSet>,
    },
}

impl RouteSpec {
    /// Creates a root spec.
    pub fn root(handler: impl Into<Handler>) -> Self {
        Self::Root {
            handler: handler.into(),
            hooks: None,
        }
    }

    /// Creates a single-route spec.
    pub fn single(pattern: impl Into<RoutePattern>, handler: impl Into<Handler>) -> Self {
        Self::Single {
            pattern: pattern.into(),
            handler: handler.into(),
            hooks: None,
        }
    }

    /// Creates a map spec.
    pub fn map(map: RouteMap) -> Self {
        Self::Map { map, hooks: None }
    }

    /// Attaches trailing hooks.
    #[must_use]
    pub fn hooks(self, hooks: HookSet) -> Self {
        match self {
            Self::Root { handler, .. } => Self::Root {
                handler,
                hooks: Some(hooks),
            },
            Self::Single {
                pattern, handler, ..
            } => Self::Single {
                pattern,
                handler,
                hooks: Some(hooks),
            },
            Self::Map { map, .. } => Self::Map {
                map,
                hooks: Some(hooks),
            },
        }
    }

    /// Expands the spec into an ordered map rooted at `root`.
    pub fn into_map(self, root: &str) -> RouteMap {
        match self {
            Self::Root { handler, hooks } => {
                let pattern = RoutePattern::template(root);
                let name = pattern.to_string();
                RouteMap::new().named(pattern, name, handler, hooks)
            }
            Self::Single {
                pattern,
                handler,
                hooks,
            } => {
                let pattern = with_root(root, pattern);
                let name = pattern.to_string();
                RouteMap::new().named(pattern, name, handler, hooks)
            }
            Self::Map { map, hooks } => map.with_root(root).with_hooks(hooks.as_ref()),
        }
    }
}

/// Prefixes a template with the cleaned root; regexes are left untouched.
pub fn with_root(root: &str, pattern: RoutePattern) -> RoutePattern {
    match pattern {
        RoutePattern::Template(template) => {
            let root = clean(root);
            if root.is_empty() {
                RoutePattern::Template(template)
            } else if template.is_empty() {
                RoutePattern::template(root)
            } else {
                RoutePattern::Template(format!("{root}/{template}"))
            }
        }
        regex @ RoutePattern::Regex(_) => regex,
    }
}

/// Selects routes to remove.
#[derive(Debug, Clone)]
pub enum RouteFilter {
    /// Routes registered with an equal pattern.
    Pattern(RoutePattern),
    /// Routes sharing this handler.
    Handler(Handler),
}

impl RouteFilter {
    /// Returns true if the route is selected.
    pub fn matches(&self, route: &Route) -> bool {
        match self {
            Self::Pattern(pattern) => route.pattern() == pattern,
            Self::Handler(handler) => route.handler().ptr_eq(handler),
        }
    }
}

impl From<&str> for RouteFilter {
    fn from(s: &str) -> Self {
        Self::Pattern(RoutePattern::template(s))
    }
}

impl From<Regex> for RouteFilter {
    fn from(r: Regex) -> Self {
        Self::Pattern(RoutePattern::Regex(r))
    }
}

impl From<RoutePattern> for RouteFilter {
    fn from(p: RoutePattern) -> Self {
        Self::Pattern(p)
    }
}

impl From<Handler> for RouteFilter {
    fn from(h: Handler) -> Self {
        Self::Handler(h)
    }
}

impl From<&Handler> for RouteFilter {
    fn from(h: &Handler) -> Self {
        Self::Handler(h.clone())
    }
}
