//! Lifecycle hooks run around route handlers.
//!
//! `before` and `leave` guard a transition: they resolve to a [`Flow`] and
//! may hold the resolution pending for as long as they need. Returning
//! [`Flow::Abort`] cancels the transition. `after` and `already` are
//! notifications and cannot stop anything.
//!
//! # Example
//!
//! ```
//! use oxide_navigator::{Flow, HookSet, Match};
//!
//! let hooks = HookSet::new()
//!     .before(|m: Match| async move {
//!         if m.query("token").is_some() {
//!             Flow::Continue
//!         } else {
//!             Flow::Abort
//!         }
//!     })
//!     .after(|m: &Match| println!("entered {}", m.url));
//! assert!(hooks.has_before());
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::pipeline::{BoxFuture, Flow};
use crate::route_match::Match;

/// A hook that can hold or cancel a transition.
pub type GuardHook = Arc<dyn Fn(Match) -> BoxFuture<'static, Flow> + Send + Sync>;

/// A fire-and-forget hook.
pub type NotifyHook = Arc<dyn Fn(&Match) + Send + Sync>;

/// The optional hooks attached to a route, a not-found handler, or a router.
#[derive(Clone, Default)]
pub struct HookSet {
    /// Runs before the handler of the route being entered.
    pub before: Option<GuardHook>,
    /// Runs after the handler.
    pub after: Option<NotifyHook>,
    /// Runs on the current route when another location is entered.
    pub leave: Option<GuardHook>,
    /// Runs when the current location is resolved again.
    pub already: Option<NotifyHook>,
}

impl HookSet {
    /// Creates an empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `before` hook.
    #[must_use]
    pub fn before<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Match) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Flow> + Send + 'static,
    {
        self.before = Some(guard_hook(hook));
        self
    }

    /// Sets the `after` hook.
    #[must_use]
    pub fn after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Match) + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Sets the `leave` hook.
    #[must_use]
    pub fn leave<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Match) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Flow> + Send + 'static,
    {
        self.leave = Some(guard_hook(hook));
        self
    }

    /// Sets the `already` hook.
    #[must_use]
    pub fn already<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Match) + Send + Sync + 'static,
    {
        self.already = Some(Arc::new(hook));
        self
    }

    /// Returns true if a `before` hook is set.
    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }

    /// Returns true if no hook is set.
    pub fn is_empty(&self) -> bool {
        self.before.is_none()
            && self.after.is_none()
            && self.leave.is_none()
            && self.already.is_none()
    }

    /// Fills every missing kind from `defaults`.
    ///
    /// A hook present here replaces the default of the same kind entirely.
    #[must_use]
    pub fn or_defaults(&self, defaults: &Self) -> Self {
        Self {
            before: self.before.clone().or_else(|| defaults.before.clone()),
            after: self.after.clone().or_else(|| defaults.after.clone()),
            leave: self.leave.clone().or_else(|| defaults.leave.clone()),
            already: self.already.clone().or_else(|| defaults.already.clone()),
        }
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("leave", &self.leave.is_some())
            .field("already", &self.already.is_some())
            .finish()
    }
}

fn guard_hook<F, Fut>(hook: F) -> GuardHook
where
    F: Fn(Match) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Flow> + Send + 'static,
{
    Arc::new(move |m: Match| -> BoxFuture<'static, Flow> { Box::pin(hook(m)) })
}

/// Runs an optional guard hook; a missing hook always continues.
pub(crate) async fn guard(hook: Option<&GuardHook>, m: &Match) -> Flow {
    match hook {
        Some(hook) => hook(m.clone()).await,
        None => Flow::Continue,
    }
}

/// Runs an optional notification hook.
pub(crate) fn notify(hook: Option<&NotifyHook>, m: &Match) {
    if let Some(hook) = hook {
        hook(m);
    }
}
