//! Resolution of a location into a transition.
//!
//! Every resolution runs the same [`Pipeline`]:
//!
//! ```text
//! matched?
//! ├─ yes ─ same route, url and query as current?
//! │        ├─ yes ─ handler, after, already                  → Repeat
//! │        └─ no ── leave (current), before (new), commit    → Committed | Aborted
//! └─ no ── not-found handler?
//!          ├─ yes ─ before, handler, after                   → NotFound | Aborted
//!          └─ no ── warn                                     → Unmatched
//! ```

use tracing::{debug, warn};

use crate::hooks::{self, HookSet};
use crate::path::{clean, split_location};
use crate::pipeline::{BoxFuture, Flow, Pipeline, Step};
use crate::query::QueryParams;
use crate::route::{Handler, Route};
use crate::route_match::Match;

/// The hook that stopped a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortStage {
    /// The `leave` hook of the current route.
    Leave,
    /// The `before` hook of the route being entered.
    Before,
}

/// How a resolution ended.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A new match became current; its handler and `after` hook ran.
    Committed(Match),
    /// The location equals the current one; the handler ran again but
    /// nothing changed.
    Repeat(Match),
    /// A hook aborted; nothing changed and the new handler did not run.
    Aborted(AbortStage),
    /// No route matched and the not-found handler ran.
    NotFound(Match),
    /// No route matched and there is no not-found handler.
    Unmatched,
}

impl Resolution {
    /// Returns true for [`Resolution::Committed`] and [`Resolution::NotFound`].
    pub fn transitioned(&self) -> bool {
        matches!(self, Self::Committed(_) | Self::NotFound(_))
    }

    /// Returns the committed match, if any.
    pub fn committed(&self) -> Option<&Match> {
        match self {
            Self::Committed(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the match the handler was invoked with, if any.
    pub fn handled(&self) -> Option<&Match> {
        match self {
            Self::Committed(m) | Self::Repeat(m) | Self::NotFound(m) => Some(m),
            Self::Aborted(_) | Self::Unmatched => None,
        }
    }

    /// Returns true if a hook aborted the resolution.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// The handler used when no route matches.
#[derive(Debug, Clone)]
pub struct NotFound {
    /// Invoked with the synthetic match.
    pub handler: Handler,
    /// Hooks for the not-found path.
    pub hooks: Option<HookSet>,
}

/// Builds a match for a location that no route claims.
pub fn synthetic_match(location: &str) -> Match {
    let (path, query_string) = split_location(location);
    Match {
        url: clean(path).to_string(),
        query_string: query_string.to_string(),
        route: None,
        data: None,
        params: QueryParams::parse(query_string),
    }
}

/// State shared by the steps of one resolution.
pub(crate) struct ResolveContext {
    location: String,
    candidate: Option<Match>,
    current: Option<Match>,
    defaults: HookSet,
    not_found: Option<NotFound>,
    outcome: Option<Resolution>,
}

impl ResolveContext {
    pub(crate) fn new(
        location: String,
        candidate: Option<Match>,
        current: Option<Match>,
        defaults: HookSet,
        not_found: Option<NotFound>,
    ) -> Self {
        Self {
            location,
            candidate,
            current,
            defaults,
            not_found,
            outcome: None,
        }
    }

    /// Returns the current match after the run.
    pub(crate) fn current(&self) -> Option<&Match> {
        self.current.as_ref()
    }

    pub(crate) fn into_resolution(self) -> Resolution {
        self.outcome.unwrap_or(Resolution::Unmatched)
    }

    fn hooks_for(&self, own: Option<&HookSet>) -> HookSet {
        own.map_or_else(|| self.defaults.clone(), |h| h.or_defaults(&self.defaults))
    }

    fn route_hooks(&self, route: Option<&Route>) -> HookSet {
        self.hooks_for(route.and_then(Route::hooks))
    }

    fn is_repeat(&self) -> bool {
        match (&self.current, &self.candidate) {
            (Some(current), Some(candidate)) => current.same_location(candidate),
            _ => false,
        }
    }
}

/// Builds the pipeline every resolution runs through.
pub(crate) fn resolution_pipeline() -> Pipeline<ResolveContext> {
    Pipeline::from_steps(vec![Step::branch(
        |ctx: &ResolveContext| ctx.candidate.is_some(),
        vec![Step::branch(
            ResolveContext::is_repeat,
            vec![Step::sync(repeat)],
            vec![
                Step::action(leave_current),
                Step::action(before_candidate),
                Step::sync(commit),
            ],
        )],
        vec![Step::branch(
            |ctx: &ResolveContext| ctx.not_found.is_some(),
            vec![Step::action(before_not_found), Step::sync(not_found)],
            vec![Step::sync(unmatched)],
        )],
    )])
}

fn repeat(ctx: &mut ResolveContext) -> Flow {
    let Some(m) = ctx.candidate.take() else {
        return Flow::Continue;
    };
    let hooks = ctx.route_hooks(m.route.as_deref());

    debug!(url = %m.url, route = m.route_name(), "location already current");
    if let Some(route) = &m.route {
        route.handler().call(&m);
    }
    hooks::notify(hooks.after.as_ref(), &m);
    hooks::notify(hooks.already.as_ref(), &m);

    ctx.outcome = Some(Resolution::Repeat(m));
    Flow::Continue
}

fn leave_current(ctx: &mut ResolveContext) -> BoxFuture<'_, Flow> {
    Box::pin(async move {
        let Some(current) = ctx.current.as_ref() else {
            return Flow::Continue;
        };
        let hooks = ctx.route_hooks(current.route.as_deref());

        let flow = hooks::guard(hooks.leave.as_ref(), current).await;
        if flow.is_abort() {
            debug!(location = %ctx.location, "leave hook aborted the transition");
            ctx.outcome = Some(Resolution::Aborted(AbortStage::Leave));
        }
        flow
    })
}

fn before_candidate(ctx: &mut ResolveContext) -> BoxFuture<'_, Flow> {
    Box::pin(async move {
        let Some(candidate) = ctx.candidate.as_ref() else {
            return Flow::Continue;
        };
        let hooks = ctx.route_hooks(candidate.route.as_deref());

        let flow = hooks::guard(hooks.before.as_ref(), candidate).await;
        if flow.is_abort() {
            debug!(location = %ctx.location, "before hook aborted the transition");
            ctx.outcome = Some(Resolution::Aborted(AbortStage::Before));
        }
        flow
    })
}

fn commit(ctx: &mut ResolveContext) -> Flow {
    let Some(m) = ctx.candidate.take() else {
        return Flow::Continue;
    };
    let hooks = ctx.route_hooks(m.route.as_deref());

    debug!(url = %m.url, route = m.route_name(), "transition committed");
    ctx.current = Some(m.clone());
    if let Some(route) = &m.route {
        route.handler().call(&m);
    }
    hooks::notify(hooks.after.as_ref(), &m);

    ctx.outcome = Some(Resolution::Committed(m));
    Flow::Continue
}

fn before_not_found(ctx: &mut ResolveContext) -> BoxFuture<'_, Flow> {
    Box::pin(async move {
        let hooks = ctx.hooks_for(ctx.not_found.as_ref().and_then(|nf| nf.hooks.as_ref()));
        let m = synthetic_match(&ctx.location);

        let flow = hooks::guard(hooks.before.as_ref(), &m).await;
        if flow.is_abort() {
            debug!(location = %ctx.location, "before hook aborted the not-found handler");
            ctx.outcome = Some(Resolution::Aborted(AbortStage::Before));
        }
        flow
    })
}

fn not_found(ctx: &mut ResolveContext) -> Flow {
    let Some(not_found) = ctx.not_found.as_ref() else {
        return Flow::Continue;
    };
    let hooks = ctx.hooks_for(not_found.hooks.as_ref());
    let m = synthetic_match(&ctx.location);

    debug!(location = %ctx.location, "no route matched, using not-found handler");
    not_found.handler.call(&m);
    hooks::notify(hooks.after.as_ref(), &m);

    ctx.outcome = Some(Resolution::NotFound(m));
    Flow::Continue
}

fn unmatched(ctx: &mut ResolveContext) -> Flow {
    warn!(
        location = %ctx.location,
        "\"{}\" didn't match any of the registered routes",
        ctx.location
    );
    ctx.outcome = Some(Resolution::Unmatched);
    Flow::Continue
}
