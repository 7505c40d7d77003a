//! Sequential, abortable step execution.
//!
//! A [`Pipeline`] runs its steps one after another against a shared
//! context. Every step resolves to a [`Flow`]; the first
//! [`Flow::Abort`] stops the run and is reported to the caller. A step
//! whose future is pending suspends the whole pipeline, so steps never
//! overlap.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::trace;

/// A boxed future for async hook and step operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a step or hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Go on with the next step.
    Continue,
    /// Stop the pipeline.
    Abort,
}

impl Flow {
    /// Returns true for [`Flow::Abort`].
    pub fn is_abort(self) -> bool {
        self == Self::Abort
    }
}

impl From<bool> for Flow {
    fn from(proceed: bool) -> Self {
        if proceed {
            Self::Continue
        } else {
            Self::Abort
        }
    }
}

type ActionFn<C> = dyn for<'a> Fn(&'a mut C) -> BoxFuture<'a, Flow> + Send + Sync;
type PredicateFn<C> = dyn Fn(&C) -> bool + Send + Sync;

/// A single pipeline step.
pub enum Step<C> {
    /// Runs a callback against the context.
    Action(Arc<ActionFn<C>>),
    /// Picks one of two step lists when reached.
    Branch {
        predicate: Arc<PredicateFn<C>>,
        then: Vec<Step<C>>,
        otherwise: Vec<Step<C>>,
    },
}

impl<C> Clone for Step<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Action(action) => Self::Action(Arc::clone(action)),
            Self::Branch {
                predicate,
                then,
                otherwise,
            } => Self::Branch {
                predicate: Arc::clone(predicate),
                then: then.clone(),
                otherwise: otherwise.clone(),
            },
        }
    }
}

impl<C: Send> Step<C> {
    /// Creates an async step.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_navigator::{Flow, Step};
    ///
    /// let step = Step::<Vec<u8>>::action(|ctx| {
    ///     Box::pin(async move {
    ///         ctx.push(1);
    ///         Flow::Continue
    ///     })
    /// });
    /// # drop(step);
    /// ```
    pub fn action<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut C) -> BoxFuture<'a, Flow> + Send + Sync + 'static,
    {
        Self::Action(Arc::new(f))
    }

    /// Creates a step that completes immediately.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&mut C) -> Flow + Send + Sync + 'static,
    {
        Self::action(move |ctx| {
            let flow = f(ctx);
            Box::pin(std::future::ready(flow))
        })
    }

    /// Creates a conditional step.
    ///
    /// The predicate is evaluated once, when the step is reached, and the
    /// selected list runs in place of this step.
    pub fn branch<P>(predicate: P, then: Vec<Self>, otherwise: Vec<Self>) -> Self
    where
        P: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self::Branch {
            predicate: Arc::new(predicate),
            then,
            otherwise,
        }
    }
}

/// An ordered list of steps.
pub struct Pipeline<C> {
    steps: Vec<Step<C>>,
}

impl<C> Clone for Pipeline<C> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
        }
    }
}

impl<C: Send> Default for Pipeline<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send> Pipeline<C> {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Creates a pipeline from a list of steps.
    pub fn from_steps(steps: Vec<Step<C>>) -> Self {
        Self { steps }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: Step<C>) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the number of top-level steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs every step in order, stopping at the first abort.
    pub async fn run(&self, ctx: &mut C) -> Flow {
        run_steps(&self.steps, ctx).await
    }
}

fn run_steps<'a, C: Send>(steps: &'a [Step<C>], ctx: &'a mut C) -> BoxFuture<'a, Flow> {
    Box::pin(async move {
        for (index, step) in steps.iter().enumerate() {
            let flow = match step {
                Step::Action(action) => action(&mut *ctx).await,
                Step::Branch {
                    predicate,
                    then,
                    otherwise,
                } => {
                    let taken = predicate(&*ctx);
                    trace!(step = index, taken, "pipeline branch");
                    run_steps(if taken { then } else { otherwise }, &mut *ctx).await
                }
            };

            if flow.is_abort() {
                trace!(step = index, "pipeline aborted");
                return Flow::Abort;
            }
        }

        Flow::Continue
    })
}
