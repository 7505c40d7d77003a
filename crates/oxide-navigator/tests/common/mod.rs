#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use futures::future::{self, Ready};
use oxide_navigator::{Flow, Match, MemoryHistory, Router, RouterOptions};
use serde_json::Value;

/// Records handler and hook invocations in call order.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<(String, Match)>>>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler or notification hook recording under `tag`.
    pub fn record(&self, tag: &str) -> impl Fn(&Match) + Send + Sync + 'static {
        let calls = self.clone();
        let tag = tag.to_string();
        move |m: &Match| calls.push(&tag, m.clone())
    }

    /// A guard hook recording under `tag` and resolving to `flow`.
    pub fn guard(&self, tag: &str, flow: Flow) -> impl Fn(Match) -> Ready<Flow> + Send + Sync + 'static {
        let calls = self.clone();
        let tag = tag.to_string();
        move |m: Match| {
            calls.push(&tag, m);
            future::ready(flow)
        }
    }

    fn push(&self, tag: &str, m: Match) {
        self.0.lock().unwrap().push((tag.to_string(), m));
    }

    pub fn tags(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|(t, _)| t == tag).count()
    }

    pub fn matches(&self, tag: &str) -> Vec<Match> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn last(&self, tag: &str) -> Match {
        self.matches(tag)
            .pop()
            .unwrap_or_else(|| panic!("`{tag}` was never called"))
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap().is_empty()
    }
}

pub fn router() -> Router {
    Router::new(RouterOptions::new().root("/"))
}

pub fn router_with_history(initial: &str) -> (Router, MemoryHistory) {
    let history = MemoryHistory::new(initial);
    let router = Router::with_environment(RouterOptions::new().root("/"), history.clone());
    (router, history)
}

pub fn data(m: &Match) -> Value {
    serde_json::to_value(&m.data).unwrap()
}

pub fn params(m: &Match) -> Value {
    serde_json::to_value(&m.params).unwrap()
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let buffer = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || buffer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
