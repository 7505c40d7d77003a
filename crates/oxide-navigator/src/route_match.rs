//! The result of matching a location against a route.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::query::QueryParams;
use crate::route::Route;

/// Values captured from the path.
///
/// Template routes produce named values; regex routes produce their capture
/// groups in order. Serializes as a JSON object or array respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MatchData {
    /// `:name` captures of a template.
    Named(HashMap<String, String>),
    /// Capture groups of a regex, in order.
    Positional(Vec<String>),
}

impl MatchData {
    /// Gets a named value.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            Self::Named(values) => values.get(name).map(String::as_str),
            Self::Positional(_) => None,
        }
    }

    /// Gets a positional value.
    pub fn get_index(&self, index: usize) -> Option<&str> {
        match self {
            Self::Named(_) => None,
            Self::Positional(values) => values.get(index).map(String::as_str),
        }
    }

    /// Parses a named value as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }
}

/// A location resolved against a route.
#[derive(Clone)]
pub struct Match {
    /// Cleaned path part of the location.
    pub url: String,
    /// Raw query string, without the leading `?`.
    pub query_string: String,
    /// The matched route; `None` for not-found matches.
    pub route: Option<Arc<Route>>,
    /// Captured path values; `None` when the pattern captures nothing.
    pub data: Option<MatchData>,
    /// Parsed query parameters; `None` when the query string is empty.
    pub params: Option<QueryParams>,
}

impl Match {
    /// Returns the name of the matched route.
    pub fn route_name(&self) -> Option<&str> {
        self.route.as_deref().map(Route::name)
    }

    /// Returns true if both matches point at the same route, url and query.
    pub fn same_location(&self, other: &Self) -> bool {
        let same_route = match (&self.route, &other.route) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_route && self.url == other.url && self.query_string == other.query_string
    }

    /// Gets a named path value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.get(name))
    }

    /// Gets the first query value for a key.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.params.as_ref().and_then(|p| p.get_str(key))
    }
}

impl fmt::Debug for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("url", &self.url)
            .field("query_string", &self.query_string)
            .field("route", &self.route_name())
            .field("data", &self.data)
            .field("params", &self.params)
            .finish()
    }
}
