//! Path pattern matching.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::query::{self, QueryParams};
use crate::route::Route;
use crate::route_match::{Match, MatchData};

/// Strips every leading and trailing `/`.
///
/// ```
/// use oxide_navigator::clean;
///
/// assert_eq!(clean("/foo/bar//"), "foo/bar");
/// assert_eq!(clean("/"), "");
/// ```
pub fn clean(s: &str) -> &str {
    s.trim_matches('/')
}

/// Splits a location into its path and raw query string at the first `?`.
pub fn split_location(location: &str) -> (&str, &str) {
    location.split_once('?').unwrap_or((location, ""))
}

/// What a route accepts: a path template or a precompiled regex.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Template with `:name` captures and `*` wildcards, stored cleaned.
    Template(String),
    /// Regex tested as-is against the cleaned path.
    Regex(Regex),
}

impl RoutePattern {
    /// Creates a template pattern, stripping leading and trailing `/`.
    pub fn template(pattern: &str) -> Self {
        Self::Template(clean(pattern).to_string())
    }

    /// Returns the template text or the regex source.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Template(s) => s,
            Self::Regex(r) => r.as_str(),
        }
    }

    /// Returns true for regex patterns.
    pub fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.is_regex() == other.is_regex() && self.as_str() == other.as_str()
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(s) => f.write_str(s),
            Self::Regex(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(s: &str) -> Self {
        Self::template(s)
    }
}

impl From<String> for RoutePattern {
    fn from(s: String) -> Self {
        Self::template(&s)
    }
}

impl From<Regex> for RoutePattern {
    fn from(r: Regex) -> Self {
        Self::Regex(r)
    }
}

/// A piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text, matched verbatim.
    Literal(String),
    /// `:name`, one or more non-`/` characters.
    Param(String),
    /// `*`, anything including `/`.
    Wildcard,
}

/// A route pattern compiled into an anchored matcher.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pattern: RoutePattern,
    segments: Vec<Segment>,
    regex: Regex,
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Compiles a pattern.
    ///
    /// Template syntax:
    /// - `users` - Literal path
    /// - `users/:id` - Named capture of one path segment
    /// - `files/*` - Wildcard matching the rest of the path
    ///
    /// A trailing `/` on the tested path is always accepted.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_navigator::{CompiledPattern, RoutePattern};
    ///
    /// let pattern = CompiledPattern::compile(&RoutePattern::template("/posts/:id")).unwrap();
    /// assert!(pattern.is_match("posts/42"));
    /// assert!(pattern.is_match("posts/42/"));
    /// assert!(!pattern.is_match("posts/42/comments"));
    /// ```
    pub fn compile(pattern: &RoutePattern) -> Result<Self> {
        let template = match pattern {
            RoutePattern::Regex(regex) => {
                return Ok(Self {
                    pattern: pattern.clone(),
                    segments: Vec::new(),
                    regex: regex.clone(),
                    param_names: Vec::new(),
                });
            }
            RoutePattern::Template(template) => template,
        };

        let segments = parse_template(template);
        let mut param_names = Vec::new();
        let mut regex_str = String::from("^");

        for segment in &segments {
            match segment {
                Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
                Segment::Param(name) => {
                    param_names.push(name.clone());
                    regex_str.push_str("([^/]+)");
                }
                Segment::Wildcard => regex_str.push_str("(?:.*)"),
            }
        }

        regex_str.push_str("(?:/$|$)");

        let regex =
            Regex::new(&regex_str).map_err(|e| RouterError::InvalidPattern(e.to_string()))?;

        Ok(Self {
            pattern: pattern.clone(),
            segments,
            regex,
            param_names,
        })
    }

    /// Returns the source pattern.
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    /// Returns the capture names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns true if the cleaned path matches.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Tests a cleaned path.
    ///
    /// The outer `Option` is the match result; the inner one is the
    /// decoded capture data, absent when the pattern captures nothing.
    pub(crate) fn match_path(&self, path: &str) -> Option<Option<MatchData>> {
        let caps = self.regex.captures(path)?;

        if self.pattern.is_regex() {
            if caps.len() <= 1 {
                return Some(None);
            }
            let values = caps
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| query::decode(m.as_str())))
                .collect();
            return Some(Some(MatchData::Positional(values)));
        }

        if self.param_names.is_empty() {
            return Some(None);
        }

        let mut named = HashMap::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = caps.get(i + 1) {
                named.insert(name.clone(), query::decode(value.as_str()));
            }
        }

        Some(Some(MatchData::Named(named)))
    }

    /// Builds a location from the template, substituting every `:name`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use oxide_navigator::{CompiledPattern, RoutePattern};
    ///
    /// let pattern = CompiledPattern::compile(&RoutePattern::template("/foo/:id/:action")).unwrap();
    /// let data: HashMap<String, String> = [("id", "xxx"), ("action", "save")]
    ///     .into_iter()
    ///     .map(|(k, v)| (k.to_string(), v.to_string()))
    ///     .collect();
    /// assert_eq!(pattern.generate(&data).unwrap(), "/foo/xxx/save");
    /// ```
    pub fn generate(&self, data: &HashMap<String, String>) -> Result<String> {
        if self.pattern.is_regex() {
            return Err(RouterError::NotGeneratable(self.pattern.to_string()));
        }

        let mut path = String::from("/");

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => path.push_str(s),
                Segment::Param(name) => {
                    let value = data.get(name).ok_or_else(|| RouterError::MissingParameter {
                        route: self.pattern.to_string(),
                        param: name.clone(),
                    })?;
                    path.push_str(value);
                }
                Segment::Wildcard => path.push('*'),
            }
        }

        Ok(path)
    }
}

/// Splits a cleaned template into literal, named and wildcard segments.
///
/// `:name` and `*name` both capture one segment; a bare `*` matches the rest
/// of the path.
fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != ':' && c != '*' {
            literal.push(c);
            continue;
        }

        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if !is_word_char(next) {
                break;
            }
            name.push(next);
            chars.next();
        }

        let segment = match (c, name.is_empty()) {
            (':', true) => {
                literal.push(':');
                continue;
            }
            ('*', true) => Segment::Wildcard,
            _ => Segment::Param(name),
        };
        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(segment);
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tests a raw location against a route.
///
/// The location is split at the first `?`; the path part is cleaned before
/// matching and the query part is parsed into [`QueryParams`].
pub fn match_route(location: &str, route: &Arc<Route>) -> Option<Match> {
    let (path, query_string) = split_location(location);
    let url = clean(path);
    let data = route.compiled().match_path(url)?;

    Some(Match {
        url: url.to_string(),
        query_string: query_string.to_string(),
        route: Some(Arc::clone(route)),
        data,
        params: QueryParams::parse(query_string),
    })
}
