//! Router configuration.

use serde::Deserialize;

/// Configuration for a [`crate::Router`].
///
/// Can be built in code or deserialized, e.g. from JSON:
///
/// ```
/// use oxide_navigator::RouterOptions;
///
/// let options: RouterOptions = serde_json::from_str(r#"{"root": "/app"}"#).unwrap();
/// assert_eq!(options.root.as_deref(), Some("/app"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Prefix for every template route and for [`crate::Router::link`].
    ///
    /// When unset the router warns and falls back to `/`.
    pub root: Option<String>,
    /// Subscribe to environment location changes at construction.
    ///
    /// Changes queue up until the router drains them with
    /// [`crate::Router::listen`] or [`crate::Router::process_location_changes`].
    /// Turn this off for a router that is never driven.
    pub listen: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterOptions {
    /// Creates options with no root and listening enabled.
    pub fn new() -> Self {
        Self {
            root: None,
            listen: true,
        }
    }

    /// Sets the root path.
    #[must_use]
    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Enables or disables the location-change subscription.
    ///
    /// A subscribed router must drain its changes; see the `listen` field.
    #[must_use]
    pub fn listen(mut self, listen: bool) -> Self {
        self.listen = listen;
        self
    }
}
