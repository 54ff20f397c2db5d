//! Endpoint parsing.

/// An engine endpoint normalised to the URI `Bollard` expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Endpoint {
    /// `unix://` socket or `npipe://` named pipe.
    Local(String),
    /// `http://` or `https://` endpoint; `tcp://` is rewritten to `http://`.
    Remote(String),
}

impl Endpoint {
    /// Parse a configured endpoint.
    ///
    /// A bare path becomes a named pipe when it starts with `//` or `\\`, and
    /// a Unix socket otherwise. Detection is syntactic, not per-platform.
    pub(super) fn parse(raw: &str) -> Self {
        if raw.starts_with("unix://") || raw.starts_with("npipe://") {
            return Self::Local(raw.to_owned());
        }
        if let Some(authority) = raw.strip_prefix("tcp://") {
            return Self::Remote(format!("http://{authority}"));
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Self::Remote(raw.to_owned());
        }
        if raw.starts_with("//") || raw.starts_with("\\\\") {
            Self::Local(format!("npipe://{raw}"))
        } else {
            Self::Local(format!("unix://{raw}"))
        }
    }

    /// Returns the normalised URI.
    pub(super) fn uri(&self) -> &str {
        match self {
            Self::Local(uri) | Self::Remote(uri) => uri,
        }
    }
}
