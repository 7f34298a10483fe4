use std::fmt::{self, Debug};

use crate::utils::Redact;

/// Credential for a NetStorage storage group.
///
/// Immutable for the life of a client instance; concurrent calls share it
/// by reference.
#[derive(Clone)]
pub struct Credential {
    /// NetStorage host name, e.g. `example-nsu.akamaihd.net`.
    pub host: String,
    /// Upload account username.
    pub username: String,
    /// Shared secret key. Treated as UTF-8 text when used as HMAC key.
    pub key: String,
    /// Whether to talk to the host over https.
    pub use_ssl: bool,
}

impl Credential {
    /// Create a new credential. TLS is off by default, matching the
    /// NetStorage HTTP API default.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            key: key.into(),
            use_ssl: false,
        }
    }

    /// Enable https for all requests.
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self
    }

    /// A credential can only sign requests when it carries a secret key.
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.key.is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("key", &Redact::from(&self.key))
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}
