//! Pluggable authentication policies.
//!
//! The SSH handler turns every authentication attempt into [`Credentials`]
//! and asks the configured [`AuthPolicy`]. Session logic never sees any of
//! this.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use ttygate_config::schema::{AuthConfig, AuthMode};

/// One authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials<'a> {
    None { user: &'a str },
    Password { user: &'a str, password: &'a str },
    PublicKey { user: &'a str, fingerprint: &'a str },
}

impl<'a> Credentials<'a> {
    pub fn user(&self) -> &'a str {
        match self {
            Credentials::None { user }
            | Credentials::Password { user, .. }
            | Credentials::PublicKey { user, .. } => *user,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Credentials::None { .. } => "none",
            Credentials::Password { .. } => "password",
            Credentials::PublicKey { .. } => "publickey",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Accept,
    Reject,
}

/// Decides whether a connection may proceed.
pub trait AuthPolicy: Send + Sync {
    fn check(&self, credentials: &Credentials<'_>) -> AuthDecision;

    /// Whether the `none` method should be offered at all.
    fn allows_anonymous(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// Accepts everyone. For public demo deployments only.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl AuthPolicy for AcceptAll {
    fn check(&self, _credentials: &Credentials<'_>) -> AuthDecision {
        AuthDecision::Accept
    }

    fn allows_anonymous(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "accept_all"
    }
}

/// Checks passwords against SHA-256 digests and keys against fingerprints.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    passwords: BTreeMap<String, String>,
    authorized_keys: HashSet<String>,
}

impl StaticCredentials {
    pub fn new<I, S>(passwords: BTreeMap<String, String>, authorized_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            passwords: passwords
                .into_iter()
                .map(|(user, digest)| (user, digest.to_ascii_lowercase()))
                .collect(),
            authorized_keys: authorized_keys
                .into_iter()
                .map(|k| normalize_fingerprint(k.as_ref()).to_string())
                .collect(),
        }
    }
}

impl AuthPolicy for StaticCredentials {
    fn check(&self, credentials: &Credentials<'_>) -> AuthDecision {
        let ok = match credentials {
            Credentials::None { .. } => false,
            Credentials::Password { user, password } => self
                .passwords
                .get(*user)
                .is_some_and(|expected| *expected == sha256_hex(password)),
            Credentials::PublicKey { fingerprint, .. } => self
                .authorized_keys
                .contains(normalize_fingerprint(fingerprint)),
        };
        if ok {
            AuthDecision::Accept
        } else {
            AuthDecision::Reject
        }
    }

    fn name(&self) -> &'static str {
        "credentials"
    }
}

/// Build the policy selected by `auth.mode`.
pub fn policy_from_config(config: &AuthConfig) -> Arc<dyn AuthPolicy> {
    match config.mode {
        AuthMode::AcceptAll => Arc::new(AcceptAll),
        AuthMode::Credentials => Arc::new(StaticCredentials::new(
            config.passwords.clone(),
            &config.authorized_keys,
        )),
    }
}

fn sha256_hex(input: &str) -> String {
    Sha256::digest(input.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn normalize_fingerprint(fingerprint: &str) -> &str {
    let trimmed = fingerprint.trim();
    trimmed.strip_prefix("SHA256:").unwrap_or(trimmed)
}
