//! Session environment construction.
//!
//! A spawned session is visible to a remote, possibly unauthenticated user,
//! so its environment is built from scratch: only allow-listed host
//! variables are copied, then deployment-fixed values are applied on top.

use std::collections::BTreeMap;
use std::ffi::OsString;

/// Colour capability flags forced on every session.
pub const COLOR_OVERRIDES: &[(&str, &str)] = &[("COLORTERM", "truecolor"), ("FORCE_COLOR", "3")];

/// Which host variables may be inherited, plus fixed values to inject.
#[derive(Debug, Clone, Default)]
pub struct EnvPolicy {
    allow: Vec<String>,
    overrides: BTreeMap<String, String>,
}

impl EnvPolicy {
    pub fn new(allow: Vec<String>, overrides: BTreeMap<String, String>) -> Self {
        Self { allow, overrides }
    }

    /// Build a snapshot from the current process environment.
    ///
    /// Variables whose names or values are not valid UTF-8 are skipped.
    pub fn snapshot(&self, term: &str) -> EnvSnapshot {
        let host = std::env::vars_os().filter_map(|(k, v): (OsString, OsString)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        });
        self.snapshot_from(host, term)
    }

    /// Build a snapshot from an explicit host environment.
    pub fn snapshot_from<I, K, V>(&self, host: I, term: &str) -> EnvSnapshot
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = BTreeMap::new();

        for (key, value) in host {
            let key = key.into();
            if !self.allow.iter().any(|allowed| *allowed == key) {
                continue;
            }
            let value = value.into();
            if value.is_empty() {
                continue;
            }
            vars.insert(key, value);
        }

        for (key, value) in &self.overrides {
            vars.insert(key.clone(), value.clone());
        }
        // Colour flags and TERM are not configurable.
        for (key, value) in COLOR_OVERRIDES {
            vars.insert((*key).to_string(), (*value).to_string());
        }
        vars.insert("TERM".to_string(), term.to_string());

        EnvSnapshot { vars }
    }
}

/// Immutable environment for one spawned session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    fn default_policy() -> EnvPolicy {
        EnvPolicy::new(
            ["PATH", "HOME", "LANG", "LC_ALL", "LC_CTYPE", "NODE_ENV"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            BTreeMap::new(),
        )
    }

    #[test]
    fn copies_only_allow_listed_variables() {
        let host = [
            ("PATH", "/usr/bin"),
            ("HOME", "/home/demo"),
            ("AWS_SECRET_ACCESS_KEY", "hunter2"),
            ("DATABASE_URL", "postgres://prod"),
        ];
        let env = default_policy().snapshot_from(host, "xterm-256color");

        assert_eq!(env.get("PATH"), Some("/usr/bin"));
        assert_eq!(env.get("HOME"), Some("/home/demo"));
        assert!(!env.contains("AWS_SECRET_ACCESS_KEY"));
        assert!(!env.contains("DATABASE_URL"));
    }

    #[test]
    fn applies_fixed_overrides() {
        let env = default_policy().snapshot_from(Vec::<(String, String)>::new(), "screen");
        assert_eq!(env.get("TERM"), Some("screen"));
        assert_eq!(env.get("COLORTERM"), Some("truecolor"));
        assert_eq!(env.get("FORCE_COLOR"), Some("3"));
        assert_eq!(env.len(), 3);
    }

    #[test]
    fn term_from_host_is_replaced_by_negotiated_term() {
        let mut policy = default_policy();
        policy.allow.push("TERM".into());
        let env = policy.snapshot_from([("TERM", "dumb")], "xterm-kitty");
        assert_eq!(env.get("TERM"), Some("xterm-kitty"));
    }

    #[test]
    fn empty_host_values_are_skipped() {
        let env = default_policy().snapshot_from([("LANG", "")], "xterm");
        assert!(!env.contains("LANG"));
    }

    #[test]
    fn configured_overrides_are_applied() {
        let policy = EnvPolicy::new(
            vec!["PATH".into()],
            BTreeMap::from([("APP_MODE".to_string(), "demo".to_string())]),
        );
        let env = policy.snapshot_from([("APP_MODE", "prod")], "xterm");
        assert_eq!(env.get("APP_MODE"), Some("demo"));
    }

    #[test]
    fn configured_overrides_cannot_weaken_colour_flags() {
        let policy = EnvPolicy::new(
            vec!["PATH".into()],
            BTreeMap::from([
                ("COLORTERM".to_string(), "256".to_string()),
                ("FORCE_COLOR".to_string(), "0".to_string()),
                ("TERM".to_string(), "dumb".to_string()),
            ]),
        );
        let env = policy.snapshot_from([("PATH", "/bin")], "xterm-256color");
        assert_eq!(env.get("COLORTERM"), Some("truecolor"));
        assert_eq!(env.get("FORCE_COLOR"), Some("3"));
        assert_eq!(env.get("TERM"), Some("xterm-256color"));
    }

    #[test]
    fn random_host_variables_never_leak() {
        let policy = default_policy();
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let mut host: Vec<(String, String)> = Vec::new();
            for _ in 0..rng.gen_range(0..40) {
                let len = rng.gen_range(1..16);
                let key: String = (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(len)
                    .map(char::from)
                    .collect();
                let value: String = (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(8)
                    .map(char::from)
                    .collect();
                host.push((key, value));
            }
            host.push(("PATH".into(), "/bin".into()));

            let env = policy.snapshot_from(host.clone(), "xterm-256color");
            for (key, _) in env.iter() {
                let permitted = policy.allow.iter().any(|a| a == key)
                    || COLOR_OVERRIDES.iter().any(|(k, _)| *k == key)
                    || key == "TERM";
                assert!(permitted, "{key} leaked into session environment");
            }
            assert_eq!(env.get("PATH"), Some("/bin"));
        }
    }

    #[test]
    fn snapshot_reads_process_environment() {
        let env = default_policy().snapshot("xterm");
        assert_eq!(env.get("TERM"), Some("xterm"));
        if let Ok(path) = std::env::var("PATH") {
            if !path.is_empty() {
                assert_eq!(env.get("PATH"), Some(path.as_str()));
            }
        }
    }
}
