//! Environment-derived policy signals
//!
//! The cache provider's behavior depends on a handful of process-environment
//! facts: whether we are running under CI, whether remote writes were
//! explicitly enabled, and whether a remote endpoint was supplied through the
//! environment rather than configuration. These are resolved exactly once at
//! startup into an [`EnvSignals`] value that is passed down by value; nothing
//! in the cache layer reads environment variables per call.

use serde::Serialize;

/// Environment variables that indicate a CI environment when set truthy.
const CI_ENV_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "CIRCLECI",
    "TRAVIS",
    "TF_BUILD",
    "TEAMCITY_VERSION",
    "JENKINS_URL",
];

/// Explicit opt-in for writing to the remote cache outside CI.
const WRITE_REMOTE_VAR: &str = "STRIDER_WRITE_REMOTE_CACHE";
/// Remote blob store endpoint, e.g. `https://cache.example.com`.
const REMOTE_URL_VAR: &str = "STRIDER_REMOTE_CACHE_URL";
/// Bearer token for the remote blob store.
const REMOTE_TOKEN_VAR: &str = "STRIDER_REMOTE_CACHE_TOKEN";

/// Snapshot of the environment signals the cache layer consumes.
///
/// Immutable after construction; safe to clone into every component that
/// needs policy decisions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvSignals {
    /// True when the process runs inside a continuous-integration environment
    pub running_in_ci: bool,
    /// True when remote-cache writes were explicitly enabled via environment
    pub write_remote_override: bool,
    /// Remote cache endpoint supplied through the environment, if any
    pub remote_endpoint: Option<String>,
    /// Bearer token for the remote cache, if any
    pub remote_auth_token: Option<String>,
}

impl EnvSignals {
    /// Resolve all signals from the process environment.
    ///
    /// Call once at startup and pass the result down.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve signals from an arbitrary lookup function.
    ///
    /// Exists so tests can exercise policy resolution without mutating the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let running_in_ci = CI_ENV_VARS
            .iter()
            .any(|var| lookup(var).as_deref().is_some_and(is_truthy));

        Self {
            running_in_ci,
            write_remote_override: lookup(WRITE_REMOTE_VAR).as_deref().is_some_and(is_truthy),
            remote_endpoint: lookup(REMOTE_URL_VAR).filter(|s| !s.trim().is_empty()),
            remote_auth_token: lookup(REMOTE_TOKEN_VAR).filter(|s| !s.is_empty()),
        }
    }
}

/// CI providers set their marker variables to values like "true", "1", or a
/// version string; "false" and "0" mean explicitly disabled.
fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && !v.eq_ignore_ascii_case("false") && v != "0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn signals_from(vars: &[(&str, &str)]) -> EnvSignals {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvSignals::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let signals = signals_from(&[]);
        assert!(!signals.running_in_ci);
        assert!(!signals.write_remote_override);
        assert!(signals.remote_endpoint.is_none());
        assert!(signals.remote_auth_token.is_none());
    }

    #[test]
    fn detects_generic_ci_variable() {
        let signals = signals_from(&[("CI", "true")]);
        assert!(signals.running_in_ci);
    }

    #[test]
    fn detects_provider_specific_variables() {
        assert!(signals_from(&[("GITHUB_ACTIONS", "true")]).running_in_ci);
        assert!(signals_from(&[("BUILDKITE", "true")]).running_in_ci);
        assert!(signals_from(&[("TEAMCITY_VERSION", "2024.1")]).running_in_ci);
    }

    #[test]
    fn explicitly_disabled_ci_is_not_ci() {
        assert!(!signals_from(&[("CI", "false")]).running_in_ci);
        assert!(!signals_from(&[("CI", "0")]).running_in_ci);
        assert!(!signals_from(&[("CI", "")]).running_in_ci);
    }

    #[test]
    fn write_override_is_case_insensitive() {
        assert!(signals_from(&[("STRIDER_WRITE_REMOTE_CACHE", "TRUE")]).write_remote_override);
        assert!(signals_from(&[("STRIDER_WRITE_REMOTE_CACHE", "1")]).write_remote_override);
        assert!(!signals_from(&[("STRIDER_WRITE_REMOTE_CACHE", "false")]).write_remote_override);
    }

    #[test]
    fn remote_endpoint_ignores_blank_values() {
        let signals = signals_from(&[("STRIDER_REMOTE_CACHE_URL", "   ")]);
        assert!(signals.remote_endpoint.is_none());

        let signals = signals_from(&[
            ("STRIDER_REMOTE_CACHE_URL", "https://cache.example.com"),
            ("STRIDER_REMOTE_CACHE_TOKEN", "sekrit"),
        ]);
        assert_eq!(
            signals.remote_endpoint.as_deref(),
            Some("https://cache.example.com")
        );
        assert_eq!(signals.remote_auth_token.as_deref(), Some("sekrit"));
    }
}
