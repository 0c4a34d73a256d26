//! Runtime environment classification.
//!
//! The client runs either inside the embedded desktop shell (no origin, so
//! cross-origin requests to the backend must use its absolute address) or in
//! a standard browser tab (requests go through a same-origin dev proxy).
//! The classification is computed once at startup from [`HostSignals`] the
//! embedder collects, then threaded through constructors as a plain value;
//! nothing here queries ambient global state.

/// Substring of the client identification string that marks the embedded
/// desktop shell (matched case-insensitively).
pub const EMBEDDED_UA_SIGNATURE: &str = "electron";

/// Runtime signals gathered by the embedder before startup.
///
/// `Default` is all-absent, which classifies as [`Mode::Browser`], the
/// right answer for non-interactive contexts with no host environment.
#[derive(Debug, Clone, Default)]
pub struct HostSignals {
    /// Host-integration capability marker present on the global environment.
    pub host_bridge: bool,
    /// Module-loading capability exposed on the global environment.
    pub module_loader: bool,
    /// Reported client identification string, if any.
    pub user_agent: Option<String>,
}

/// Where the client is running. Decides the base endpoint for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Embedded desktop shell; requests target the backend's absolute address.
    Embedded,
    /// Browser tab; requests go through the relative dev-proxy prefix.
    Browser,
}

impl Mode {
    /// Classify the runtime environment. Deterministic, no I/O, never fails.
    #[must_use]
    pub fn detect(signals: &HostSignals) -> Self {
        if signals.host_bridge || signals.module_loader {
            return Self::Embedded;
        }
        let shell_ua = signals
            .user_agent
            .as_deref()
            .is_some_and(|ua| ua.to_ascii_lowercase().contains(EMBEDDED_UA_SIGNATURE));
        if shell_ua {
            Self::Embedded
        } else {
            Self::Browser
        }
    }

    #[must_use]
    pub fn is_embedded(self) -> bool {
        matches!(self, Self::Embedded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_signals_is_browser() {
        assert_eq!(Mode::detect(&HostSignals::default()), Mode::Browser);
    }

    #[test]
    fn host_bridge_is_embedded() {
        let signals = HostSignals {
            host_bridge: true,
            ..HostSignals::default()
        };
        assert_eq!(Mode::detect(&signals), Mode::Embedded);
    }

    #[test]
    fn module_loader_is_embedded() {
        let signals = HostSignals {
            module_loader: true,
            ..HostSignals::default()
        };
        assert_eq!(Mode::detect(&signals), Mode::Embedded);
    }

    #[test]
    fn user_agent_signature_is_case_insensitive() {
        let signals = HostSignals {
            user_agent: Some("Mozilla/5.0 Chrome/120 ELECTRON/28.0".into()),
            ..HostSignals::default()
        };
        assert_eq!(Mode::detect(&signals), Mode::Embedded);
    }

    #[test]
    fn plain_browser_user_agent_is_browser() {
        let signals = HostSignals {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0".into()),
            ..HostSignals::default()
        };
        assert_eq!(Mode::detect(&signals), Mode::Browser);
    }

    #[test]
    fn detection_is_idempotent() {
        let signals = HostSignals {
            host_bridge: true,
            user_agent: Some("electron".into()),
            module_loader: true,
        };
        assert_eq!(Mode::detect(&signals), Mode::detect(&signals));
    }
}
