#![forbid(unsafe_code)]

//! Log events for bindings and the host document.
//!
//! formerr logs at three levels only:
//!
//! | Level   | Used for |
//! |---------|----------|
//! | `warn`  | configuration the binding ignores (unknown validity kind, malformed pattern, busy registry) |
//! | `debug` | resolution outcomes and disconnection |
//! | `trace` | listener wiring, teardown, show/clear, dispatch |
//!
//! With the `tracing` feature these are the `tracing` macros. Without it they
//! expand to `()`, so they are usable in statement and expression position
//! alike and their arguments are never evaluated.
//!
//! The `tracing-json` feature adds [`init_json_subscriber`].

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV_VAR: &str = "FORMERR_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset or blank.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards a `warn` event.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// Discards a `debug` event.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {
            ()
        };
    }

    /// Discards a `trace` event.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {
            ()
        };
    }
}

/// Filter directives from `lookup(LOG_ENV_VAR)`, falling back to
/// [`DEFAULT_LOG_FILTER`] when unset or blank.
#[must_use]
pub fn filter_directives(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(LOG_ENV_VAR)
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned())
}

/// Install a global JSON subscriber filtered by `FORMERR_LOG`.
///
/// Unparsable directives fall back to [`DEFAULT_LOG_FILTER`]. Returns `false`
/// when a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let directives = filter_directives(|key| std::env::var(key).ok());
    let filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_default_when_unset_or_blank() {
        assert_eq!(filter_directives(|_| None), DEFAULT_LOG_FILTER);
        assert_eq!(filter_directives(|_| Some("  ".into())), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn directives_read_from_formerr_log() {
        let lookup = |key: &str| (key == LOG_ENV_VAR).then(|| " formerr_widgets=trace ".to_owned());
        assert_eq!(filter_directives(lookup), "formerr_widgets=trace");
    }

    #[test]
    fn macros_work_in_expression_position() {
        let level = Some(3);
        match level {
            Some(_) => crate::debug!("level set"),
            None => crate::warn!("no level"),
        }
        crate::trace!("done");
    }
}
