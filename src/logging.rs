//! Logging setup.
//!
//! Logs go to **stderr** so they never mix with anything a host reads from
//! stdout. `RUST_LOG` filters them as usual:
//!
//! ```bash
//! RUST_LOG=checkly_provider=debug ./terraform-provider-checkly
//! ```
//!
//! When `CHECKLY_DEBUG_LOG` names a file, everything at `debug` and above is
//! appended to that file instead, regardless of `RUST_LOG`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::env;

/// Where log lines end up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(env::DEBUG_LOG).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::File(PathBuf::from(path)),
            None => Self::Stderr,
        }
    }
}

fn subscriber(default_level: &str) -> impl Subscriber + Send + Sync + 'static {
    let target = LogTarget::resolve(|name| std::env::var(name).ok());

    let file = match &target {
        LogTarget::File(path) => OpenOptions::new().create(true).append(true).open(path).ok(),
        LogTarget::Stderr => None,
    };

    // An unopenable debug log falls back to stderr.
    let (filter, writer, ansi) = match file {
        Some(file) => (
            EnvFilter::new("debug"),
            BoxMakeWriter::new(Mutex::new(file)),
            false,
        ),
        None => (
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            BoxMakeWriter::new(std::io::stderr),
            true,
        ),
    };

    tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the global subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Like [`init_logging`], with `default_level` used when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Install the global subscriber if none is set yet.
///
/// Returns `false` when another subscriber was already installed.
pub fn try_init_logging() -> bool {
    subscriber("info").try_init().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new("info").is_ok());
        assert!(EnvFilter::try_new("checkly_provider=debug").is_ok());
        assert!(EnvFilter::try_new("warn,checkly_provider::api=trace").is_ok());
    }

    #[test]
    fn test_debug_log_target() {
        let target = LogTarget::resolve(|name| {
            (name == env::DEBUG_LOG).then(|| "/tmp/checkly.log".to_string())
        });
        assert_eq!(target, LogTarget::File(PathBuf::from("/tmp/checkly.log")));

        assert_eq!(LogTarget::resolve(|_| None), LogTarget::Stderr);
        assert_eq!(LogTarget::resolve(|_| Some("  ".to_string())), LogTarget::Stderr);
    }

    #[test]
    fn test_try_init_is_idempotent() {
        let _ = try_init_logging();
        assert!(!try_init_logging());
    }
}
