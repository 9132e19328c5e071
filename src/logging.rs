use std::sync::Once;

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

static INIT: Once = Once::new();

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    fn default_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "ldap2json=error",
            Verbosity::Normal => "ldap2json=warn",
            Verbosity::Debug => "ldap2json=debug",
        }
    }
}

/// Pick the filter directives: a non-empty `RUST_LOG` wins, otherwise the
/// verbosity decides.
pub fn filter_directives(rust_log: Option<&str>, verbosity: Verbosity) -> String {
    // Scripts frequently set RUST_LOG unconditionally but potentially with an
    // empty value, and we don't want that to be interpreted as a desire to
    // silence everything.
    match rust_log.filter(|s| !s.is_empty()) {
        Some(directives) => directives.to_string(),
        None => verbosity.default_directive().to_string(),
    }
}

/// Install the global subscriber.  Logs go to stderr so stdout stays the
/// user-facing channel; calling this more than once is harmless.
pub fn init_logging(verbosity: Verbosity) {
    INIT.call_once(|| {
        let rust_log = std::env::var("RUST_LOG").ok();
        let directives = filter_directives(rust_log.as_deref(), verbosity);
        let filter = EnvFilter::try_new(&directives)
            .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .compact()
            // These end up in terminals next to colored console output as
            // well as in redirected logs, so no ANSI.
            .with_ansi(false)
            .without_time()
            .with_writer(std::io::stderr)
            .finish();
        // Fails only if someone else (a test harness, an embedding program)
        // already installed a subscriber, which is fine.
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[test]
fn test_filter_directives() {
    assert_eq!(filter_directives(None, Verbosity::Debug), "ldap2json=debug");
    assert_eq!(filter_directives(Some(""), Verbosity::Quiet), "ldap2json=error");
    assert_eq!(
        filter_directives(Some("ldap2json=trace"), Verbosity::Normal),
        "ldap2json=trace"
    );
    assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
    assert_eq!(Verbosity::from_flags(true, false), Verbosity::Quiet);
    assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
}
