use std::{fmt, sync::Once};

use tracing_subscriber::{filter::Directive, fmt as subscriber_fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "budget_ledger=info";

/// Installs the global fmt subscriber. `RUST_LOG` directives are honoured on top of the default.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = DEFAULT_DIRECTIVE.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
        // Another subscriber may already be installed by the embedding application.
        let _ = subscriber_fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

/// Compile-time build metadata emitted by `build.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("BUDGET_LEDGER_BUILD_HASH"),
        built_at: env!("BUDGET_LEDGER_BUILD_TIMESTAMP"),
        target: env!("BUDGET_LEDGER_BUILD_TARGET"),
        profile: env!("BUDGET_LEDGER_BUILD_PROFILE"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "budget_ledger {} ({} {}, {} build for {})",
            self.version, self.commit, self.built_at, self.profile, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_carries_package_version() {
        let info = build_info();
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.to_string().starts_with("budget_ledger "));
    }

    #[test]
    fn init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
