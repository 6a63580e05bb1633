//! Shared helper functions for CLI commands

use chrono::{DateTime, NaiveDate, Utc};
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::clock::{Clock, FixedClock, SystemClock};
use crate::core::config::Config;
use crate::core::identity::EntityId;
use crate::core::repository::Repository;
use crate::core::workspace::Workspace;

/// Open the repository, honoring the global --workspace override
pub fn open_repository(global: &GlobalOpts) -> Result<Repository> {
    let workspace = match &global.workspace {
        Some(path) => Workspace::discover_from(path),
        None => Workspace::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))?;
    Repository::open(workspace).map_err(|e| miette::miette!("{}", e))
}

/// Resolve the effective list format: an explicit `--format` wins, then the
/// configured `default_format`, then aligned columns.
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    match global.format {
        OutputFormat::Auto => config
            .default_format
            .as_deref()
            .and_then(|name| <OutputFormat as clap::ValueEnum>::from_str(name, true).ok())
            .filter(|format| *format != OutputFormat::Auto)
            .unwrap_or(OutputFormat::Tsv),
        format => format,
    }
}

/// The clock commands run against: fixed when a reference date is given
pub fn clock_at(at: Option<NaiveDate>) -> Box<dyn Clock> {
    match at {
        Some(date) => Box::new(FixedClock::at_date(date)),
        None => Box::new(SystemClock),
    }
}

/// Format an EntityId for display, truncating if too long
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated.
/// Counts characters rather than bytes so multibyte names never split
/// mid-sequence.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Date-only display for timestamps
pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Visit);
        let formatted = format_short_id(&id);
        // Full IDs are 32 chars (prefix + dash + 26-char ULID), so truncate
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // 8 characters, 24 bytes; fits by character count
        assert_eq!(truncate_str("ペットパラダイス", 8), "ペットパラダイス");
        // Cut falls between characters, never inside a UTF-8 sequence
        assert_eq!(truncate_str("ペットパラダイス", 6), "ペット...");
    }

    #[test]
    fn test_resolve_format_uses_configured_default() {
        let auto = GlobalOpts {
            format: OutputFormat::Auto,
            quiet: false,
            verbose: false,
            workspace: None,
        };
        let config = Config {
            default_format: Some("json".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_format(&auto, &config), OutputFormat::Json);

        // An explicit flag wins over the configured default
        let explicit = GlobalOpts {
            format: OutputFormat::Csv,
            ..auto.clone()
        };
        assert_eq!(resolve_format(&explicit, &config), OutputFormat::Csv);

        // No configured default falls back to aligned columns
        assert_eq!(resolve_format(&auto, &Config::default()), OutputFormat::Tsv);

        // Unknown names are ignored rather than erroring
        let bogus = Config {
            default_format: Some("wide".to_string()),
            ..Config::default()
        };
        assert_eq!(resolve_format(&auto, &bogus), OutputFormat::Tsv);
    }

    #[test]
    fn test_clock_at_fixed() {
        let clock = clock_at(NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }
}
