//! Default nanok logger (spec.md §6, SPEC_FULL.md §3): a `log` facade with an
//! `env_logger` sink owned by the binary. Library crates only ever call
//! `log::debug!`/`warn!`/`error!`; this module is the only place a sink gets
//! installed.

use std::borrow::Cow;
use std::str::FromStr;

use anyhow::Result;
use log::LevelFilter;

const LOG_ENABLED_ENV: &str = "NK_LOG_ENABLED";
const LOG_LEVEL_ENV: &str = "NK_LOG_LEVEL";
const LOG_EDUCATIONAL_ENV: &str = "NK_LOG_EDUCATIONAL";

#[cfg(debug_assertions)]
const DEFAULT_LOG_LEVEL: &str = "debug";
#[cfg(not(debug_assertions))]
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Initializes the logger. Must be called once before any library code logs.
///
/// `verbose` forces debug level regardless of `NK_LOG_LEVEL`. Logging can be
/// switched off entirely by setting `NK_LOG_ENABLED=0`.
pub fn init(verbose: bool) -> Result<bool> {
    if disabled_by_env() {
        return Ok(educational_enabled());
    }

    let level = detect_log_level(verbose)?;
    env_logger::Builder::new()
        .filter_level(level)
        .format(text_write)
        .target(env_logger::Target::Stderr)
        .init();

    Ok(educational_enabled())
}

fn disabled_by_env() -> bool {
    matches!(
        std::env::var(LOG_ENABLED_ENV).as_deref(),
        Ok("0") | Ok("false") | Ok("no")
    )
}

pub fn educational_enabled() -> bool {
    std::env::var(LOG_EDUCATIONAL_ENV).is_ok()
}

fn detect_log_level(verbose: bool) -> Result<LevelFilter> {
    let filter: Cow<str> = if verbose {
        "debug".into()
    } else if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        numeric_level_alias(&level).unwrap_or(level).into()
    } else {
        DEFAULT_LOG_LEVEL.into()
    };
    Ok(LevelFilter::from_str(filter.as_ref())?)
}

/// `NK_LOG_LEVEL` accepts either a name or the numeric scale `0..3`.
fn numeric_level_alias(raw: &str) -> Option<String> {
    let level = match raw {
        "0" => "error",
        "1" => "warn",
        "2" => "info",
        "3" => "debug",
        _ => return None,
    };
    Some(level.to_string())
}

fn text_write<F: std::io::Write>(f: &mut F, record: &log::Record) -> std::io::Result<()> {
    match (record.file(), record.line()) {
        (Some(file), Some(line)) => write!(f, "[{} {}:{}]", record.level(), file, line)?,
        _ => write!(f, "[{}]", record.level())?,
    }
    writeln!(f, " {}", record.args())
}

/// Emits a one-line "why" annotation for a lifecycle transition when
/// `NK_LOG_EDUCATIONAL` is set, and is a no-op otherwise.
pub fn educational(message: &str) {
    if educational_enabled() {
        log::info!("[why] {message}");
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    struct EnvGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let original = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self { key, original }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(v) => std::env::set_var(self.key, v),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    #[serial]
    fn verbose_flag_forces_debug() {
        let _guard = EnvGuard::set(LOG_LEVEL_ENV, "error");
        assert_eq!(detect_log_level(true).unwrap(), LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn default_level_matches_build_profile() {
        std::env::remove_var(LOG_LEVEL_ENV);
        let expected = if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        };
        assert_eq!(detect_log_level(false).unwrap(), expected);
    }

    #[test]
    #[serial]
    fn level_from_env_name() {
        let _guard = EnvGuard::set(LOG_LEVEL_ENV, "error");
        assert_eq!(detect_log_level(false).unwrap(), LevelFilter::Error);
    }

    #[test]
    #[serial]
    fn level_from_env_numeric_alias() {
        let _guard = EnvGuard::set(LOG_LEVEL_ENV, "3");
        assert_eq!(detect_log_level(false).unwrap(), LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn educational_flag_reads_env() {
        let _guard = EnvGuard::set(LOG_EDUCATIONAL_ENV, "1");
        assert!(educational_enabled());
    }
}
