use crate::error::{JenError, Result};

pub const BASE_ENV_VAR_NAME: &str = "JEN_COMPARE_DEFAULT_BASE";

/// Seconds.
pub const DEFAULT_TIMEOUT: u64 = 5;

const NO_BASE_MESSAGE: &str =
    "No URL base specified (either on command line or env var); giving up.";

/// Picks the base URL from the command line, falling back to the environment.
///
/// Empty values count as absent on both sides.
pub fn resolve_base_url(cli_base: Option<String>, env_base: Option<String>) -> Result<String> {
    cli_base
        .filter(|base| !base.is_empty())
        .or_else(|| env_base.filter(|base| !base.is_empty()))
        .ok_or_else(|| JenError::Config(NO_BASE_MESSAGE.to_string()))
}

pub fn env_base_url() -> Option<String> {
    std::env::var(BASE_ENV_VAR_NAME).ok()
}

/// clap value parser for `-t/--timeout`.
pub fn parse_timeout(value: &str) -> std::result::Result<u64, String> {
    match value.trim().parse::<u64>() {
        Ok(seconds) if seconds > 0 => Ok(seconds),
        _ => Err(format!("{value} is not a positive integer")),
    }
}
