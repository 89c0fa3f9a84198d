//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

use super::StorageMode;

static RE_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9.\-:]*[A-Za-z0-9])?$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_HOST" => {
            if !RE_HOST.is_match(value) {
                return Err("must be a hostname or IP address".into());
            }
        }
        "SERVER_PORT" => {
            let v: u16 = value.parse().map_err(|_| "must be a port number")?;
            if v == 0 {
                return Err("must be between 1 and 65535".into());
            }
        }
        "STORAGE_MODE" => {
            value
                .parse::<StorageMode>()
                .map_err(|_| "must be 'disk' or 'memory'")?;
        }
        "FONT_SIZE" => {
            let v: f32 = value.parse().map_err(|_| "must be a number")?;
            if !(6.0..=200.0).contains(&v) {
                return Err("must be between 6 and 200".into());
            }
        }
        "CACHE_CAPACITY" => validate_int_range(value, 1, 100_000)?,
        "CACHE_TTL_SECS" => validate_int_range(value, 1, 7 * 24 * 3600)?,
        "CACHE_SWEEP_SECS" => validate_int_range(value, 1, 24 * 3600)?,
        "DEFAULT_CAPTION" => {
            if value.chars().count() > 200 {
                return Err("must be at most 200 characters".into());
            }
        }
        "OUTPUT_DIR" | "QR_STUDIO_DATA_DIR" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_must_be_nonzero_u16() {
        assert!(validate_setting("SERVER_PORT", "5000").is_ok());
        assert!(validate_setting("SERVER_PORT", "0").is_err());
        assert!(validate_setting("SERVER_PORT", "70000").is_err());
        assert!(validate_setting("SERVER_PORT", "abc").is_err());
    }

    #[test]
    fn storage_mode_accepts_known_values() {
        assert!(validate_setting("STORAGE_MODE", "disk").is_ok());
        assert!(validate_setting("STORAGE_MODE", "memory").is_ok());
        assert!(validate_setting("STORAGE_MODE", "redis").is_err());
    }

    #[test]
    fn storage_mode_is_case_insensitive() {
        assert!(validate_setting("STORAGE_MODE", "Memory").is_ok());
        assert!(validate_setting("STORAGE_MODE", "DISK").is_ok());
    }

    #[test]
    fn host_rejects_whitespace() {
        assert!(validate_setting("SERVER_HOST", "0.0.0.0").is_ok());
        assert!(validate_setting("SERVER_HOST", "localhost").is_ok());
        assert!(validate_setting("SERVER_HOST", "bad host").is_err());
    }

    #[test]
    fn cache_limits_are_ranged() {
        assert!(validate_setting("CACHE_CAPACITY", "128").is_ok());
        assert!(validate_setting("CACHE_CAPACITY", "0").is_err());
        assert!(validate_setting("CACHE_TTL_SECS", "-5").is_err());
    }

    #[test]
    fn unknown_keys_pass() {
        assert!(validate_setting("SOMETHING_ELSE", "whatever").is_ok());
    }
}
