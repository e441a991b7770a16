//! Environment loading helpers.
//!
//! Centralizes the fallback logic so business code never repeats
//! `env::var(..).ok().filter(..).unwrap_or_else(..)` chains.

use std::env;

/// Load `.env` from the current directory into the environment (never
/// overriding variables that are already set). Idempotent.
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let path = env::current_dir()
            .map(|d| d.join(".env"))
            .unwrap_or_else(|_| std::path::PathBuf::from(".env"));
        if let Ok(content) = std::fs::read_to_string(&path) {
            tracing::debug!("Loading environment from {}", path.display());
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some(eq_pos) = line.find('=') {
                    let key = line[..eq_pos].trim();
                    let mut value = line[eq_pos + 1..].trim();
                    if (value.starts_with('"') && value.ends_with('"') && value.len() >= 2)
                        || (value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2)
                    {
                        value = &value[1..value.len() - 1];
                    }
                    if !key.is_empty() && env::var(key).is_err() {
                        #[allow(unsafe_code)]
                        unsafe {
                            env::set_var(key, value);
                        }
                    }
                }
            }
        }
    });
}

/// Read an environment variable, falling back to `default` when unset or empty.
pub fn env_or<F>(key: &str, default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(default)
}

/// Read an environment variable as `Option`. An empty or whitespace-only
/// value counts as unset; callers rely on this to get true flag omission
/// rather than an empty flag value.
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|s| {
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    })
}

/// Parse a boolean environment variable: anything but 0/false/no/off is true.
pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key).ok().as_deref() {
        Some(s) if !s.trim().is_empty() => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own key; std::env is process-global.

    #[test]
    fn test_env_or_default_on_unset() {
        let v = env_or("TAOBOOT_TEST_UNSET_KEY_A", || "fallback".to_string());
        assert_eq!(v, "fallback");
    }

    #[test]
    fn test_env_optional_empty_is_none() {
        #[allow(unsafe_code)]
        unsafe {
            env::set_var("TAOBOOT_TEST_EMPTY_KEY_B", "   ");
        }
        assert_eq!(env_optional("TAOBOOT_TEST_EMPTY_KEY_B"), None);
    }

    #[test]
    fn test_env_optional_set() {
        #[allow(unsafe_code)]
        unsafe {
            env::set_var("TAOBOOT_TEST_SET_KEY_C", "203.0.113.5");
        }
        assert_eq!(
            env_optional("TAOBOOT_TEST_SET_KEY_C").as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn test_env_bool_values() {
        #[allow(unsafe_code)]
        unsafe {
            env::set_var("TAOBOOT_TEST_BOOL_D", "off");
        }
        assert!(!env_bool("TAOBOOT_TEST_BOOL_D", true));
        assert!(env_bool("TAOBOOT_TEST_BOOL_UNSET_E", true));
        assert!(!env_bool("TAOBOOT_TEST_BOOL_UNSET_F", false));
    }
}
