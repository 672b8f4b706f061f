//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [cache]
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = non_empty(section.get("root")) {
            config.cache.root = Some(expand_tilde(v));
        }
        if let Some(v) = section.get("capacity") {
            let capacity: usize = parse_value("cache", "capacity", v, "must be a positive integer")?;
            if capacity == 0 {
                return Err(invalid("cache", "capacity", v, "must be at least 1"));
            }
            config.cache.capacity = capacity;
        }
    }

    // [bundle]
    if let Some(section) = ini.section(Some("bundle")) {
        if let Some(v) = section.get("offset_mode") {
            config.bundle.offset_mode = parse_value(
                "bundle",
                "offset_mode",
                &v.to_lowercase(),
                "must be 'compat' or 'full'",
            )?;
        }
    }

    // [export]
    if let Some(section) = ini.section(Some("export")) {
        if let Some(v) = non_empty(section.get("output")) {
            config.export.output = Some(expand_tilde(v));
        }
        if let Some(v) = non_empty(section.get("workers")) {
            let workers: usize = parse_value("export", "workers", v, "must be a positive integer")?;
            if workers == 0 {
                return Err(invalid("export", "workers", v, "must be at least 1"));
            }
            config.export.workers = Some(workers);
        }
        if let Some(v) = section.get("row_offset") {
            config.export.row_offset = parse_value("export", "row_offset", v, "must be an integer")?;
        }
    }

    // [server]
    if let Some(section) = ini.section(Some("server")) {
        if let Some(v) = section.get("bind") {
            config.server.bind =
                parse_value("server", "bind", v, "must be an address like 127.0.0.1:8080")?;
        }
        if let Some(v) = section.get("request_timeout_secs") {
            config.server.request_timeout_secs = parse_value(
                "server",
                "request_timeout_secs",
                v,
                "must be a non-negative integer (seconds, 0 disables)",
            )?;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section.get("directory")) {
            config.logging.directory = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("file")) {
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::OffsetMode;
    use tempfile::TempDir;

    fn load(contents: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, contents).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_partial_config() {
        let config = load(
            r#"
[cache]
root = /srv/tiles/_alllayers

[bundle]
offset_mode = FULL
"#,
        )
        .unwrap();

        assert_eq!(config.cache.root, Some(PathBuf::from("/srv/tiles/_alllayers")));
        assert_eq!(config.cache.capacity, 20);
        assert_eq!(config.bundle.offset_mode, OffsetMode::Full);
        assert_eq!(config.export.row_offset, -1);
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = load(
            r#"
[cache]
root =

[export]
workers =
"#,
        )
        .unwrap();

        assert!(config.cache.root.is_none());
        assert!(config.export.workers.is_none());
    }

    #[test]
    fn test_invalid_offset_mode() {
        let err = load("[bundle]\noffset_mode = six\n").unwrap_err();
        assert!(err.to_string().contains("offset_mode"));
        assert!(err.to_string().contains("'compat' or 'full'"));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = load("[cache]\ncapacity = 0\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "capacity"));
    }

    #[test]
    fn test_invalid_bind_address() {
        let err = load("[server]\nbind = localhost\n").unwrap_err();
        assert!(err.to_string().contains("server.bind"));
    }

    #[test]
    fn test_negative_row_offset() {
        let config = load("[export]\nrow_offset = -3\n").unwrap();
        assert_eq!(config.export.row_offset, -3);
    }

    #[test]
    fn test_expand_tilde() {
        let path = expand_tilde("~/tiles");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("tiles"));
        }

        let path = expand_tilde("/absolute/path");
        assert_eq!(path, PathBuf::from("/absolute/path"));
    }
}
