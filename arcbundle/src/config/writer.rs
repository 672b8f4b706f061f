//! INI serialization: `ConfigFile` → commented `config.ini` text.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let root = config
        .cache
        .root
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();
    let output = config
        .export
        .output
        .as_deref()
        .map(path_to_string)
        .unwrap_or_default();
    let workers = config
        .export
        .workers
        .map(|w| w.to_string())
        .unwrap_or_default();

    format!(
        r#"[cache]
; Compact cache root containing the L00, L01, ... level directories
; Example: root = /data/arcgis/Layers/_alllayers
root = {}
; Number of bundles the tile server keeps in memory (default: 20)
capacity = {}

[bundle]
; How bundle index offsets are decoded:
;   compat - low 4 bytes of each 5-byte record (default)
;   full   - all 5 bytes, for data files larger than 4 GiB
offset_mode = {}

[export]
; Default output directory for `arcbundle export`
output = {}
; Worker threads (empty = one per CPU)
workers = {}
; Added to the row before it is written into the C<row>.png filename (default: -1)
row_offset = {}

[server]
; Listen address for `arcbundle serve`
bind = {}
; Seconds before a tile request is answered with 504 (0 disables)
request_timeout_secs = {}

[logging]
directory = {}
file = {}
"#,
        root,
        config.cache.capacity,
        config.bundle.offset_mode,
        output,
        workers,
        config.export.row_offset,
        config.server.bind,
        config.server.request_timeout_secs,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_string_has_all_sections() {
        let text = to_config_string(&ConfigFile::default());
        for section in ["[cache]", "[bundle]", "[export]", "[server]", "[logging]"] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("offset_mode = compat"));
        assert!(text.contains("row_offset = -1"));
        assert!(text.contains("bind = 127.0.0.1:8080"));
    }
}
