/// Widget construction for the two screens
///
/// - admin.rs: panel administration (folder tree, imports, per-node actions)
/// - search.rs: catalog-wide file search
///
/// Everything here is pure view code over the state module; mutations go
/// back through `Message`.

pub mod admin;
pub mod search;

/// Human-readable file size for file cards ("1.5 MB").
pub fn format_file_size(size: u64) -> String {
    if size == 0 {
        return "0 B".to_string();
    }
    let mut value = size as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{:.1} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.1} TB", value)
}

/// Size shown on a file card: the recorded size, falling back to the copy on
/// disk when the record holds zero.
pub fn display_size(recorded: u64, filepath: &str) -> String {
    let size = if recorded == 0 {
        std::fs::metadata(filepath).map(|m| m.len()).unwrap_or(0)
    } else {
        recorded
    };
    format_file_size(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.0 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_display_size_prefers_recorded_value() {
        assert_eq!(display_size(2048, "/definitely/not/here"), "2.0 KB");
        assert_eq!(display_size(0, "/definitely/not/here"), "0 B");
    }
}
