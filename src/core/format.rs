use std::fs::Metadata;
use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Human-friendly byte count, one decimal place (`512.0B`, `1.5KB`).
pub fn human_size(bytes: u64) -> String {
    let mut n = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if n < 1024.0 {
            return format!("{:.1}{}", n, unit);
        }
        n /= 1024.0;
    }
    format!("{:.1}PB", n)
}

pub fn format_time(time: SystemTime, pattern: &str) -> String {
    let dt: DateTime<Local> = time.into();
    dt.format(pattern).to_string()
}

pub fn modified_time(metadata: &Metadata) -> String {
    metadata
        .modified()
        .map(|t| format_time(t, "%Y-%m-%d %H:%M"))
        .unwrap_or_else(|_| "?".repeat(16))
}

/// `drwxr-xr-x` style permission string.
#[cfg(unix)]
pub fn permission_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    let kind = if metadata.is_dir() {
        'd'
    } else if metadata.file_type().is_symlink() {
        'l'
    } else {
        '-'
    };

    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
pub fn permission_string(metadata: &Metadata) -> String {
    let kind = if metadata.is_dir() { 'd' } else { '-' };
    let write = if metadata.permissions().readonly() { '-' } else { 'w' };
    format!("{}r{}-r{}-r{}-", kind, write, write, write)
}

pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(human_size(0), "0.0B");
        assert_eq!(human_size(512), "512.0B");
        assert_eq!(human_size(1536), "1.5KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0MB");
    }

    #[test]
    fn percent_of_zero_is_zero() {
        assert_eq!(percent(5, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }

    #[cfg(unix)]
    #[test]
    fn permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o640)).unwrap();

        let meta = std::fs::metadata(&file).unwrap();
        assert_eq!(permission_string(&meta), "-rw-r-----");
        let meta = std::fs::metadata(dir.path()).unwrap();
        assert!(permission_string(&meta).starts_with('d'));
    }
}
