use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub trait PathExt {
    /// True if the file extension equals `extension` (without the dot).
    fn has_extension(&self, extension: &str) -> bool;
    fn to_slash_string(&self) -> String;
}

impl PathExt for Path {
    fn has_extension(&self, extension: &str) -> bool {
        self.extension() == Some(OsStr::new(extension))
    }

    fn to_slash_string(&self) -> String {
        normalize_path_separator(&self.to_string_lossy())
    }
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `to` relative to `from`, falling back to `to` itself.
pub fn relative_to(to: &Path, from: &Path) -> PathBuf {
    pathdiff::diff_paths(to, from).unwrap_or_else(|| to.to_path_buf())
}

// Helper function for cross-platform path comparison
pub fn normalize_path_separator(s: &str) -> String {
    s.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_lua_file_when_checking_extension_then_matches() {
        assert!(Path::new("src/main.lua").has_extension("lua"));
        assert!(!Path::new("src/main.luau").has_extension("lua"));
        assert!(!Path::new("src/lua").has_extension("lua"));
    }

    #[test]
    fn given_nested_path_when_relativizing_then_strips_base() {
        let rel = relative_to(Path::new("/p/lib/util.lua"), Path::new("/p"));
        assert_eq!(rel, PathBuf::from("lib/util.lua"));
    }

    #[test]
    fn given_windows_separators_when_normalizing_then_uses_slashes() {
        assert_eq!(normalize_path_separator(r"C:\p\main.lua"), "C:/p/main.lua");
    }
}
