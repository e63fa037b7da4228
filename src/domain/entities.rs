//! Domain entities: core data structures

use std::fmt;
use std::path::PathBuf;

/// One source file taking part in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Name used in the `require` call (e.g. `"lib.util"`); unused for the entry file
    pub name: String,
    /// Canonical path, the identity key for deduplication
    pub path: PathBuf,
    /// Raw file text, `None` if the file is not present locally
    pub content: Option<String>,
}

impl Module {
    /// Module referenced by a `require` call, content not yet read.
    pub fn required(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: None,
        }
    }

    /// Module with known content.
    pub fn with_content(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: Some(content.into()),
        }
    }

    /// True if the file was read from disk during resolution.
    pub fn is_local(&self) -> bool {
        self.content.is_some()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A `require` occurrence found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireRef {
    /// String literal passed to `require`, without quotes
    pub name: String,
    /// Candidate path below the project root
    pub path: PathBuf,
}

impl From<RequireRef> for Module {
    fn from(r: RequireRef) -> Self {
        Module::required(r.name, r.path)
    }
}

/// A module after bundling, with its generated block attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledModule {
    pub name: String,
    pub path: PathBuf,
    /// Loader definition (if first seen) plus registration; raw code for the entry file
    pub content: String,
}

/// Result of bundling a resolved project.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// The self-contained program text
    pub source: String,
    /// Per-module records in bundle order, entry file last
    pub modules: Vec<BundledModule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_require_ref_when_converted_then_module_has_no_content() {
        let module: Module = RequireRef {
            name: "lib.util".into(),
            path: PathBuf::from("/p/lib/util.lua"),
        }
        .into();

        assert_eq!(module.name, "lib.util");
        assert!(!module.is_local());
    }
}
