//! `require` extraction from Lua source text.
//!
//! Pattern based, not a parser: line comments (`--`) before a call on the same
//! line disable it, block comments and computed module names are not understood.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::entities::RequireRef;

/// `require "x"`, `require 'x'`, `require("x")`, `require ( 'x' )`, also across newlines.
static REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(?\s*(?:"([^"\n]*)"|'([^'\n]*)')"#).expect("valid require regex")
});

const LINE_COMMENT: &str = "--";

/// Returns the module names required by `source`, in order of appearance.
///
/// Duplicates are kept; a call is skipped when `--` precedes its string
/// literal on the same line.
pub fn required_names(source: &str) -> Vec<&str> {
    REQUIRE_RE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .filter(|literal| !is_commented_out(source, literal.start()))
        .map(|literal| literal.as_str())
        .collect()
}

fn is_commented_out(source: &str, literal_start: usize) -> bool {
    // literal_start is just past the opening quote
    let quote = literal_start.saturating_sub(1);
    let line_start = source[..quote].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..quote].contains(LINE_COMMENT)
}

/// Maps required module names to candidate files below one project root.
///
/// All names resolve against the root, never against the requiring file's directory.
#[derive(Debug, Clone)]
pub struct RequireExtractor {
    root: PathBuf,
    extension: String,
}

impl RequireExtractor {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// `a.b.c` -> `<root>/a/b/c.<ext>`
    pub fn module_path(&self, name: &str) -> PathBuf {
        let relative = format!("{}.{}", name.replace('.', "/"), self.extension);
        // `.ao` must stay below the root, not become `/ao.lua`
        self.root.join(relative.trim_start_matches('/'))
    }

    /// Scan `source` and resolve every required name to its candidate path.
    pub fn extract(&self, source: &str) -> Vec<RequireRef> {
        required_names(source)
            .into_iter()
            .map(|name| RequireRef {
                name: name.to_string(),
                path: self.module_path(name),
            })
            .collect()
    }
}
