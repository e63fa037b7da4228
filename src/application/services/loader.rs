//! Load service
//!
//! Validates an entry file, resolves its project, synthesizes the bundle and
//! renders the preview of the files that go into it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::services::resolver::{ProjectResolver, ResolvedProject};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{self, Bundle, TreeStyle};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::{absolutize, relative_to, PathExt};

const LOAD_COMMAND: &str = ".load";

/// A resolved project together with its bundle.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub project: ResolvedProject,
    pub bundle: Bundle,
}

/// How the file preview is drawn.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    pub style: TreeStyle,
    /// Show paths relative to the project root
    pub relative: bool,
    /// Text appended to the entry file's path, e.g. `[MAIN]`
    pub label: Option<String>,
}

/// Outcome of bundling every spec file of a directory.
#[derive(Debug, Default)]
pub struct SpecReport {
    /// Written bundle files
    pub bundled: Vec<PathBuf>,
    /// Spec files that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl SpecReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Extract the file argument of a `.load <file>` directive.
///
/// Surrounding single or double quotes are removed.
pub fn parse_load_directive(line: &str) -> ApplicationResult<PathBuf> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some(LOAD_COMMAND) {
        return Err(ApplicationError::InvalidDirective(line.to_string()));
    }
    let file = parts
        .next()
        .map(strip_quotes)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApplicationError::InvalidDirective(line.to_string()))?;
    Ok(PathBuf::from(file))
}

fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(&['"', '\''][..]).unwrap_or(s);
    s.strip_suffix(&['"', '\''][..]).unwrap_or(s)
}

/// Service turning an entry file into a bundle.
pub struct LoadService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl LoadService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    fn resolver(&self) -> ProjectResolver {
        ProjectResolver::new(Arc::clone(&self.fs), &self.settings.extension)
    }

    /// Resolve the project without bundling it.
    pub fn resolve(&self, entry: &Path) -> ApplicationResult<ResolvedProject> {
        self.resolver().resolve(entry)
    }

    /// Resolve and bundle the project rooted at `entry`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, entry: &Path) -> ApplicationResult<LoadOutput> {
        let project = self.resolve(entry)?;
        let bundle = domain::bundle(&project.load_order)?;
        debug!(
            "load: bundled {} modules into {} bytes",
            bundle.modules.len(),
            bundle.source.len()
        );
        Ok(LoadOutput { project, bundle })
    }

    /// Handle a `.load <file>` directive; relative files resolve against `cwd`.
    pub fn load_directive(&self, line: &str, cwd: &Path) -> ApplicationResult<LoadOutput> {
        let file = parse_load_directive(line)?;
        self.load(&absolutize(&file, cwd))
    }

    /// Hierarchical view of the project's files.
    pub fn preview(&self, project: &ResolvedProject, options: &PreviewOptions) -> String {
        let paths = project.modules.iter().map(|module| {
            let shown = if options.relative {
                relative_to(&module.path, &project.root)
            } else {
                module.path.clone()
            };
            let mut shown = shown.to_slash_string();
            if module.path == project.entry {
                if let Some(label) = &options.label {
                    shown.push(' ');
                    shown.push_str(label);
                }
            }
            shown
        });
        domain::render_paths(paths, &options.style)
    }

    /// Write bundled source to `out`, creating parent directories.
    pub fn write_bundle(&self, bundle: &Bundle, out: &Path) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(out)
            .with_path_context("create output directory", out)?;
        self.fs
            .write(out, &bundle.source)
            .with_path_context("write bundle", out)
    }

    /// Bundle every spec file directly inside `dir` into `out_dir/<file name>`.
    ///
    /// A failing spec is recorded and the remaining specs are still processed.
    #[instrument(level = "debug", skip(self))]
    pub fn bundle_specs(&self, dir: &Path, out_dir: &Path) -> ApplicationResult<SpecReport> {
        let files = self
            .fs
            .list_files(dir)
            .with_path_context("list spec directory", dir)?;

        let mut report = SpecReport::default();
        for spec in files.iter().filter(|f| self.is_spec_file(f)) {
            let Some(file_name) = spec.file_name() else {
                continue;
            };
            let out = out_dir.join(file_name);
            match self
                .load(spec)
                .and_then(|output| self.write_bundle(&output.bundle, &out))
            {
                Ok(()) => {
                    debug!("bundle_specs: {} -> {}", spec.display(), out.display());
                    report.bundled.push(out);
                }
                Err(e) => {
                    warn!("bundle_specs: {} failed: {}", spec.display(), e);
                    report.failed.push((spec.clone(), e.to_string()));
                }
            }
        }
        Ok(report)
    }

    fn is_spec_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy().ends_with(&self.settings.spec_suffix))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".load main.lua", "main.lua")]
    #[case(".load \"process/main.lua\"", "process/main.lua")]
    #[case(".load 'main.lua'", "main.lua")]
    #[case("  .load   main.lua  ", "main.lua")]
    fn given_load_directive_when_parsing_then_returns_file(
        #[case] line: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(parse_load_directive(line).unwrap(), PathBuf::from(expected));
    }

    #[rstest]
    #[case(".load")]
    #[case(".load \"\"")]
    #[case("load main.lua")]
    #[case("")]
    fn given_malformed_directive_when_parsing_then_errors(#[case] line: &str) {
        assert!(matches!(
            parse_load_directive(line),
            Err(ApplicationError::InvalidDirective(_))
        ));
    }
}
