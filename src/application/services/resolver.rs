//! Dependency resolution
//!
//! Walks `require` statements from an entry file and returns the local modules
//! of the project in dependency order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::vec;

use itertools::Itertools;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{Module, RequireExtractor, RequireRef};
use crate::infrastructure::traits::FileSystem;
use crate::util::path::PathExt;

/// Modules of a project in postorder: dependencies first, entry file last.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    /// Directory all requires resolve against
    pub root: PathBuf,
    /// Canonical entry file
    pub entry: PathBuf,
    /// Local modules, each distinct path exactly once, entry last
    pub modules: Vec<Module>,
    /// Bundle input: `modules` plus one alias entry for every further require name
    /// of an already listed path, placed before the first module that needs it
    pub load_order: Vec<Module>,
    /// Required names without a local file (expected to be provided by the host)
    pub unresolved: Vec<String>,
}

impl ResolvedProject {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.modules.iter().map(|m| m.path.as_path())
    }
}

/// A module on the traversal stack with the requires still to visit.
struct Frame {
    module: Module,
    pending: vec::IntoIter<RequireRef>,
}

/// Depth-first `require` walker over an injected filesystem.
pub struct ProjectResolver {
    fs: Arc<dyn FileSystem>,
    extension: String,
}

impl ProjectResolver {
    pub fn new(fs: Arc<dyn FileSystem>, extension: impl Into<String>) -> Self {
        Self {
            fs,
            extension: extension.into(),
        }
    }

    /// Resolve the project rooted at `entry`.
    ///
    /// Fails if `entry` has the wrong extension (checked before any I/O) or does
    /// not exist. Requires without a local file are dropped, not reported as errors.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&self, entry: &Path) -> ApplicationResult<ResolvedProject> {
        if !entry.has_extension(&self.extension) {
            return Err(ApplicationError::InvalidExtension {
                path: entry.to_path_buf(),
                expected: self.extension.clone(),
            });
        }
        if !self.fs.is_file(entry) {
            return Err(ApplicationError::EntryFileNotFound(entry.to_path_buf()));
        }

        let entry = self
            .fs
            .canonicalize(entry)
            .or_entry_missing("canonicalize entry", entry)?;
        let root = entry
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ApplicationError::EntryFileNotFound(entry.clone()))?;
        debug!("resolve: root={}", root.display());

        let extractor = RequireExtractor::new(&root, &self.extension);
        let name = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let visited = self.walk(Module::required(name, &entry), &extractor)?;

        let (load_order, missing): (Vec<_>, Vec<_>) =
            visited.into_iter().partition(Module::is_local);
        let modules: Vec<Module> = load_order
            .iter()
            .unique_by(|m| m.path.clone())
            .cloned()
            .collect();
        let unresolved: Vec<String> = missing.into_iter().map(|m| m.name).collect();
        debug!(
            "resolve: {} local modules, {} aliases, {} unresolved",
            modules.len(),
            load_order.len() - modules.len(),
            unresolved.len()
        );

        match modules.last() {
            Some(last) if last.path == entry => Ok(ResolvedProject {
                root,
                entry,
                modules,
                load_order,
                unresolved,
            }),
            _ => Err(ApplicationError::EntryFileNotFound(entry)),
        }
    }

    /// Postorder traversal with an explicit stack.
    ///
    /// Each path is read and walked once. A path still on the stack is skipped, so
    /// cycles terminate. Requiring an already recorded path under a new name appends
    /// an alias entry (same path and content) at that point of the walk.
    fn walk(&self, root: Module, extractor: &RequireExtractor) -> ApplicationResult<Vec<Module>> {
        let mut sorted: Vec<Module> = Vec::new();
        let mut recorded: HashSet<PathBuf> = HashSet::new();
        let mut names: HashSet<(PathBuf, String)> = HashSet::new();
        let mut in_progress: HashSet<PathBuf> = HashSet::new();

        in_progress.insert(root.path.clone());
        let mut stack = vec![self.enter(root, extractor)?];

        while let Some(frame) = stack.last_mut() {
            match frame.pending.next() {
                Some(child) => {
                    let module = self.locate(child);
                    if in_progress.contains(&module.path) {
                        debug!("walk: skip in progress {}", module.path.display());
                        continue;
                    }
                    if recorded.contains(&module.path) {
                        let key = (module.path.clone(), module.name.clone());
                        if names.insert(key) {
                            let alias = sorted.iter().find(|m| m.path == module.path).map(|first| {
                                debug!("walk: '{}' aliases '{}'", module.name, first.name);
                                Module {
                                    name: module.name.clone(),
                                    ..first.clone()
                                }
                            });
                            sorted.extend(alias);
                        }
                        continue;
                    }
                    in_progress.insert(module.path.clone());
                    stack.push(self.enter(module, extractor)?);
                }
                None => {
                    let Some(done) = stack.pop() else { break };
                    in_progress.remove(&done.module.path);
                    if recorded.insert(done.module.path.clone()) {
                        names.insert((done.module.path.clone(), done.module.name.clone()));
                        sorted.push(done.module);
                    }
                }
            }
        }

        Ok(sorted)
    }

    /// Read the module if it exists locally and collect its requires.
    fn enter(&self, mut module: Module, extractor: &RequireExtractor) -> ApplicationResult<Frame> {
        if !self.fs.is_file(&module.path) {
            info!(
                "module '{}' not found locally ({}), assuming it is provided at runtime",
                module.name,
                module.path.display()
            );
            return Ok(Frame {
                module,
                pending: Vec::new().into_iter(),
            });
        }

        let content = self
            .fs
            .read_to_string_lossy(&module.path)
            .with_path_context("read module", &module.path)?;
        let requires = extractor.extract(&content);
        debug!(
            "enter: {} requires {:?}",
            module.path.display(),
            requires.iter().map(|r| r.name.as_str()).collect::<Vec<_>>()
        );
        module.content = Some(content);

        Ok(Frame {
            module,
            pending: requires.into_iter(),
        })
    }

    /// Canonical path for existing files, the candidate path otherwise.
    fn locate(&self, require: RequireRef) -> Module {
        let path = if self.fs.is_file(&require.path) {
            self.fs
                .canonicalize(&require.path)
                .unwrap_or_else(|_| require.path.clone())
        } else {
            require.path.clone()
        };
        Module::required(require.name, path)
    }
}
