//! Bundle synthesis: wraps resolved modules into one Lua program.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::entities::{Bundle, BundledModule, Module};
use crate::domain::error::DomainError;

const LOADER_PREFIX: &str = "_loaded_mod_";
const BLOCK_SEPARATOR: &str = "\n\n";

/// Loader identifier suffix for a module name: `a.b` -> `a_b`, `.a` -> `a`.
///
/// Characters that cannot appear in a Lua identifier become `_`.
pub fn loader_id(name: &str) -> String {
    let id = name.replace('.', "_");
    let id = id.strip_prefix('_').unwrap_or(&id);
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Hands out loader function names, one per path.
///
/// Distinct paths whose names derive the same identifier (`a.b` and `a_b`) get a
/// numeric suffix, so every name keeps referring to the file it was defined for.
#[derive(Debug, Default)]
struct LoaderNames {
    by_path: HashMap<PathBuf, String>,
    taken: HashSet<String>,
}

impl LoaderNames {
    fn get(&self, path: &Path) -> Option<&str> {
        self.by_path.get(path).map(String::as_str)
    }

    fn assign(&mut self, name: &str, path: &Path) -> String {
        let base = format!("{LOADER_PREFIX}{}", loader_id(name));
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        if candidate != base {
            debug!(name, loader = %candidate, "loader name taken by another path");
        }
        self.taken.insert(candidate.clone());
        self.by_path.insert(path.to_path_buf(), candidate.clone());
        candidate
    }
}

fn definition(name: &str, loader: &str, content: &str) -> String {
    format!("-- module: \"{name}\"\nlocal function {loader}()\n{content}\nend\n")
}

fn registration(name: &str, loader: &str) -> String {
    format!("\n_G.package.loaded[\"{name}\"] = {loader}()")
}

/// Builds the bundled program from a postorder module list (entry file last).
///
/// Every dependency gets a loader function and a `package.loaded` registration.
/// A module whose path was already wrapped reuses that path's loader and only adds
/// its own registration. The entry file's code is appended unwrapped.
#[instrument(level = "debug", skip(project), fields(modules = project.len()))]
pub fn bundle(project: &[Module]) -> Result<Bundle, DomainError> {
    let (entry, dependencies) = project.split_last().ok_or(DomainError::EmptyProject)?;

    let mut loaders = LoaderNames::default();
    let mut modules: Vec<BundledModule> = Vec::with_capacity(project.len());
    for module in dependencies {
        let content = module
            .content
            .as_deref()
            .ok_or_else(|| DomainError::MissingContent {
                path: module.path.clone(),
            })?;

        let block = match loaders.get(&module.path) {
            Some(loader) => {
                debug!(name = %module.name, loader, "module already wrapped");
                registration(&module.name, loader)
            }
            None => {
                let loader = loaders.assign(&module.name, &module.path);
                definition(&module.name, &loader, content) + &registration(&module.name, &loader)
            }
        };

        modules.push(BundledModule {
            name: module.name.clone(),
            path: module.path.clone(),
            content: block,
        });
    }

    let entry_content = entry
        .content
        .clone()
        .ok_or_else(|| DomainError::MissingContent {
            path: entry.path.clone(),
        })?;
    modules.push(BundledModule {
        name: entry.name.clone(),
        path: entry.path.clone(),
        content: entry_content,
    });

    let source = modules.iter().map(|m| &m.content).join(BLOCK_SEPARATOR);

    Ok(Bundle { source, modules })
}
