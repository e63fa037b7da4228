//! Command handlers

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{LoadOutput, PreviewOptions};
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{config_template, global_config_path, project_config_path, Settings};
use crate::domain::TreeStyle;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::absolutize;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Bundle {
            entry,
            output,
            quiet,
        }) => cmd_bundle(cli, entry, output.as_deref(), *quiet),
        Some(Commands::Tree {
            entry,
            relative,
            ascii,
        }) => cmd_tree(cli, entry, *relative, *ascii),
        Some(Commands::Files { entry }) => cmd_files(cli, entry),
        Some(Commands::Load { line }) => cmd_load(cli, line),
        Some(Commands::Specs { dir, output }) => cmd_specs(cli, dir, output.as_deref()),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `luabundle --help`".into(),
        )),
    }
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir().map_err(|e| InfraError::io("current directory", e).into())
}

fn explicit_project_dir(cli: &Cli) -> CliResult<Option<&Path>> {
    match cli.project_dir.as_deref() {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "project directory not found: {}",
            dir.display()
        ))),
        dir => Ok(dir),
    }
}

/// Settings are looked up in `-C` or else in `fallback_dir`.
fn container(cli: &Cli, fallback_dir: Option<&Path>) -> CliResult<ServiceContainer> {
    let project_dir = explicit_project_dir(cli)?.or(fallback_dir);
    debug!("container: project_dir={:?}", project_dir);
    let settings = Settings::load(project_dir)?;
    Ok(ServiceContainer::new(settings))
}

fn container_for_entry(cli: &Cli, entry: &Path) -> CliResult<ServiceContainer> {
    let entry = absolutize(entry, &current_dir()?);
    container(cli, entry.parent())
}

fn preview_options(settings: &Settings) -> PreviewOptions {
    PreviewOptions {
        style: TreeStyle::from(settings.tree.style),
        relative: settings.tree.relative,
        label: Some(output::main_label(&settings.main_label)),
    }
}

fn emit(
    container: &ServiceContainer,
    out: &LoadOutput,
    target: Option<&Path>,
    quiet: bool,
) -> CliResult<()> {
    if !quiet {
        output::header("The following files will be bundled:");
        let preview = container
            .loader
            .preview(&out.project, &preview_options(&container.settings));
        output::tree(&preview);
    }

    match target {
        Some(path) => {
            container.loader.write_bundle(&out.bundle, path)?;
            output::success(&format!("Bundle written: {}", path.display()));
        }
        None => output::info(&out.bundle.source),
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_bundle(cli: &Cli, entry: &Path, target: Option<&Path>, quiet: bool) -> CliResult<()> {
    let container = container_for_entry(cli, entry)?;
    if !quiet {
        output::progress("Loading...", &entry.display());
    }
    let out = container.loader.load(&absolutize(entry, &current_dir()?))?;
    emit(&container, &out, target, quiet)
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, entry: &Path, relative: bool, ascii: bool) -> CliResult<()> {
    let container = container_for_entry(cli, entry)?;
    let project = container
        .loader
        .resolve(&absolutize(entry, &current_dir()?))?;

    let mut options = preview_options(&container.settings);
    options.relative |= relative;
    if ascii {
        options.style = TreeStyle::ASCII;
    }
    output::info(&container.loader.preview(&project, &options));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_files(cli: &Cli, entry: &Path) -> CliResult<()> {
    let container = container_for_entry(cli, entry)?;
    let project = container
        .loader
        .resolve(&absolutize(entry, &current_dir()?))?;
    for path in project.paths() {
        output::info(&path.display());
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_load(cli: &Cli, line: &str) -> CliResult<()> {
    let cwd = current_dir()?;
    let container = container(cli, Some(&cwd))?;
    let out = container.loader.load_directive(line, &cwd)?;
    emit(&container, &out, None, false)
}

#[instrument(skip(cli))]
fn cmd_specs(cli: &Cli, dir: &Path, target: Option<&Path>) -> CliResult<()> {
    let cwd = current_dir()?;
    let container = container(cli, Some(&cwd))?;
    let out_dir = absolutize(target.unwrap_or(&container.settings.build_dir), &cwd);
    let dir = absolutize(dir, &cwd);

    let report = container.loader.bundle_specs(&dir, &out_dir)?;
    for path in &report.bundled {
        output::success(&path.display());
    }
    for (path, reason) in &report.failed {
        output::failure(&format!("{}: {}", path.display(), reason));
    }
    if report.bundled.is_empty() && report.failed.is_empty() {
        output::warning(&format!(
            "no *{} files in {}",
            container.settings.spec_suffix,
            dir.display()
        ));
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::Failed(format!(
            "{} of {} spec files failed",
            report.failed.len(),
            report.failed.len() + report.bundled.len()
        )))
    }
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    let project_dir = match explicit_project_dir(cli)? {
        Some(dir) => dir.to_path_buf(),
        None => current_dir()?,
    };

    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(&project_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global:  {}", describe(&path))),
                None => output::info("global:  <no config directory>"),
            }
            let local = project_config_path(&project_dir);
            output::info(&format!("project: {}", describe(&local)));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("no global config directory available".into()))?
            } else {
                project_config_path(&project_dir)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_path_context("create config directory", parent)?;
            }
            std::fs::write(&path, config_template()).with_path_context("write config", &path)?;
            output::success(&format!("Created {}", path.display()));
        }
    }
    Ok(())
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
