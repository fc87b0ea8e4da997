//! Command dispatch
//!
//! Every command loads the layered settings, builds the service container and
//! prints through the `output` helpers.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{AnalysisResponse, ApplicationError};
use crate::cli::args::{Cli, Commands, ConfigCommands, RequestArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, project_config_path, Settings};
use crate::domain::{NodeId, Scene, SceneTreeConvert, Topology};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute(cli: Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, run `rigmerge --help`".to_string(),
        ));
    };
    let project_dir = cli
        .project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok());

    match command {
        Commands::Completion { shell } => {
            print_completions(*shell);
            Ok(())
        }
        Commands::Info => {
            print_info();
            Ok(())
        }
        Commands::Analyze { request, output } => {
            cmd_analyze(&container(project_dir.as_deref())?, request, output.as_deref())
        }
        Commands::Merge { request, output } => {
            cmd_merge(&container(project_dir.as_deref())?, request, output.as_deref())
        }
        Commands::Duplicates { input } => cmd_duplicates(&container(project_dir.as_deref())?, input),
        Commands::Tree { input } => cmd_tree(&container(project_dir.as_deref())?, input),
        Commands::Config { command } => {
            cmd_config(&container(project_dir.as_deref())?, command, project_dir.as_deref())
        }
    }
}

fn container(project_dir: Option<&Path>) -> CliResult<ServiceContainer> {
    let settings = Settings::load(project_dir)?;
    debug!("settings: {:?}", settings);
    Ok(ServiceContainer::new(settings))
}

fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn print_info() {
    let cmd = Cli::command();
    if let Some(a) = cmd.get_author() {
        output::info(&format!("AUTHOR: {}", a));
    }
    if let Some(v) = cmd.get_version() {
        output::info(&format!("VERSION: {}", v));
    }
}

fn print_summary(title: &str, response: &AnalysisResponse) {
    output::header(title);
    output::count("referenced clothing bones", response.referenced_clothing_bones);
    output::count("bones moved", response.estimated_moved_bones);
    output::count("bones renamed", response.estimated_renamed_bones);
    output::count("meshes moved", response.estimated_moved_smrs);
    output::count("meshes renamed", response.estimated_renamed_smrs);
    output::count("objects deleted", response.estimated_deleted_objects);
    for warning in &response.warnings {
        output::warning(warning);
    }
}

fn print_hierarchy(scene: &Scene, root: NodeId) {
    if scene.contains(root) {
        output::info(&scene.to_tree_string(root));
    }
}

#[instrument(skip(services))]
fn cmd_analyze(
    services: &ServiceContainer,
    args: &RequestArgs,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let analysis = &services.analysis;
    match output_path {
        Some(path) => {
            let response = analysis.analyze_file(&args.input, path, args.suffix.as_deref())?;
            print_summary("Merge analysis", &response);
            output::action("Written", &path.display());
        }
        None => {
            let request = analysis.load_request(&args.input)?;
            let response = analysis.analyze(&request, args.suffix.as_deref())?;
            output::info(&analysis.render_response(&response)?);
        }
    }
    Ok(())
}

#[instrument(skip(services))]
fn cmd_merge(
    services: &ServiceContainer,
    args: &RequestArgs,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let analysis = &services.analysis;
    let request = analysis.load_request(&args.input)?;
    let (imported, outcome) = analysis.merge(&request, args.suffix.as_deref())?;
    let response = AnalysisResponse::from(&outcome.report);

    print_summary("Merge result", &response);
    if services.settings.show_tree {
        output::header("Avatar");
        print_hierarchy(&imported.scene, imported.avatar_root);
        if imported.scene.contains(imported.clothing_root) {
            output::header("Clothing (kept)");
            print_hierarchy(&imported.scene, imported.clothing_root);
        }
    }
    if let Some(path) = output_path {
        analysis.write_response(&response, path)?;
        output::action("Written", &path.display());
    }
    Ok(())
}

#[instrument(skip(services))]
fn cmd_duplicates(services: &ServiceContainer, input: &Path) -> CliResult<()> {
    let analysis = &services.analysis;
    let duplicates = analysis.duplicates(&analysis.load_request(input)?)?;
    if duplicates.is_empty() {
        output::success("no duplicate bone names");
        return Ok(());
    }
    for (label, names) in [("avatar", &duplicates.avatar), ("clothing", &duplicates.clothing)] {
        if names.is_empty() {
            output::success_detail(&format!("{}: unique", label));
        } else {
            output::failure(&format!("{}: {}", label, names.join(", ")));
        }
    }
    Ok(())
}

#[instrument(skip(services))]
fn cmd_tree(services: &ServiceContainer, input: &Path) -> CliResult<()> {
    let imported = services
        .analysis
        .load_request(input)?
        .import()
        .map_err(ApplicationError::from)?;
    output::header("Avatar");
    print_hierarchy(&imported.scene, imported.avatar_root);
    output::header("Clothing");
    print_hierarchy(&imported.scene, imported.clothing_root);
    Ok(())
}

fn cmd_config(
    services: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&services.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = config_target(*global, project_dir)?;
            if services.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            services
                .fs
                .ensure_parent(&path)
                .and_then(|()| services.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            let global = global_config_path();
            let project = project_dir.map(project_config_path);
            for (label, path) in [("global", global), ("project", project)] {
                match path {
                    Some(p) if services.fs.exists(&p) => {
                        output::success_detail(&format!("{}: {}", label, p.display()))
                    }
                    Some(p) => output::failure(&format!("{}: {} (not found)", label, p.display())),
                    None => output::failure(&format!("{}: unavailable", label)),
                }
            }
            Ok(())
        }
    }
}

fn config_target(global: bool, project_dir: Option<&Path>) -> CliResult<PathBuf> {
    if global {
        global_config_path()
            .ok_or_else(|| CliError::Usage("cannot determine config directory".to_string()))
    } else {
        project_dir
            .map(project_config_path)
            .ok_or_else(|| CliError::InvalidArgs("no project directory".to_string()))
    }
}
