mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::io::{self, Write};
use std::process;

use cli_args::{Cli, Commands, SelectionOpts};
use hcli_core::{AppError, Config, MergeRequest};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => report_failure(&e, &mut io::stderr()),
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

/// Writes the one-line error report and returns the exit code. Quiet mode
/// silences logging only; a failing command always says why.
fn report_failure(err: &anyhow::Error, out: &mut dyn Write) -> i32 {
    log::debug!("Application failed: {:?}", err);
    let _ = writeln!(out, "{} {:#}", "Error:".red().bold(), err);
    exit_code_for(err)
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<AppError>() {
        Some(AppError::NoChanges) => 1,
        Some(AppError::NothingStaged) => 1,
        Some(AppError::NotARepository(_)) => 1,
        Some(AppError::Config(_)) => 1,
        Some(AppError::TomlParse(_)) => 1,
        Some(AppError::TomlSerialize(_)) => 1,
        Some(AppError::Io(_)) => 2,
        Some(AppError::FileRead { .. }) => 2,
        Some(AppError::FileWrite { .. }) => 2,
        Some(AppError::Decode { .. }) => 2,
        Some(AppError::ToolInvocationFailed { .. }) => 2,
        Some(AppError::ToolTimeout { .. }) => 2,
        Some(AppError::InvalidArgument(_)) => 5,
        Some(AppError::Glob(_)) => 5,
        Some(AppError::DurationParse(_)) => 5,
        Some(_) => 1,
        None => 1,
    }
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Completion(args) => {
            log::debug!("Executing 'completion' command...");
            commands::completion::handle_completion_command(&args, quiet)?;
        }
        Commands::Config(args) => {
            log::debug!("Executing 'config' command...");
            let config = load_config(cli.config.as_ref(), cli.no_config)?;
            commands::config::handle_config_command(&args, &config, quiet)?;
        }
        Commands::Merge(args) => {
            log::debug!("Executing 'merge' command...");
            let config = load_config(cli.config.as_ref(), cli.no_config)?;
            commands::merge::handle_merge_command(&args, &config, quiet)?;
        }
        Commands::Plan(args) => {
            log::debug!("Executing 'plan' command...");
            let config = load_config(cli.config.as_ref(), cli.no_config)?;
            commands::plan::handle_plan_command(&args, &config)?;
        }
        Commands::CommitPrompt(args) => {
            log::debug!("Executing 'commit-prompt' command...");
            let config = load_config(cli.config.as_ref(), cli.no_config)?;
            commands::commit_prompt::handle_commit_prompt_command(&args, &config, quiet)?;
        }
        Commands::Tree(args) => {
            log::debug!("Executing 'tree' command...");
            let config = load_config(cli.config.as_ref(), cli.no_config)?;
            commands::tree::handle_tree_command(&args, &config, quiet)?;
        }
    }
    Ok(())
}

pub fn load_config(config_file: Option<&String>, disable_config: bool) -> Result<Config> {
    let config_path = Config::resolve_config_path(config_file, disable_config)
        .context("Failed to resolve configuration path")?;

    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    log::trace!("Effective config: {:?}", config);
    Ok(config)
}

/// Builds the merge request from CLI selection flags layered over `[merge]`.
/// Config excludes come first, CLI excludes are appended; boolean flags can
/// only turn features on.
pub fn merge_request_with_cli_overrides(
    config: &Config,
    selection: &SelectionOpts,
    char_count: bool,
) -> MergeRequest {
    log::trace!("Applying CLI overrides to merge config...");
    let mut exclude_patterns = config.merge.exclude.clone();
    exclude_patterns.extend(selection.exclude.iter().cloned());

    MergeRequest {
        directory: selection.dir.clone(),
        exclude_patterns,
        additional_files: selection.files.clone(),
        include_docs: selection.docs || config.merge.include_docs,
        with_char_counts: char_count || config.merge.char_counts,
    }
}
