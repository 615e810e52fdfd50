use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use colored::*;
use hcli_core::AppError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli_args::{Cli, CompletionArgs};

const DEFAULT_SHELL: &str = "fish";

fn parse_shell(name: &str) -> Result<Shell, AppError> {
    match name.to_lowercase().as_str() {
        "fish" => Ok(Shell::Fish),
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        _ => Err(AppError::InvalidArgument(format!(
            "Unsupported shell for completion: {}",
            name
        ))),
    }
}

/// Where each shell picks up user completions, with the file name it expects.
fn completion_target(shell: Shell, bin_name: &str) -> Option<PathBuf> {
    match shell {
        Shell::Fish => dirs::config_dir()
            .map(|p| p.join("fish").join("completions").join(format!("{}.fish", bin_name))),
        Shell::Bash => dirs::config_dir()
            .map(|p| p.join("bash_completion.d").join(format!("{}.bash", bin_name))),
        Shell::Zsh => dirs::data_local_dir()
            .map(|p| p.join("zsh").join("site-functions").join(format!("_{}", bin_name))),
        _ => None,
    }
}

pub fn handle_completion_command(args: &CompletionArgs, quiet: bool) -> Result<()> {
    let shell_name = args.shell.as_deref().unwrap_or(DEFAULT_SHELL);
    let shell = parse_shell(shell_name)?;

    let mut command = Cli::command();
    let bin_name = command.get_name().to_string();

    if !args.save {
        generate(shell, &mut command, bin_name, &mut io::stdout());
        return Ok(());
    }

    let save_path = completion_target(shell, &bin_name)
        .ok_or_else(|| anyhow::anyhow!("Could not determine standard completion directory."))?;

    if save_path.exists() {
        if quiet {
            anyhow::bail!(
                "Target file '{}' exists. Overwrite prevented in quiet mode.",
                save_path.display()
            );
        }
        print!(
            "{} Completion file already exists at '{}'. Overwrite? [{}/{}] ",
            "⚠️".yellow(),
            save_path.display().to_string().cyan(),
            "y".green(),
            "N".red()
        );
        io::stdout().flush().context("Failed to flush stdout")?;
        let mut response = String::new();
        io::stdin()
            .read_line(&mut response)
            .context("Failed to read user input")?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Save cancelled.");
            return Ok(());
        }
    }

    if let Some(save_dir) = save_path.parent() {
        fs::create_dir_all(save_dir)
            .with_context(|| format!("Failed to create directory {}", save_dir.display()))?;
    }
    let mut file = File::create(&save_path)
        .with_context(|| format!("Failed to create file {}", save_path.display()))?;
    generate(shell, &mut command, bin_name, &mut file);

    if !quiet {
        println!(
            "{} {} completions saved to: {}",
            "✅".green(),
            shell_name.cyan(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_shells_parse_case_insensitively() {
        assert_eq!(parse_shell("ZSH").unwrap(), Shell::Zsh);
        assert!(matches!(
            parse_shell("powershell"),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zsh_target_uses_underscore_prefix() {
        if let Some(path) = completion_target(Shell::Zsh, "h") {
            assert!(path.ends_with("zsh/site-functions/_h"));
        }
    }
}
