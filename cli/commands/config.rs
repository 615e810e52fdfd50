use crate::cli_args::ConfigArgs;
use crate::output::write_to_stdout;
use anyhow::{Context, Result};
use colored::*;
use hcli_core::Config;
use std::io::{self, Write};

pub fn handle_config_command(args: &ConfigArgs, effective: &Config, quiet: bool) -> Result<()> {
    if !args.save {
        let toml = effective
            .to_toml_string()
            .context("Failed to serialize effective configuration")?;
        return write_to_stdout(&toml);
    }

    let save_path = Config::default_config_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine the user config directory."))?;

    let overwrite = save_path.exists();
    if overwrite {
        if quiet {
            anyhow::bail!(
                "Target file '{}' exists. Overwrite prevented in quiet mode.",
                save_path.display()
            );
        }
        print!(
            "{} Config file already exists at '{}'. Overwrite? [{}/{}] ",
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

    Config::default()
        .save_to_path(&save_path, overwrite)
        .context("Failed to save default configuration")?;
    if !quiet {
        println!(
            "{} Default config saved to: {}",
            "✅".green(),
            save_path.display().to_string().blue()
        );
    }
    Ok(())
}
