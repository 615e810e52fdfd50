use crate::cli_args::MergeArgs;
use crate::merge_request_with_cli_overrides;
use crate::output;
use anyhow::{Context, Result};
use colored::*;
use hcli_core::{Config, aggregate};
use log;

const MERGED_BANNER: &str = "----------Merged Files----------";

pub fn handle_merge_command(args: &MergeArgs, config: &Config, quiet: bool) -> Result<()> {
    let request = merge_request_with_cli_overrides(config, &args.selection, args.char_count);
    log::info!("Merging files under {}", request.directory.display());

    let git = config.git_for(&request.directory)?;
    let document = aggregate(&git, &request).context("Failed to merge files")?;

    if !quiet && !args.sink.stdout {
        println!("{}", MERGED_BANNER.green().bold());
    }
    output::emit(
        &document,
        &args.sink,
        &config.merge.output_filename,
        quiet,
    )
}
