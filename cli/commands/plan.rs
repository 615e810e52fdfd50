use crate::cli_args::PlanArgs;
use crate::merge_request_with_cli_overrides;
use crate::output::{print_plan_table, write_to_stdout};
use anyhow::{Context, Result};
use hcli_core::{Config, plan};
use log;

pub fn handle_plan_command(args: &PlanArgs, config: &Config) -> Result<()> {
    let request = merge_request_with_cli_overrides(config, &args.selection, false);
    let git = config.git_for(&request.directory)?;
    let entries = plan(&git, &request).context("Failed to classify candidate files")?;
    log::debug!("Plan has {} entries.", entries.len());

    if args.json {
        let json = serde_json::to_string_pretty(&entries)
            .context("Failed to serialize plan to JSON")?;
        write_to_stdout(&json)
    } else {
        print_plan_table(&entries)
    }
}
