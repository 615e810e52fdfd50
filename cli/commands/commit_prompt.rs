use crate::cli_args::CommitPromptArgs;
use crate::output;
use anyhow::{Context, Result};
use hcli_core::{Config, build_commit_prompt, load_template};
use log;

pub fn handle_commit_prompt_command(
    args: &CommitPromptArgs,
    config: &Config,
    quiet: bool,
) -> Result<()> {
    let log_count = args.logs.unwrap_or(config.commit_prompt.log_count);
    let tree_depth = args.depth.unwrap_or(config.commit_prompt.tree_depth);
    let template_path = args.template.clone().or_else(|| config.get_template_path());
    log::debug!(
        "Commit prompt: logs={}, depth={}, template={:?}",
        log_count,
        tree_depth,
        template_path
    );

    let template = load_template(template_path.as_deref())?;
    let git = config.git_for(&args.dir)?;
    // Precondition errors (nothing staged, no changes) pass through untouched
    // so the caller sees the plain message.
    let prompt = build_commit_prompt(&git, &template, log_count, tree_depth)?;

    output::emit(
        &prompt,
        &args.sink,
        &config.commit_prompt.output_filename,
        quiet,
    )
    .context("Failed to deliver commit prompt")
}
