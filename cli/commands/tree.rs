use crate::cli_args::TreeArgs;
use crate::output;
use anyhow::{Context, Result};
use hcli_core::config::DEFAULT_TREE_OUTPUT;
use hcli_core::{Config, Vcs};

pub fn handle_tree_command(args: &TreeArgs, config: &Config, quiet: bool) -> Result<()> {
    let depth = args.depth.unwrap_or(config.commit_prompt.tree_depth);
    let git = config.git_for(&args.dir)?;
    let tree = git.tree(depth).context("Failed to list repository tree")?;

    if args.sink.stdout || args.sink.output.is_some() {
        return output::emit(&tree, &args.sink, DEFAULT_TREE_OUTPUT, quiet);
    }
    // Bare `h gt` shows the tree and keeps a copy in the temp dir.
    output::write_to_stdout(&tree)?;
    output::emit(&tree, &args.sink, DEFAULT_TREE_OUTPUT, quiet)
}
