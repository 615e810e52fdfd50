use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Merge repository files and build git commit prompts for AI models.",
    long_about = "h collects the tracked files of a git repository (plus any extra files you name), \nfilters out lock files, images, docs and binaries, and merges the rest into one document. \nIt can also turn the staged changes into a commit-message prompt.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}",
    after_help = "EXAMPLES:\n  h merge -e target -f notes.txt\n  h plan --json\n  h gp -l 10 --stdout\n  h gt -d 2",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        help = "Silence informational messages and warnings."
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Path to the TOML config file (default: <config dir>/h-cli/config.toml).",
        value_name = "CONFIG_FILE",
        conflicts_with = "no_config"
    )]
    pub config: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Do not load any config file.",
        conflicts_with = "config"
    )]
    pub no_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        visible_alias = "m",
        about = "Merge tracked and additional files into one document."
    )]
    Merge(MergeArgs),

    #[command(
        visible_alias = "p",
        about = "Show how every candidate file would be classified."
    )]
    Plan(PlanArgs),

    #[command(
        name = "commit-prompt",
        visible_alias = "gp",
        about = "Build a commit-message prompt from the staged changes."
    )]
    CommitPrompt(CommitPromptArgs),

    #[command(visible_alias = "gt", about = "Print the repository file tree.")]
    Tree(TreeArgs),

    #[command(about = "Show the effective configuration or save the default one.")]
    Config(ConfigArgs),

    #[command(about = "Generate or save shell completion scripts.")]
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SelectionOpts {
    #[arg(
        short,
        long,
        default_value = ".",
        help = "Repository directory to work in.",
        value_name = "DIR",
        help_heading = "File Selection"
    )]
    pub dir: PathBuf,

    #[arg(
        short,
        long = "exclude",
        help = "Exclude paths containing this segment or matching this glob (repeatable).",
        value_name = "PATTERN",
        help_heading = "File Selection"
    )]
    pub exclude: Vec<String>,

    #[arg(
        short = 'f',
        long = "file",
        help = "Also include this file, tracked or not (repeatable).",
        value_name = "FILE",
        help_heading = "File Selection"
    )]
    pub files: Vec<PathBuf>,

    #[arg(
        long,
        help = "Include documentation files (*.md).",
        help_heading = "File Selection"
    )]
    pub docs: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SinkOpts {
    #[arg(
        short,
        long,
        help = "Write the result to this file instead of the temp directory.",
        value_name = "PATH",
        conflicts_with = "stdout",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        help = "Print the result to stdout instead of saving it.",
        conflicts_with = "output",
        help_heading = "Output"
    )]
    pub stdout: bool,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[command(flatten)]
    pub selection: SelectionOpts,

    #[arg(
        long,
        help = "Prefix every listed file with its character count.",
        help_heading = "Output"
    )]
    pub char_count: bool,

    #[command(flatten)]
    pub sink: SinkOpts,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub selection: SelectionOpts,

    #[arg(long, help = "Print the plan as JSON.", help_heading = "Output")]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CommitPromptArgs {
    #[arg(
        short,
        long,
        help = "Number of recent commits to include (default: from config, 5).",
        value_name = "N"
    )]
    pub logs: Option<usize>,

    #[arg(
        short = 'd',
        long,
        help = "Tree depth to include, 0 for unlimited (default: from config, 3).",
        value_name = "N"
    )]
    pub depth: Option<usize>,

    #[arg(long, default_value = ".", help = "Repository directory.", value_name = "DIR")]
    pub dir: PathBuf,

    #[arg(
        long,
        help = "Template file with {status}, {diff}, {logs} and {tree} placeholders.",
        value_name = "PATH"
    )]
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub sink: SinkOpts,
}

#[derive(Args, Debug, Clone)]
pub struct TreeArgs {
    #[arg(
        short = 'd',
        long,
        help = "Maximum depth, 0 for unlimited (default: from config, 3).",
        value_name = "N"
    )]
    pub depth: Option<usize>,

    #[arg(long, default_value = ".", help = "Repository directory.", value_name = "DIR")]
    pub dir: PathBuf,

    #[command(flatten)]
    pub sink: SinkOpts,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    #[arg(
        long,
        value_parser = ["fish", "bash", "zsh"],
        help = "Shell to generate completions for (default: fish)."
    )]
    pub shell: Option<String>,
    #[arg(
        long,
        help = "Save the script to the shell's standard completion directory."
    )]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        long,
        help = "Write the default configuration to the default config location."
    )]
    pub save: bool,
}
