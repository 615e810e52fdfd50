pub mod classify;
pub mod config;
pub mod error;
pub mod gather;
pub mod git;
pub mod merge;
pub mod prompt;
pub mod reader;
pub mod sink;
pub mod structure;

pub use classify::{Classification, ClassifyPolicy, is_binary_file};
pub use config::Config;
pub use error::{AppError, Result};
pub use gather::{CandidatePath, Origin, collect_candidates};
pub use git::{GitCli, GitSnapshot, Vcs, capture_snapshot, check_changes};
pub use merge::{MergeRequest, PlanEntry, aggregate, plan};
pub use prompt::{build_commit_prompt, compose, default_commit_template, load_template};
pub use reader::FileRecord;
pub use sink::{FileSink, Sink, TempFileSink};
pub use structure::{render_structure, render_tree};
