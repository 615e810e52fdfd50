pub mod commit_prompt;
pub mod completion;
pub mod config;
pub mod merge;
pub mod plan;
pub mod tree;
