use crate::error::{AppError, Result};
use crate::git::{self, GitSnapshot, Vcs};
use log;
use std::fs;
use std::path::Path;

pub const EMPTY_HISTORY_TEXT: &str = "No commit history";

static DEFAULT_COMMIT_TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../data/commit_prompt.txt"
));

pub fn default_commit_template() -> &'static str {
    DEFAULT_COMMIT_TEMPLATE
}

/// Reads a template from disk, or returns the embedded one.
pub fn load_template(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => {
            log::debug!("Loading commit prompt template from {}", p.display());
            fs::read_to_string(p).map_err(|e| AppError::FileRead {
                path: p.to_path_buf(),
                source: e,
            })
        }
        None => Ok(DEFAULT_COMMIT_TEMPLATE.to_string()),
    }
}

/// Substitutes `{status}`, `{diff}`, `{logs}` and `{tree}` in one pass.
/// Substituted text is never rescanned; other braces are copied as-is.
pub fn compose(template: &str, snapshot: &GitSnapshot) -> String {
    let logs = if snapshot.recent_logs.is_empty() {
        EMPTY_HISTORY_TEXT.to_string()
    } else {
        snapshot.recent_logs.join("\n")
    };
    let placeholders: [(&str, &str); 4] = [
        ("{status}", snapshot.status.as_str()),
        ("{diff}", snapshot.staged_diff.as_str()),
        ("{logs}", logs.as_str()),
        ("{tree}", snapshot.tree.as_str()),
    ];

    let mut out = String::with_capacity(template.len() + snapshot.staged_diff.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        match placeholders.iter().find(|(key, _)| tail.starts_with(key)) {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len()..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn build_commit_prompt(
    vcs: &dyn Vcs,
    template: &str,
    log_count: usize,
    tree_depth: usize,
) -> Result<String> {
    let snapshot = git::capture_snapshot(vcs, log_count, tree_depth)?;
    Ok(compose(template, &snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::testing::FakeVcs;

    fn snapshot() -> GitSnapshot {
        GitSnapshot {
            status: "On branch main".to_string(),
            staged_diff: "+fn {diff}() {}".to_string(),
            recent_logs: vec!["a1 init".to_string(), "b2 more".to_string()],
            tree: "src/\n  lib.rs".to_string(),
        }
    }

    #[test]
    fn substitutes_all_placeholders() {
        let out = compose("S={status}|D={diff}|L={logs}|T={tree}", &snapshot());
        assert_eq!(
            out,
            "S=On branch main|D=+fn {diff}() {}|L=a1 init\nb2 more|T=src/\n  lib.rs"
        );
    }

    #[test]
    fn leaves_other_braces_and_shell_characters_alone() {
        let out = compose("`{unknown}` {status}! {", &snapshot());
        assert_eq!(out, "`{unknown}` On branch main! {");
    }

    #[test]
    fn empty_history_is_spelled_out() {
        let mut snap = snapshot();
        snap.recent_logs.clear();
        assert_eq!(compose("{logs}", &snap), EMPTY_HISTORY_TEXT);
    }

    #[test]
    fn default_template_has_every_placeholder() {
        for key in ["{status}", "{diff}", "{logs}", "{tree}"] {
            assert!(default_commit_template().contains(key), "{key}");
        }
    }

    #[test]
    fn build_prompt_fails_without_staged_changes() {
        let vcs = FakeVcs {
            unstaged: "+x".to_string(),
            ..FakeVcs::with_tracked(&["a.txt"])
        };
        let err = build_commit_prompt(&vcs, default_commit_template(), 5, 3).unwrap_err();
        assert!(matches!(err, AppError::NothingStaged));
    }

    #[test]
    fn build_prompt_embeds_snapshot() {
        let vcs = FakeVcs {
            status: "M a.txt".to_string(),
            staged: "+hello".to_string(),
            ..FakeVcs::with_tracked(&["a.txt"])
        };
        let out = build_commit_prompt(&vcs, "{status}\n{diff}\n{logs}\n{tree}", 5, 3).unwrap();
        assert_eq!(out, "M a.txt\n+hello\nNo commit history\na.txt");
    }
}
