use crate::error::{AppError, Result};
use crate::structure;
use log;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

pub const DEFAULT_GIT_BINARY: &str = "git";
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Repository introspection used by the merge and commit-prompt pipelines.
pub trait Vcs {
    /// Fails with `NotARepository` unless the working directory is inside a
    /// work tree.
    fn ensure_repository(&self) -> Result<()>;
    /// Tracked files relative to the working directory, in listing order.
    fn tracked_files(&self) -> Result<Vec<PathBuf>>;
    fn status(&self) -> Result<String>;
    fn unstaged_diff(&self) -> Result<String>;
    fn staged_diff(&self) -> Result<String>;
    /// At most `count` one-line, non-merge entries, newest first. Short or
    /// empty history is not an error.
    fn recent_logs(&self, count: usize) -> Result<Vec<String>>;

    fn tree(&self, depth: usize) -> Result<String> {
        let files = self.tracked_files()?;
        Ok(structure::render_tree(&files, depth))
    }
}

/// Runs the `git` executable against a fixed working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
    workdir: PathBuf,
    timeout: Duration,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: DEFAULT_GIT_BINARY.to_string(),
            workdir: workdir.into(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn execute(&self, args: &[&str]) -> Result<GitOutput> {
        let subcommand = args.join(" ");
        log::debug!("Running {} {} in {}", self.binary, subcommand, self.workdir.display());

        // Untranslated output regardless of the caller's locale.
        let mut child = Command::new(&self.binary)
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .env("LC_ALL", "C")
            .env("LANGUAGE", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AppError::tool(&subcommand, format!("failed to spawn {}: {}", self.binary, e)))?;

        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                log::error!("git {} timed out after {:?}", subcommand, self.timeout);
                return Err(AppError::ToolTimeout {
                    subcommand,
                    timeout: self.timeout,
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AppError::tool(subcommand, format!("failed waiting on git: {}", e)));
            }
        };

        Ok(GitOutput {
            code: status.code(),
            stdout: join_reader(stdout_handle, &subcommand)?,
            stderr: join_reader(stderr_handle, &subcommand)?,
            subcommand,
        })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.execute(args)?;
        if output.code != Some(0) {
            return Err(output.into_failure());
        }
        Ok(output.stdout)
    }

    /// False on an unborn branch (fresh `git init`), decided by exit code alone.
    fn has_commits(&self) -> Result<bool> {
        let output = self.execute(&["rev-parse", "--verify", "-q", "HEAD"])?;
        match output.code {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(output.into_failure()),
        }
    }
}

struct GitOutput {
    subcommand: String,
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl GitOutput {
    /// Keeps the first non-empty stderr line; the rest (usage dumps, hints) goes
    /// to the debug log.
    fn into_failure(self) -> AppError {
        let code = self
            .code
            .map_or_else(|| "terminated".to_string(), |c| c.to_string());
        log::debug!("git {} exited with {}: {}", self.subcommand, code, self.stderr.trim());
        let first_line = self
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no error output");
        AppError::tool(
            self.subcommand,
            format!("exit status {}: {}", code, first_line),
        )
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(handle: Option<JoinHandle<io::Result<Vec<u8>>>>, subcommand: &str) -> Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| AppError::tool(subcommand, "output reader panicked"))?
        .map_err(|e| AppError::tool(subcommand, format!("failed to read output: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

impl Vcs for GitCli {
    fn ensure_repository(&self) -> Result<()> {
        let output = self.execute(&["rev-parse", "--is-inside-work-tree"])?;
        if output.code == Some(0) && output.stdout.trim() == "true" {
            return Ok(());
        }
        log::debug!("rev-parse: {}", output.stderr.trim());
        Err(AppError::NotARepository(self.workdir.clone()))
    }

    fn tracked_files(&self) -> Result<Vec<PathBuf>> {
        let out = self.run(&["ls-files", "-z"])?;
        Ok(out
            .split('\0')
            .filter(|entry| !entry.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    fn status(&self) -> Result<String> {
        Ok(self.run(&["status"])?.trim_end().to_string())
    }

    fn unstaged_diff(&self) -> Result<String> {
        Ok(self.run(&["diff"])?.trim_end().to_string())
    }

    fn staged_diff(&self) -> Result<String> {
        Ok(self.run(&["diff", "--staged"])?.trim_end().to_string())
    }

    fn recent_logs(&self, count: usize) -> Result<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if !self.has_commits()? {
            log::debug!("Repository has no commits yet.");
            return Ok(Vec::new());
        }
        let limit = format!("-{}", count);
        let out = self.run(&["log", &limit, "--oneline", "--no-merges"])?;
        Ok(out.lines().map(str::to_string).collect())
    }
}

/// Repository state captured for one commit-prompt invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitSnapshot {
    pub status: String,
    pub staged_diff: String,
    pub recent_logs: Vec<String>,
    pub tree: String,
}

/// Fails with `NotARepository` outside a work tree, `NoChanges` when nothing
/// differs, `NothingStaged` when changes exist but none are staged. Returns the
/// staged diff otherwise.
pub fn check_changes(vcs: &dyn Vcs) -> Result<String> {
    vcs.ensure_repository()?;
    let unstaged = vcs.unstaged_diff()?;
    let staged = vcs.staged_diff()?;
    if unstaged.trim().is_empty() && staged.trim().is_empty() {
        return Err(AppError::NoChanges);
    }
    if staged.trim().is_empty() {
        return Err(AppError::NothingStaged);
    }
    Ok(staged)
}

/// Checks preconditions, then collects status, logs and tree. The first failing
/// git call aborts the whole capture.
pub fn capture_snapshot(vcs: &dyn Vcs, log_count: usize, tree_depth: usize) -> Result<GitSnapshot> {
    log::debug!("Checking for staged changes...");
    let staged_diff = check_changes(vcs)?;

    log::debug!("Collecting git metadata (logs: {}, depth: {})...", log_count, tree_depth);
    let status = vcs.status()?;
    let recent_logs = vcs.recent_logs(log_count)?;
    let tree = vcs.tree(tree_depth)?;

    Ok(GitSnapshot {
        status,
        staged_diff,
        recent_logs,
        tree,
    })
}
