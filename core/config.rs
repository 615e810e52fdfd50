use crate::error::{AppError, Result};
use crate::git::{DEFAULT_GIT_BINARY, GitCli};
use log;
use parse_duration::parse;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_DIR: &str = "h-cli";
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";
pub const DEFAULT_MERGE_OUTPUT: &str = "merged_files.txt";
pub const DEFAULT_PROMPT_OUTPUT: &str = "git_commit_msg.txt";
pub const DEFAULT_TREE_OUTPUT: &str = "git_tree.md";
pub const DEFAULT_GIT_TIMEOUT_TEXT: &str = "30s";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub commit_prompt: CommitPromptConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_false")]
    pub include_docs: bool,
    #[serde(default = "default_false")]
    pub char_counts: bool,
    #[serde(default = "default_merge_output")]
    pub output_filename: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommitPromptConfig {
    #[serde(default = "default_log_count")]
    pub log_count: usize,
    #[serde(default = "default_tree_depth")]
    pub tree_depth: usize,
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default = "default_prompt_output")]
    pub output_filename: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
    #[serde(default = "default_git_binary")]
    pub binary: String,
    #[serde(default = "default_git_timeout")]
    pub timeout: String,
}

/// Provider selection and credentials for downstream AI tooling. Loaded and
/// saved with the rest of the file; nothing in this crate reads it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AiConfig {
    #[serde(default = "default_ai_provider")]
    pub provider: String,
    #[serde(flatten, default)]
    pub keys: BTreeMap<String, String>,
}

fn default_false() -> bool {
    false
}
fn default_merge_output() -> String {
    DEFAULT_MERGE_OUTPUT.to_string()
}
fn default_prompt_output() -> String {
    DEFAULT_PROMPT_OUTPUT.to_string()
}
fn default_log_count() -> usize {
    5
}
fn default_tree_depth() -> usize {
    3
}
fn default_git_binary() -> String {
    DEFAULT_GIT_BINARY.to_string()
}
fn default_git_timeout() -> String {
    DEFAULT_GIT_TIMEOUT_TEXT.to_string()
}
fn default_ai_provider() -> String {
    "gemini".to_string()
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            include_docs: default_false(),
            char_counts: default_false(),
            output_filename: default_merge_output(),
        }
    }
}
impl Default for CommitPromptConfig {
    fn default() -> Self {
        Self {
            log_count: default_log_count(),
            tree_depth: default_tree_depth(),
            template: None,
            output_filename: default_prompt_output(),
        }
    }
}
impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: default_git_binary(),
            timeout: default_git_timeout(),
        }
    }
}
impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: default_ai_provider(),
            keys: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME))
    }

    /// The file to load, if any. An explicit path must exist; the default
    /// location is optional.
    pub fn resolve_config_path(
        cli_config_file: Option<&String>,
        cli_disable_config: bool,
    ) -> Result<Option<PathBuf>> {
        if cli_disable_config {
            log::debug!("Config file loading disabled via CLI flag.");
            return Ok(None);
        }

        match cli_config_file {
            Some(p_str) => {
                let path = PathBuf::from(shellexpand::tilde(p_str).as_ref());
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Specified config file not found at path: {}",
                        path.display()
                    )));
                }
                log::debug!("Using specified config file path: {}", path.display());
                Ok(Some(path))
            }
            None => match Self::default_config_path() {
                Some(default_path) if default_path.exists() => {
                    log::debug!("Using default config file path: {}", default_path.display());
                    Ok(Some(default_path))
                }
                Some(default_path) => {
                    log::debug!(
                        "No config file specified and default not found at: {}",
                        default_path.display()
                    );
                    Ok(None)
                }
                None => {
                    log::debug!("No user config directory on this platform.");
                    Ok(None)
                }
            },
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", config_path.display());
        let toml_content = fs::read_to_string(config_path).map_err(|e| AppError::FileRead {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&toml_content).map_err(|e| match e {
            AppError::TomlParse(msg) => AppError::TomlParse(format!(
                "Error parsing config file '{}': {}",
                config_path.display(),
                msg
            )),
            other => other,
        })
    }

    pub fn from_toml_str(toml_content: &str) -> Result<Self> {
        toml::from_str::<Config>(toml_content).map_err(|e| {
            AppError::TomlParse(format!("{}. Check TOML syntax and structure.", e))
        })
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Writes this configuration to `path`, creating parent directories.
    /// Refuses to replace an existing file unless `overwrite` is set.
    pub fn save_to_path(&self, path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            return Err(AppError::Config(format!(
                "Config file already exists at {}",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::FileWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::write(path, self.to_toml_string()?).map_err(|e| AppError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Configuration written to {}", path.display());
        Ok(())
    }

    pub fn get_git_timeout(&self) -> Result<Duration> {
        parse(&self.git.timeout).map_err(|e| {
            AppError::DurationParse(format!(
                "Invalid git timeout duration '{}': {}. Use format like '500ms', '30s'.",
                self.git.timeout, e
            ))
        })
    }

    pub fn git_for(&self, workdir: &Path) -> Result<GitCli> {
        Ok(GitCli::new(workdir)
            .with_binary(self.git.binary.clone())
            .with_timeout(self.get_git_timeout()?))
    }

    pub fn get_template_path(&self) -> Option<PathBuf> {
        self.commit_prompt
            .template
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
    }
}
