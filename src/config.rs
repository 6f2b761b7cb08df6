use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigIssue, IssueKind, PublishError, Result};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "notepublish.toml";
/// File name looked up in the user config directory.
pub const USER_CONFIG_FILE: &str = ".notepublish.toml";

/// Represents the complete configuration for note-publish.
///
/// The three directory paths and `also_sync_markdown` are the user-facing
/// settings; the sections tune how the build and git steps are issued.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Static-site generator project directory (build runs here).
    #[serde(default)]
    pub generator_project_path: String,

    /// Markdown notes directory fed to the generator.
    #[serde(default)]
    pub markdown_source_path: String,

    /// Directory the generator writes html into.
    #[serde(default)]
    pub html_output_path: String,

    /// Also commit and push the markdown source after publishing the site.
    #[serde(default)]
    pub also_sync_markdown: bool,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_build_command() -> String {
    "npx quartz build -d {source} -o {output}".to_string()
}

/// How the static-site generator is invoked.
///
/// `command` is a shell script template; `{source}` and `{output}` are
/// replaced by the quoted markdown source and html output paths.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GeneratorConfig {
    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default = "default_build_command")]
    pub command: String,

    /// Directories prepended to `PATH` for the build (e.g. a node version manager bin dir).
    #[serde(default)]
    pub path_prepend: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            shell: default_shell(),
            command: default_build_command(),
            path_prepend: Vec::new(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

/// Remote and branch the git steps push to.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Repository the built site is committed in. Defaults to the generator project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_repository: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            branch: default_branch(),
            site_repository: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_descriptor_file() -> String {
    "vercel.json".to_string()
}

/// Deployment descriptor written into the html output after a build.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeployConfig {
    #[serde(default = "default_true")]
    pub write_descriptor: bool,

    #[serde(default = "default_descriptor_file")]
    pub descriptor_file: String,

    #[serde(default = "default_true")]
    pub clean_urls: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            write_descriptor: true,
            descriptor_file: default_descriptor_file(),
            clean_urls: true,
        }
    }
}

/// Expands a leading `~` in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).into_owned())
}

impl Config {
    pub fn generator_project_dir(&self) -> PathBuf {
        expand_path(&self.generator_project_path)
    }

    pub fn markdown_source_dir(&self) -> PathBuf {
        expand_path(&self.markdown_source_path)
    }

    pub fn html_output_dir(&self) -> PathBuf {
        expand_path(&self.html_output_path)
    }

    /// Repository the built site is staged, committed and pushed in.
    pub fn site_repository_dir(&self) -> PathBuf {
        match self.site_repository_override() {
            Some(repo) => expand_path(repo),
            None => self.generator_project_dir(),
        }
    }

    /// `git.site_repository`, unless it is unset or blank.
    pub fn site_repository_override(&self) -> Option<&str> {
        self.git
            .site_repository
            .as_deref()
            .filter(|repo| !repo.trim().is_empty())
    }

    /// Checks the three required directories.
    ///
    /// Returns one issue per field that is empty, missing, or not a directory.
    /// An empty list means the configuration can be used for a publish run.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        [
            ("generator_project_path", &self.generator_project_path),
            ("markdown_source_path", &self.markdown_source_path),
            ("html_output_path", &self.html_output_path),
        ]
        .into_iter()
        .filter_map(|(field, raw)| check_dir(field, raw))
        .collect()
    }

    /// Like [`Config::validate`], but as a `Result`.
    pub fn ensure_valid(&self) -> Result<()> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(PublishError::InvalidConfig(issues))
        }
    }
}

fn check_dir(field: &'static str, raw: &str) -> Option<ConfigIssue> {
    if raw.trim().is_empty() {
        return Some(ConfigIssue {
            field,
            problem: IssueKind::Empty,
        });
    }

    let path = expand_path(raw);
    let problem = if !path.exists() {
        IssueKind::Missing(path)
    } else if !path.is_dir() {
        IssueKind::NotADirectory(path)
    } else {
        return None;
    };

    Some(ConfigIssue { field, problem })
}

/// Path of the per-user config file, if a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(USER_CONFIG_FILE))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `notepublish.toml` in current directory
/// 3. `.notepublish.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        match user_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        }
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        PublishError::config(format!("cannot read {}: {}", path.display(), e))
    })?;

    toml::from_str(&config_str)
        .map_err(|e| PublishError::config(format!("cannot parse {}: {}", path.display(), e)))
}

/// Writes configuration to `path` as TOML, creating parent directories.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| PublishError::config(format!("cannot serialize config: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(path, contents)?;
    Ok(())
}
