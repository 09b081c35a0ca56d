use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "twinmark";
const LOCAL_RC: &str = ".twinmarkrc";

/// Defaults read from rc files and merged with command-line flags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub content_dir: Option<PathBuf>,
    pub excerpt_limit: Option<usize>,
    pub pretty: bool,
    pub verbose: bool,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches add up, values from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            content_dir: other
                .content_dir
                .clone()
                .or_else(|| self.content_dir.clone()),
            excerpt_limit: other.excerpt_limit.or(self.excerpt_limit),
            pretty: self.pretty || other.pretty,
            verbose: self.verbose || other.verbose,
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_DIR).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_DIR).join("config");
        }
    }

    PathBuf::from(LOCAL_RC)
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_RC)
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# twinmark defaults (saved with --save)".to_string()];
    if let Some(dir) = &flags.content_dir {
        lines.push(format!("--content-dir {}", dir.display()));
    }
    if let Some(limit) = flags.excerpt_limit {
        lines.push(format!("--excerpt-limit {limit}"));
    }
    if flags.pretty {
        lines.push("--pretty".to_string());
    }
    if flags.verbose {
        lines.push("--verbose".to_string());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list. Unknown tokens and malformed
/// values are skipped.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--pretty" => flags.pretty = true,
            "--verbose" | "-v" => flags.verbose = true,
            "--content-dir" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.content_dir = Some(PathBuf::from(next));
                    i += 1;
                }
            }
            "--excerpt-limit" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.excerpt_limit = next.parse().ok();
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--content-dir=") {
                    flags.content_dir = Some(PathBuf::from(value));
                } else if let Some(value) = token.strip_prefix("--excerpt-limit=") {
                    flags.excerpt_limit = value.parse().ok();
                }
            }
        }
        i += 1;
    }
    flags
}
