use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "OAIRESP_CONFIG";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
    pub output: Option<String>,
    pub env_file: Option<PathBuf>,
    pub pause: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl ProfileConfig {
    pub fn output_mode(&self) -> Result<Option<OutputMode>, String> {
        self.output
            .as_deref()
            .map(|value| {
                OutputMode::parse(value).ok_or_else(|| {
                    format!("Invalid profile output '{value}'. Supported values: text, json.")
                })
            })
            .transpose()
    }
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let path = config_path()?;
    let config = read_config(&path)?;
    find_profile(config, name, &path)
}

/// Checks that the config file parses and, when given, that `profile` exists
/// and holds valid values. Returns the checked path.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let path = config_path()?;
    let config = read_config(&path)?;

    if let Some(name) = profile {
        let profile = find_profile(config, name, &path)?;
        profile.output_mode()?;
    } else if let Some(profiles) = &config.profiles {
        for profile in profiles.values() {
            profile.output_mode()?;
        }
    }

    Ok(path)
}

fn read_config(path: &Path) -> Result<ConfigFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;
    parse_config(&raw, path)
}

fn parse_config(raw: &str, path: &Path) -> Result<ConfigFile, String> {
    toml::from_str(raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))
}

fn find_profile(config: ConfigFile, name: &str, path: &Path) -> Result<ProfileConfig, String> {
    let mut profiles = config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })?;

    profiles.remove(name).ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })
}

pub fn config_path() -> Result<PathBuf, String> {
    resolve_config_path(
        env::var(CONFIG_ENV).ok(),
        env::var("XDG_CONFIG_HOME").ok(),
        env::var("HOME").ok(),
    )
}

fn resolve_config_path(
    explicit: Option<String>,
    xdg: Option<String>,
    home: Option<String>,
) -> Result<PathBuf, String> {
    let non_empty = |value: Option<String>| {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(path) = non_empty(explicit) {
        return Ok(PathBuf::from(path));
    }

    if let Some(xdg) = non_empty(xdg) {
        return Ok(PathBuf::from(xdg).join("oairesp").join("config.toml"));
    }

    let home = non_empty(home).ok_or_else(|| {
        format!("Cannot resolve config path: set {CONFIG_ENV} or HOME/XDG_CONFIG_HOME.")
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("oairesp")
        .join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::{find_profile, parse_config, resolve_config_path, OutputMode};
    use std::path::{Path, PathBuf};

    #[test]
    fn explicit_path_wins_over_xdg_and_home() {
        let path = resolve_config_path(
            Some("/tmp/custom.toml".to_string()),
            Some("/xdg".to_string()),
            Some("/home/me".to_string()),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn blank_values_fall_through_to_home() {
        let path = resolve_config_path(
            Some("  ".to_string()),
            Some(String::new()),
            Some("/home/me".to_string()),
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/home/me/.config/oairesp/config.toml"));

        let xdg = resolve_config_path(None, Some("/xdg".to_string()), None).unwrap();
        assert_eq!(xdg, PathBuf::from("/xdg/oairesp/config.toml"));
    }

    #[test]
    fn missing_home_is_an_error() {
        let err = resolve_config_path(None, None, None).unwrap_err();
        assert!(err.contains("OAIRESP_CONFIG"));
    }

    #[test]
    fn profile_fields_are_parsed() {
        let path = Path::new("config.toml");
        let config = parse_config(
            "[profiles.fast]\nmodel = \"gpt-4.1-nano\"\ntimeout = 9\noutput = \"JSON\"\npause = true\n",
            path,
        )
        .unwrap();
        let profile = find_profile(config, "fast", path).unwrap();
        assert_eq!(profile.model.as_deref(), Some("gpt-4.1-nano"));
        assert_eq!(profile.timeout, Some(9));
        assert_eq!(profile.pause, Some(true));
        assert_eq!(profile.output_mode().unwrap(), Some(OutputMode::Json));
    }

    #[test]
    fn unknown_output_is_rejected() {
        let path = Path::new("config.toml");
        let config = parse_config("[profiles.bad]\noutput = \"yaml\"\n", path).unwrap();
        let profile = find_profile(config, "bad", path).unwrap();
        assert_eq!(
            profile.output_mode().unwrap_err(),
            "Invalid profile output 'yaml'. Supported values: text, json."
        );
    }

    #[test]
    fn missing_profiles_section_is_reported() {
        let path = Path::new("config.toml");
        let config = parse_config("", path).unwrap();
        let err = find_profile(config, "any", path).unwrap_err();
        assert!(err.contains("does not contain a [profiles] section"));
    }
}
