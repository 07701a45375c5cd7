use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dashboard::query::{QueryProfile, UnmappedSelection};
use crate::errors::DashError;
use crate::models::team::{TeamDirectory, TeamMember};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub jira: JiraConfig,
    #[serde(default)]
    pub team: TeamConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JiraConfig {
    pub url: String,
    pub email: String,
    pub auth_method: AuthMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMethod {
    /// Jira Cloud: email + API token over basic auth.
    ApiToken { token: String },
    /// Jira Data Center / Server: bearer token.
    PersonalAccessToken { token: String },
}

impl AuthMethod {
    pub fn token(&self) -> &str {
        match self {
            AuthMethod::ApiToken { token } | AuthMethod::PersonalAccessToken { token } => token,
        }
    }

    pub fn with_token(&self, token: String) -> Self {
        match self {
            AuthMethod::ApiToken { .. } => AuthMethod::ApiToken { token },
            AuthMethod::PersonalAccessToken { .. } => AuthMethod::PersonalAccessToken { token },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuthMethod::ApiToken { .. } => "API Token",
            AuthMethod::PersonalAccessToken { .. } => "Personal Access Token",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TeamConfig {
    pub members: Vec<TeamMember>,
    pub unmapped_selection: UnmappedSelection,
}

impl TeamConfig {
    pub fn directory(&self) -> TeamDirectory {
        TeamDirectory::new(self.members.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub default_days_back: u32,
    pub activity_limit: usize,
    pub priority_limit: usize,
    pub completed_limit: usize,
    pub my_issues_limit: usize,
    pub query: QueryProfile,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_days_back: 7,
            activity_limit: 1000,
            priority_limit: 50,
            completed_limit: 100,
            my_issues_limit: 100,
            query: QueryProfile::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Layers the config file, `TEAMPULSE__*` variables and the plain
    /// `JIRA_URL` / `JIRA_USERNAME` / `JIRA_API_TOKEN` variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let env_url = std::env::var("JIRA_URL").ok();
        let env_token = std::env::var("JIRA_API_TOKEN").ok();

        if !config_path.exists() && env_url.is_none() {
            return Err(DashError::ConfigNotFound.into());
        }

        let mut builder = Config::builder()
            .add_source(
                File::from(config_path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("TEAMPULSE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("jira.url", env_url)
            .map_err(DashError::from)?
            .set_override_option("jira.email", std::env::var("JIRA_USERNAME").ok())
            .map_err(DashError::from)?;

        if let Some(token) = env_token {
            builder = builder
                .set_override("jira.auth_method.type", "api_token")
                .map_err(DashError::from)?
                .set_override("jira.auth_method.token", token)
                .map_err(DashError::from)?;
        }

        let settings = builder
            .build()
            .map_err(DashError::from)
            .context("Failed to read configuration")?
            .try_deserialize::<Settings>()
            .map_err(DashError::from)
            .context("Failed to parse configuration")?;

        tracing::debug!(path = %config_path.display(), members = settings.team.members.len(), "Loaded settings");
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&config_path, config_str)
            .context("Failed to write config file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&config_path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&config_path, perms)?;
        }

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".teampulse"))
    }

    /// Masks all but the first and last four characters of a secret.
    pub fn mask(secret: &str) -> String {
        let chars: Vec<char> = secret.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
