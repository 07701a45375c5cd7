use colored::*;
use std::fmt;

#[derive(Debug)]
pub enum DashError {
    // Configuration errors
    ConfigNotFound,
    ConfigInvalid(String),
    ConfigValidationFailed(String),

    // Jira errors
    JiraAuthFailed(u16),
    JiraApiError(u16, String),

    // Network errors
    NetworkError(String),

    // Export errors
    ExportFailed(String),

    // Generic error
    Other(String),
}

impl fmt::Display for DashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            DashError::ConfigNotFound => {
                write!(f, "{}\n", "Configuration not found".red().bold())?;
                write!(f, "   {}\n\n", "Run 'teampulse init' or set JIRA_URL, JIRA_USERNAME and JIRA_API_TOKEN".dimmed())?;
                write!(f, "   {}", "teampulse init".green())
            }
            DashError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your config file: ~/.teampulse/config.toml\n")?;
                write!(f, "   2. Or reinitialize: {}", "teampulse init".green())
            }
            DashError::ConfigValidationFailed(msg) => {
                write!(f, "{}\n", "Configuration validation failed".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your API token is valid\n")?;
                write!(f, "   2. Verify network connectivity\n")?;
                write!(f, "   3. Reinitialize if needed: {}", "teampulse init".green())
            }

            // Jira errors
            DashError::JiraAuthFailed(status) => {
                write!(f, "{}\n", format!("Jira authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", "Your API token may have expired or is invalid".dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Generate new token: {}\n", "https://id.atlassian.com/manage-profile/security/api-tokens".cyan())?;
                write!(f, "   2. Update config: {}\n", "teampulse config set jira.token <token>".green())?;
                write!(f, "   3. Or edit manually: ~/.teampulse/config.toml")
            }
            DashError::JiraApiError(status, msg) => {
                write!(f, "{}\n", format!("Jira API error ({})", status).red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Check the JQL and try again")
            }

            // Network errors
            DashError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your internet connection\n")?;
                write!(f, "   2. Verify you can reach your Jira instance\n")?;
                write!(f, "   3. Try again in a moment")
            }

            // Export errors
            DashError::ExportFailed(msg) => {
                write!(f, "{}\n", "Export failed".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Check the output path is writable")
            }

            // Generic
            DashError::Other(msg) => {
                write!(f, "{}\n", "Error".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
        }
    }
}

impl std::error::Error for DashError {}

impl DashError {
    /// Transport and auth failures abort a whole view.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DashError::JiraAuthFailed(_) | DashError::JiraApiError(..) | DashError::NetworkError(_)
        )
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            DashError::NetworkError(err.to_string())
        } else if let Some(status) = err.status() {
            if status == 401 || status == 403 {
                DashError::JiraAuthFailed(status.as_u16())
            } else {
                DashError::JiraApiError(status.as_u16(), err.to_string())
            }
        } else {
            DashError::Other(err.to_string())
        }
    }
}

impl From<::config::ConfigError> for DashError {
    fn from(err: ::config::ConfigError) -> Self {
        DashError::ConfigInvalid(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(DashError::JiraAuthFailed(401).is_transport());
        assert!(DashError::NetworkError("down".to_string()).is_transport());
        assert!(DashError::JiraApiError(400, "bad jql".to_string()).is_transport());
        assert!(!DashError::ConfigNotFound.is_transport());
        assert!(!DashError::ExportFailed("denied".to_string()).is_transport());
    }

    #[test]
    fn test_display_mentions_status() {
        colored::control::set_override(false);
        let text = DashError::JiraApiError(400, "Field 'foo' does not exist".to_string()).to_string();
        assert!(text.contains("Jira API error (400)"));
        assert!(text.contains("Field 'foo' does not exist"));
    }
}
