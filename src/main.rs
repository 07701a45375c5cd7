use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod dashboard;
mod errors;
mod models;
mod output;

use api::jira::JiraClient;
use crate::config::settings::Settings;
use dashboard::assemble::Assembled;
use dashboard::metrics::{team_workload, SummaryMetrics};
use dashboard::query::{PriorityView, UnmappedSelection};
use dashboard::{export, Dashboard};
use models::filter::{FilterIntent, MemberSelection, Ordering, StatusBucket};
use models::team::TeamMember;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "teampulse")]
#[command(version = "0.1.0")]
#[command(about = "Team activity and priorities from Jira, in your terminal", long_about = None)]
struct Cli {
    /// for debugging purposes
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: table, json or csv
    #[arg(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Export the result as CSV (default file: <view>_<yyyymmdd>.csv)
    #[arg(short, long, global = true, num_args = 0..=1, value_name = "FILE")]
    output: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Default)]
struct MemberArgs {
    /// Team member display name, repeatable (default: everyone)
    #[arg(short, long = "member")]
    members: Vec<String>,

    /// Sort order: updated, priority, priority-due or oldest
    #[arg(long)]
    order: Option<Ordering>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive setup of Jira credentials and team members
    Init,

    /// Issues created or updated recently
    Activity {
        #[command(flatten)]
        filter: MemberArgs,

        /// How many days back to look (default from config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Status group: all, completed, in-progress, blocked or a status name
        #[arg(short, long)]
        status: Option<StatusBucket>,

        /// Show every normalized column
        #[arg(long)]
        all_columns: bool,

        /// Print summary metrics above the table
        #[arg(long)]
        summary: bool,
    },

    /// Ranked priority list
    Priorities {
        #[arg(value_enum, default_value_t = PriorityArg::Current)]
        view: PriorityArg,

        #[command(flatten)]
        filter: MemberArgs,
    },

    /// Work completed last calendar week
    Completed {
        #[command(flatten)]
        filter: MemberArgs,
    },

    /// Open issues assigned to you
    Mine,

    /// Run an arbitrary JQL query
    Query {
        jql: String,

        /// Maximum number of results
        #[arg(long, default_value = "100")]
        limit: usize,
    },

    /// Issue counts per team member over recent activity
    Team {
        /// How many days back to look (default from config)
        #[arg(short, long)]
        days: Option<u32>,
    },

    /// Open an issue in the browser
    Open {
        /// (e.g., OPS-1234)
        issue_key: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Current,
    UpNext,
}

impl From<PriorityArg> for PriorityView {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Current => PriorityView::Current,
            PriorityArg::UpNext => PriorityView::UpNext,
        }
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration (with masked secrets)
    Show,

    /// Set a specific configuration value
    Set {
        /// Configuration key (e.g., jira.email, team.member, dashboard.priority_limit)
        key: String,
        /// New value
        value: String,
    },

    /// Validate configuration by testing the Jira connection
    Validate,

    /// Get the path to the config file
    Path,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.format == OutputFormat::Table && cli.output.is_none() {
        println!("{}", "TeamPulse v0.1.0".bright_cyan().bold());
        println!();
    }

    let result = match cli.command {
        Commands::Init => handle_init().await,

        Commands::Activity {
            filter,
            days,
            status,
            all_columns,
            summary,
        } => {
            handle_activity(
                filter,
                days,
                status.unwrap_or_default(),
                all_columns,
                summary,
                cli.format,
                cli.output,
            )
            .await
        }

        Commands::Priorities { view, filter } => {
            handle_priorities(view.into(), filter, cli.format, cli.output).await
        }

        Commands::Completed { filter } => handle_completed(filter, cli.format, cli.output).await,

        Commands::Mine => handle_mine(cli.format, cli.output).await,

        Commands::Query { jql, limit } => handle_query(&jql, limit, cli.format, cli.output).await,

        Commands::Team { days } => handle_team(days, cli.format).await,

        Commands::Open { issue_key } => handle_open(&issue_key),

        Commands::Config { action } => handle_config(action).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<errors::DashError>() {
            Some(dash) => eprintln!("\n{}", dash),
            None => eprintln!("\n{:#}", e),
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("teampulse=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn jira_client(settings: &Settings) -> JiraClient {
    JiraClient::new(
        settings.jira.url.clone(),
        settings.jira.email.clone(),
        settings.jira.auth_method.clone(),
    )
}

fn build_intent(settings: &Settings, filter: MemberArgs, days: Option<u32>, status: StatusBucket) -> FilterIntent {
    FilterIntent {
        members: MemberSelection::from_names(filter.members),
        days_back: days.unwrap_or(settings.dashboard.default_days_back),
        status,
        ordering: filter.order,
    }
}

/// Prints the table, or writes it as CSV when an output file was requested.
fn emit(
    view: &str,
    title: &str,
    assembled: &Assembled,
    format: OutputFormat,
    export_to: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    if let Some(path) = export_to {
        let path = path.unwrap_or_else(|| export::default_file_name(view));
        export::write_csv(&assembled.table, &path)?;
        println!(
            "{} {} issues to {}",
            "Exported".green().bold(),
            assembled.table.len().to_string().bright_white(),
            path.display().to_string().bright_white()
        );
        return Ok(());
    }

    if format == OutputFormat::Table {
        println!("{}", title.cyan().bold());
        println!(
            "{}  {} issues found",
            "".dimmed(),
            assembled.issues.len().to_string().bright_white()
        );
        println!();
    }
    output::print_issues(&assembled.table, format)
}

async fn handle_activity(
    filter: MemberArgs,
    days: Option<u32>,
    status: StatusBucket,
    all_columns: bool,
    summary: bool,
    format: OutputFormat,
    export_to: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = jira_client(&settings);
    let team = settings.team.directory();
    let dashboard = Dashboard::new(&client, &settings.dashboard, &team, settings.team.unmapped_selection);

    let intent = build_intent(&settings, filter, days, status);
    let assembled = dashboard.weekly_activity(&intent, all_columns).await?;
    let mut title = format!("Activity in the last {} days", intent.days_back);
    if intent.status != StatusBucket::All {
        title.push_str(&format!(" ({})", intent.status));
    }

    if summary && export_to.is_none() {
        output::print_summary(&SummaryMetrics::from_issues(&assembled.issues), format)?;
        println!();
    }

    emit("weekly_activity", &title, &assembled, format, export_to)
}

async fn handle_priorities(
    view: PriorityView,
    filter: MemberArgs,
    format: OutputFormat,
    export_to: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = jira_client(&settings);
    let team = settings.team.directory();
    let dashboard = Dashboard::new(&client, &settings.dashboard, &team, settings.team.unmapped_selection);

    let intent = build_intent(&settings, filter, None, StatusBucket::All);
    let assembled = dashboard.priorities(view, &intent).await?;

    let (file_stem, title) = match view {
        PriorityView::Current => ("current_priorities", "Current Priorities"),
        PriorityView::UpNext => ("up_next_priorities", "Up Next"),
    };
    emit(file_stem, title, &assembled, format, export_to)
}

async fn handle_completed(
    filter: MemberArgs,
    format: OutputFormat,
    export_to: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = jira_client(&settings);
    let team = settings.team.directory();
    let dashboard = Dashboard::new(&client, &settings.dashboard, &team, settings.team.unmapped_selection);

    let intent = build_intent(&settings, filter, None, StatusBucket::All);
    let assembled = dashboard.last_week_completed(&intent).await?;

    emit("last_week_completed", "Completed last week", &assembled, format, export_to)
}

async fn handle_mine(format: OutputFormat, export_to: Option<Option<PathBuf>>) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = jira_client(&settings);
    let team = settings.team.directory();
    let dashboard = Dashboard::new(&client, &settings.dashboard, &team, settings.team.unmapped_selection);

    let assembled = dashboard.my_issues().await?;
    emit("my_issues", "Your Open Issues", &assembled, format, export_to)
}

async fn handle_query(
    jql: &str,
    limit: usize,
    format: OutputFormat,
    export_to: Option<Option<PathBuf>>,
) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = jira_client(&settings);
    let team = settings.team.directory();
    let dashboard = Dashboard::new(&client, &settings.dashboard, &team, settings.team.unmapped_selection);

    if format == OutputFormat::Table && export_to.is_none() {
        println!("{}", format!("  JQL: {}", jql).dimmed());
        println!();
    }

    let assembled = dashboard.custom(jql, limit).await?;
    emit("query", "Query results", &assembled, format, export_to)
}

async fn handle_team(days: Option<u32>, format: OutputFormat) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let client = jira_client(&settings);
    let team = settings.team.directory();
    let dashboard = Dashboard::new(&client, &settings.dashboard, &team, settings.team.unmapped_selection);

    let names = team.members().iter().map(|m| m.name.clone()).collect();
    let mut intent = FilterIntent::for_members(names);
    intent.days_back = days.unwrap_or(settings.dashboard.default_days_back);
    let assembled = dashboard.weekly_activity(&intent, true).await?;
    let workload = team_workload(&assembled.issues, &team);

    if format == OutputFormat::Table {
        println!("{}", format!("Team workload, last {} days", intent.days_back).cyan().bold());
        println!();
        output::print_summary(&SummaryMetrics::from_issues(&assembled.issues), format)?;
        println!();
    }
    output::print_workload(&workload, format)
}

fn handle_open(issue_key: &str) -> anyhow::Result<()> {
    let settings = Settings::load()?;

    let url = models::issue::issue_url(&settings.jira.url, issue_key);
    println!("{} {}", "Opening issue:".dimmed(), url.bright_white());
    open::that(&url)?;

    Ok(())
}

async fn handle_init() -> anyhow::Result<()> {
    use crate::config::settings::*;
    use dialoguer::{Input, Password, Select};

    println!("{}", "TeamPulse Configuration Setup".cyan().bold());
    println!();
    println!(
        "{}",
        "This will store your credentials in ~/.teampulse/config.toml".dimmed()
    );
    println!(
        "{}",
        "The file will be created with read-only permissions (600)".dimmed()
    );
    println!();

    println!("{}", "Jira Configuration".bold());
    let jira_url: String = Input::new()
        .with_prompt("Jira URL (e.g., https://<company>.atlassian.net)")
        .interact_text()?;
    let jira_email: String = Input::new().with_prompt("Jira email").interact_text()?;
    println!();

    let auth_choice = Select::new()
        .with_prompt("Authentication method")
        .items(&[
            "API Token (for Jira Cloud)",
            "Personal Access Token (for Jira Data Center/Server)",
        ])
        .default(0)
        .interact()?;

    let auth_method = if auth_choice == 1 {
        println!();
        println!("{}", "To create a Personal Access Token:".dimmed());
        println!("{}", "  1. Go to Jira → Profile → Personal Access Tokens".dimmed());
        println!("{}", "  2. Click 'Create token'".dimmed());
        println!();
        let token = Password::new().with_prompt("Personal Access Token").interact()?;
        AuthMethod::PersonalAccessToken { token }
    } else {
        println!();
        println!("{}", "To create a Jira API token:".dimmed());
        println!("{}", "  1. Go to https://id.atlassian.com/manage-profile/security/api-tokens".dimmed());
        println!("{}", "  2. Click 'Create API token'".dimmed());
        println!();
        let token = Password::new().with_prompt("Jira API token").interact()?;
        AuthMethod::ApiToken { token }
    };

    println!();
    println!("{}", "=== Team ===".bold());
    println!("{}", "  Add members by display name and Jira email. Leave the name empty to finish.".dimmed());
    let mut members = Vec::new();
    loop {
        let name: String = Input::new()
            .with_prompt("Member name")
            .allow_empty(true)
            .interact_text()?;
        if name.trim().is_empty() {
            break;
        }
        let identity: String = Input::new()
            .with_prompt(format!("Jira email for {}", name.trim()))
            .interact_text()?;
        members.push(TeamMember {
            name: name.trim().to_string(),
            identity: identity.trim().to_string(),
        });
    }

    let settings = Settings {
        jira: JiraConfig {
            url: jira_url.trim().trim_end_matches('/').to_string(),
            email: jira_email.trim().to_string(),
            auth_method,
        },
        team: TeamConfig {
            members,
            unmapped_selection: UnmappedSelection::default(),
        },
        dashboard: DashboardConfig::default(),
    };

    println!();
    println!("{}", "Validating configuration...".cyan());
    println!();

    print!("{}", "  Testing Jira connection... ".dimmed());
    std::io::Write::flush(&mut std::io::stdout())?;

    match jira_client(&settings).current_user().await {
        Ok(user) => {
            println!("{}", "✓".green().bold());
            println!("  {} {}", "Signed in as:".bold(), user.display_name.bright_white());
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            return Err(errors::DashError::ConfigValidationFailed(format!(
                "Jira connection failed: {}",
                e
            ))
            .into());
        }
    }

    settings.save()?;

    let config_path = Settings::config_path()?;
    println!();
    println!("{}", "Configuration saved!".green().bold());
    println!(
        "  Location: {}",
        config_path.display().to_string().bright_white()
    );
    println!();
    println!("{}", "Keep your API tokens secure!".yellow());
    println!("{}", "  Never commit config.toml to git".dimmed());

    Ok(())
}

/// Applies `teampulse config set <key> <value>` to loaded settings.
fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> anyhow::Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.len() != 2 {
        anyhow::bail!("Invalid key format. Use format: section.field (e.g., jira.email)");
    }

    let limit = || -> anyhow::Result<usize> {
        value
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a positive number", key))
    };

    match (parts[0], parts[1]) {
        ("jira", "url") => settings.jira.url = value.trim_end_matches('/').to_string(),
        ("jira", "email") => settings.jira.email = value.to_string(),
        ("jira", "token") => {
            settings.jira.auth_method = settings.jira.auth_method.with_token(value.to_string())
        }
        ("team", "member") => {
            let member = parse_member(value)?;
            match settings.team.members.iter_mut().find(|m| m.name == member.name) {
                Some(existing) => existing.identity = member.identity,
                None => settings.team.members.push(member),
            }
        }
        ("team", "remove") => {
            let before = settings.team.members.len();
            settings.team.members.retain(|m| m.name != value);
            if settings.team.members.len() == before {
                anyhow::bail!("No team member named {}", value);
            }
        }
        ("team", "unmapped_selection") => {
            settings.team.unmapped_selection = match value {
                "unfiltered" => UnmappedSelection::Unfiltered,
                "no_matches" => UnmappedSelection::NoMatches,
                _ => anyhow::bail!("unmapped_selection must be 'unfiltered' or 'no_matches'"),
            }
        }
        ("dashboard", "default_days_back") => {
            settings.dashboard.default_days_back = value
                .parse()
                .map_err(|_| anyhow::anyhow!("{} must be a number of days", key))?
        }
        ("dashboard", "activity_limit") => settings.dashboard.activity_limit = limit()?,
        ("dashboard", "priority_limit") => settings.dashboard.priority_limit = limit()?,
        ("dashboard", "completed_limit") => settings.dashboard.completed_limit = limit()?,
        ("dashboard", "my_issues_limit") => settings.dashboard.my_issues_limit = limit()?,
        ("dashboard", "current_status") => settings.dashboard.query.current_status = value.to_string(),
        _ => anyhow::bail!("Unknown configuration key: {}", key),
    }

    Ok(())
}

/// `Name=identity`, as accepted by `config set team.member`.
fn parse_member(value: &str) -> anyhow::Result<TeamMember> {
    let (name, identity) = value
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Use format: \"Display Name=email@company.com\""))?;

    let (name, identity) = (name.trim(), identity.trim());
    if name.is_empty() || identity.is_empty() {
        anyhow::bail!("Both the member name and the identity are required");
    }

    Ok(TeamMember {
        name: name.to_string(),
        identity: identity.to_string(),
    })
}

async fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;

            println!("{}", "Current Configuration".cyan().bold());
            println!();

            println!("{}", "[jira]".bold());
            println!("  {} {}", "url:".dimmed(), settings.jira.url.bright_white());
            println!("  {} {}", "email:".dimmed(), settings.jira.email.bright_white());
            println!("  {} {}", "auth_method:".dimmed(), settings.jira.auth_method.label().bright_white());
            println!(
                "  {} {}",
                "token:".dimmed(),
                Settings::mask(settings.jira.auth_method.token()).yellow()
            );

            println!();
            println!("{}", "[team]".bold());
            if settings.team.members.is_empty() {
                println!("  {}", "no members configured".dimmed());
            }
            for member in &settings.team.members {
                println!("  {} {}", format!("{}:", member.name).dimmed(), member.identity.bright_white());
            }
            let policy = match settings.team.unmapped_selection {
                UnmappedSelection::Unfiltered => "unfiltered",
                UnmappedSelection::NoMatches => "no_matches",
            };
            println!("  {} {}", "unmapped_selection:".dimmed(), policy.bright_white());

            let dash = &settings.dashboard;
            println!();
            println!("{}", "[dashboard]".bold());
            println!("  {} {}", "default_days_back:".dimmed(), dash.default_days_back.to_string().bright_white());
            println!("  {} {}", "activity_limit:".dimmed(), dash.activity_limit.to_string().bright_white());
            println!("  {} {}", "priority_limit:".dimmed(), dash.priority_limit.to_string().bright_white());
            println!("  {} {}", "completed_limit:".dimmed(), dash.completed_limit.to_string().bright_white());
            println!("  {} {}", "my_issues_limit:".dimmed(), dash.my_issues_limit.to_string().bright_white());
            println!("  {} {}", "current_status:".dimmed(), dash.query.current_status.bright_white());

            Ok(())
        }

        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            apply_setting(&mut settings, &key, &value)?;
            settings.save()?;

            let shown = if key == "jira.token" { Settings::mask(&value) } else { value };
            println!("{}", format!("✓ Updated {} to: {}", key, shown).green().bold());
            println!();
            println!("{}", "Configuration saved successfully!".green());

            Ok(())
        }

        ConfigAction::Validate => {
            println!("{}", "Validating configuration...".cyan().bold());
            println!();

            let settings = Settings::load()?;

            print!("{}", "  Testing Jira connection... ".dimmed());
            std::io::Write::flush(&mut std::io::stdout())?;

            match jira_client(&settings).current_user().await {
                Ok(user) => {
                    println!("{}", "✓".green().bold());
                    let account = user.email_address.or(user.name).unwrap_or_default();
                    println!(
                        "  {} {} {}",
                        "Signed in as:".bold(),
                        user.display_name.bright_white(),
                        account.dimmed()
                    );
                }
                Err(e) => {
                    println!("{}", "✗".red().bold());
                    println!();
                    println!("{}", format!("  Jira connection failed: {:#}", e).red());
                    println!();
                    println!("{}", "  To fix:".yellow());
                    println!("{}", "    1. Check your Jira URL is correct".dimmed());
                    println!("{}", "    2. Verify your authentication token is valid".dimmed());
                    println!("{}", "    3. Update with: teampulse config set jira.token <new-token>".dimmed());
                    anyhow::bail!("Jira validation failed");
                }
            }

            print!("{}", "  Checking team directory... ".dimmed());
            if let Some(member) = settings.team.members.iter().find(|m| m.identity.trim().is_empty()) {
                println!("{}", "✗".red().bold());
                return Err(errors::DashError::ConfigValidationFailed(format!(
                    "Team member '{}' has no Jira identity",
                    member.name
                ))
                .into());
            }
            println!(
                "{} {}",
                "✓".green().bold(),
                format!("({} members)", settings.team.members.len()).dimmed()
            );

            println!();
            println!("{}", "✓ All validations passed!".green().bold());

            Ok(())
        }

        ConfigAction::Path => {
            println!("{}", Settings::config_path()?.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use crate::config::settings::{AuthMethod, DashboardConfig, JiraConfig, TeamConfig};

    fn settings() -> Settings {
        Settings {
            jira: JiraConfig {
                url: "https://jira.example.com".to_string(),
                email: "me@example.com".to_string(),
                auth_method: AuthMethod::ApiToken {
                    token: "secret".to_string(),
                },
            },
            team: TeamConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_activity_flags() {
        let cli = Cli::try_parse_from([
            "teampulse", "activity", "--days", "14", "-m", "Alice", "-m", "Bob", "--status", "blocked",
            "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::Activity { filter, days, status, .. } => {
                assert_eq!(filter.members, vec!["Alice", "Bob"]);
                assert_eq!(days, Some(14));
                assert_eq!(status, Some(StatusBucket::Blocked));
            }
            _ => panic!("expected activity"),
        }
    }

    #[test]
    fn test_parse_output_without_file() {
        let cli = Cli::try_parse_from(["teampulse", "completed", "--output"]).unwrap();
        assert_eq!(cli.output, Some(None));

        let cli = Cli::try_parse_from(["teampulse", "mine", "--output", "mine.csv"]).unwrap();
        assert_eq!(cli.output, Some(Some(PathBuf::from("mine.csv"))));
    }

    #[test]
    fn test_parse_priority_view() {
        let cli = Cli::try_parse_from(["teampulse", "priorities", "up-next"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Priorities {
                view: PriorityArg::UpNext,
                ..
            }
        ));
    }

    #[test]
    fn test_build_intent_uses_configured_days() {
        let mut settings = settings();
        settings.dashboard.default_days_back = 10;

        let intent = build_intent(&settings, MemberArgs::default(), None, StatusBucket::All);
        assert_eq!(intent.days_back, 10);
        assert_eq!(intent.members, MemberSelection::All);

        let filter = MemberArgs {
            members: vec!["Alice".to_string()],
            order: Some(Ordering::Oldest),
        };
        let intent = build_intent(&settings, filter, Some(3), StatusBucket::Completed);
        assert_eq!(intent.days_back, 3);
        assert_eq!(intent.members, MemberSelection::Selected(vec!["Alice".to_string()]));
        assert_eq!(intent.ordering, Some(Ordering::Oldest));
    }

    #[test]
    fn test_apply_setting_team_member() {
        let mut settings = settings();
        apply_setting(&mut settings, "team.member", "Alice Smith=alice@example.com").unwrap();
        apply_setting(&mut settings, "team.member", "Alice Smith=asmith@example.com").unwrap();

        assert_eq!(settings.team.members.len(), 1);
        assert_eq!(settings.team.members[0].identity, "asmith@example.com");

        apply_setting(&mut settings, "team.remove", "Alice Smith").unwrap();
        assert!(settings.team.members.is_empty());
        assert!(apply_setting(&mut settings, "team.remove", "Alice Smith").is_err());
    }

    #[test]
    fn test_apply_setting_values() {
        let mut settings = settings();
        apply_setting(&mut settings, "jira.token", "fresh").unwrap();
        apply_setting(&mut settings, "dashboard.priority_limit", "25").unwrap();
        apply_setting(&mut settings, "team.unmapped_selection", "no_matches").unwrap();

        assert_eq!(settings.jira.auth_method.token(), "fresh");
        assert_eq!(settings.dashboard.priority_limit, 25);
        assert_eq!(settings.team.unmapped_selection, UnmappedSelection::NoMatches);
    }

    #[test]
    fn test_apply_setting_rejects_bad_input() {
        let mut settings = settings();
        assert!(apply_setting(&mut settings, "jira", "x").is_err());
        assert!(apply_setting(&mut settings, "git.token", "x").is_err());
        assert!(apply_setting(&mut settings, "dashboard.activity_limit", "lots").is_err());
        assert!(apply_setting(&mut settings, "team.unmapped_selection", "maybe").is_err());
    }

    #[test]
    fn test_parse_member() {
        let member = parse_member(" Edu Cielo = edu.cielo@example.com ").unwrap();
        assert_eq!(member.name, "Edu Cielo");
        assert_eq!(member.identity, "edu.cielo@example.com");

        assert!(parse_member("no-separator").is_err());
        assert!(parse_member("=missing@name.com").is_err());
    }
}
