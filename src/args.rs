//! Command-line surface for `smartlead`.
//! Shared between the binary and tests so both parse the same definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser, value_parser};

use crate::{
    config::{LoggingOverrides, SettingsOverrides},
    error::CliError,
    io,
    lookup::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE},
};

#[derive(Parser, Debug)]
#[command(name = "smartlead", version, about = "Smartlead API command-line client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Campaign operations (settings, schedule, analytics, leads)
    Campaigns(CampaignsArgs),
    /// Global lead operations
    Leads(LeadsArgs),
    /// Campaign webhook operations
    Webhooks(WebhooksArgs),
    /// Direct API access for endpoints without a dedicated command
    Raw(RawArgs),
    /// Manage the persisted configuration
    Config(ConfigArgs),
}

/// Mutually exclusive JSON body sources; `-` reads stdin.
#[derive(Args, Debug, Clone, Default)]
pub struct BodyArgs {
    /// Request body as inline JSON, or '-' for stdin
    #[arg(long = "body-json", value_name = "JSON")]
    pub body_json: Option<String>,

    /// Path to a JSON request body, or '-' for stdin
    #[arg(long = "body-file", value_name = "PATH")]
    pub body_file: Option<PathBuf>,
}

impl BodyArgs {
    pub fn load_required(&self) -> Result<serde_json::Value, CliError> {
        io::load_required(self.body_json.as_deref(), self.body_file.as_deref())
    }

    pub fn load_optional(&self) -> Result<Option<serde_json::Value>, CliError> {
        io::load_optional(self.body_json.as_deref(), self.body_file.as_deref())
    }
}

/// Pagination budget for lead lookups.
#[derive(Args, Debug, Clone, Copy)]
pub struct ScanArgs {
    /// List page size while searching
    #[arg(
        long = "page-size",
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = value_parser!(u32).range(1..=100)
    )]
    pub page_size: u32,

    /// Max pages to scan while searching
    #[arg(
        long = "max-pages",
        default_value_t = DEFAULT_MAX_PAGES,
        value_parser = value_parser!(u32).range(1..)
    )]
    pub max_pages: u32,
}

#[derive(Parser, Debug)]
pub struct CampaignsArgs {
    #[command(subcommand)]
    pub action: CampaignsCmd,
}

#[derive(Subcommand, Debug)]
pub enum CampaignsCmd {
    /// List campaigns
    List {
        #[arg(long)]
        offset: Option<i64>,
        /// Filter campaigns by client ID
        #[arg(long = "client-id")]
        client_id: Option<i64>,
        /// Include tags in the response
        #[arg(long = "include-tags", value_name = "BOOL", value_parser = BoolishValueParser::new())]
        include_tags: Option<bool>,
    },
    /// Get a campaign by ID
    Get { campaign_id: i64 },
    /// Create a campaign
    Create {
        /// Campaign name (required unless a body is provided)
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "client-id")]
        client_id: Option<i64>,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Update campaign settings
    Update {
        campaign_id: i64,
        #[command(flatten)]
        fields: CampaignUpdateFlags,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Update the campaign sending schedule
    Schedule {
        campaign_id: i64,
        #[command(flatten)]
        fields: CampaignScheduleFlags,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Delete a campaign
    Delete {
        campaign_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Change campaign status
    Status {
        campaign_id: i64,
        #[arg(long, value_enum, ignore_case = true)]
        status: CampaignStatusArg,
    },
    /// Per-lead sending statistics
    Statistics {
        campaign_id: i64,
        #[arg(long)]
        offset: Option<i64>,
        /// Page size (defaults to the configured default limit)
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long = "email-sequence-number")]
        email_sequence_number: Option<i64>,
        #[arg(long = "email-status")]
        email_status: Option<String>,
    },
    /// Campaign analytics
    Analytics(AnalyticsArgs),
    /// Leads within a campaign
    Leads(CampaignLeadsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CampaignUpdateFlags {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "client-id")]
    pub client_id: Option<i64>,
    /// e.g. REPLY_TO_AN_EMAIL
    #[arg(long = "stop-lead-settings")]
    pub stop_lead_settings: Option<String>,
    #[arg(long = "unsubscribe-text")]
    pub unsubscribe_text: Option<String>,
    #[arg(long = "follow-up-percentage", value_parser = value_parser!(i64).range(0..=100))]
    pub follow_up_percentage: Option<i64>,
    #[arg(long = "send-as-plain-text", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub send_as_plain_text: Option<bool>,
    #[arg(long = "force-plain-text", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub force_plain_text: Option<bool>,
    #[arg(long = "enable-ai-esp-matching", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub enable_ai_esp_matching: Option<bool>,
    /// Pause same-domain leads when one replies
    #[arg(
        long = "auto-pause-domain-leads-on-reply",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub auto_pause_domain_leads_on_reply: Option<bool>,
    #[arg(
        long = "ignore-ss-mailbox-sending-limit",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub ignore_ss_mailbox_sending_limit: Option<bool>,
    #[arg(long = "domain-level-rate-limit", value_name = "BOOL", value_parser = BoolishValueParser::new())]
    pub domain_level_rate_limit: Option<bool>,
    #[arg(long = "bounce-autopause-threshold")]
    pub bounce_autopause_threshold: Option<String>,
    /// Repeatable track_settings entry (e.g. DONT_TRACK_EMAIL_OPEN)
    #[arg(long = "track-setting", value_name = "SETTING")]
    pub track_settings: Vec<String>,
    /// Repeatable AI categorisation option ID
    #[arg(long = "ai-category-id", value_name = "ID")]
    pub ai_category_ids: Vec<i64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CampaignScheduleFlags {
    /// IANA timezone
    #[arg(long)]
    pub timezone: Option<String>,
    /// Repeatable day of week (0=Sun .. 6=Sat)
    #[arg(long = "day", value_parser = value_parser!(i64).range(0..=6))]
    pub days: Vec<i64>,
    /// HH:MM
    #[arg(long = "start-hour")]
    pub start_hour: Option<String>,
    /// HH:MM
    #[arg(long = "end-hour")]
    pub end_hour: Option<String>,
    /// Minutes between emails
    #[arg(long = "min-time-btw-emails", value_parser = value_parser!(i64).range(0..))]
    pub min_time_btw_emails: Option<i64>,
    #[arg(long = "max-new-leads-per-day", value_parser = value_parser!(i64).range(0..))]
    pub max_new_leads_per_day: Option<i64>,
    /// ISO datetime, sent as given
    #[arg(long = "schedule-start-time")]
    pub schedule_start_time: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPER")]
pub enum CampaignStatusArg {
    Start,
    Paused,
    Stopped,
}

impl CampaignStatusArg {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Paused => "PAUSED",
            Self::Stopped => "STOPPED",
        }
    }
}

#[derive(Parser, Debug)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub action: AnalyticsCmd,
}

#[derive(Subcommand, Debug)]
pub enum AnalyticsCmd {
    /// Top-level analytics for a campaign
    Top { campaign_id: i64 },
    /// Analytics for a date range
    ByDate {
        campaign_id: i64,
        /// YYYY-MM-DD
        #[arg(long = "start-date")]
        start_date: String,
        /// YYYY-MM-DD
        #[arg(long = "end-date")]
        end_date: String,
    },
}

#[derive(Parser, Debug)]
pub struct CampaignLeadsArgs {
    #[command(subcommand)]
    pub action: CampaignLeadsCmd,
}

#[derive(Subcommand, Debug)]
pub enum CampaignLeadsCmd {
    /// List leads in a campaign
    List {
        campaign_id: i64,
        #[arg(long)]
        offset: Option<i64>,
        /// Page size (defaults to the configured default limit)
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Find one lead in a campaign by scanning the lead list
    Get {
        campaign_id: i64,
        lead_id: i64,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Add leads to a campaign
    Add {
        campaign_id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Replace a lead's fields
    Update {
        campaign_id: i64,
        lead_id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Patch selected lead fields on top of the current values
    Patch {
        campaign_id: i64,
        lead_id: i64,
        #[command(flatten)]
        fields: LeadPatchFlags,
        /// JSON object for custom_fields, or '-' for stdin
        #[arg(long = "custom-fields-json", value_name = "JSON")]
        custom_fields_json: Option<String>,
        /// Path to a JSON object for custom_fields, or '-' for stdin
        #[arg(long = "custom-fields-file", value_name = "PATH")]
        custom_fields_file: Option<PathBuf>,
        #[command(flatten)]
        body: BodyArgs,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Pause a lead
    Pause { campaign_id: i64, lead_id: i64 },
    /// Resume a paused lead
    Resume {
        campaign_id: i64,
        lead_id: i64,
        /// Resume after N days
        #[arg(long = "delay-days", value_parser = value_parser!(i64).range(0..))]
        delay_days: Option<i64>,
    },
    /// Unsubscribe a lead from this campaign
    Unsubscribe { campaign_id: i64, lead_id: i64 },
    /// Remove a lead from a campaign
    Delete {
        campaign_id: i64,
        lead_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Message history for a lead
    MessageHistory { campaign_id: i64, lead_id: i64 },
}

#[derive(Args, Debug, Clone, Default)]
pub struct LeadPatchFlags {
    /// Override email (normally taken from the current lead)
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long = "first-name")]
    pub first_name: Option<String>,
    #[arg(long = "last-name")]
    pub last_name: Option<String>,
    #[arg(long = "phone-number")]
    pub phone_number: Option<String>,
    #[arg(long = "company-name")]
    pub company_name: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long = "linkedin-profile")]
    pub linkedin_profile: Option<String>,
    #[arg(long = "company-url")]
    pub company_url: Option<String>,
}

#[derive(Parser, Debug)]
pub struct LeadsArgs {
    #[command(subcommand)]
    pub action: LeadsCmd,
}

#[derive(Subcommand, Debug)]
pub enum LeadsCmd {
    /// Look up a lead by email address
    GetByEmail {
        #[arg(long)]
        email: String,
    },
    /// Unsubscribe a lead from every campaign
    UnsubscribeAll { lead_id: i64 },
}

#[derive(Parser, Debug)]
pub struct WebhooksArgs {
    #[command(subcommand)]
    pub action: WebhooksCmd,
}

#[derive(Subcommand, Debug)]
pub enum WebhooksCmd {
    /// List webhooks of a campaign
    List { campaign_id: i64 },
    /// Create or update a campaign webhook
    Upsert {
        campaign_id: i64,
        #[command(flatten)]
        body: BodyArgs,
    },
    /// Delete a campaign webhook
    Delete {
        campaign_id: i64,
        #[arg(long = "webhook-id")]
        webhook_id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Parser, Debug)]
pub struct RawArgs {
    #[command(subcommand)]
    pub action: RawCmd,
}

#[derive(Subcommand, Debug)]
pub enum RawCmd {
    /// Send an arbitrary request; the body is not validated
    Request {
        /// HTTP method (GET, POST, PATCH, DELETE, ...)
        #[arg(long)]
        method: String,
        /// API path (e.g. /campaigns) or full URL
        #[arg(long)]
        path: String,
        /// Query parameter KEY=VALUE (repeatable)
        #[arg(long = "query", value_name = "KEY=VALUE")]
        query: Vec<String>,
        /// Query parameter KEY=<json> (repeatable)
        #[arg(long = "query-json", value_name = "KEY=JSON")]
        query_json: Vec<String>,
        /// Header KEY=VALUE (repeatable)
        #[arg(long = "header", value_name = "KEY=VALUE")]
        header: Vec<String>,
        #[command(flatten)]
        body: BodyArgs,
        /// Include status code and headers in the output
        #[arg(long = "include-meta")]
        include_meta: bool,
        /// Do not append the api_key query parameter
        #[arg(long = "no-auth")]
        no_auth: bool,
    },
    /// Print example raw invocations
    Examples,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigCmd,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCmd {
    /// Show the effective configuration
    Show {
        /// Show the full API key
        #[arg(long)]
        reveal: bool,
    },
    /// Set one dotted key in the config file, e.g. core.retries 5
    Set { key: String, value: String },
    /// Print the config file location
    Path,
    /// Save --api-key/--base-url to the config file
    Init {
        /// Save without validating the API key
        #[arg(long = "skip-validation")]
        skip_validation: bool,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommands() {
        let cli = Cli::try_parse_from([
            "smartlead",
            "campaigns",
            "list",
            "--retries",
            "2",
            "--pretty",
            "--include-tags",
            "yes",
        ])
        .expect("parse");

        assert_eq!(cli.settings.retries, Some(2));
        assert!(cli.settings.pretty);
        assert!(matches!(
            cli.command,
            Commands::Campaigns(CampaignsArgs {
                action: CampaignsCmd::List {
                    include_tags: Some(true),
                    ..
                }
            })
        ));
    }

    #[test]
    fn out_of_range_flags_are_rejected() {
        let day = Cli::try_parse_from(["smartlead", "campaigns", "schedule", "1", "--day", "7"]);
        assert!(day.is_err());

        let page = Cli::try_parse_from([
            "smartlead", "campaigns", "leads", "get", "1", "2", "--page-size", "101",
        ]);
        assert!(page.is_err());
    }

    #[test]
    fn status_accepts_any_case() {
        let cli = Cli::try_parse_from([
            "smartlead", "campaigns", "status", "4", "--status", "paused",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Campaigns(CampaignsArgs {
                action: CampaignsCmd::Status {
                    status: CampaignStatusArg::Paused,
                    ..
                }
            })
        ));
    }
}
