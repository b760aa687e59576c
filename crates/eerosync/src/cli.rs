//! Clap derive structures for the `eerosync` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand, ValueEnum};

use eerosync_core::{
    Activity, ActivityScope, NetworkSetting, NightlightMode, ProfileSetting,
};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// eerosync -- sync and manage eero home networks
#[derive(Debug, Parser)]
#[command(
    name = "eerosync",
    version,
    about = "Sync and manage eero home networks from the command line",
    long_about = "Pulls account, network, eero, profile and client state from the\n\
        eero cloud service in one sync cycle and applies setting changes.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "EEROSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API host (overrides profile)
    #[arg(long, env = "EEROSYNC_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "EEROSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "EEROSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Write raw response payloads to this directory
    #[arg(long, env = "EEROSYNC_DUMP_DIR", global = true)]
    pub dump_dir: Option<PathBuf>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Two-state switch for boolean settings.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    #[value(alias = "true", alias = "enable")]
    On,
    #[value(alias = "false", alias = "disable")]
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in with an email address or phone number
    Login(LoginArgs),

    /// Show the account behind the active session
    Account,

    /// List or inspect networks
    #[command(alias = "net", alias = "n")]
    Networks(ResourceArgs),

    /// List or inspect eero units
    #[command(alias = "eeros", alias = "d")]
    Devices(ResourceArgs),

    /// List or inspect connected clients
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// List or inspect profiles
    Profiles(ResourceArgs),

    /// List backup networks
    Backups(ResourceArgs),

    /// Fetch one activity series and show the per-resource totals
    Activity(ActivityArgs),

    /// Change a setting
    Set(SetArgs),

    /// Reboot a network or a single eero
    Reboot(RebootArgs),

    /// Install pending firmware updates on a network
    Update {
        /// Network id
        network: String,
    },

    /// Re-sync on an interval and print a summary after each cycle
    Watch(WatchArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email address or phone number (prompted when omitted)
    #[arg(long)]
    pub login: Option<String>,

    /// Verification code (prompted when omitted)
    #[arg(long)]
    pub code: Option<String>,

    /// Store the session token in the config file instead of the keyring
    #[arg(long)]
    pub plaintext: bool,
}

// ── Read commands ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List resources
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one resource by id
    Get {
        /// Resource id
        id: String,
    },
}

/// Shared filtering arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only resources of this network
    #[arg(long, short = 'n')]
    pub network: Option<String>,
}

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// List clients
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Only currently connected clients
        #[arg(long)]
        connected: bool,
    },

    /// Show one client by id
    Get {
        /// Client id
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ActivityArgs {
    /// Series to fetch, e.g. `blocked_day` or `data_usage_week`
    pub activity: Activity,

    /// Resource family the series is requested for
    #[arg(long, short = 's', default_value = "network")]
    pub scope: ActivityScope,

    /// Network id (defaults to every network)
    #[arg(long, short = 'n')]
    pub network: Option<String>,

    /// Profile ids to fan out over for the `profiles` scope
    #[arg(long = "profile-id", value_delimiter = ',')]
    pub profile_ids: Vec<String>,
}

// ── Set ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Toggle a network setting (ad-block, guest-network, sqm, upnp, ...)
    Network {
        /// Network id
        network: String,
        setting: NetworkSetting,
        state: Toggle,
    },

    /// Set the hour window in which firmware updates install
    UpdateHour {
        /// Network id
        network: String,
        /// Window label, e.g. `2am_3am`
        label: String,
    },

    /// Toggle a profile setting (paused, ad-block, block-*-content, ...)
    Profile {
        /// Profile id
        profile: String,
        setting: ProfileSetting,
        state: Toggle,
    },

    /// Replace a profile's blocked applications
    BlockedApps {
        /// Profile id
        profile: String,
        /// Application identifiers (none clears the list)
        apps: Vec<String>,
    },

    /// Pause or resume a client
    ClientPaused {
        /// Client id
        client: String,
        state: Toggle,
    },

    /// Turn an eero's status light on or off
    StatusLight {
        /// Eero id
        device: String,
        state: Toggle,
    },

    /// Set an eero's status light brightness (0 turns it off)
    StatusLightBrightness {
        /// Eero id
        device: String,
        #[arg(value_parser = clap::value_parser!(u64).range(0..=100))]
        percent: u64,
    },

    /// Configure a Beacon's nightlight
    Nightlight(NightlightArgs),

    /// Toggle auto-join for a backup network
    BackupAutoJoin {
        /// Backup network id
        backup: String,
        state: Toggle,
    },
}

#[derive(Debug, Args)]
pub struct NightlightArgs {
    /// Beacon id
    pub device: String,

    #[command(subcommand)]
    pub command: NightlightCommand,
}

#[derive(Debug, Subcommand)]
pub enum NightlightCommand {
    /// Switch between disabled, ambient and scheduled
    Mode { mode: NightlightMode },

    /// Set the on/off times (HH:MM)
    Schedule {
        #[arg(value_parser = parse_time)]
        on: NaiveTime,
        #[arg(value_parser = parse_time)]
        off: NaiveTime,
    },

    /// Set the brightness percentage
    Brightness {
        #[arg(value_parser = clap::value_parser!(u64).range(0..=100))]
        percent: u64,
    },
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

// ── Reboot ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RebootArgs {
    #[command(subcommand)]
    pub command: RebootCommand,
}

#[derive(Debug, Subcommand)]
pub enum RebootCommand {
    /// Reboot every eero on a network
    Network { network: String },
    /// Reboot a single eero
    Device { device: String },
}

// ── Watch & Completions ──────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between cycles (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_typed_setting_arguments() {
        let cli = Cli::try_parse_from(["eerosync", "set", "network", "42", "guest-network", "on"])
            .unwrap_or_else(|e| panic!("{e}"));
        match cli.command {
            Command::Set(SetArgs {
                command:
                    SetCommand::Network {
                        network,
                        setting,
                        state,
                    },
            }) => {
                assert_eq!(network, "42");
                assert_eq!(setting, NetworkSetting::GuestNetwork);
                assert!(state.enabled());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_schedule_time() {
        let err = Cli::try_parse_from([
            "eerosync",
            "set",
            "nightlight",
            "7",
            "schedule",
            "25:00",
            "06:00",
        ]);
        assert!(err.is_err());
    }
}
