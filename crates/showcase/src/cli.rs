use clap::{ArgAction, ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use showcase_core::Theme;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "showcase",
    version,
    about = "Submit projects and tools to a GitHub-hosted showcase"
)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'o', value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to colorize output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a TOML config file
    #[arg(long, env = "SHOWCASE_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Debug, Copy, Default)]
pub enum ColorChoice {
    /// Colorize output if stdout is a terminal
    #[default]
    Auto,
    /// Always colorize output
    Always,
    /// Never colorize output
    Never,
}

#[derive(ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Light,
    Dark,
    /// Follow the terminal's color scheme
    System,
}

impl From<ThemeChoice> for Theme {
    fn from(choice: ThemeChoice) -> Self {
        match choice {
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::System => Theme::System,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in to GitHub and manage the stored session
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Project operations
    #[command(visible_alias = "p")]
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Tool operations
    #[command(visible_alias = "t")]
    Tool {
        #[command(subcommand)]
        action: ToolCommands,
    },
    /// Per-user preferences (display name, theme, extra scopes)
    Settings {
        #[command(subcommand)]
        action: SettingsCommands,
    },
    /// Inspect the effective configuration
    #[command(visible_alias = "cfg")]
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Generate shell completions and write to stdout
    pub fn generate_completions(shell: Shell) {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "showcase", &mut std::io::stdout());
    }
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Start the GitHub OAuth flow, or store a token directly with --token
    Login {
        /// Print the authorization URL instead of opening a browser
        #[arg(long, conflicts_with = "token")]
        no_browser: bool,

        /// Extra scope to request on top of user and repo (repeatable)
        #[arg(long = "scope", value_name = "SCOPE", conflicts_with = "token")]
        scopes: Vec<String>,

        /// Personal access token to use instead of the OAuth flow
        #[arg(long)]
        token: Option<String>,
    },
    /// Complete the OAuth flow with the code GitHub redirected back with
    #[command(group(ArgGroup::new("source").required(true).args(["code", "url"])))]
    Callback {
        /// Authorization code
        #[arg(long)]
        code: Option<String>,

        /// State echoed back by GitHub (defaults to the pending login)
        #[arg(long, requires = "code")]
        state: Option<String>,

        /// Full redirect URL; code and state are read from its query
        #[arg(long, conflicts_with_all = ["code", "state"])]
        url: Option<String>,
    },
    /// Forget the stored token and user
    Logout,
    /// Show who is logged in and whether the token is still accepted
    Status,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Submit a project (opens an issue on the showcase repository)
    Submit {
        /// Project name
        #[arg(long)]
        name: String,

        /// Project URL
        #[arg(long)]
        url: String,

        /// Short description
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// List projects already in the showcase
    List,
}

#[derive(Subcommand, Debug)]
pub enum ToolCommands {
    /// Submit a tool (fork, branch, upload files, open a pull request)
    #[command(group(ArgGroup::new("source").required(true).multiple(true).args(["dir", "folder"])))]
    Submit {
        /// Tool name
        #[arg(long)]
        name: String,

        /// Short description
        #[arg(long, short = 'd', default_value = "")]
        description: String,

        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,

        /// Directory whose files are uploaded (sub-directories are ignored)
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,

        /// Folder name to record; without --dir no files are uploaded
        #[arg(long, value_name = "NAME")]
        folder: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the current user's settings and the active palette
    Show,
    /// Change settings; unspecified fields keep their value
    Set {
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long, value_name = "BOOL")]
        email_notifications: Option<bool>,

        #[arg(long, value_enum)]
        theme: Option<ThemeChoice>,

        /// Additional OAuth scope, applied on next login (repeatable)
        #[arg(long = "scope", value_name = "SCOPE")]
        scopes: Vec<String>,

        /// Remove all additional scopes
        #[arg(long, conflicts_with = "scopes")]
        clear_scopes: bool,
    },
    /// Delete the settings and log out
    Disconnect,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Show searched config file paths and the data directory
    Path,
}
