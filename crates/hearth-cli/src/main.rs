use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hearth_core::chat::MessageLocation;
use hearth_core::budget::EntryKind;

mod commands;

use commands::client::ClientOptions;

#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Hearth CLI - household budgets, profiles and chat from the terminal", long_about = None)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Principal to act as
    #[arg(long = "as", global = true)]
    principal: Option<String>,

    /// Delegation token sent with every call
    #[arg(long, global = true)]
    delegation: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or locate the client configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List remote methods and whether they can be called
    Methods,
    /// Translate a raw backend error into the message a user would see
    Translate {
        /// Raw error text
        text: String,
    },
    /// Compute an age from a date of birth
    Age { year: String, month: String, day: String },
    /// Read the caller's profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Personal budget and the local ledger
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },
    /// Household invites
    Invites {
        #[command(subcommand)]
        action: InviteAction,
    },
    /// Chat rooms
    Chat {
        #[command(subcommand)]
        action: ChatAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the caller's profile
    Show,
    /// Show the caller's role
    Role,
}

#[derive(Subcommand)]
enum BudgetAction {
    /// Show the personal budget
    Show,
    /// Overwrite the personal budget
    Set {
        #[arg(long)]
        income: f64,
        #[arg(long)]
        expenses: f64,
        #[arg(long, default_value = "")]
        goals: String,
    },
    /// List ledger entries and totals
    Ledger,
    /// Add a ledger entry
    Add {
        #[arg(value_parser = commands::budget::parse_kind)]
        kind: EntryKind,
        description: String,
        amount: f64,
    },
    /// Remove a ledger entry by id
    Remove { id: String },
}

#[derive(Subcommand)]
enum InviteAction {
    /// List pending invites
    List,
    /// Invite a user by username
    Send { username: String },
    /// Accept an invite
    Accept { id: String },
    /// Decline an invite
    Decline { id: String },
}

#[derive(Subcommand)]
enum ChatAction {
    /// Print new messages of a room as they arrive
    Tail {
        #[arg(long, default_value = "global", value_parser = commands::chat::parse_location)]
        location: MessageLocation,
        /// Stop after this many updates
        #[arg(long)]
        updates: Option<usize>,
    },
    /// Post a message to a room
    Send {
        #[arg(long, default_value = "global", value_parser = commands::chat::parse_location)]
        location: MessageLocation,
        content: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = ClientOptions {
        config_path: cli.config,
        principal: cli.principal,
        delegation: cli.delegation,
    };
    let config = options.load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config)?,
            ConfigAction::Path => commands::config::path(&options)?,
        },
        Commands::Methods => commands::config::methods(&config)?,
        Commands::Translate { text } => commands::tools::translate_text(&text),
        Commands::Age { year, month, day } => commands::tools::age(&year, &month, &day)?,
        Commands::Profile { action } => {
            let ctx = options.connect(config).await?;
            match action {
                ProfileAction::Show => commands::profile::show(&ctx).await?,
                ProfileAction::Role => commands::profile::role(&ctx).await?,
            }
        }
        Commands::Budget { action } => {
            let ctx = options.connect(config).await?;
            match action {
                BudgetAction::Show => commands::budget::show(&ctx).await?,
                BudgetAction::Set {
                    income,
                    expenses,
                    goals,
                } => commands::budget::set(&ctx, income, expenses, goals).await?,
                BudgetAction::Ledger => commands::budget::ledger(&ctx).await?,
                BudgetAction::Add {
                    kind,
                    description,
                    amount,
                } => commands::budget::add(&ctx, kind, &description, amount).await?,
                BudgetAction::Remove { id } => commands::budget::remove(&ctx, &id).await?,
            }
        }
        Commands::Invites { action } => {
            let ctx = options.connect(config).await?;
            match action {
                InviteAction::List => commands::household::list(&ctx).await?,
                InviteAction::Send { username } => commands::household::send(&ctx, &username).await?,
                InviteAction::Accept { id } => commands::household::accept(&ctx, &id).await?,
                InviteAction::Decline { id } => commands::household::decline(&ctx, &id).await?,
            }
        }
        Commands::Chat { action } => {
            let ctx = options.connect(config).await?;
            match action {
                ChatAction::Tail { location, updates } => {
                    commands::chat::tail(&ctx, location, updates).await?
                }
                ChatAction::Send { location, content } => {
                    commands::chat::send(&ctx, location, &content).await?
                }
            }
        }
    }

    Ok(())
}
