mod commands;
mod context;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use household_core::Collection;

use crate::commands::add::AddCommand;
use crate::context::Context;

#[derive(Parser)]
#[command(name = "household")]
#[command(about = "Manage your family's calendar, expenses, shopping list and chores")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionArg {
    Calendar,
    Expenses,
    Shop,
    Chores,
}

impl From<CollectionArg> for Collection {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Calendar => Collection::Calendar,
            CollectionArg::Expenses => Collection::Expenses,
            CollectionArg::Shop => Collection::ShopList,
            CollectionArg::Chores => Collection::HomeChores,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show where the config lives and what it contains
    Config,
    /// List the rows of a collection
    List { collection: CollectionArg },
    /// Calendar with recurring events expanded and public holidays
    Agenda {
        /// First day to show (YYYY-MM-DD, default today)
        #[arg(long)]
        from: Option<String>,

        /// Number of days to show
        #[arg(long, default_value_t = 14)]
        days: i64,
    },
    /// Upcoming one-time events
    Upcoming,
    /// Add a row
    #[command(subcommand)]
    Add(AddCommand),
    /// Change fields of a row, e.g. `--set quantity=3 --set name="Oat milk"`
    Edit {
        collection: CollectionArg,
        /// Row id (or a unique prefix)
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// Remove a row
    Rm {
        collection: CollectionArg,
        /// Row id (or a unique prefix)
        id: String,
    },
    /// Money spent over the last week, month or year
    Spent {
        #[arg(long, default_value = "week")]
        window: String,

        /// Only count this member's expenses
        #[arg(long)]
        user: Option<String>,

        /// Currency to report in (EUR, USD, CZK)
        #[arg(long, default_value = "EUR")]
        currency: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config => commands::config::run(),
        command => run(&Context::load()?, command).await,
    }
}

async fn run(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Config => commands::config::run(),
        Commands::List { collection } => commands::list::run(ctx, collection.into()).await,
        Commands::Agenda { from, days } => commands::agenda::run(ctx, from.as_deref(), days).await,
        Commands::Upcoming => commands::agenda::upcoming(ctx).await,
        Commands::Add(add) => commands::add::run(ctx, add).await,
        Commands::Edit {
            collection,
            id,
            fields,
        } => commands::edit::run(ctx, collection.into(), &id, &fields).await,
        Commands::Rm { collection, id } => commands::rm::run(ctx, collection.into(), &id).await,
        Commands::Spent {
            window,
            user,
            currency,
        } => commands::spent::run(ctx, &window, user.as_deref(), &currency).await,
    }
}
