use clap::{Parser, ValueEnum};
use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Command {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

impl From<Command> for MigrationCommand {
    fn from(command: Command) -> Self {
        match command {
            Command::Up => MigrationCommand::Up,
            Command::Down => MigrationCommand::Down,
            Command::Fresh => MigrationCommand::Fresh,
            Command::Reset => MigrationCommand::Reset,
            Command::Refresh => MigrationCommand::Refresh,
            Command::Status => MigrationCommand::Status,
        }
    }
}

#[derive(Parser)]
#[command(name = "migration-cli")]
#[command(about = "Sorter Master database migration tool")]
struct Args {
    /// Migration command to run
    #[arg(value_enum)]
    command: Command,

    /// Database URL (postgres://... or sqlite://path?mode=rwc)
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .without_time()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_env_filter("migration=info,sqlx=warn")
        .init();

    let args = Args::parse();

    // In-memory databases vanish with the process, so a CLI migration against one is pointless.
    if args.database_url.starts_with("sqlite::memory:") {
        eprintln!("❌ SQLite in-memory databases are not supported for CLI operations.");
        eprintln!("Use a file database instead, e.g. sqlite://sorter.db?mode=rwc");
        std::process::exit(2);
    }

    let mut opt = ConnectOptions::new(&args.database_url);
    opt.max_connections(1).sqlx_logging(false);

    let db = match Database::connect(opt).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = migrate(&db, args.command.into()).await {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}
