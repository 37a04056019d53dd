use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use civictrack::blob::LocalBlobStore;
use civictrack::commands;
use civictrack::db::Database;
use civictrack::filter::IssueFilter;
use civictrack::lifecycle::IssuePatch;
use civictrack::models::{IssueType, Priority, Role, Status};

#[derive(Parser)]
#[command(name = "civictrack")]
#[command(about = "Civic issue reporting and lifecycle tracker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize civictrack in the current directory
    Init,

    /// Report a new issue
    Report {
        /// Acting user id (normally supplied by the identity layer)
        #[arg(long = "as", env = "CIVICTRACK_USER", value_name = "USER_ID")]
        as_user: i64,
        /// Issue category
        #[arg(short = 't', long = "type")]
        issue_type: IssueType,
        /// What is wrong
        #[arg(short, long)]
        description: String,
        /// Street address of the problem
        #[arg(short, long)]
        address: String,
        /// Latitude
        #[arg(long)]
        lat: f64,
        /// Longitude
        #[arg(long)]
        lng: f64,
        /// Priority (defaults to medium)
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Photo files to attach (up to 5, 5 MiB each)
        #[arg(long = "photo", value_name = "FILE")]
        photos: Vec<PathBuf>,
    },

    /// List issues
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<Status>,
        /// Filter by issue category
        #[arg(short = 't', long = "type")]
        issue_type: Option<IssueType>,
        /// Filter by priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Filter by reporting user id
        #[arg(short, long)]
        reporter: Option<i64>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show issue details
    Show {
        /// Issue ID
        id: i64,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Update an issue's workflow fields
    Update {
        /// Issue ID
        id: i64,
        /// New status
        #[arg(short, long)]
        status: Option<Status>,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// Responsible department
        #[arg(short, long)]
        department: Option<String>,
        /// Staff user id to assign
        #[arg(short, long)]
        assign: Option<i64>,
        /// Resolution notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete an issue
    Delete {
        /// Issue ID
        id: i64,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show dashboard statistics
    Stats {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List issues reported by the acting user
    Mine {
        /// Acting user id
        #[arg(long = "as", env = "CIVICTRACK_USER", value_name = "USER_ID")]
        as_user: i64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// User management
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a user
    Add {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// Role (defaults to citizen)
        #[arg(short, long, default_value = "citizen")]
        role: Role,
    },
    /// Show the acting user's own record
    Show {
        /// Acting user id
        #[arg(long = "as", env = "CIVICTRACK_USER", value_name = "USER_ID")]
        as_user: i64,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List all users (admin only)
    List {
        /// Acting user id
        #[arg(long = "as", env = "CIVICTRACK_USER", value_name = "USER_ID")]
        as_user: i64,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn find_data_dir() -> Result<PathBuf> {
    let mut current = env::current_dir()?;

    loop {
        let candidate = current.join(".civictrack");
        if candidate.exists() && candidate.is_dir() {
            return Ok(candidate);
        }

        if !current.pop() {
            bail!("Not a civictrack directory (or any parent). Run 'civictrack init' first.");
        }
    }
}

fn get_db() -> Result<Database> {
    let data_dir = find_data_dir()?;
    let db_path = data_dir.join("issues.db");
    Database::open(&db_path).context("Failed to open database")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civictrack=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let cwd = env::current_dir()?;
            commands::init::run(&cwd)
        }

        Commands::Report {
            as_user,
            issue_type,
            description,
            address,
            lat,
            lng,
            priority,
            photos,
        } => {
            let db = get_db()?;
            let blobs = LocalBlobStore::new(find_data_dir()?.join("uploads"))?;
            commands::report::run(
                &db,
                &blobs,
                as_user,
                issue_type,
                &description,
                &address,
                lat,
                lng,
                priority,
                &photos,
            )
        }

        Commands::List {
            status,
            issue_type,
            priority,
            reporter,
            json,
        } => {
            let db = get_db()?;
            let filter = IssueFilter {
                status,
                issue_type,
                priority,
                reporter_id: reporter,
            };
            commands::list::run(&db, &filter, json)
        }

        Commands::Show { id, json } => {
            let db = get_db()?;
            commands::show::run(&db, id, json)
        }

        Commands::Update {
            id,
            status,
            priority,
            department,
            assign,
            notes,
        } => {
            let db = get_db()?;
            let patch = IssuePatch {
                status,
                priority,
                department,
                assigned_to: assign,
                resolution_notes: notes,
            };
            commands::update::run(&db, id, &patch)
        }

        Commands::Delete { id, force } => {
            let db = get_db()?;
            commands::delete::run(&db, id, force)
        }

        Commands::Stats { json } => {
            let db = get_db()?;
            commands::stats::run(&db, json)
        }

        Commands::Mine { as_user, json } => {
            let db = get_db()?;
            commands::mine::run(&db, as_user, json)
        }

        Commands::User { action } => {
            let db = get_db()?;
            match action {
                UserCommands::Add { name, email, role } => {
                    commands::users::add(&db, &name, &email, role)
                }
                UserCommands::Show { as_user, json } => commands::users::show(&db, as_user, json),
                UserCommands::List { as_user, json } => commands::users::list(&db, as_user, json),
            }
        }
    }
}
