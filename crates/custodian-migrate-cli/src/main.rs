//! custodian-migrate CLI - field-level schema migrations for custodian objects.

use clap::{Parser, Subcommand};
use custodian_migrate::{
    Config, FieldMigration, FileSyncer, MetaDescriptionSyncer, MigrateError,
    PgTarget, StatementSet,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "custodian-migrate")]
#[command(about = "Field-level schema migrations for custodian objects")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the DDL a migration would execute
    Plan {
        /// Migration document (YAML or JSON)
        #[arg(short, long)]
        migration: PathBuf,
    },

    /// Apply a migration to the database and the description store
    Apply {
        /// Migration document (YAML or JSON)
        #[arg(short, long)]
        migration: PathBuf,

        /// Execute the DDL, then roll back without saving the description
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a stored object description
    Show {
        /// Object name
        object: String,
    },

    /// Test the target database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    let syncer = FileSyncer::new(&config.metadata.path);
    info!(
        "Using {} metadata store at {}",
        syncer.backend_type(),
        syncer.dir().display()
    );

    match cli.command {
        Commands::Plan { migration } => {
            let migration = FieldMigration::load(&migration)?;
            let statements = migration.plan(&syncer).await?;
            print_statements(&statements, cli.output_json)?;
        }

        Commands::Apply { migration, dry_run } => {
            let migration = FieldMigration::load(&migration)?;
            let target = PgTarget::new(&config.target).await?;
            let mut tx = target.begin().await?;

            if dry_run {
                let statements = migration.dry_run(&syncer, &mut tx).await?;
                if !cli.output_json {
                    println!("Dry run succeeded; all changes rolled back.\n");
                }
                print_statements(&statements, cli.output_json)?;
                return Ok(());
            }

            let description = migration.apply(&syncer, &mut tx).await.map_err(|e| {
                warn!("Migration of {} rolled back: {}", migration.object, e);
                e
            })?;
            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&description)?);
            } else {
                println!("Migration applied to {}", description.name);
                println!("  Fields: {}", description.fields.len());
            }
        }

        Commands::Show { object } => {
            let description = syncer.get(&object).await?.ok_or_else(|| {
                MigrateError::MetaStore(format!("Object {} does not exist", object))
            })?;
            println!("{}", serde_json::to_string_pretty(&description)?);
        }

        Commands::HealthCheck => {
            let target = PgTarget::new(&config.target).await?;
            let result = target.health_check().await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Target (PostgreSQL): {} ({}ms)",
                    if result.healthy { "OK" } else { "FAILED" },
                    result.latency_ms
                );
                if let Some(ref version) = result.server_version {
                    println!("    Version: {}", version);
                }
                if let Some(ref err) = result.error {
                    println!("    Error: {}", err);
                }
            }

            if !result.healthy {
                return Err(MigrateError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

fn print_statements(statements: &StatementSet, json: bool) -> Result<(), MigrateError> {
    if json {
        println!("{}", serde_json::to_string_pretty(statements)?);
    } else if statements.is_empty() {
        println!("No changes.");
    } else {
        print!("{}", statements);
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so plans and JSON output stay clean on stdout.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
