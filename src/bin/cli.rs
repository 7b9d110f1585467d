use anyhow::Context;
use census::census_config::{DatabaseConfig, JwtConfig};
use census::cli::{init_repository, issue_token, seed_persons};
use census::utils::tracing::Tracer;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "census-cli")]
#[command(about = "Census CLI - Administrative tools for the Census API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint a bearer token signed with JWT_SECRET
    IssueToken {
        /// Subject (`sub` claim) of the token
        #[arg(short = 's', long)]
        subject: String,

        /// Lifetime in seconds (defaults to JWT_ACCESS_EXPIRY)
        #[arg(short = 't', long)]
        ttl: Option<i64>,
    },
    /// Create the person table if it does not exist
    InitDb,
    /// Insert fake persons
    Seed {
        /// Number of persons to create
        #[arg(short = 'c', long, default_value = "20")]
        count: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "census=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::IssueToken { subject, ttl } => {
            let token = issue_token(&subject, ttl, &JwtConfig::from_env())?;
            println!("{}", token);
        }
        Commands::InitDb => {
            let db_config = database_config()?;
            let repo = init_repository(&db_config, Tracer::noop()).await?;
            println!("✅ Table `{}` is ready", repo.table());
        }
        Commands::Seed { count } => {
            let db_config = database_config()?;
            let repo = init_repository(&db_config, Tracer::noop()).await?;
            let ids = seed_persons(&repo, count).await?;
            println!("🌱 Seeded {} persons into `{}`", ids.len(), repo.table());
        }
    }

    Ok(())
}

fn database_config() -> anyhow::Result<DatabaseConfig> {
    DatabaseConfig::from_env().context("DATABASE_URL must be set")
}
