use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ghstep::config::{AppConfig, RunnerEnv};
use ghstep::step::StepContext;

#[derive(Parser)]
#[command(name = "ghstep", about = "GitHub helpers for CI pipeline steps")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Token for the GitHub REST API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the commit sha and run id this execution reports against
    Context,

    /// Download a workflow artifact as a zip archive
    DownloadArtifact {
        #[arg(long)]
        id: u64,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List every file tracked at a commit
    ListFiles {
        /// Commit to list; defaults to the triggering commit
        #[arg(long)]
        sha: Option<String>,
    },

    /// Create or update the named status comment on the triggering pull request
    UpsertComment {
        #[arg(long)]
        name: String,
        #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let runner = RunnerEnv::load()?;
    let step = StepContext::new(config, runner, cli.token)?;

    match cli.command {
        Command::Context => {
            let ctx = step.resolve_trigger_context()?;
            println!("sha={}", ctx.commit_sha);
            println!("run_id={}", ctx.run_id);
        }
        Command::DownloadArtifact { id, output } => {
            let token = step.token()?;
            step.download_artifact(id, &output, token).await?;
        }
        Command::ListFiles { sha } => {
            let sha = match sha {
                Some(sha) => sha,
                None => step.resolve_trigger_context()?.commit_sha,
            };
            for file in step.list_files(&sha).await? {
                println!("{file}");
            }
        }
        Command::UpsertComment {
            name,
            body,
            body_file,
        } => {
            let message = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => tokio::fs::read_to_string(&path).await?,
                (None, None) => anyhow::bail!("either --body or --body-file is required"),
            };
            match step.upsert_comment(&name, &message).await? {
                Some(comment) => tracing::info!(url = %comment.html_url, "Comment up to date"),
                None => tracing::info!("Event has no pull request, no comment posted"),
            }
        }
    }

    Ok(())
}
