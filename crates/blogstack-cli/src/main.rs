//! blogstack CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "blogstack")]
#[command(about = "Stage-parameterized infrastructure synthesis", long_about = None)]
struct Cli {
    /// Deploy manifest path
    #[arg(long, default_value = "blogstack.kdl")]
    manifest: PathBuf,

    /// Deployment stage (dev or prod)
    #[arg(long, env = "BLOG_STAGE")]
    stage: Option<String>,

    /// Stack to compose (app or cdn)
    #[arg(long, env = "BLOG_STACK", default_value = "app")]
    stack: String,

    /// Commit identifier used as the image tag; defaults to "latest"
    #[arg(long, env = "BLOG_COMMIT_SHA")]
    commit: Option<String>,

    /// JSON parameter file (path -> value) backing the parameter store
    #[arg(long)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the stack template as JSON
    Synth,
    /// Show the dependency-ordered apply plan
    Plan,
    /// List the parameter paths the selected stack requires
    Params,
    /// Parse and validate the deploy manifest
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Synth => {
            let ctx = commands::build_context(
                &cli.manifest,
                cli.stage.as_deref(),
                Some(&cli.stack),
                cli.commit.clone(),
            )?;
            let resolver = commands::resolver(&ctx, cli.params.as_deref())?;
            commands::synth(&ctx, &resolver).await?;
        }
        Commands::Plan => {
            let ctx = commands::build_context(
                &cli.manifest,
                cli.stage.as_deref(),
                Some(&cli.stack),
                cli.commit.clone(),
            )?;
            let resolver = commands::resolver(&ctx, cli.params.as_deref())?;
            commands::plan(&ctx, &resolver).await?;
        }
        Commands::Params => {
            let ctx = commands::build_context(
                &cli.manifest,
                cli.stage.as_deref(),
                Some(&cli.stack),
                cli.commit.clone(),
            )?;
            commands::params(&ctx);
        }
        Commands::Validate => {
            commands::validate(&cli.manifest)?;
        }
    }

    Ok(())
}
