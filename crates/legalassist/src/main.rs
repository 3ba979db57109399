use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use legalassist_common::{logger, AppConfig};
use legalassist_server::FeatureRouter;
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
            return;
        }
    }

    dotenv::dotenv().ok();
}

#[derive(Parser)]
#[command(name = "legalassist")]
#[command(about = "LegalAssist - legal consultation, document analysis and template drafting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        #[command(flatten)]
        policy: PolicyArgs,
    },

    /// Run a single request and print the result
    Ask {
        /// consult, analyze or generate-template
        #[arg(long, default_value = "consult")]
        feature: String,

        /// Read the message from a text file
        #[arg(long, conflicts_with = "message")]
        file: Option<PathBuf>,

        /// Question, document text or document type
        message: Vec<String>,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Analysis policy overrides
#[derive(Args, Default)]
struct PolicyArgs {
    /// Documents up to this many characters are analyzed in one call
    #[arg(long)]
    threshold: Option<usize>,

    /// Characters per chunk once a document is segmented
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long)]
    overlap: Option<usize>,
}

impl PolicyArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(threshold) = self.threshold {
            config.analysis.single_shot_threshold = threshold;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.analysis.chunk_size = chunk_size;
        }
        if let Some(overlap) = self.overlap {
            config.analysis.chunk_overlap = overlap;
        }
    }
}

async fn serve(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server_host = host;
    }
    if let Some(port) = port {
        config.server_port = port;
    }
    config.validate()?;

    logger::setup_logging(config.log_dir.as_deref(), &config.log_level)?;

    tracing::info!("LegalAssist starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Address: {}", config.server_bind_address());
    tracing::info!("  Model: {} ({})", config.model.model, config.model.base_url);
    tracing::info!(
        "  Analysis: threshold {} chars, chunk {} chars, overlap {} chars",
        config.analysis.single_shot_threshold,
        config.analysis.chunk_size,
        config.analysis.chunk_overlap
    );

    let gateway = legalassist_llm::build_gateway(&config.model)?;

    println!("Server listening on http://{}", config.server_bind_address());

    legalassist_server::start_server(config, gateway).await?;
    Ok(())
}

async fn ask(
    config: AppConfig,
    feature: String,
    file: Option<PathBuf>,
    message: Vec<String>,
) -> Result<()> {
    config.validate()?;
    logger::setup_console_logging(&config.log_level)?;

    let message = match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => message.join(" "),
    };

    let gateway = legalassist_llm::build_gateway(&config.model)?;
    let router = FeatureRouter::new(gateway, &config)?;

    let response = router.handle(Some(&message), Some(&feature)).await?;

    println!("{}", response.response);
    if let Some(template) = response.template {
        println!();
        println!("{}", template);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env at project root before AppConfig reads the environment
    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;

    match cli.command {
        Some(Commands::Serve { host, port, policy }) => {
            policy.apply(&mut config);
            serve(config, host, port).await?;
        }
        Some(Commands::Ask {
            feature,
            file,
            message,
            policy,
        }) => {
            policy.apply(&mut config);
            ask(config, feature, file, message).await?;
        }
        None => {
            serve(config, None, None).await?;
        }
    }

    Ok(())
}
