//! shadow-client CLI entry point.

use clap::{Parser, Subcommand};
use shadow_client::{ClientConfig, ClientSessionStore, Navigator, OnboardingGate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Inspect the session and onboarding state as a client would see it.
#[derive(Debug, Parser)]
#[command(name = "shadow-client")]
#[command(about = "Client session and onboarding tool for Shadow", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the signed-in user's profile.
    Whoami,
    /// Run the onboarding gate for a path.
    Gate {
        /// Path the client is currently on.
        #[arg(long, default_value = "/")]
        path: String,
    },
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, path: &str) {
        println!("redirect {}", path);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shadow_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let store = ClientSessionStore::new();
    let snapshot = store.hydrate(&cli.config.session_source()).await;

    match cli.command {
        Commands::Whoami => match &snapshot.state.user {
            Some(user) => println!("{}", serde_json::to_string_pretty(user)?),
            None => println!("not signed in"),
        },
        Commands::Gate { path } => {
            let gate = OnboardingGate::new(cli.config.storage(), PrintNavigator);
            match gate.evaluate(&snapshot, &path) {
                Some(decision) => println!("{:?}", decision),
                None => println!("already checked"),
            }
        }
    }

    Ok(())
}
