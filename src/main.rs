//! Governance agent - main entry point.
//!
//! Subcommands:
//! - `serve`: run the chat endpoint
//! - `ask`: answer one question and exit
//! - `tools`: print the function-tool menu sent to the model
//! - `send`: talk to a running agent over the chat endpoint

use clap::{Parser, Subcommand};
use governance_agent::tools::ToolCatalog;
use governance_agent::transport::AgentClient;
use governance_agent::types::{AgentAddress, TransportConfig};
use governance_agent::{Config, GovernanceAgent};

#[derive(Parser, Debug)]
#[command(name = "governance-agent")]
#[command(about = "Chat agent for Internet Computer governance")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the chat endpoint until Ctrl-C
    Serve {
        /// Override the listen address
        #[arg(long, env = "AGENT_LISTEN_ADDR")]
        listen: Option<String>,
    },
    /// Answer a single question
    Ask {
        /// The question
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Print the tool menu as JSON
    Tools,
    /// Send a chat message to a running agent and print its replies
    Send {
        /// Agent address
        #[arg(long, default_value = "127.0.0.1:8001")]
        to: String,

        /// Sender address used in the envelope
        #[arg(long, default_value = "cli-user")]
        from: String,

        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    governance_agent::observability::init_tracing(level);

    match cli.command {
        Command::Tools => {
            let specs = ToolCatalog::governance().to_function_specs();
            println!("{}", serde_json::to_string_pretty(&specs)?);
        }
        Command::Ask { query } => {
            let agent = GovernanceAgent::from_config(Config::from_env()?)?;
            println!("{}", agent.ask(&query.join(" ")).await);
        }
        Command::Serve { listen } => {
            let mut config = Config::from_env()?;
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            let agent = GovernanceAgent::from_config(config)?;
            let server = agent.server()?;

            let cancel = server.cancel_token();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Ctrl-C received");
                    cancel.cancel();
                }
            });

            tracing::info!("Starting {}", agent.handler().address());
            server.serve().await?;
        }
        Command::Send { to, from, text } => {
            let sender = AgentAddress::from_string(from)?;
            let client = AgentClient::new(to.parse()?, sender, &TransportConfig::default());
            for reply in client.ask(&text.join(" ")).await? {
                println!("{}", reply);
            }
        }
    }

    Ok(())
}
