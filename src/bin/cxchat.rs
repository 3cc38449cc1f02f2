//! Interactive chat application for conversing with a Dialogflow CX agent.
//!
//! This binary provides a REPL interface: each line typed is sent to the
//! agent and its reply is printed.  Type `exit` (in any case) to leave.
//!
//! # Usage
//!
//! ```bash
//! # Agent coordinates from the environment
//! export DIALOGFLOW_PROJECT_ID=pizza-delivery
//! export DIALOGFLOW_AGENT_ID=d34d8823-076f-4bb7-a8ef-a5be5f469f0d
//! cxchat
//!
//! # Or on the command line, in a regional location
//! cxchat --project-id pizza-delivery --location us-central1 --agent-id d34d8823
//!
//! # Or from a YAML file, keeping one session across runs
//! cxchat --config agent.yaml --session-id user-1234
//! ```
//!
//! Access tokens are taken from `DIALOGFLOW_ACCESS_TOKEN` or
//! `GOOGLE_OAUTH_ACCESS_TOKEN`, falling back to Application Default Credentials
//! (`GOOGLE_APPLICATION_CREDENTIALS`, `gcloud auth application-default login`,
//! the metadata server, or the `gcloud` CLI).
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/session [id]` - Show or switch the session
//! - `/language [code]` - Show or change the input language
//! - `/config` - Show the agent and session in use
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use cxchat::chat::{
    ChatArgs, ChatClient, ChatConfig, PlainTextRenderer, Renderer, SessionContext, run_repl,
};

/// Main entry point for the cxchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("cxchat [OPTIONS]");

    let config = match ChatConfig::load(&args) {
        Ok(config) => config,
        Err(err) => {
            PlainTextRenderer::with_color(!args.no_color).print_error(&err.to_string());
            std::process::exit(2);
        }
    };

    let default_level = if config.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    tracing::info!(
        agent = %config.agent,
        session_id = %config.session_id,
        "starting chat"
    );

    let client = ChatClient::from_config(&config)?;
    let mut context = SessionContext::from(&config);
    let mut rl = DefaultEditor::new()?;

    let turns = run_repl(&client, &mut context, &mut rl, &mut renderer).await?;
    tracing::info!(turns = turns.len(), "chat ended");

    Ok(())
}
