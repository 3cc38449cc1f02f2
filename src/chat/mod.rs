//! Chat application module for interactive conversations with a Dialogflow CX agent.
//!
//! This module provides a REPL chat interface built on top of the client
//! library. It supports:
//!
//! - One detect-intent request per line of input
//! - An exit keyword and slash commands for session control
//! - Configuration from a YAML file, the environment, and the command line
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The chat client and per-turn bookkeeping
//! - [`commands`]: Exit keyword and slash command parsing
//! - [`repl`]: The read-eval-print loop

mod commands;
mod config;
mod repl;
mod session;

pub use crate::render::{BOT_LABEL, FALLBACK_REPLY, PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, EXIT_KEYWORD, help_text, parse_command};
pub use config::{
    ChatArgs, ChatConfig, ConfigLayer, DEFAULT_LANGUAGE_CODE, DEFAULT_LOCATION,
    default_session_id,
};
pub use repl::{Input, LineReader, PROMPT, run_repl};
pub use session::{ChatClient, ConversationTurn, SessionContext, extract_reply_text};
