//! The interactive read-eval-print loop.

use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::commands::{ChatCommand, EXIT_KEYWORD, help_text, parse_command};
use crate::chat::session::{ChatClient, ConversationTurn, SessionContext};
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::sessions::SessionsClient;

/// Prompt shown before each line of input.
pub const PROMPT: &str = "You: ";

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its newline.
    Line(String),
    /// Ctrl+C at the prompt.
    Interrupted,
    /// End of input (Ctrl+D or a closed pipe).
    Eof,
}

/// A source of input lines.
pub trait LineReader {
    /// Shows `prompt` and reads one line.
    fn read_line(&mut self, prompt: &str) -> Result<Input>;

    /// Records a line in the history, if the reader keeps one.
    fn add_history(&mut self, line: &str) {
        _ = line;
    }
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Input> {
        match self.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(ReadlineError::Io(e)) => Err(Error::io("failed to read input", e)),
            Err(e) => Err(Error::io(
                "failed to read input",
                io::Error::other(e.to_string()),
            )),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.add_history_entry(line);
    }
}

/// Runs the chat loop until the exit keyword or end of input.
///
/// Every non-empty line that is not a command is sent to the agent in
/// `context`; the reply, or the fallback message, is rendered before the next
/// line is read.  A failed turn does not end the loop.
///
/// Returns the turns that were sent to the agent, in order.
///
/// # Errors
///
/// Returns an error only if reading input fails.
pub async fn run_repl<S: SessionsClient>(
    client: &ChatClient<S>,
    context: &mut SessionContext,
    input: &mut dyn LineReader,
    renderer: &mut dyn Renderer,
) -> Result<Vec<ConversationTurn>> {
    let mut turns = Vec::new();
    renderer.print_banner(EXIT_KEYWORD);

    loop {
        let line = match input.read_line(PROMPT)? {
            Input::Line(line) => line,
            Input::Interrupted => continue,
            Input::Eof => {
                renderer.print_farewell();
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        input.add_history(line);

        if let Some(cmd) = parse_command(line) {
            match cmd {
                ChatCommand::Quit => {
                    renderer.print_farewell();
                    break;
                }
                ChatCommand::Help => {
                    for line in help_text().lines() {
                        renderer.print_info(&format!("    {}", line));
                    }
                }
                ChatCommand::Session(None) => {
                    renderer.print_info(&format!("Session: {}", context.session_id));
                }
                ChatCommand::Session(Some(session_id)) => {
                    renderer.print_info(&format!("Switched to session {}", session_id));
                    context.session_id = session_id;
                }
                ChatCommand::Language(None) => {
                    renderer.print_info(&format!("Language: {}", context.language_code));
                }
                ChatCommand::Language(Some(language_code)) => {
                    renderer.print_info(&format!("Language set to {}", language_code));
                    context.language_code = language_code;
                }
                ChatCommand::ShowConfig => {
                    print_config(client, context, renderer);
                }
                ChatCommand::Invalid(message) => {
                    renderer.print_error(&message);
                }
            }
            continue;
        }

        renderer.print_user_echo(line);
        let turn = client.turn(context, line).await;
        match turn.displayable_reply() {
            Some(reply) => renderer.print_reply(reply),
            None => renderer.print_fallback(),
        }
        turns.push(turn);
    }

    Ok(turns)
}

fn print_config<S: SessionsClient>(
    client: &ChatClient<S>,
    context: &SessionContext,
    renderer: &mut dyn Renderer,
) {
    let agent = client.agent();
    renderer.print_info("    Current Configuration:");
    renderer.print_info(&format!("      Project: {}", agent.project_id));
    renderer.print_info(&format!("      Location: {}", agent.location));
    renderer.print_info(&format!("      Agent: {}", agent.agent_id));
    renderer.print_info(&format!("      Session: {}", context.session_id));
    renderer.print_info(&format!("      Language: {}", context.language_code));
    renderer.print_info(&format!(
        "      Session path: {}",
        client.session_path(&context.session_id)
    ));
}
