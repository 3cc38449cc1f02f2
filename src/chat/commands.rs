//! Command parsing for the chat application.
//!
//! This module recognizes the bare exit keyword and the slash commands that
//! control the chat loop without sending anything to the agent.

/// The word that ends the chat, compared case-insensitively.
pub const EXIT_KEYWORD: &str = "exit";

/// A parsed chat command.
///
/// These commands control the chat loop and are not sent to the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Exit the chat application.
    Quit,

    /// Display help information.
    Help,

    /// Show the current session id, or switch to a new one.
    Session(Option<String>),

    /// Show the current language code, or switch to a new one.
    Language(Option<String>),

    /// Show the current configuration.
    ShowConfig,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for commands.
///
/// Returns `Some(ChatCommand)` if the input is the exit keyword (in any case)
/// or starts with `/`, or `None` if it should be sent to the agent.
///
/// # Examples
///
/// ```
/// # use cxchat::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("EXIT"), Some(ChatCommand::Quit));
/// assert!(parse_command("/session user-42").is_some());
/// assert!(parse_command("I want a pizza").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if input.eq_ignore_ascii_case(EXIT_KEYWORD) {
        return Some(ChatCommand::Quit);
    }

    let rest = input.strip_prefix('/')?;
    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "config" => ChatCommand::ShowConfig,
        "session" => match argument {
            Some(id) if id.contains(char::is_whitespace) => {
                ChatCommand::Invalid("/session ids cannot contain whitespace".to_string())
            }
            id => ChatCommand::Session(id.map(str::to_string)),
        },
        "language" | "lang" => match argument {
            Some(code) if !is_language_code(code) => ChatCommand::Invalid(format!(
                "/language expects a language tag such as 'en' or 'pt-BR', got '{code}'"
            )),
            code => ChatCommand::Language(code.map(str::to_string)),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn is_language_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  exit                   Exit the chat (any case)
  /session [id]          Show the session id, or switch to a new session
  /language [code]       Show the language code, or change it (e.g., /language de)
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_keyword_any_case() {
        assert_eq!(parse_command("exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("EXIT"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("ExIt"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  exit  "), Some(ChatCommand::Quit));
        assert_eq!(parse_command("exit now"), None);
        assert_eq!(parse_command("exited"), None);
    }

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/QUIT"), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_session() {
        assert_eq!(parse_command("/session"), Some(ChatCommand::Session(None)));
        assert_eq!(
            parse_command("/session   user-42 "),
            Some(ChatCommand::Session(Some("user-42".to_string())))
        );
        assert!(matches!(
            parse_command("/session two words"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("whitespace")
        ));
    }

    #[test]
    fn parse_language() {
        assert_eq!(
            parse_command("/language pt-BR"),
            Some(ChatCommand::Language(Some("pt-BR".to_string())))
        );
        assert_eq!(
            parse_command("/lang de"),
            Some(ChatCommand::Language(Some("de".to_string())))
        );
        assert_eq!(
            parse_command("/language"),
            Some(ChatCommand::Language(None))
        );
        assert!(matches!(
            parse_command("/language en_US!"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("language tag")
        ));
    }

    #[test]
    fn parse_help_and_config() {
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/config"), Some(ChatCommand::ShowConfig));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse_command("/pizza"),
            Some(ChatCommand::Invalid("Unknown command: /pizza".to_string()))
        );
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("I want a large pizza"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("exit"));
        assert!(help.contains("/session"));
        assert!(help.contains("/language"));
    }
}
