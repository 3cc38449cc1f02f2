//! Output rendering for the chat loop.
//!
//! This module provides the renderer trait and a plain-text implementation
//! that writes to stdout (or any writer) with optional ANSI styling.

use std::io::{self, Stdout, Write};

/// ANSI escape code for bold text (used for the bot label).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for echoed input).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the bot label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for the fallback reply).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Label printed before every bot reply.
pub const BOT_LABEL: &str = "Bot: ";

/// Reply printed when the agent could not be reached or said nothing.
pub const FALLBACK_REPLY: &str = "Sorry, I didn't understand that.";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Print the greeting shown when the loop starts.
    fn print_banner(&mut self, exit_keyword: &str);

    /// Echo the user's input before it is sent.
    fn print_user_echo(&mut self, text: &str);

    /// Print the agent's reply.
    fn print_reply(&mut self, text: &str);

    /// Print the fixed reply used when there is nothing else to show.
    fn print_fallback(&mut self) {
        self.print_reply(FALLBACK_REPLY);
    }

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print the goodbye shown when the loop ends.
    fn print_farewell(&mut self);
}

/// Plain text renderer with optional ANSI styling.
///
/// Regular output goes to the wrapped writer (stdout by default); errors go
/// to stderr.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            out: io::stdout(),
            use_color,
        }
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self { out, use_color }
    }

    /// Consumes the renderer, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }

    fn reply_line(&mut self, color: &str, text: &str) {
        if self.use_color {
            let _ = writeln!(
                self.out,
                "{ANSI_BOLD}{ANSI_CYAN}{BOT_LABEL}{ANSI_RESET}{color}{text}{ANSI_RESET}"
            );
            let _ = self.out.flush();
        } else {
            self.line(&format!("{BOT_LABEL}{text}"));
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_banner(&mut self, exit_keyword: &str) {
        self.line(&format!(
            "\nWelcome to the chatbot! Type '{exit_keyword}' to end the chat.\n"
        ));
    }

    fn print_user_echo(&mut self, text: &str) {
        if self.use_color {
            self.line(&format!("{ANSI_DIM}User Input: {text}{ANSI_RESET}"));
        } else {
            self.line(&format!("User Input: {text}"));
        }
    }

    fn print_reply(&mut self, text: &str) {
        self.reply_line("", text);
    }

    fn print_fallback(&mut self) {
        self.reply_line(ANSI_YELLOW, FALLBACK_REPLY);
    }

    fn print_error(&mut self, error: &str) {
        if self.use_color {
            eprintln!("{ANSI_RED}Error: {error}{ANSI_RESET}");
        } else {
            eprintln!("Error: {error}");
        }
    }

    fn print_info(&mut self, info: &str) {
        self.line(info);
    }

    fn print_farewell(&mut self) {
        self.line("Goodbye!");
    }
}
