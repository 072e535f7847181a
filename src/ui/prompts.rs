//! ui::prompts
//!
//! Interactive prompts.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::io::{self, BufRead, IsTerminal, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(e: io::Error) -> Self {
        PromptError::IoError(e.to_string())
    }
}

/// Whether stdin is attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Read one line from `reader`, without the trailing newline.
///
/// End of input is reported as `Cancelled`.
pub fn read_line_from<R: BufRead>(reader: &mut R) -> Result<String, PromptError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(PromptError::Cancelled);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Prompt for text input on stderr and read it from stdin.
pub fn input(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    eprint!("{}", message);
    io::stderr().flush()?;
    read_line_from(&mut io::stdin().lock())
}

/// Prompt for masked input (e.g., consumer secrets).
///
/// The input is not echoed to the terminal.
pub fn password(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let value = rpassword::prompt_password(message)?;
    if value.is_empty() {
        return Err(PromptError::Cancelled);
    }
    Ok(value)
}
