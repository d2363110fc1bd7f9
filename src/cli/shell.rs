use std::{
    env, fmt,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use shell_words::split;

use crate::config::ConfigManager;
use crate::core::services::ServiceError;
use crate::core::RecordBook;
use crate::errors::LedgerError;
use crate::storage::JsonFileStore;

use super::commands;
use super::output;

pub const SCRIPT_ENV: &str = "KAKEIBO_CLI_SCRIPT";
const PROMPT: &str = "kakeibo> ";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error("{0}")]
    Command(String),
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Core(LedgerError::Io(err))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("unknown command `{0}`; try `help`")]
    UnknownCommand(String),
    #[error(transparent)]
    Storage(#[from] LedgerError),
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(err) => CommandError::Storage(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// State shared by every command of one CLI session.
pub struct ShellContext {
    pub(crate) store: JsonFileStore,
    pub(crate) book: RecordBook,
    pub mode: CliMode,
}

impl ShellContext {
    /// Opens the data directory at `base`, or the default one when `None`.
    pub fn open(base: Option<PathBuf>, mode: CliMode) -> Result<Self, CliError> {
        let manager = match base.clone() {
            Some(dir) => ConfigManager::with_base_dir(dir)?,
            None => ConfigManager::new()?,
        };
        let config = manager.load()?;
        let store = JsonFileStore::new(base, Some(config.backup_retention))?;
        let book = RecordBook::new(Box::new(store.clone()), config);
        tracing::debug!(config = %manager.path().display(), "cli session opened");
        Ok(Self { store, book, mode })
    }

    /// Runs one command line and returns its rendered output.
    pub fn execute(&mut self, tokens: &[String]) -> Result<(String, LoopControl), CommandError> {
        let Some(raw) = tokens.first() else {
            return Ok((String::new(), LoopControl::Continue));
        };
        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        if matches!(command.as_str(), "exit" | "quit") {
            return Ok((String::new(), LoopControl::Exit));
        }
        let text = commands::dispatch(self, &command, &args)?;
        Ok((text, LoopControl::Continue))
    }

    pub fn process_line(&mut self, line: &str) -> LoopControl {
        let tokens = match parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                output::warning(err);
                return LoopControl::Continue;
            }
        };
        match self.execute(&tokens) {
            Ok((text, control)) => {
                if !text.is_empty() {
                    println!("{text}");
                }
                control
            }
            Err(err) => {
                output::error(err);
                LoopControl::Continue
            }
        }
    }
}

/// Entry point of the binary. With arguments, runs that single command;
/// otherwise reads commands from stdin until `exit` or end of input.
pub fn run_cli(args: Vec<String>) -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::open(None, mode)?;

    if !args.is_empty() {
        let (text, _) = context.execute(&args)?;
        if !text.is_empty() {
            println!("{text}");
        }
        return Ok(());
    }

    run_lines(&mut context)
}

fn run_lines(context: &mut ShellContext) -> Result<(), CliError> {
    if context.mode == CliMode::Interactive {
        output::print(output::MessageKind::Info, "type `help` for commands, `exit` to leave");
    }
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if context.mode == CliMode::Interactive {
            print!("{PROMPT}");
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if context.process_line(&line) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line(r#"add expense 500 "corner cafe""#).unwrap();
        assert_eq!(tokens, vec!["add", "expense", "500", "corner cafe"]);
        assert!(parse_command_line(r#"add "unterminated"#).is_err());
    }

    #[test]
    fn service_errors_map_to_command_errors() {
        let err: CommandError = ServiceError::Invalid("nope".into()).into();
        assert!(matches!(err, CommandError::InvalidArguments(message) if message == "nope"));
    }
}
