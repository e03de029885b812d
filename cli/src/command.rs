//! Parsing of the line-oriented command language.

use thiserror::Error;
use todo_sync::SyncError;

pub const HELP: &str = "\
commands:
  add [text]    add a task (uses the current draft when text is omitted)
  draft <text>  set the new-task draft
  toggle <n>    flip completion of row n
  edit <n>      start editing row n
  text <text>   replace the text being edited
  save          save the edit
  cancel        discard the edit
  del <n>       delete row n
  list          show the list
  reload        fetch the whole list again
  help          show this help
  quit          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Option<String>),
    Draft(String),
    Toggle(usize),
    Edit(usize),
    Text(String),
    Save,
    Cancel,
    Delete(usize),
    List,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    #[error("`{0}` needs a row number")]
    MissingRow(&'static str),

    #[error("`{0}` is not a row number")]
    BadRow(String),

    #[error("no row {0}")]
    NoSuchRow(usize),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// Text arguments are taken verbatim after the first space so inner and
    /// trailing whitespace reach the draft unchanged.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let line = line.trim_start();
        if line.trim().is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(' ') {
            Some((word, rest)) => (word, Some(rest)),
            None => (line.trim_end(), None),
        };
        let text = || rest.unwrap_or_default().to_string();

        let command = match word {
            "add" | "a" => Command::Add(rest.map(str::to_string)),
            "draft" => Command::Draft(text()),
            "toggle" | "t" => Command::Toggle(row("toggle", rest)?),
            "edit" | "e" => Command::Edit(row("edit", rest)?),
            "text" => Command::Text(text()),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "del" | "delete" | "rm" => Command::Delete(row("del", rest)?),
            "list" | "ls" => Command::List,
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

fn row(command: &'static str, rest: Option<&str>) -> Result<usize, CommandError> {
    let arg = rest.map(str::trim).filter(|s| !s.is_empty());
    let arg = arg.ok_or(CommandError::MissingRow(command))?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CommandError::BadRow(arg.to_string())),
    }
}
