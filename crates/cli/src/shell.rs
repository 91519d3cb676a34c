//! Interactive shell.

use anyhow::Result;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tripstore_executor::Executor;

use crate::args::ShellLine;

const PROMPT: &str = "tripstore> ";

/// Read commands until EOF, printing each result or error.
pub fn run(executor: &Executor) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // history is in-memory recall only; a rejected entry changes nothing
        let _ = rl.add_history_entry(line);

        let Some(words) = shlex::split(line) else {
            eprintln!("error: unbalanced quotes");
            continue;
        };
        let action = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.action,
            Err(e) => {
                eprintln!("{}", e.render());
                continue;
            }
        };
        match action.into_command() {
            Some(cmd) => {
                crate::run_one(executor, cmd);
            }
            None => eprintln!("error: already in a shell"),
        }
    }
    Ok(())
}
