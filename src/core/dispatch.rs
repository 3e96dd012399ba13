use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use log::{debug, error};

use crate::core::error::ShellError;
use crate::core::registry::Builtin;
use crate::core::session::Session;
use crate::core::tokenizer::tokenize;

/// Words that end the session instead of running anything.
pub const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

#[derive(Debug)]
pub enum CommandResult {
    Success(String),
    Failure(ShellError),
    /// The user asked to leave; the caller stops reading and saves history.
    Exit,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandResult::Success(_))
    }

    pub fn status(&self) -> i32 {
        match self {
            CommandResult::Success(_) | CommandResult::Exit => 0,
            CommandResult::Failure(e) => e.status(),
        }
    }
}

impl From<Result<String, ShellError>> for CommandResult {
    fn from(result: Result<String, ShellError>) -> Self {
        match result {
            Ok(text) => CommandResult::Success(text),
            Err(e) => CommandResult::Failure(e),
        }
    }
}

/// Runs one input line. Nothing a command does escapes as a panic or a raw
/// OS error; every outcome comes back as a `CommandResult`.
pub fn dispatch(line: &str, session: &mut Session) -> CommandResult {
    if line.trim().is_empty() {
        return CommandResult::Success(String::new());
    }

    let tokens = match tokenize(line) {
        Ok(tokens) => tokens,
        Err(e) => return CommandResult::Failure(e),
    };
    let Some((name, args)) = tokens.split_first() else {
        return CommandResult::Success(String::new());
    };

    if EXIT_WORDS.contains(&name.as_str()) {
        return CommandResult::Exit;
    }

    match session.registry().get(name).copied() {
        Some(builtin) => run_builtin(builtin, args, session).into(),
        None => {
            let cwd = session.working_dir().to_path_buf();
            session.runner.run(&tokens, &cwd).into()
        }
    }
}

thread_local! {
    static IN_BUILTIN: Cell<bool> = const { Cell::new(false) };
}

static PANIC_HOOK: Once = Once::new();

/// Wraps the process panic hook once. Panics raised while a builtin runs
/// go to the log; every other panic reaches the previous hook unchanged.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_BUILTIN.with(Cell::get) {
                debug!("builtin panic: {}", info);
            } else {
                previous(info);
            }
        }));
    });
}

fn run_builtin(builtin: Builtin, args: &[String], session: &mut Session) -> Result<String, ShellError> {
    debug!("builtin {} {:?}", builtin.name, args);
    install_panic_hook();
    IN_BUILTIN.with(|flag| flag.set(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (builtin.handler)(args, session)));
    IN_BUILTIN.with(|flag| flag.set(false));

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("builtin {} panicked: {}", builtin.name, message);
            Err(ShellError::Internal {
                command: builtin.name.to_string(),
                message,
            })
        }
    }
}
