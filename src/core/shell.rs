use log::{debug, info};

use crate::core::dispatch::{dispatch, CommandResult, EXIT_WORDS};
use crate::core::error::ShellError;
use crate::core::nl::{NlMapper, Rewrite};
use crate::core::session::Session;
use crate::core::tokenizer::tokenize_lenient;

/// What happened to one input line.
#[derive(Debug)]
pub struct Execution {
    /// Set when the line was typed in plain English and rewritten.
    pub rewrite: Option<Rewrite>,
    pub result: CommandResult,
}

/// The engine the front ends talk to: rewrite, dispatch, remember.
pub struct Shell {
    session: Session,
    mapper: Option<&'static NlMapper>,
    confirm_destructive: bool,
}

impl Shell {
    pub fn new(session: Session, natural_language: bool, confirm_destructive: bool) -> Self {
        Self {
            session,
            mapper: natural_language.then(NlMapper::shared),
            confirm_destructive,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs `line`. The line is recorded in history exactly as typed, even
    /// when it gets rewritten. `confirm` is asked before any rewrite that
    /// deletes files; returning false skips it.
    pub fn execute(&mut self, line: &str, confirm: &mut dyn FnMut(&Rewrite) -> bool) -> Execution {
        if line.trim().is_empty() {
            return Execution {
                rewrite: None,
                result: CommandResult::Success(String::new()),
            };
        }
        self.session.history.record(line);

        let rewrite = self.rewrite(line);
        let result = match &rewrite {
            Some(rw) if rw.destructive && self.confirm_destructive && !confirm(rw) => {
                info!("declined destructive rewrite {:?}", rw.command);
                CommandResult::Failure(ShellError::Declined(rw.command.clone()))
            }
            Some(rw) => dispatch(&rw.command, &mut self.session),
            None => dispatch(line, &mut self.session),
        };
        if result.is_success() {
            debug!("{:?} succeeded", line);
        } else if let CommandResult::Failure(e) = &result {
            debug!("{:?} failed ({:?}): {}", line, e.kind(), e);
        }
        Execution { rewrite, result }
    }

    fn rewrite(&self, line: &str) -> Option<Rewrite> {
        let mapper = self.mapper?;
        let first = tokenize_lenient(line).into_iter().next()?;
        if self.session.registry().contains(&first) || EXIT_WORDS.contains(&first.as_str()) {
            debug!("{} is a command, not rewriting", first);
            return None;
        }
        mapper.rewrite(line)
    }

    pub fn save_history(&self) -> Result<(), String> {
        self.session.history.save()
    }
}
