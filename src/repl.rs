use std::path::{Path, PathBuf};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::core::completion::CompletionEngine;
use crate::core::registry::CommandRegistry;
use crate::core::tokenizer::quote;

/// Tab completion for the line editor. The working directory is refreshed
/// before every prompt so relative paths follow `cd`.
pub struct ShellHelper {
    engine: CompletionEngine,
    cwd: PathBuf,
}

impl ShellHelper {
    pub fn new(registry: &CommandRegistry, cwd: &Path) -> Self {
        Self {
            engine: CompletionEngine::new(registry),
            cwd: cwd.to_path_buf(),
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        let start = word_start(before);
        let partial = &before[start..];

        let pairs = self
            .engine
            .complete(before, partial, &self.cwd)
            .into_iter()
            .map(candidate_pair)
            .collect();
        Ok((start, pairs))
    }
}

/// The menu shows the bare name; the inserted text stays one word.
fn candidate_pair(candidate: String) -> Pair {
    Pair {
        replacement: quote(&candidate),
        display: candidate,
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<Self::Hint> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

fn word_start(before: &str) -> usize {
    before
        .char_indices()
        .rev()
        .find(|(_, c)| matches!(c, ' ' | '\t' | '\r' | '\n'))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

pub enum Input {
    Line(String),
    /// Ctrl-C: drop the current line and prompt again.
    Cancelled,
    /// Ctrl-D
    Eof,
}

pub struct Repl {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl Repl {
    /// `past` seeds arrow-key recall with lines from earlier sessions.
    pub fn new<'a>(
        helper: ShellHelper,
        past: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, String> {
        let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()
            .map_err(|e| format!("Failed to initialize line editor: {}", e))?;
        editor.set_helper(Some(helper));
        for line in past {
            editor
                .add_history_entry(line)
                .map_err(|e| format!("Failed to seed history: {}", e))?;
        }
        Ok(Self { editor })
    }

    pub fn read_line(&mut self, prompt: &str, cwd: &Path) -> Result<Input, ReadlineError> {
        if let Some(helper) = self.editor.helper_mut() {
            helper.cwd = cwd.to_path_buf();
        }

        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Cancelled),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err),
        }
    }
}

/// `~/src $ ` style prompt.
pub fn prompt(display_dir: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[1;34m{}\x1b[0m $ ", display_dir)
    } else {
        format!("{} $ ", display_dir)
    }
}
