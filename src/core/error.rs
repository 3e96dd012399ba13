use std::io;
use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a failed command, so callers can branch
/// without looking at message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    NotFound,
    Permission,
    NotADirectory,
    IsADirectory,
    AlreadyExists,
    Parse,
    External,
    Io,
    Internal,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{command}: {message}")]
    Usage { command: String, message: String },

    #[error("{command}: {target}: No such file or directory")]
    NotFound { command: String, target: String },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("{0}: cannot execute: Permission denied")]
    NotExecutable(String),

    #[error("{command}: {target}: Permission denied")]
    PermissionDenied { command: String, target: String },

    #[error("{command}: {target}: Not a directory")]
    NotADirectory { command: String, target: String },

    #[error("{command}: {target}: Is a directory")]
    IsADirectory { command: String, target: String },

    #[error("{command}: {target}: File exists")]
    AlreadyExists { command: String, target: String },

    #[error("parse error: {0}")]
    Parse(String),

    /// A rewritten line would delete something and nobody confirmed it.
    #[error("not running '{0}' without confirmation")]
    Declined(String),

    #[error("{command}: exited with status {status}")]
    ExternalFailure {
        command: String,
        status: i32,
        output: String,
    },

    #[error("{command}: killed after {}s timeout", .after.as_secs())]
    Timeout {
        command: String,
        after: Duration,
        output: String,
    },

    #[error("{command}: {target}: {source}")]
    Io {
        command: String,
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("error executing builtin {command}: {message}")]
    Internal { command: String, message: String },

    /// Several per-target failures from one multi-operand command. `output`
    /// keeps whatever the successful targets produced.
    #[error("{}", render_batch(.errors))]
    Batch {
        output: String,
        errors: Vec<ShellError>,
    },
}

fn render_batch(errors: &[ShellError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ShellError {
    pub fn usage(command: &str, message: impl Into<String>) -> Self {
        ShellError::Usage {
            command: command.to_string(),
            message: message.into(),
        }
    }

    /// Classifies an OS error raised while `command` worked on `target`.
    pub fn from_io(command: &str, target: &str, err: io::Error) -> Self {
        let command = command.to_string();
        let target = target.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => ShellError::NotFound { command, target },
            io::ErrorKind::PermissionDenied => ShellError::PermissionDenied { command, target },
            io::ErrorKind::AlreadyExists => ShellError::AlreadyExists { command, target },
            io::ErrorKind::NotADirectory => ShellError::NotADirectory { command, target },
            io::ErrorKind::IsADirectory => ShellError::IsADirectory { command, target },
            _ => ShellError::Io {
                command,
                target,
                source: err,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::Usage { .. } | ShellError::Declined(_) => ErrorKind::Usage,
            ShellError::NotFound { .. } | ShellError::CommandNotFound(_) => ErrorKind::NotFound,
            ShellError::PermissionDenied { .. } | ShellError::NotExecutable(_) => {
                ErrorKind::Permission
            }
            ShellError::NotADirectory { .. } => ErrorKind::NotADirectory,
            ShellError::IsADirectory { .. } => ErrorKind::IsADirectory,
            ShellError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            ShellError::Parse(_) => ErrorKind::Parse,
            ShellError::ExternalFailure { .. } | ShellError::Timeout { .. } => ErrorKind::External,
            ShellError::Io { .. } => ErrorKind::Io,
            ShellError::Internal { .. } => ErrorKind::Internal,
            ShellError::Batch { errors, .. } => errors
                .first()
                .map(|e| e.kind())
                .unwrap_or(ErrorKind::Internal),
        }
    }

    /// Numeric status used when the shell runs non-interactively.
    pub fn status(&self) -> i32 {
        match self {
            ShellError::CommandNotFound(_) => 127,
            ShellError::NotExecutable(_) => 126,
            ShellError::ExternalFailure { status, .. } => *status,
            ShellError::Timeout { .. } => 124,
            ShellError::Usage { .. } | ShellError::Parse(_) => 2,
            ShellError::Batch { errors, .. } => errors.first().map(|e| e.status()).unwrap_or(1),
            _ => 1,
        }
    }

    /// Output captured alongside the failure (child process output, or the
    /// successful part of a batch).
    pub fn output(&self) -> Option<&str> {
        match self {
            ShellError::ExternalFailure { output, .. }
            | ShellError::Timeout { output, .. }
            | ShellError::Batch { output, .. } => Some(output.as_str()),
            _ => None,
        }
    }
}

/// Accumulates per-target results of a multi-operand command so one bad
/// operand does not stop the rest.
#[derive(Debug, Default)]
pub struct Batch {
    lines: Vec<String>,
    errors: Vec<ShellError>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn fail(&mut self, err: ShellError) {
        self.errors.push(err);
    }

    pub fn record(&mut self, result: Result<String, ShellError>) {
        match result {
            Ok(text) if text.is_empty() => {}
            Ok(text) => self.lines.push(text),
            Err(e) => self.errors.push(e),
        }
    }

    pub fn finish(self) -> Result<String, ShellError> {
        let output = self.lines.join("\n");
        if self.errors.is_empty() {
            return Ok(output);
        }
        let mut errors = self.errors;
        if errors.len() == 1 && output.is_empty() {
            return Err(errors.remove(0));
        }
        Err(ShellError::Batch { output, errors })
    }
}
