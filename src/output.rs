use std::io::{self, Write};

use supports_color::Stream;

use crate::core::dispatch::CommandResult;
use crate::core::shell::Execution;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

pub struct Printer {
    pub use_color: bool,
}

impl Printer {
    pub fn new() -> Self {
        let use_color = supports_color::on(Stream::Stdout).is_some();
        Self { use_color }
    }

    pub fn error(&self, message: &str) {
        for line in message.lines() {
            eprintln!("{}", self.prefixed("[-]", RED, line));
        }
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{}", self.prefixed("[!]", YELLOW, message));
    }

    pub fn banner(&self, dir: &str) {
        println!("{}", self.paint(CYAN, "rterm"));
        println!("{}", self.paint(DIM, &format!("working in {}", dir)));
        println!("Type 'help' for available commands, 'exit' to quit.");
        println!();
    }

    /// Command output goes out verbatim; failures get the `[-]` prefix.
    pub fn print_execution(&self, run: &Execution) {
        if let Some(rewrite) = &run.rewrite {
            println!("{}", self.paint(DIM, &format!("# interpreted -> {}", rewrite.command)));
        }
        match &run.result {
            CommandResult::Success(text) => self.verbatim(text),
            CommandResult::Failure(err) => {
                if let Some(output) = err.output() {
                    self.verbatim(output);
                }
                self.error(&err.to_string());
            }
            CommandResult::Exit => {}
        }
    }

    fn verbatim(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Child output already ends in a newline; escape sequences must not get one
        if text.ends_with('\n') || text.starts_with('\x1b') {
            print!("{}", text);
            let _ = io::stdout().flush();
        } else {
            println!("{}", text);
        }
    }

    fn prefixed(&self, prefix: &str, color: &str, message: &str) -> String {
        format!("{} {}", self.paint(color, prefix), message)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{}{}{}", color, text, RESET)
        } else {
            text.to_string()
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}
