mod fs;
mod shell;
mod system;
mod text;

use crate::core::error::ShellError;
use crate::core::registry::Builtin;

pub const BUILTINS: &[Builtin] = &[
    Builtin { name: "pwd", usage: "pwd", summary: "Print working directory", handler: fs::pwd },
    Builtin { name: "cd", usage: "cd [dir|-]", summary: "Change directory (default ~)", handler: fs::cd },
    Builtin { name: "ls", usage: "ls [-l] [-a] [dir]", summary: "List directory contents", handler: fs::ls },
    Builtin { name: "mkdir", usage: "mkdir [-p] dir...", summary: "Make directories", handler: fs::mkdir },
    Builtin { name: "rmdir", usage: "rmdir [-r] dir...", summary: "Remove empty directories", handler: fs::rmdir },
    Builtin { name: "rm", usage: "rm [-r] [-f] target...", summary: "Remove files or directories", handler: fs::rm },
    Builtin { name: "touch", usage: "touch file...", summary: "Create files or update timestamps", handler: fs::touch },
    Builtin { name: "cat", usage: "cat file...", summary: "Print file contents", handler: text::cat },
    Builtin { name: "head", usage: "head [-nN] file...", summary: "Print the first N lines (default 10)", handler: text::head },
    Builtin { name: "tail", usage: "tail [-nN] file...", summary: "Print the last N lines (default 10)", handler: text::tail },
    Builtin { name: "mv", usage: "mv src... dest", summary: "Move or rename", handler: fs::mv },
    Builtin { name: "cp", usage: "cp src... dest", summary: "Copy files and directories", handler: fs::cp },
    Builtin { name: "stat", usage: "stat target...", summary: "Show file status", handler: fs::stat },
    Builtin { name: "echo", usage: "echo args...", summary: "Print arguments", handler: text::echo },
    Builtin { name: "cpu", usage: "cpu", summary: "Show CPU usage", handler: system::cpu },
    Builtin { name: "mem", usage: "mem", summary: "Show memory usage", handler: system::mem },
    Builtin { name: "ps", usage: "ps", summary: "List processes", handler: system::ps },
    Builtin { name: "top", usage: "top", summary: "CPU, memory and busiest processes", handler: system::top },
    Builtin { name: "df", usage: "df", summary: "Show disk usage", handler: system::df },
    Builtin { name: "help", usage: "help", summary: "Show this help", handler: shell::help },
    Builtin { name: "history", usage: "history [N]", summary: "Show command history", handler: shell::history },
    Builtin { name: "clear", usage: "clear", summary: "Clear the screen", handler: shell::clear },
    Builtin { name: "ai", usage: "ai query", summary: "Interpret a plain-English request", handler: shell::ai },
];

/// Single-letter flags pulled out of an argument list.
#[derive(Debug, Default)]
pub(crate) struct Flags(Vec<char>);

impl Flags {
    pub fn has(&self, flag: char) -> bool {
        self.0.contains(&flag)
    }
}

/// Separates `-x` style flags from operands. `--` ends flag parsing and a
/// lone `-` is an operand. Letters outside `allowed` are usage errors.
pub(crate) fn parse_flags(
    command: &str,
    args: &[String],
    allowed: &str,
) -> Result<(Flags, Vec<String>), ShellError> {
    let mut flags = Vec::new();
    let mut operands = Vec::new();
    let mut flags_done = false;

    for arg in args {
        if flags_done || arg == "-" || !arg.starts_with('-') {
            operands.push(arg.clone());
            continue;
        }
        if arg == "--" {
            flags_done = true;
            continue;
        }
        for c in arg.chars().skip(1) {
            if !allowed.contains(c) {
                return Err(ShellError::usage(command, format!("invalid option -- '{}'", c)));
            }
            flags.push(c);
        }
    }
    Ok((Flags(flags), operands))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn combined_flags_and_operands() {
        let (flags, operands) = parse_flags("ls", &args(&["-la", "src", "-"]), "la").unwrap();
        assert!(flags.has('l') && flags.has('a'));
        assert_eq!(operands, vec!["src", "-"]);
    }

    #[test]
    fn double_dash_ends_flags() {
        let (flags, operands) = parse_flags("rm", &args(&["--", "-weird"]), "rf").unwrap();
        assert!(!flags.has('r'));
        assert_eq!(operands, vec!["-weird"]);
    }

    #[test]
    fn unknown_flag_is_usage_error() {
        let err = parse_flags("ls", &args(&["-z"]), "la").unwrap_err();
        assert_eq!(err.to_string(), "ls: invalid option -- 'z'");
    }
}
