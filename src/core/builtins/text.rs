use std::fs;

use crate::core::error::{Batch, ShellError};
use crate::core::session::Session;

const DEFAULT_LINES: usize = 10;

/// Reads a whole file as text, replacing invalid UTF-8.
fn read_text(command: &str, label: &str, session: &Session) -> Result<String, ShellError> {
    let path = session.resolve(label);
    if path.is_dir() {
        return Err(ShellError::IsADirectory {
            command: command.into(),
            target: label.into(),
        });
    }
    let bytes = fs::read(&path).map_err(|e| ShellError::from_io(command, label, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn cat(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    if args.is_empty() {
        return Err(ShellError::usage("cat", "missing file operand"));
    }

    let mut batch = Batch::new();
    for file in args {
        match read_text("cat", file, session) {
            Ok(text) => {
                let text = text.strip_suffix('\n').unwrap_or(&text);
                batch.push(text);
            }
            Err(e) => batch.fail(e),
        }
    }
    batch.finish()
}

/// Pulls `-nN` / `-n N` off the front of the arguments.
fn parse_count<'a>(command: &str, args: &'a [String]) -> Result<(usize, &'a [String]), ShellError> {
    let invalid = |value: &str| ShellError::usage(command, format!("invalid number of lines: '{}'", value));

    match args.first().map(String::as_str) {
        Some("-n") => {
            let value = args
                .get(1)
                .ok_or_else(|| ShellError::usage(command, "option requires an argument -- 'n'"))?;
            let count = value.parse().map_err(|_| invalid(value))?;
            Ok((count, &args[2..]))
        }
        Some(flag) if flag.starts_with("-n") => {
            let value = &flag[2..];
            let count = value.parse().map_err(|_| invalid(value))?;
            Ok((count, &args[1..]))
        }
        Some(flag) if flag.starts_with('-') && flag.len() > 1 => {
            Err(ShellError::usage(command, format!("invalid option -- '{}'", &flag[1..])))
        }
        _ => Ok((DEFAULT_LINES, args)),
    }
}

fn excerpt<F>(command: &str, args: &[String], session: &Session, pick: F) -> Result<String, ShellError>
where
    F: Fn(&[&str], usize) -> Vec<String>,
{
    let (count, files) = parse_count(command, args)?;
    if files.is_empty() {
        return Err(ShellError::usage(command, "missing file operand"));
    }

    let mut batch = Batch::new();
    for file in files {
        match read_text(command, file, session) {
            Ok(text) => {
                let lines: Vec<&str> = text.lines().collect();
                let picked = pick(&lines, count).join("\n");
                if files.len() > 1 {
                    batch.push(format!("==> {} <==\n{}", file, picked));
                } else {
                    batch.push(picked);
                }
            }
            Err(e) => batch.fail(e),
        }
    }
    batch.finish()
}

pub fn head(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    excerpt("head", args, session, |lines, n| {
        lines.iter().take(n).map(|l| l.to_string()).collect()
    })
}

pub fn tail(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    excerpt("tail", args, session, |lines, n| {
        let start = lines.len().saturating_sub(n);
        lines[start..].iter().map(|l| l.to_string()).collect()
    })
}

pub fn echo(args: &[String], _session: &mut Session) -> Result<String, ShellError> {
    Ok(args.join(" "))
}
