use crate::core::error::ShellError;
use crate::core::nl::NlMapper;
use crate::core::session::Session;

pub fn help(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let mut lines = vec!["Built-in commands:".to_string()];
    for builtin in session.registry().iter() {
        lines.push(format!("  {:<24} {}", builtin.usage, builtin.summary));
    }
    lines.push(String::new());
    lines.push("External commands are run as child processes in the current directory.".to_string());
    lines.push("Type 'exit' or 'quit' to leave.".to_string());
    Ok(lines.join("\n"))
}

pub fn history(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    if session.history.is_empty() {
        return Ok(String::new());
    }
    let total = session.history.len();
    let count = match args {
        [] => total,
        [n] => n
            .parse()
            .map_err(|_| ShellError::usage("history", format!("{}: numeric argument required", n)))?,
        _ => return Err(ShellError::usage("history", "too many arguments")),
    };

    let entries = session.history.get_last_n(count);
    let first = total - entries.len() + 1;
    let lines: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{:>5}  {}", first + i, entry.line))
        .collect();
    Ok(lines.join("\n"))
}

pub fn clear(_args: &[String], _session: &mut Session) -> Result<String, ShellError> {
    Ok("\x1b[2J\x1b[H".to_string())
}

/// Shows what a plain-English request would turn into. Never runs it.
pub fn ai(args: &[String], _session: &mut Session) -> Result<String, ShellError> {
    if args.is_empty() {
        return Err(ShellError::usage("ai", "missing query"));
    }
    let query = args.join(" ");
    match NlMapper::shared().rewrite(&query) {
        Some(rewrite) if rewrite.destructive => Ok(format!(
            "interpreted -> {} (destructive; type it yourself to run it)",
            rewrite.command
        )),
        Some(rewrite) => Ok(format!("interpreted -> {}", rewrite.command)),
        None => Ok("AI-driven command interpretation is not implemented yet.".to_string()),
    }
}
