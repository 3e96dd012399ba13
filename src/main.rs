mod core;
mod output;
mod repl;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::{debug, warn};

use crate::core::config::{timeout_from_secs, Config};
use crate::core::dispatch::CommandResult;
use crate::core::history::History;
use crate::core::nl::Rewrite;
use crate::core::runner::ExternalRunner;
use crate::core::session::Session;
use crate::core::shell::Shell;
use crate::core::sysmon::SysinfoProbe;
use crate::output::Printer;
use crate::repl::{prompt, Input, Repl, ShellHelper};

#[derive(Parser, Debug)]
#[command(name = "rterm", version, about = "Interactive shell with file, text and system builtins")]
struct Args {
    /// Run one line and exit with its status
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    command: Option<String>,

    /// Neither load nor save history
    #[arg(long)]
    no_history: bool,

    /// Run plain-English lines as typed instead of rewriting them
    #[arg(long)]
    no_nl: bool,

    /// Kill external commands after this many seconds (0 = never)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>,

    /// Script to run line by line
    script: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("RTERM_LOG", "warn")).init();

    let args = Args::parse();
    let printer = Printer::new();

    let status = match run(args, &printer) {
        Ok(status) => status,
        Err(e) => {
            printer.error(&e);
            1
        }
    };
    process::exit(status);
}

fn configure(args: &Args) -> Config {
    let mut config = Config::load();
    if let Some(path) = &args.history_file {
        config.history_file = Some(path.clone());
    }
    if args.no_history {
        config.history_file = None;
    }
    if args.no_nl {
        config.natural_language = false;
    }
    if let Some(secs) = args.timeout {
        config.command_timeout = timeout_from_secs(secs);
    }
    debug!("config: {:?}", config);
    config
}

fn run(args: Args, printer: &Printer) -> Result<i32, String> {
    let config = configure(&args);
    let interactive = args.command.is_none() && args.script.is_none();

    // Only interactive sessions read and write the history file
    let history = match (&config.history_file, interactive) {
        (Some(path), true) => {
            let mut history = History::new(Some(path.clone()), config.history_limit);
            if let Err(e) = history.load() {
                printer.warning(&format!("Could not load history: {}", e));
            }
            history
        }
        _ => History::in_memory(config.history_limit),
    };

    let cwd = std::env::current_dir()
        .or_else(|_| dirs::home_dir().ok_or(()))
        .map_err(|_| "Cannot determine a working directory".to_string())?;

    let session = Session::new(
        cwd,
        history,
        ExternalRunner::new(config.command_timeout),
        Box::new(SysinfoProbe::new()),
    );
    let mut shell = Shell::new(session, config.natural_language, config.confirm_destructive);

    if let Some(line) = &args.command {
        return Ok(run_line(&mut shell, line, printer).unwrap_or(0));
    }
    if let Some(script) = &args.script {
        return run_script(&mut shell, script, printer);
    }
    interactive_mode(&mut shell, printer)
}

/// `None` once the line asked to leave.
fn run_line(shell: &mut Shell, line: &str, printer: &Printer) -> Option<i32> {
    // Nobody is there to say yes
    let run = shell.execute(line, &mut |_: &Rewrite| false);
    printer.print_execution(&run);
    match run.result {
        CommandResult::Exit => None,
        other => Some(other.status()),
    }
}

fn run_script(shell: &mut Shell, path: &Path, printer: &Printer) -> Result<i32, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read script '{}': {}", path.display(), e))?;

    let mut status = 0;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match run_line(shell, trimmed, printer) {
            Some(code) => status = code,
            None => break,
        }
    }
    Ok(status)
}

fn interactive_mode(shell: &mut Shell, printer: &Printer) -> Result<i32, String> {
    // Ctrl-C should reach the child, not end the shell
    if let Err(e) = ctrlc::set_handler(|| {}) {
        warn!("Could not install Ctrl-C handler: {}", e);
    }

    let helper = ShellHelper::new(shell.session().registry(), shell.session().working_dir());
    let mut repl = Repl::new(helper, shell.session().history.lines())?;

    printer.banner(&shell.session().display_dir());

    loop {
        let line_prompt = prompt(&shell.session().display_dir(), printer.use_color);
        let cwd = shell.session().working_dir().to_path_buf();

        let line = match repl.read_line(&line_prompt, &cwd) {
            Ok(Input::Line(line)) => line,
            Ok(Input::Cancelled) => continue,
            Ok(Input::Eof) => {
                println!("exit");
                break;
            }
            Err(e) => {
                printer.error(&format!("Input error: {}", e));
                break;
            }
        };

        let run = shell.execute(&line, &mut confirm_on_terminal);
        printer.print_execution(&run);
        if matches!(run.result, CommandResult::Exit) {
            break;
        }
    }

    if let Err(e) = shell.save_history() {
        printer.warning(&format!("Could not save history: {}", e));
    }
    Ok(0)
}

fn confirm_on_terminal(rewrite: &Rewrite) -> bool {
    print!("'{}' deletes files. Run it? [y/N] ", rewrite.command);
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
