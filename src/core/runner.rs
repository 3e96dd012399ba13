use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::core::error::ShellError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// How long output is still collected after a timed-out child is killed.
/// Anything it forked may hold the pipes open far longer.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Runs anything that is not a builtin as a child process.
#[derive(Debug, Clone, Default)]
pub struct ExternalRunner {
    timeout: Option<Duration>,
}

impl ExternalRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    /// Spawns `argv` in `cwd` and returns stdout followed by stderr.
    ///
    /// A non-zero exit is still an error, but it carries the captured
    /// output so the caller can show it.
    pub fn run(&self, argv: &[String], cwd: &Path) -> Result<String, ShellError> {
        let Some((program, args)) = argv.split_first() else {
            return Ok(String::new());
        };
        debug!("spawning {:?} in {}", argv, cwd.display());

        // Checked up front so a missing or unsearchable directory is not
        // reported as a missing program
        let dir_label = cwd.display().to_string();
        match fs::metadata(cwd.join(".")) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(ShellError::NotADirectory {
                    command: program.clone(),
                    target: dir_label,
                })
            }
            Err(e) => return Err(ShellError::from_io(program, &dir_label, e)),
        }

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        // Both pipes drain on their own threads so a chatty stderr cannot
        // block the child while we sit on stdout.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let waited = self.wait(&mut child);
        let grace = matches!(waited, Ok(None)).then_some(DRAIN_GRACE);

        let mut output = collect(stdout, grace);
        output.push_str(&collect(stderr, grace));

        match waited {
            Ok(Some(status)) if status.success() => Ok(output),
            Ok(Some(status)) => {
                let status = exit_code(status);
                debug!("{} exited with {}", program, status);
                Err(ShellError::ExternalFailure {
                    command: program.clone(),
                    status,
                    output,
                })
            }
            Ok(None) => {
                let after = self.timeout.unwrap_or_default();
                warn!("{} killed after {:?}", program, after);
                Err(ShellError::Timeout {
                    command: program.clone(),
                    after,
                    output,
                })
            }
            Err(e) => Err(ShellError::from_io(program, program, e)),
        }
    }

    /// `Ok(None)` means the deadline passed and the child was killed.
    fn wait(&self, child: &mut Child) -> io::Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return child.wait().map(Some);
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                child.kill()?;
                child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Output read so far, plus a signal that the pipe reached EOF.
struct Drain {
    buf: Arc<Mutex<Vec<u8>>>,
    done: Receiver<()>,
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let (tx, done) = mpsc::channel();
    let shared = Arc::clone(&buf);
    thread::spawn(move || {
        let mut chunk = [0u8; 8192];
        loop {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => match shared.lock() {
                    Ok(mut buf) => buf.extend_from_slice(&chunk[..n]),
                    Err(_) => break,
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = tx.send(());
    });
    Drain { buf, done }
}

/// Waits for EOF, or at most `grace` when the child was killed.
fn collect(drain: Option<Drain>, grace: Option<Duration>) -> String {
    let Some(drain) = drain else {
        return String::new();
    };
    match grace {
        Some(grace) => {
            if drain.done.recv_timeout(grace).is_err() {
                debug!("pipe still open after kill, keeping partial output");
            }
        }
        None => {
            let _ = drain.done.recv();
        }
    }
    let bytes = drain.buf.lock().map(|buf| buf.clone()).unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn spawn_error(program: &str, err: io::Error) -> ShellError {
    match err.kind() {
        io::ErrorKind::NotFound => ShellError::CommandNotFound(program.to_string()),
        io::ErrorKind::PermissionDenied => ShellError::NotExecutable(program.to_string()),
        _ => ShellError::from_io(program, program, err),
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
