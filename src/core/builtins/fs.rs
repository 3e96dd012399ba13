use std::fs::{self, Metadata, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;

use super::parse_flags;
use crate::core::error::{Batch, ShellError};
use crate::core::format::{format_time, human_size, modified_time, permission_string};
use crate::core::session::Session;

pub fn pwd(_args: &[String], session: &mut Session) -> Result<String, ShellError> {
    Ok(session.working_dir().display().to_string())
}

pub fn cd(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    if args.len() > 1 {
        return Err(ShellError::usage("cd", "too many arguments"));
    }

    let (label, target) = match args.first().map(String::as_str) {
        None => ("~", session.resolve("~")),
        Some("-") => match session.previous_dir() {
            Some(prev) => ("-", prev.to_path_buf()),
            None => return Err(ShellError::usage("cd", "no previous directory")),
        },
        Some(dir) => (dir, session.resolve(dir)),
    };

    let metadata = fs::metadata(&target).map_err(|e| ShellError::from_io("cd", label, e))?;
    if !metadata.is_dir() {
        return Err(ShellError::NotADirectory {
            command: "cd".into(),
            target: label.into(),
        });
    }
    // Resolving "." inside needs search permission, not read permission
    fs::metadata(target.join(".")).map_err(|e| ShellError::from_io("cd", label, e))?;

    debug!("cd {} -> {}", label, target.display());
    session.change_dir(target);

    if label == "-" {
        Ok(session.working_dir().display().to_string())
    } else {
        Ok(String::new())
    }
}

pub fn ls(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let (flags, operands) = parse_flags("ls", args, "la")?;
    let long = flags.has('l');
    let all = flags.has('a');

    if operands.len() <= 1 {
        let label = operands.first().map(String::as_str).unwrap_or(".");
        return list_one(label, &session.resolve(label), long, all);
    }

    let mut batch = Batch::new();
    for label in &operands {
        batch.record(
            list_one(label, &session.resolve(label), long, all)
                .map(|listing| format!("{}:\n{}", label, listing)),
        );
    }
    batch.finish()
}

fn list_one(label: &str, path: &Path, long: bool, all: bool) -> Result<String, ShellError> {
    let metadata = fs::metadata(path).map_err(|e| ShellError::from_io("ls", label, e))?;

    if !metadata.is_dir() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| label.to_string());
        return Ok(if long { long_line(&name, &metadata) } else { name });
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| ShellError::from_io("ls", label, e))? {
        let entry = entry.map_err(|e| ShellError::from_io("ls", label, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if all || !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();

    if !long {
        return Ok(names.join("  "));
    }

    let lines: Vec<String> = names
        .iter()
        .filter_map(|name| {
            let full = path.join(name);
            // Dangling symlinks still get a line
            let metadata = fs::metadata(&full).or_else(|_| fs::symlink_metadata(&full)).ok()?;
            Some(long_line(name, &metadata))
        })
        .collect();
    Ok(lines.join("\n"))
}

fn long_line(name: &str, metadata: &Metadata) -> String {
    format!(
        "{} {:>8} {} {}",
        permission_string(metadata),
        human_size(metadata.len()),
        modified_time(metadata),
        name
    )
}

pub fn mkdir(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let (flags, operands) = parse_flags("mkdir", args, "p")?;
    if operands.is_empty() {
        return Err(ShellError::usage("mkdir", "missing operand"));
    }
    let parents = flags.has('p');

    let mut batch = Batch::new();
    for dir in &operands {
        let target = session.resolve(dir);
        let result = if parents {
            fs::create_dir_all(&target)
        } else {
            fs::create_dir(&target)
        };
        if let Err(e) = result {
            batch.fail(ShellError::from_io("mkdir", dir, e));
        }
    }
    batch.finish()
}

pub fn rmdir(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let (flags, operands) = parse_flags("rmdir", args, "r")?;
    if operands.is_empty() {
        return Err(ShellError::usage("rmdir", "missing operand"));
    }
    let recursive = flags.has('r');

    let mut batch = Batch::new();
    for dir in &operands {
        batch.record(remove_dir(dir, &session.resolve(dir), recursive));
    }
    batch.finish()
}

fn remove_dir(label: &str, target: &Path, recursive: bool) -> Result<String, ShellError> {
    let metadata = fs::symlink_metadata(target).map_err(|e| ShellError::from_io("rmdir", label, e))?;
    if !metadata.is_dir() {
        return Err(ShellError::NotADirectory {
            command: "rmdir".into(),
            target: label.into(),
        });
    }

    if recursive {
        fs::remove_dir_all(target).map_err(|e| ShellError::from_io("rmdir", label, e))?;
        return Ok(String::new());
    }

    let has_entries = fs::read_dir(target)
        .map_err(|e| ShellError::from_io("rmdir", label, e))?
        .next()
        .is_some();
    if has_entries {
        return Err(ShellError::usage(
            "rmdir",
            format!("failed to remove '{}': Directory not empty (use -r)", label),
        ));
    }
    fs::remove_dir(target).map_err(|e| ShellError::from_io("rmdir", label, e))?;
    Ok(String::new())
}

pub fn rm(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let (flags, operands) = parse_flags("rm", args, "rRf")?;
    let recursive = flags.has('r') || flags.has('R');
    let force = flags.has('f');

    if operands.is_empty() {
        return if force {
            Ok(String::new())
        } else {
            Err(ShellError::usage("rm", "missing operand"))
        };
    }

    let mut batch = Batch::new();
    for target in &operands {
        batch.record(remove_target(target, &session.resolve(target), recursive, force));
    }
    batch.finish()
}

fn remove_target(label: &str, target: &Path, recursive: bool, force: bool) -> Result<String, ShellError> {
    if matches!(label.trim_end_matches('/'), "." | "..") || target.parent().is_none() {
        return Err(ShellError::usage("rm", format!("refusing to remove '{}'", label)));
    }

    let metadata = match fs::symlink_metadata(target) {
        Ok(metadata) => metadata,
        Err(e) if force && e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(ShellError::from_io("rm", label, e)),
    };

    // symlink_metadata: a link to a directory is removed as a file
    let result = if metadata.is_dir() {
        if !recursive {
            return Err(ShellError::IsADirectory {
                command: "rm".into(),
                target: format!("cannot remove '{}' (use -r)", label),
            });
        }
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };

    result.map_err(|e| ShellError::from_io("rm", label, e))?;
    debug!("removed {}", target.display());
    Ok(String::new())
}

pub fn touch(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    if args.is_empty() {
        return Err(ShellError::usage("touch", "missing file operand"));
    }

    let mut batch = Batch::new();
    for file in args {
        let target = session.resolve(file);
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&target)
            .and_then(|f| f.set_modified(SystemTime::now()));
        if let Err(e) = result {
            batch.fail(ShellError::from_io("touch", file, e));
        }
    }
    batch.finish()
}

/// One source → destination pair of a `mv`/`cp`.
struct Transfer {
    label: String,
    source: PathBuf,
    target: PathBuf,
    /// The destination as the user would name it.
    target_label: String,
}

/// Works out every destination before anything is touched, so a bad
/// destination fails the whole command with no source moved.
fn plan_transfers(command: &str, operands: &[String], session: &Session) -> Result<Vec<Transfer>, ShellError> {
    let (dest_label, sources) = match operands.split_last() {
        Some((dest, sources)) if !sources.is_empty() => (dest, sources),
        Some((only, _)) => {
            return Err(ShellError::usage(
                command,
                format!("missing destination file operand after '{}'", only),
            ))
        }
        None => return Err(ShellError::usage(command, "missing file operand")),
    };
    let dest = session.resolve(dest_label);
    let dest_is_dir = dest.is_dir();

    if sources.len() > 1 && !dest_is_dir {
        return Err(ShellError::usage(
            command,
            format!("target '{}' is not a directory", dest_label),
        ));
    }

    let mut transfers = Vec::new();
    for label in sources {
        let source = session.resolve(label);
        let (target, target_label) = match (dest_is_dir, source.file_name()) {
            (true, Some(name)) => (
                dest.join(name),
                format!("{}/{}", dest_label.trim_end_matches('/'), name.to_string_lossy()),
            ),
            _ => (dest.clone(), dest_label.clone()),
        };
        transfers.push(Transfer {
            label: label.clone(),
            source,
            target,
            target_label,
        });
    }
    Ok(transfers)
}

fn check_not_into_itself(command: &str, t: &Transfer) -> Result<(), ShellError> {
    if t.source.is_dir() && t.target.starts_with(&t.source) {
        return Err(ShellError::usage(
            command,
            format!("cannot {} '{}' into itself", if command == "mv" { "move" } else { "copy" }, t.label),
        ));
    }
    Ok(())
}

fn check_not_same_file(command: &str, t: &Transfer) -> Result<(), ShellError> {
    if same_file(&t.source, &t.target) {
        return Err(ShellError::usage(
            command,
            format!("'{}' and '{}' are the same file", t.label, t.target_label),
        ));
    }
    Ok(())
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub fn mv(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let transfers = plan_transfers("mv", args, session)?;

    let mut batch = Batch::new();
    for t in &transfers {
        batch.record(move_one(t));
    }
    batch.finish()
}

fn move_one(t: &Transfer) -> Result<String, ShellError> {
    fs::symlink_metadata(&t.source).map_err(|e| ShellError::from_io("mv", &t.label, e))?;
    check_not_into_itself("mv", t)?;
    check_not_same_file("mv", t)?;

    match fs::rename(&t.source, &t.target) {
        Ok(()) => Ok(String::new()),
        Err(e) if is_cross_device(&e) => {
            // Different filesystem: copy, then drop the original
            copy_any(&t.source, &t.target).map_err(|e| ShellError::from_io("mv", &t.label, e))?;
            let removed = if t.source.is_dir() {
                fs::remove_dir_all(&t.source)
            } else {
                fs::remove_file(&t.source)
            };
            removed.map_err(|e| ShellError::from_io("mv", &t.label, e))?;
            Ok(String::new())
        }
        Err(e) => Err(ShellError::from_io("mv", &t.label, e)),
    }
}

#[cfg(unix)]
fn is_cross_device(err: &io::Error) -> bool {
    // EXDEV
    err.raw_os_error() == Some(18)
}

#[cfg(not(unix))]
fn is_cross_device(_err: &io::Error) -> bool {
    false
}

pub fn cp(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    let (_flags, operands) = parse_flags("cp", args, "rR")?;
    let transfers = plan_transfers("cp", &operands, session)?;

    let mut batch = Batch::new();
    for t in &transfers {
        let result = fs::metadata(&t.source)
            .map_err(|e| ShellError::from_io("cp", &t.label, e))
            .and_then(|_| check_not_into_itself("cp", t))
            .and_then(|_| check_not_same_file("cp", t))
            .and_then(|_| {
                copy_any(&t.source, &t.target)
                    .map(|_| String::new())
                    .map_err(|e| ShellError::from_io("cp", &t.label, e))
            });
        batch.record(result);
    }
    batch.finish()
}

fn copy_any(source: &Path, target: &Path) -> io::Result<()> {
    if source.is_dir() {
        copy_dir_all(source, target)
    } else {
        fs::copy(source, target).map(|_| ())
    }
}

fn copy_dir_all(source: &Path, target: &Path) -> io::Result<()> {
    fs::create_dir_all(target)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_all(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }
    Ok(())
}

pub fn stat(args: &[String], session: &mut Session) -> Result<String, ShellError> {
    if args.is_empty() {
        return Err(ShellError::usage("stat", "missing operand"));
    }

    let mut batch = Batch::new();
    for file in args {
        let target = session.resolve(file);
        match fs::symlink_metadata(&target) {
            Ok(metadata) => batch.push(describe(&target, &metadata)),
            Err(e) => batch.fail(ShellError::from_io("stat", file, e)),
        }
    }
    batch.finish()
}

fn file_kind(metadata: &Metadata) -> &'static str {
    let ft = metadata.file_type();
    if ft.is_dir() {
        "directory"
    } else if ft.is_symlink() {
        "symbolic link"
    } else if ft.is_file() {
        "regular file"
    } else {
        "special file"
    }
}

fn timestamp(time: io::Result<SystemTime>) -> String {
    time.map(|t| format_time(t, "%Y-%m-%d %H:%M:%S%.f %z"))
        .unwrap_or_else(|_| "-".to_string())
}

#[cfg(unix)]
fn describe(path: &Path, metadata: &Metadata) -> String {
    use std::os::unix::fs::MetadataExt;

    let changed = chrono::DateTime::from_timestamp(metadata.ctime(), metadata.ctime_nsec() as u32)
        .map(SystemTime::from)
        .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData));

    [
        format!("  File: {}", path.display()),
        format!(
            "  Size: {}\tBlocks: {}\tIO Block: {}\t{}",
            metadata.len(),
            metadata.blocks(),
            metadata.blksize(),
            file_kind(metadata)
        ),
        format!("Device: {}\tInode: {}\tLinks: {}", metadata.dev(), metadata.ino(), metadata.nlink()),
        format!("Access: ({:04o}/{})", metadata.mode() & 0o7777, permission_string(metadata)),
        format!("Access: {}", timestamp(metadata.accessed())),
        format!("Modify: {}", timestamp(metadata.modified())),
        format!("Change: {}", timestamp(changed)),
    ]
    .join("\n")
}

#[cfg(not(unix))]
fn describe(path: &Path, metadata: &Metadata) -> String {
    [
        format!("  File: {}", path.display()),
        format!("  Size: {}\t{}", metadata.len(), file_kind(metadata)),
        format!("Access: ({})", permission_string(metadata)),
        format!("Access: {}", timestamp(metadata.accessed())),
        format!("Modify: {}", timestamp(metadata.modified())),
        format!("Create: {}", timestamp(metadata.created())),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::core::session::testing::session_in;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cd_into_missing_dir_keeps_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());

        let err = cd(&args(&["nope"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(session.working_dir(), dir.path());
    }

    #[test]
    fn cd_into_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "x").unwrap();
        let mut session = session_in(dir.path());

        let err = cd(&args(&["f.txt"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotADirectory);
        assert_eq!(session.working_dir(), dir.path());
    }

    #[cfg(unix)]
    #[test]
    fn cd_needs_search_permission_not_read_permission() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not bind a privileged user
        let privileged = fs::read_dir(&locked).is_ok();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        if privileged {
            return;
        }

        let read_only = dir.path().join("read_only");
        let search_only = dir.path().join("search_only");
        fs::create_dir(&read_only).unwrap();
        fs::create_dir(&search_only).unwrap();
        fs::set_permissions(&read_only, fs::Permissions::from_mode(0o444)).unwrap();
        fs::set_permissions(&search_only, fs::Permissions::from_mode(0o111)).unwrap();
        let mut session = session_in(dir.path());

        let err = cd(&args(&["read_only"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(session.working_dir(), dir.path());

        cd(&args(&["search_only"]), &mut session).unwrap();
        assert_eq!(session.working_dir(), search_only.as_path());

        fs::set_permissions(&read_only, fs::Permissions::from_mode(0o755)).unwrap();
        fs::set_permissions(&search_only, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn cd_relative_then_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut session = session_in(dir.path());

        cd(&args(&["sub"]), &mut session).unwrap();
        assert_eq!(session.working_dir(), dir.path().join("sub"));
        assert_eq!(pwd(&[], &mut session).unwrap(), dir.path().join("sub").display().to_string());

        cd(&args(&[".."]), &mut session).unwrap();
        assert_eq!(session.working_dir(), dir.path());

        let out = cd(&args(&["-"]), &mut session).unwrap();
        assert_eq!(out, dir.path().join("sub").display().to_string());
    }

    #[test]
    fn cd_without_args_goes_home() {
        let home = match dirs::home_dir().filter(|h| h.is_dir()) {
            Some(home) => home,
            None => return,
        };
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());

        cd(&[], &mut session).unwrap();
        assert_eq!(session.working_dir(), crate::core::session::normalize(&home));
    }

    #[test]
    fn mkdir_twice_reports_already_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());

        mkdir(&args(&["x"]), &mut session).unwrap();
        let err = mkdir(&args(&["x"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(dir.path().join("x").is_dir());

        // -p tolerates existing directories and creates parents
        mkdir(&args(&["-p", "x", "a/b/c"]), &mut session).unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
    }

    #[test]
    fn mkdir_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        let mut session = session_in(dir.path());

        let err = mkdir(&args(&["one", "two"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(dir.path().join("two").is_dir());
    }

    #[test]
    fn rm_directory_needs_recursive_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("d")).unwrap();
        fs::write(dir.path().join("d/inner.txt"), "x").unwrap();
        let mut session = session_in(dir.path());

        let err = rm(&args(&["d"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IsADirectory);
        assert!(err.to_string().contains("Is a directory"));
        assert!(dir.path().join("d/inner.txt").exists());

        rm(&args(&["-r", "d"]), &mut session).unwrap();
        assert!(!dir.path().join("d").exists());
    }

    #[test]
    fn rm_reports_each_missing_target_and_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();
        fs::write(dir.path().join("gone.txt"), "x").unwrap();
        let mut session = session_in(dir.path());

        let err = rm(&args(&["missing1", "gone.txt", "missing2"]), &mut session).unwrap_err();
        match err {
            ShellError::Batch { errors, .. } => assert_eq!(errors.len(), 2),
            other => panic!("expected batch, got {:?}", other),
        }
        assert!(!dir.path().join("gone.txt").exists());
        assert!(dir.path().join("keep.txt").exists());

        // -f silences missing files
        rm(&args(&["-f", "missing1"]), &mut session).unwrap();
    }

    #[test]
    fn rm_refuses_dot() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let err = rm(&args(&["-rf", "."]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(dir.path().exists());
    }

    #[test]
    fn rmdir_only_removes_empty_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::create_dir(dir.path().join("full")).unwrap();
        fs::write(dir.path().join("full/f"), "x").unwrap();
        let mut session = session_in(dir.path());

        let err = rmdir(&args(&["empty", "full"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(!dir.path().join("empty").exists());
        assert!(dir.path().join("full").exists());

        rmdir(&args(&["-r", "full"]), &mut session).unwrap();
        assert!(!dir.path().join("full").exists());
    }

    #[test]
    fn ls_hides_dotfiles_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", ".hidden", "a.txt"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let mut session = session_in(dir.path());

        let out = ls(&[], &mut session).unwrap();
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), vec!["a.txt", "b.txt"]);

        let out = ls(&args(&["-a"]), &mut session).unwrap();
        assert_eq!(out.split_whitespace().collect::<Vec<_>>(), vec![".hidden", "a.txt", "b.txt"]);
    }

    #[test]
    fn ls_long_form_has_details() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut session = session_in(dir.path());

        let out = ls(&args(&["-l"]), &mut session).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('-'));
        assert!(lines[0].contains("5.0B"));
        assert!(lines[0].ends_with(" a.txt"));
        assert!(lines[1].starts_with('d'));
    }

    #[test]
    fn ls_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let err = ls(&args(&["ghost"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn touch_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        touch(&args(&["a", "b"]), &mut session).unwrap();
        assert!(dir.path().join("a").is_file());
        assert!(dir.path().join("b").is_file());

        let err = touch(&args(&["nodir/c"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn mv_multiple_sources_needs_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "a").unwrap();
        fs::write(dir.path().join("b"), "b").unwrap();
        let mut session = session_in(dir.path());

        let err = mv(&args(&["a", "b", "nodir"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(dir.path().join("a").exists());
        assert!(dir.path().join("b").exists());

        fs::create_dir(dir.path().join("dest")).unwrap();
        mv(&args(&["a", "b", "dest"]), &mut session).unwrap();
        assert!(dir.path().join("dest/a").exists());
        assert!(dir.path().join("dest/b").exists());
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn mv_renames_single_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old"), "data").unwrap();
        let mut session = session_in(dir.path());

        mv(&args(&["old", "new"]), &mut session).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("new")).unwrap(), "data");
    }

    #[test]
    fn cp_copies_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), "data").unwrap();
        fs::create_dir_all(dir.path().join("tree/leaf")).unwrap();
        fs::write(dir.path().join("tree/leaf/x"), "x").unwrap();
        fs::create_dir(dir.path().join("out")).unwrap();
        let mut session = session_in(dir.path());

        cp(&args(&["f", "tree", "out"]), &mut session).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("out/f")).unwrap(), "data");
        assert!(dir.path().join("out/tree/leaf/x").is_file());
        assert!(dir.path().join("f").exists());

        let err = cp(&args(&["tree", "tree/leaf"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn cp_onto_itself_keeps_the_data() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "precious data").unwrap();
        let mut session = session_in(dir.path());

        let err = cp(&args(&["f.txt", "."]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(err.to_string(), "cp: 'f.txt' and './f.txt' are the same file");
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "precious data");

        let err = cp(&args(&["f.txt", "f.txt"]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "precious data");
    }

    #[test]
    fn mv_onto_itself_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "precious data").unwrap();
        let mut session = session_in(dir.path());

        let err = mv(&args(&["f.txt", "."]), &mut session).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert_eq!(fs::read_to_string(dir.path().join("f.txt")).unwrap(), "precious data");
    }

    #[test]
    fn cp_missing_destination_operand() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        let err = cp(&args(&["only"]), &mut session).unwrap_err();
        assert_eq!(err.to_string(), "cp: missing destination file operand after 'only'");
    }

    #[test]
    fn stat_describes_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("s.txt"), "12345").unwrap();
        let mut session = session_in(dir.path());

        let out = stat(&args(&["s.txt"]), &mut session).unwrap();
        assert!(out.starts_with("  File: "));
        assert!(out.contains("Size: 5"));
        assert!(out.contains("regular file"));
        assert!(out.contains("Modify: "));
    }
}
