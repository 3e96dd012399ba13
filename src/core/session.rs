use std::path::{Component, Path, PathBuf};

use crate::core::history::History;
use crate::core::registry::CommandRegistry;
use crate::core::runner::ExternalRunner;
use crate::core::sysmon::SystemProbe;

/// Mutable state shared by every command for the lifetime of the shell.
///
/// The working directory is tracked here rather than taken from the
/// process, so a relative path always means "relative to where the user
/// last `cd`'d", whatever the OS thinks.
pub struct Session {
    working_dir: PathBuf,
    previous_dir: Option<PathBuf>,
    registry: CommandRegistry,
    pub history: History,
    pub runner: ExternalRunner,
    probe: Box<dyn SystemProbe>,
}

impl Session {
    pub fn new(
        working_dir: PathBuf,
        history: History,
        runner: ExternalRunner,
        probe: Box<dyn SystemProbe>,
    ) -> Self {
        Self {
            working_dir: normalize(&working_dir),
            previous_dir: None,
            registry: CommandRegistry::builtin(),
            history,
            runner,
            probe,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn previous_dir(&self) -> Option<&Path> {
        self.previous_dir.as_deref()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn probe(&mut self) -> &mut dyn SystemProbe {
        self.probe.as_mut()
    }

    /// Only `cd` calls this, after checking the target is a readable
    /// directory.
    pub(crate) fn change_dir(&mut self, target: PathBuf) {
        let old = std::mem::replace(&mut self.working_dir, target);
        self.previous_dir = Some(old);
    }

    /// Expands a leading `~` and anchors relative paths at the session's
    /// working directory. The result is lexically normalized.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path);
        let expanded = Path::new(expanded.as_ref());
        if expanded.is_absolute() {
            normalize(expanded)
        } else {
            normalize(&self.working_dir.join(expanded))
        }
    }

    /// Working directory for display, with the home prefix shortened to `~`.
    pub fn display_dir(&self) -> String {
        abbreviate_home(&self.working_dir)
    }
}

/// Removes `.` and resolves `..` without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never climb above the root
                if !matches!(out.components().next_back(), None | Some(Component::RootDir | Component::Prefix(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

pub fn abbreviate_home(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return if rest.as_os_str().is_empty() {
                "~".to_string()
            } else {
                format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display())
            };
        }
    }
    path.display().to_string()
}


#[cfg(test)]
mod tests {
    use super::testing::session_in;
    use super::*;

    #[test]
    fn normalizes_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
    }

    #[test]
    fn relative_paths_use_session_dir() {
        let session = session_in(Path::new("/srv/data"));
        assert_eq!(session.resolve("logs/x.txt"), PathBuf::from("/srv/data/logs/x.txt"));
        assert_eq!(session.resolve("../etc"), PathBuf::from("/srv/etc"));
        assert_eq!(session.resolve("/abs"), PathBuf::from("/abs"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let session = session_in(Path::new("/srv"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(session.resolve("~/notes"), normalize(&home.join("notes")));
        }
    }

    #[test]
    fn change_dir_remembers_previous() {
        let mut session = session_in(Path::new("/srv"));
        session.change_dir(PathBuf::from("/tmp"));
        assert_eq!(session.working_dir(), Path::new("/tmp"));
        assert_eq!(session.previous_dir(), Some(Path::new("/srv")));
    }
}
