use std::fs;
use std::path::{Path, PathBuf};

use crate::core::registry::CommandRegistry;

/// Tab-completion candidates: command names for the first word, paths
/// everywhere.
pub struct CompletionEngine {
    commands: Vec<&'static str>,
}

impl CompletionEngine {
    pub fn new(registry: &CommandRegistry) -> Self {
        Self {
            commands: registry.names().collect(),
        }
    }

    /// `buffer` is the line up to the cursor and `partial` the word being
    /// typed. Relative paths are looked up under `cwd`.
    pub fn complete(&self, buffer: &str, partial: &str, cwd: &Path) -> Vec<String> {
        let mut candidates = Vec::new();
        if is_first_word(buffer) {
            candidates.extend(
                self.commands
                    .iter()
                    .filter(|name| name.starts_with(partial))
                    .map(|name| name.to_string()),
            );
        }
        candidates.extend(complete_path(partial, cwd));
        candidates
    }
}

fn is_first_word(buffer: &str) -> bool {
    !buffer.trim_start().contains(char::is_whitespace)
}

/// Directory part kept exactly as typed, basename matched by prefix.
pub fn complete_path(partial: &str, cwd: &Path) -> Vec<String> {
    if partial == "~" {
        return vec![format!("~{}", std::path::MAIN_SEPARATOR)];
    }

    let (typed_dir, base) = match partial.rfind(['/', std::path::MAIN_SEPARATOR]) {
        Some(i) => partial.split_at(i + 1),
        None => ("", partial),
    };

    let expanded = shellexpand::tilde(typed_dir);
    let dir = Path::new(expanded.as_ref());
    let lookup: PathBuf = if typed_dir.is_empty() {
        cwd.to_path_buf()
    } else if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        cwd.join(dir)
    };

    let Ok(entries) = fs::read_dir(&lookup) else {
        return Vec::new();
    };

    let mut matches: Vec<(String, bool)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            name.starts_with(base)
                .then(|| (name, entry.path().is_dir()))
        })
        .collect();
    matches.sort();

    matches
        .into_iter()
        .map(|(name, is_dir)| {
            let mut candidate = format!("{}{}", typed_dir, name);
            if is_dir {
                candidate.push(std::path::MAIN_SEPARATOR);
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine() -> CompletionEngine {
        CompletionEngine::new(&CommandRegistry::builtin())
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("foo")).unwrap();
        fs::write(dir.path().join("foobar.txt"), "").unwrap();
        fs::write(dir.path().join("other"), "").unwrap();
        fs::write(dir.path().join("foo").join("inner.rs"), "").unwrap();
        dir
    }

    #[test]
    fn paths_are_sorted_and_dirs_marked() {
        let dir = fixture();
        assert_eq!(
            complete_path("fo", dir.path()),
            vec!["foo/".to_string(), "foobar.txt".to_string()]
        );
    }

    #[test]
    fn typed_directory_prefix_is_kept() {
        let dir = fixture();
        assert_eq!(complete_path("foo/in", dir.path()), vec!["foo/inner.rs".to_string()]);
        assert_eq!(complete_path("./oth", dir.path()), vec!["./other".to_string()]);

        let abs = format!("{}/foo/", dir.path().display());
        assert_eq!(complete_path(&abs, dir.path()), vec![format!("{}inner.rs", abs)]);
    }

    #[test]
    fn first_word_gets_commands_too() {
        let dir = fixture();
        let engine = engine();

        let got = engine.complete("hi", "hi", dir.path());
        assert_eq!(got, vec!["history".to_string()]);

        let got = engine.complete("c", "c", dir.path());
        assert!(got.contains(&"cd".to_string()));
        assert!(got.contains(&"cpu".to_string()));
    }

    #[test]
    fn later_words_only_get_paths() {
        let dir = fixture();
        let engine = engine();
        assert_eq!(engine.complete("cat fo", "fo", dir.path()), complete_path("fo", dir.path()));
        // "cat" would match as a command name here if commands were offered
        assert!(engine.complete("ls ", "", dir.path()).iter().all(|c| c != "cat"));
    }

    #[test]
    fn empty_buffer_offers_everything() {
        let dir = fixture();
        let got = engine().complete("", "", dir.path());
        assert!(got.contains(&"pwd".to_string()));
        assert!(got.contains(&"foo/".to_string()));
    }

    #[test]
    fn unreadable_directories_give_nothing() {
        let dir = fixture();
        assert!(complete_path("missing/x", dir.path()).is_empty());
    }

    #[test]
    fn bare_tilde() {
        let dir = fixture();
        assert_eq!(complete_path("~", dir.path()), vec!["~/".to_string()]);
    }
}
