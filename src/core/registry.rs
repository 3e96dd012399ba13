use std::collections::BTreeMap;

use crate::core::builtins::BUILTINS;
use crate::core::error::ShellError;
use crate::core::session::Session;

pub type Handler = fn(&[String], &mut Session) -> Result<String, ShellError>;

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub handler: Handler,
}

/// Name → handler table. Assembled once from `BUILTINS` and never changed.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, Builtin>,
}

impl CommandRegistry {
    pub fn builtin() -> Self {
        Self::from_table(BUILTINS)
    }

    pub fn from_table(table: &[Builtin]) -> Self {
        let commands = table.iter().map(|b| (b.name, *b)).collect();
        Self { commands }
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Builtin> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Command names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Builtin> {
        self.commands.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_command_is_registered() {
        let registry = CommandRegistry::builtin();
        for name in [
            "pwd", "cd", "ls", "mkdir", "rmdir", "rm", "touch", "cat", "head", "tail", "mv", "cp",
            "stat", "echo", "cpu", "mem", "ps", "top", "df", "help", "history", "clear", "ai",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
        assert_eq!(registry.names().count(), 23);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = CommandRegistry::builtin();
        assert!(registry.get("ls").is_some());
        assert!(registry.get("LS").is_none());
        assert!(registry.get("exit").is_none());
    }

    #[test]
    fn names_are_sorted() {
        let names: Vec<_> = CommandRegistry::builtin().names().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
