//! Plain-English shortcuts: "create a folder called reports" → `mkdir reports`.
//!
//! This is pattern matching, not language understanding. A line is only
//! considered when it contains one of the trigger verbs, and then only
//! rewritten if one of the rules below matches the *whole* line. Anything
//! else passes through untouched.

use std::sync::OnceLock;

use log::debug;
use regex::{Captures, Regex};

use crate::core::tokenizer::quote;

const TRIGGER: &str =
    r"(?i)\b(create|make|move|delete|remove|show|list|display|open|read|write|copy|rename)\b";

// Optional politeness in front, optional punctuation at the end
const LEAD: &str = r"(?i)^\s*(?:please\s+)?(?:can\s+you\s+)?";
const TAIL: &str = r"\s*[.!?]?\s*$";
const NAME: &str = r#"["']?([^\s"']+)["']?"#;

#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    pub rule: &'static str,
    pub command: String,
    /// Set when the command deletes something; callers must confirm first.
    pub destructive: bool,
}

struct Rule {
    name: &'static str,
    pattern: Regex,
    build: fn(&Captures) -> (String, bool),
}

pub struct NlMapper {
    trigger: Regex,
    rules: Vec<Rule>,
}

impl NlMapper {
    pub fn new() -> Self {
        let rules = vec![
            rule(
                "mkdir",
                &format!(r"(?:create|make)\s+(?:a\s+)?(?:new\s+)?(?:folder|directory|dir)\s+(?:called\s+|named\s+)?{NAME}"),
                |c| (format!("mkdir {}", quote(&c[1])), false),
            ),
            rule(
                "touch",
                &format!(r"(?:create|make)\s+(?:a\s+)?(?:new\s+)?(?:empty\s+)?file\s+(?:called\s+|named\s+)?{NAME}"),
                |c| (format!("touch {}", quote(&c[1])), false),
            ),
            rule(
                "ps",
                r"(?:show|list|display)\s+(?:me\s+)?(?:all\s+)?(?:the\s+)?(?:running\s+)?processes",
                |_| ("ps".to_string(), false),
            ),
            rule(
                "cpu",
                r"(?:show|display)\s+(?:me\s+)?(?:the\s+)?cpu(?:\s+usage)?",
                |_| ("cpu".to_string(), false),
            ),
            rule(
                "mem",
                r"(?:show|display)\s+(?:me\s+)?(?:the\s+)?(?:memory|ram)(?:\s+usage)?",
                |_| ("mem".to_string(), false),
            ),
            rule(
                "df",
                r"(?:show|display)\s+(?:me\s+)?(?:the\s+)?disk(?:\s+(?:usage|space))?",
                |_| ("df".to_string(), false),
            ),
            rule(
                "ls",
                &format!(
                    r"(?:list|show|display)\s+(?:me\s+)?(all\s+)?(?:the\s+)?files(?:\s+(?:in|inside|under)\s+(?:the\s+)?(?:folder\s+|directory\s+)?{NAME})?"
                ),
                |c| {
                    let mut command = "ls".to_string();
                    if c.get(1).is_some() {
                        command.push_str(" -a");
                    }
                    if let Some(dir) = c.get(2) {
                        command.push(' ');
                        command.push_str(&quote(dir.as_str()));
                    }
                    (command, false)
                },
            ),
            rule(
                "cat",
                &format!(
                    r"(?:show|display|open|read)\s+(?:me\s+)?(?:the\s+)?(?:contents\s+of\s+(?:the\s+)?(?:file\s+)?|file\s+){NAME}"
                ),
                |c| (format!("cat {}", quote(&c[1])), false),
            ),
            rule(
                "mv",
                &format!(r"(?:move|rename)\s+(?:the\s+)?(?:file\s+|folder\s+|directory\s+)?{NAME}\s+(?:to|into|as)\s+{NAME}"),
                |c| (format!("mv {} {}", quote(&c[1]), quote(&c[2])), false),
            ),
            rule(
                "cp",
                &format!(r"copy\s+(?:the\s+)?(?:file\s+|folder\s+|directory\s+)?{NAME}\s+(?:to|into)\s+{NAME}"),
                |c| (format!("cp {} {}", quote(&c[1]), quote(&c[2])), false),
            ),
            rule(
                "rm",
                &format!(r"(?:delete|remove)\s+(?:the\s+)?(file\s+|folder\s+|directory\s+)?{NAME}"),
                |c| {
                    let recursive = c
                        .get(1)
                        .map(|kind| !kind.as_str().trim().eq_ignore_ascii_case("file"))
                        .unwrap_or(false);
                    let flag = if recursive { "-r " } else { "" };
                    (format!("rm {}{}", flag, quote(&c[2])), true)
                },
            ),
        ];

        Self {
            trigger: Regex::new(TRIGGER).expect("trigger pattern is valid"),
            rules,
        }
    }

    /// Process-wide instance; the patterns only need compiling once.
    pub fn shared() -> &'static NlMapper {
        static MAPPER: OnceLock<NlMapper> = OnceLock::new();
        MAPPER.get_or_init(NlMapper::new)
    }

    pub fn looks_natural(&self, line: &str) -> bool {
        self.trigger.is_match(line)
    }

    /// First matching rule wins. `None` means "run the line as typed".
    pub fn rewrite(&self, line: &str) -> Option<Rewrite> {
        if !self.looks_natural(line) {
            return None;
        }
        let rewrite = self.rules.iter().find_map(|rule| {
            rule.pattern.captures(line).map(|caps| {
                let (command, destructive) = (rule.build)(&caps);
                Rewrite {
                    rule: rule.name,
                    command,
                    destructive,
                }
            })
        });
        match &rewrite {
            Some(r) => debug!("rule {} rewrote {:?} -> {:?}", r.rule, line, r.command),
            None => debug!("no rule for natural-looking input {:?}", line),
        }
        rewrite
    }
}

impl Default for NlMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn rule(name: &'static str, body: &str, build: fn(&Captures) -> (String, bool)) -> Rule {
    let pattern = format!("{LEAD}{body}{TAIL}");
    Rule {
        name,
        pattern: Regex::new(&pattern).expect("rule pattern is valid"),
        build,
    }
}
