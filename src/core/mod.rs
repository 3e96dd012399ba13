pub mod builtins;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod history;
pub mod nl;
pub mod registry;
pub mod runner;
pub mod session;
pub mod shell;
pub mod sysmon;
pub mod tokenizer;
