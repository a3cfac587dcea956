//! A small interactive shell: built-ins, `<`/`>` redirection, a single `|`
//! stage, `&` background jobs, and a ten-entry history with `!!`.

pub mod builtins;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod history;
pub mod launcher;
pub mod parser;
pub mod repl;
pub mod util;

pub use builtins::Continuation;
pub use config::Config;
pub use dispatch::Shell;
pub use error::ShellError;
