// builtins.rs

use std::env;
use crate::error::{Result, ShellError};

pub const BUILTINS: &[&str] = &["cd", "exit"];

/// What the read loop should do after a command has been dispatched.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Continuation {
    Continue,
    Exit,
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Runs `cd` or `exit`. Any other name is not handled here and is a no-op.
pub fn run_builtin(tokens: &[String]) -> Result<Continuation> {
    let Some(command) = tokens.first() else {
        return Ok(Continuation::Continue);
    };
    match command.as_str() {
        "cd" => {
            cd(tokens.get(1).map(String::as_str))?;
            Ok(Continuation::Continue)
        }
        "exit" => Ok(Continuation::Exit),
        other => {
            tracing::debug!(command = %other, "not a builtin");
            Ok(Continuation::Continue)
        }
    }
}

fn cd(target: Option<&str>) -> Result<()> {
    let target = target.ok_or(ShellError::CdMissingArgument)?;
    env::set_current_dir(target).map_err(|source| ShellError::ChangeDir {
        path: target.to_string(),
        source,
    })?;
    tracing::debug!(cwd = %target, "changed directory");
    Ok(())
}
