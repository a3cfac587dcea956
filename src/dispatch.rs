// dispatch.rs

use std::io::{Stdout, Write};
use crate::builtins::{is_builtin, run_builtin, Continuation};
use crate::error::{Result, ShellError};
use crate::history::{History, REPEAT};
use crate::launcher::Launcher;
use crate::parser::tokenize;
use crate::util::write_ignore_broken_pipe;

pub const HIST: &str = "hist";

/// Interpreter state shared across read-loop iterations. `out` receives what
/// the shell itself prints (`hist` listings, echoed `!!` lines, the
/// no-history notice); launched programs write straight to the inherited
/// descriptors.
pub struct Shell<W: Write = Stdout> {
    history: History,
    launcher: Launcher,
    out: W,
}

impl Shell<Stdout> {
    pub fn new() -> Self {
        Self::with_output(std::io::stdout())
    }
}

impl Default for Shell<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Shell<W> {
    pub fn with_output(out: W) -> Self {
        Self { history: History::new(), launcher: Launcher::new(), out }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn reap_background(&mut self) -> usize {
        self.launcher.reap_background()
    }

    /// Records a raw line (trailing newline included) and runs it.
    pub fn execute_line(&mut self, line: &str) -> Result<Continuation> {
        self.history.record(line);
        self.dispatch(tokenize(line))
    }

    fn dispatch(&mut self, mut args: Vec<String>) -> Result<Continuation> {
        let Some(command) = args.first() else {
            return Ok(Continuation::Continue);
        };
        if command == REPEAT {
            let repeat = match self.history.resolve_repeat() {
                Ok(repeat) => repeat,
                Err(err @ ShellError::NoHistory) => {
                    // a plain notice on stdout, not an `osc:` diagnostic
                    write_ignore_broken_pipe(&mut self.out, format!("{}\n", err))?;
                    return Ok(Continuation::Continue);
                }
                Err(err) => return Err(err),
            };
            write_ignore_broken_pipe(&mut self.out, &repeat.line)?;
            args = repeat.args;
        }
        let Some(command) = args.first() else {
            return Ok(Continuation::Continue);
        };

        if is_builtin(command) {
            tracing::debug!(%command, "builtin");
            return run_builtin(&args);
        }
        if command == HIST {
            self.history.show(&mut self.out)?;
            return Ok(Continuation::Continue);
        }

        let line = self.history.current().unwrap_or_default().to_string();
        let launched = self.launcher.launch(&line, args)?;
        tracing::trace!(?launched, "dispatched");
        Ok(Continuation::Continue)
    }
}
