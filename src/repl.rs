// repl.rs

use std::io::{BufRead, IsTerminal, Write};
use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::{Config as EditorConfig, DefaultEditor};
use crate::builtins::Continuation;
use crate::config::Config;
use crate::dispatch::Shell;
use crate::util::{report, write_ignore_broken_pipe};

/// Supplies one raw line per call, trailing newline included. `None` means
/// the input is exhausted.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> anyhow::Result<Self> {
        let config = EditorConfig::builder().auto_add_history(false).build();
        let editor = DefaultEditor::with_config(config).context("failed to set up the terminal")?;
        Ok(Self { editor })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line + "\n")),
            Err(ReadlineError::Interrupted) => Ok(Some("\n".to_string())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(err)) if err.kind() == std::io::ErrorKind::InvalidData => {
                report(format_args!("skipped unreadable input: {}", err));
                Ok(Some("\n".to_string()))
            }
            Err(err) => Err(err).context("failed to read from the terminal"),
        }
    }
}

/// Line reader for non-terminal input. The prompt is still written so a
/// scripted session reads like an interactive one.
pub struct Piped<R, P> {
    reader: R,
    prompt_out: P,
}

impl<R: BufRead, P: Write> Piped<R, P> {
    pub fn new(reader: R, prompt_out: P) -> Self {
        Self { reader, prompt_out }
    }
}

impl<R: BufRead, P: Write> LineSource for Piped<R, P> {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        write_ignore_broken_pipe(&mut self.prompt_out, prompt)?;
        // raw bytes, so one non-UTF-8 byte does not end the session
        let mut raw = Vec::new();
        let n = self.reader.read_until(b'\n', &mut raw).context("failed to read input")?;
        Ok((n > 0).then(|| String::from_utf8_lossy(&raw).into_owned()))
    }
}

/// Reads and dispatches lines until `exit`, end of input, or a fatal error.
/// Input that can no longer be read is reported and treated as end of input.
pub fn run<S, W>(source: &mut S, shell: &mut Shell<W>, prompt: &str) -> anyhow::Result<()>
where
    S: LineSource + ?Sized,
    W: Write,
{
    loop {
        shell.reap_background();
        let line = match source.read_line(prompt) {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("end of input");
                break;
            }
            Err(err) => {
                report(format_args!("{:#}", err));
                break;
            }
        };
        match shell.execute_line(&line) {
            Ok(Continuation::Continue) => {}
            Ok(Continuation::Exit) => break,
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => report(&err),
        }
    }
    Ok(())
}

pub fn start_repl(config: &Config) -> anyhow::Result<()> {
    let mut shell = Shell::new();
    if std::io::stdin().is_terminal() {
        run(&mut Terminal::new()?, &mut shell, &config.prompt)
    } else {
        let mut source = Piped::new(std::io::stdin().lock(), std::io::stdout());
        run(&mut source, &mut shell, &config.prompt)
    }
}
