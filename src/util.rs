// util.rs

use std::io::Write;

pub fn write_ignore_broken_pipe<W: Write, S: AsRef<str>>(mut w: W, s: S) -> std::io::Result<()> {
    let res = w.write_all(s.as_ref().as_bytes()).and_then(|_| w.flush());
    match res {
        Err(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

/// Prints a diagnostic the way the shell reports every user-visible failure.
pub fn report<E: std::fmt::Display>(err: E) {
    let _ = write_ignore_broken_pipe(std::io::stderr(), format!("osc: {}\n", err));
}
