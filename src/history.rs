// history.rs

use std::io::Write;
use crate::error::{Result, ShellError};
use crate::parser::tokenize;
use crate::util::write_ignore_broken_pipe;

pub const HISTORY_CAPACITY: usize = 10;
pub const REPEAT: &str = "!!";

/// A resolved `!!`: the earlier raw line and its fresh argument vector.
#[derive(Debug, PartialEq, Eq)]
pub struct Repeat {
    pub line: String,
    pub args: Vec<String>,
}

/// Fixed-size ring of raw input lines. `next` is the slot the following
/// line lands in, so `next - 1` always holds the line being executed.
#[derive(Debug, Default)]
pub struct History {
    slots: [Option<String>; HISTORY_CAPACITY],
    next: usize,
    recorded: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_back(&self, n: usize) -> usize {
        (self.next + HISTORY_CAPACITY - n) % HISTORY_CAPACITY
    }

    pub fn record(&mut self, line: &str) {
        self.slots[self.next] = Some(line.to_string());
        self.next = (self.next + 1) % HISTORY_CAPACITY;
        self.recorded += 1;
    }

    /// The raw line of the command currently being dispatched.
    pub fn current(&self) -> Option<&str> {
        self.slots[self.slot_back(1)].as_deref()
    }

    /// Live entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &str> + '_ {
        (0..HISTORY_CAPACITY)
            .map(move |i| (self.next + i) % HISTORY_CAPACITY)
            .filter_map(move |slot| self.slots[slot].as_deref())
    }

    pub fn show<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for (n, line) in self.entries().enumerate() {
            write_ignore_broken_pipe(&mut out, format!("{}) {}", n + 1, line))?;
        }
        Ok(())
    }

    /// Resolves `!!` against the line before the one in progress and puts
    /// the resolved line in place of the `!!` entry.
    pub fn resolve_repeat(&mut self) -> Result<Repeat> {
        if self.recorded < 2 {
            return Err(ShellError::NoHistory);
        }
        let previous = match &self.slots[self.slot_back(2)] {
            Some(line) if tokenize(line) != [REPEAT] => line.clone(),
            _ => return Err(ShellError::NoHistory),
        };
        let current = self.slot_back(1);
        self.slots[current] = Some(previous.clone());
        tracing::debug!(line = previous.trim_end(), "resolved repeat");
        Ok(Repeat { args: tokenize(&previous), line: previous })
    }
}
