// parser.rs

use crate::error::{Result, ShellError};

const DELIMITERS: &[char] = &[' ', '\t', '\r', '\n', '\x07'];

pub const REDIRECT_IN: &str = "<";
pub const REDIRECT_OUT: &str = ">";
pub const PIPE: &str = "|";
pub const BACKGROUND: &str = "&";

/// Splits a raw line into whitespace-delimited tokens. No quoting, no escapes.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split(DELIMITERS)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_index_of(args: &[String], wanted: &[&str]) -> Option<usize> {
    // index 0 is the command name and never a modifier
    args.iter()
        .enumerate()
        .skip(1)
        .find(|(_, t)| wanted.contains(&t.as_str()))
        .map(|(i, _)| i)
}

pub fn redirect_index(args: &[String]) -> Option<usize> {
    first_index_of(args, &[REDIRECT_IN, REDIRECT_OUT])
}

pub fn pipe_index(args: &[String]) -> Option<usize> {
    first_index_of(args, &[PIPE])
}

/// Strips a trailing `&` and reports whether one was there.
pub fn take_background(args: &mut Vec<String>) -> bool {
    if args.last().map(String::as_str) == Some(BACKGROUND) {
        args.pop();
        true
    } else {
        false
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Modifiers {
    pub redirect: Option<usize>,
    pub pipe: Option<usize>,
    pub background: bool,
}

impl Modifiers {
    /// Positions are taken before the background marker is removed; the
    /// marker is always last so the indices stay valid either way.
    pub fn scan(args: &mut Vec<String>) -> Self {
        let redirect = redirect_index(args);
        let pipe = pipe_index(args);
        let background = take_background(args);
        Self { redirect, pipe, background }
    }
}

/// Splits a raw line on its `|` into the producer and consumer commands.
pub fn split_pipe(line: &str) -> Result<(Vec<String>, Vec<String>)> {
    let mut halves = line.split('|');
    match (halves.next(), halves.next(), halves.next()) {
        (_, _, Some(_)) => Err(ShellError::Pipeline("only a single `|` is supported")),
        (Some(left), Some(right), None) => {
            let (left, right) = (tokenize(left), tokenize(right));
            if left.is_empty() || right.is_empty() {
                return Err(ShellError::Pipeline("missing command around `|`"));
            }
            Ok((left, right))
        }
        _ => Err(ShellError::Pipeline("missing command around `|`")),
    }
}
