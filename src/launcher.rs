// launcher.rs

use std::ffi::CString;
use std::os::unix::io::RawFd;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, pipe, write, ForkResult, Pid};
use crate::error::{Result, ShellError};
use crate::parser::{split_pipe, take_background, Modifiers, REDIRECT_IN};

const STDIN: RawFd = libc::STDIN_FILENO;
const STDOUT: RawFd = libc::STDOUT_FILENO;
const STDERR: RawFd = libc::STDERR_FILENO;

/// Result of handing a command to the launcher.
#[derive(Debug, PartialEq, Eq)]
pub enum Launched {
    /// Nothing was left to run once the modifiers were stripped.
    Skipped,
    Foreground(Vec<WaitStatus>),
    Background(Vec<Pid>),
}

/// Program name, argv and the exec failure message prefix, all built before
/// forking so the child does not allocate.
struct Program {
    name: String,
    argv: Vec<CString>,
    exec_prefix: Vec<u8>,
}

impl Program {
    fn new(args: &[String]) -> Result<Self> {
        let argv = args
            .iter()
            .map(|a| CString::new(a.as_str()).map_err(|_| ShellError::NulByte(a.clone())))
            .collect::<Result<Vec<_>>>()?;
        let exec_prefix = format!("exec: {}: ", args[0]).into_bytes();
        Ok(Self { name: args[0].clone(), argv, exec_prefix })
    }
}

/// How the child's standard streams are set up before `execvp`.
enum Wiring {
    Inherit,
    File { target: RawFd, path: CString, flags: OFlag },
    Pipe { stdin: Option<RawFd>, stdout: Option<RawFd>, ends: (RawFd, RawFd) },
}

impl Wiring {
    fn apply(&self) -> nix::Result<()> {
        match self {
            Wiring::Inherit => {}
            Wiring::File { target, path, flags } => {
                let fd = open(path.as_c_str(), *flags, Mode::from_bits_truncate(0o644))?;
                dup2(fd, *target)?;
                close(fd)?;
            }
            Wiring::Pipe { stdin, stdout, ends } => {
                if let Some(fd) = stdin {
                    dup2(*fd, STDIN)?;
                }
                if let Some(fd) = stdout {
                    dup2(*fd, STDOUT)?;
                }
                close(ends.0)?;
                close(ends.1)?;
            }
        }
        Ok(())
    }

    fn failure_prefix(&self) -> Vec<u8> {
        let what = match self {
            Wiring::Inherit => "exec".to_string(),
            Wiring::File { path, .. } => path.to_string_lossy().into_owned(),
            Wiring::Pipe { .. } => "pipe".to_string(),
        };
        format!("osc: {}: ", what).into_bytes()
    }
}

/// Writes straight to fd 2: no allocation and no `Stderr` lock, which another
/// thread of the parent may have held at fork time.
fn child_report(prefix: &[u8], err: Errno) {
    for part in [prefix, err.desc().as_bytes(), &b"\n"[..]] {
        let _ = write(STDERR, part);
    }
}

fn exec_child(program: &Program, wiring: &Wiring, wiring_prefix: &[u8]) -> ! {
    if let Err(err) = wiring.apply() {
        child_report(wiring_prefix, err);
        unsafe { libc::_exit(1) };
    }
    if let Err(err) = execvp(&program.argv[0], &program.argv) {
        child_report(&program.exec_prefix, err);
    }
    unsafe { libc::_exit(127) }
}

fn spawn(program: &Program, wiring: &Wiring) -> Result<Pid> {
    let wiring_prefix = wiring.failure_prefix();
    match unsafe { fork() } {
        Ok(ForkResult::Child) => exec_child(program, wiring, &wiring_prefix),
        Ok(ForkResult::Parent { child }) => {
            tracing::debug!(pid = %child, command = %program.name, "spawned");
            Ok(child)
        }
        Err(e) => Err(ShellError::Fork(e)),
    }
}

/// Blocks until the child has exited or was killed. Stopped children are
/// waited on again.
fn wait_foreground(pid: Pid) -> Result<WaitStatus> {
    loop {
        match waitpid(pid, Some(WaitPidFlag::WUNTRACED)) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                tracing::debug!(?status, "foreground child finished");
                return Ok(status);
            }
            Ok(status) => tracing::trace!(?status, "child not finished yet"),
            Err(Errno::EINTR) => {}
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

/// Waits on every child before handing back the first failure, so one bad
/// `waitpid` does not leave the other pipe stage behind.
fn wait_all(children: Vec<Pid>) -> Result<Vec<WaitStatus>> {
    let waited: Vec<_> = children.into_iter().map(wait_foreground).collect();
    waited.into_iter().collect()
}

#[derive(Debug, Default)]
pub struct Launcher {
    background: Vec<Pid>,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pids of background children not reaped yet.
    pub fn background_jobs(&self) -> &[Pid] {
        &self.background
    }

    pub fn launch(&mut self, line: &str, mut args: Vec<String>) -> Result<Launched> {
        let modifiers = Modifiers::scan(&mut args);
        if args.is_empty() {
            return Ok(Launched::Skipped);
        }
        tracing::debug!(?modifiers, command = %args[0], "launching");

        // redirect wins over a pipe on the same line
        let children = if let Some(index) = modifiers.redirect {
            vec![spawn_redirected(args, index)?]
        } else if modifiers.pipe.is_some() {
            spawn_pipe(line, modifiers.background)?
        } else {
            vec![spawn(&Program::new(&args)?, &Wiring::Inherit)?]
        };

        if modifiers.background {
            self.background.extend_from_slice(&children);
            return Ok(Launched::Background(children));
        }
        Ok(Launched::Foreground(wait_all(children)?))
    }

    /// Collects background children that have finished, without blocking.
    /// Returns how many were reaped.
    pub fn reap_background(&mut self) -> usize {
        let before = self.background.len();
        self.background.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(status @ (WaitStatus::Exited(..) | WaitStatus::Signaled(..))) => {
                tracing::debug!(?status, "reaped background child");
                false
            }
            Ok(_) => true,
            Err(Errno::EINTR) => true,
            Err(e) => {
                tracing::warn!(pid = %pid, error = %e, "dropping background child");
                false
            }
        });
        before - self.background.len()
    }
}

fn spawn_redirected(mut args: Vec<String>, index: usize) -> Result<Pid> {
    let op = args[index].clone();
    let path = args
        .get(index + 1)
        .ok_or_else(|| ShellError::MissingRedirectTarget(op.clone()))?;
    let path = CString::new(path.as_str()).map_err(|_| ShellError::NulByte(path.clone()))?;
    let (target, flags) = if op == REDIRECT_IN {
        (STDIN, OFlag::O_RDONLY)
    } else {
        (STDOUT, OFlag::O_CREAT | OFlag::O_WRONLY | OFlag::O_TRUNC)
    };
    args.truncate(index);
    spawn(&Program::new(&args)?, &Wiring::File { target, path, flags })
}

fn spawn_pipe(line: &str, background: bool) -> Result<Vec<Pid>> {
    let (left, mut right) = split_pipe(line)?;
    if background && take_background(&mut right) && right.is_empty() {
        return Err(ShellError::Pipeline("missing command around `|`"));
    }
    let (left, right) = (Program::new(&left)?, Program::new(&right)?);

    let ends = pipe().map_err(ShellError::Pipe)?;
    let spawned = spawn(&right, &Wiring::Pipe { stdin: Some(ends.0), stdout: None, ends })
        .and_then(|consumer| {
            let producer =
                spawn(&left, &Wiring::Pipe { stdin: None, stdout: Some(ends.1), ends })?;
            Ok(vec![producer, consumer])
        });
    // the parent keeps neither end, or the consumer never sees EOF
    let _ = close(ends.0);
    let _ = close(ends.1);
    spawned
}
