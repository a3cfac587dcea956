use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

fn osc(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_osc"));
    cmd.current_dir(dir)
        .env_remove("OSC_PROMPT")
        .env_remove("OSC_LOG")
        .stdin(Stdio::piped());
    cmd
}

fn session(dir: &Path, input: impl AsRef<[u8]>) -> Output {
    let mut child = osc(dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start osc");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_ref())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn redirected_output_can_be_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "echo hi > out.txt\ncat < out.txt\nexit\n");
    assert!(out.status.success());
    assert_eq!(std::fs::read_to_string(dir.path().join("out.txt")).unwrap(), "hi\n");
    assert_eq!(text(&out.stdout), "osc> osc> hi\nosc> ");
}

#[test]
fn failed_cd_keeps_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "cd /nonexistent\npwd\nexit\n");
    let cwd = dir.path().canonicalize().unwrap();
    assert!(text(&out.stderr).contains("cd: /nonexistent"));
    assert!(text(&out.stdout).contains(&format!("{}\n", cwd.display())));
    assert!(out.status.success());
}

#[test]
fn background_job_does_not_block_the_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = osc(dir.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let started = Instant::now();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"sleep 5 &\nexit\n")
        .unwrap();
    let status = child.wait().unwrap();
    assert!(status.success());
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[test]
fn shell_keeps_reading_after_a_pipe() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "echo a b | wc -w\nhist\nexit\n");
    let stdout = text(&out.stdout);
    assert!(stdout.contains("2\n"));
    assert!(stdout.contains("1) echo a b | wc -w\n2) hist\n"));
}

#[test]
fn repeat_reruns_the_previous_line() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "!!\necho again\n!!\n");
    assert_eq!(
        text(&out.stdout),
        "osc> No commands in history\nosc> again\nosc> echo again\nagain\nosc> "
    );
    assert!(text(&out.stderr).is_empty());
}

#[test]
fn repeat_reruns_a_pipe() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "echo a b | wc -w\n!!\nexit\n");
    assert_eq!(
        text(&out.stdout),
        "osc> 2\nosc> echo a b | wc -w\n2\nosc> "
    );
}

#[test]
fn non_utf8_input_does_not_end_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), b"echo caf\xe9\necho still-alive\nexit\n");
    assert!(out.status.success());
    assert!(text(&out.stdout).contains("still-alive\n"));
}

#[test]
fn unreadable_redirect_target_is_reported_by_the_child() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "cat < missing.txt\necho next\nexit\n");
    assert!(text(&out.stderr).contains("osc: missing.txt: No such file or directory\n"));
    assert!(text(&out.stdout).contains("next\n"));
    assert!(out.status.success());
}

#[test]
fn failing_commands_do_not_change_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "false\nosc-no-such-command\nexit\n");
    assert!(text(&out.stderr).contains("exec: osc-no-such-command"));
    assert!(out.status.success());
}

#[test]
fn end_of_input_exits_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let out = session(dir.path(), "\n   \n");
    assert!(out.status.success());
    assert_eq!(text(&out.stdout), "osc> osc> osc> ");
}
