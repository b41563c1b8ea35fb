//! Drives the built binary through a terminal session.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Config dir pointing the agent at a port nobody listens on.
fn config_home() -> tempfile::TempDir {
    let address = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("timelog-sync");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.json"),
        format!(r#"{{"server_url": "http://{}"}}"#, address),
    )
    .unwrap();
    home
}

fn spawn_session(home: &tempfile::TempDir) -> Child {
    Command::new(env!("CARGO_BIN_EXE_timelog-sync"))
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap()
}

/// Forward stdout lines so the test can wait for a prompt.
fn stdout_lines(child: &mut Child) -> mpsc::Receiver<String> {
    let stdout = child.stdout.take().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stdout).lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn wait_for_exit(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return Some(status);
        }
        thread::sleep(Duration::from_millis(20));
    }
    None
}

#[test]
fn test_quit_exits_while_stdin_stays_open() {
    let home = config_home();
    let mut child = spawn_session(&home);

    // Keep the pipe open for the whole test
    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, "quit").unwrap();

    let status = wait_for_exit(&mut child, Duration::from_secs(5));
    if status.is_none() {
        child.kill().unwrap();
    }
    drop(stdin);

    assert!(status.expect("session still running after quit").success());
}

#[test]
fn test_interrupt_during_confirmation_exits_cleanly() {
    let home = config_home();
    let mut child = spawn_session(&home);
    let lines = stdout_lines(&mut child);

    let mut stdin = child.stdin.take().unwrap();
    writeln!(stdin, "clear").unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let line = lines.recv_timeout(remaining).expect("no confirmation prompt");
        if line.ends_with("[y/N]") {
            break;
        }
    }

    let sent = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(sent.success());

    let status = wait_for_exit(&mut child, Duration::from_secs(5));
    if status.is_none() {
        child.kill().unwrap();
    }
    drop(stdin);

    // A clean exit, not the default SIGINT termination
    assert!(status.expect("session still running after Ctrl+C").success());
}
