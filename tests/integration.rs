//! Integration tests for the nightfall binary.
//!
//! Spawns the console host, feeds host commands via stdin, and checks the
//! `@<name> ...` lines it writes to stdout.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};
use std::time::Duration;

const NAMES: [&str; 9] = ["ann", "bob", "cat", "dan", "eve", "fay", "gus", "hal", "ivy"];

fn joins(n: usize) -> Vec<String> {
    NAMES[..n].iter().map(|name| format!("join {name}")).collect()
}

/// Sends commands to the host and collects stdout lines. `pause` is slept
/// after the commands, before stdin is closed.
fn run_host(args: &[&str], commands: &[String], pause: Duration) -> (bool, Vec<String>) {
    let exe = env!("CARGO_BIN_EXE_nightfall");
    let mut child = Command::new(exe)
        .args(args)
        .env_remove("NIGHTFALL_LOG")
        .env_remove("NIGHTFALL_SEED")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start nightfall");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    std::thread::sleep(pause);
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    (status.success(), lines)
}

fn lines_for<'a>(lines: &'a [String], name: &str) -> Vec<&'a str> {
    let prefix = format!("@{name} ");
    lines
        .iter()
        .filter_map(|l| l.strip_prefix(prefix.as_str()))
        .collect()
}

#[test]
fn start_deals_one_role_to_each_player() {
    let mut commands = joins(7);
    commands.push("start".to_string());
    commands.push("quit".to_string());
    let (ok, lines) = run_host(&["--seed", "5"], &commands, Duration::ZERO);
    assert!(ok);

    let mut mafiosi = 0;
    for name in &NAMES[..7] {
        let mine = lines_for(&lines, name);
        let reveals: Vec<&&str> = mine.iter().filter(|l| l.starts_with("You are ")).collect();
        assert_eq!(reveals.len(), 1, "{name} should get exactly one role: {mine:?}");
        if *reveals[0] == "You are a mafioso" {
            mafiosi += 1;
        }
        let panel = mine.iter().filter(|l| l.starts_with("[panel] ")).count();
        assert_eq!(panel, 7, "{name} should see the whole roster");
    }
    assert_eq!(mafiosi, 2);
}

#[test]
fn same_seed_deals_same_roles() {
    let mut commands = joins(8);
    commands.push("start".to_string());
    let reveals = |lines: &[String]| -> Vec<String> {
        lines
            .iter()
            .filter(|l| l.contains(" You are "))
            .cloned()
            .collect()
    };

    let (_, first) = run_host(&["--seed", "42"], &commands, Duration::ZERO);
    let (_, second) = run_host(&["--seed", "42"], &commands, Duration::ZERO);
    assert_eq!(reveals(&first).len(), 8);
    assert_eq!(reveals(&first), reveals(&second));
}

#[test]
fn too_few_players_cannot_start() {
    let mut commands = joins(6);
    commands.push("start".to_string());
    let (ok, lines) = run_host(&[], &commands, Duration::ZERO);
    assert!(ok);
    assert!(lines.iter().all(|l| !l.contains("You are ")));
}

#[test]
fn lobby_chat_reaches_joined_players() {
    let commands: Vec<String> = [
        "join ann",
        "join bob",
        "",
        "dance wildly",
        "say ann hello   there",
        "say nobody hi",
        "join cat",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let (ok, lines) = run_host(&[], &commands, Duration::ZERO);
    assert!(ok);
    assert_eq!(
        lines,
        vec!["@ann ann: hello   there", "@bob ann: hello   there"]
    );
}

#[test]
fn commands_before_start_are_refused() {
    let commands: Vec<String> = ["join ann", "join bob", "say ann /vote bob"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (_, lines) = run_host(&[], &commands, Duration::ZERO);
    assert_eq!(lines, vec!["@ann The game hasn't started yet."]);
}

#[test]
fn short_timings_reach_the_first_night() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, r#"{{ "start_delay_ms": 50 }}"#).unwrap();
    let path = config.path().to_str().unwrap().to_string();

    let mut commands = joins(7);
    commands.push("start".to_string());
    let (ok, lines) = run_host(&["--config", &path], &commands, Duration::from_millis(1500));
    assert!(ok);
    for name in &NAMES[..7] {
        assert!(lines_for(&lines, name).contains(&"Night has fallen."));
    }
    assert!(lines
        .iter()
        .any(|l| l.contains("The mafia are : ")));
}

#[test]
fn bad_config_fails() {
    let mut config = tempfile::NamedTempFile::new().unwrap();
    write!(config, r#"{{ "poll_ms": 0 }}"#).unwrap();
    let path = config.path().to_str().unwrap().to_string();

    let (ok, lines) = run_host(&["--config", &path], &[], Duration::ZERO);
    assert!(!ok);
    assert!(lines.is_empty());
}
