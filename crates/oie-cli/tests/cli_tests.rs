//! CLI Integration Tests
//!
//! Runs the `oie` binary end to end.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn oie(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_oie"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn test_interactive_stdin() {
    let output = oie(&["-c", "None"], b"The cat sat on the mat.\n");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "> The cat sat on the mat.\n0.000: (The cat; sat on; the mat)\n\n> "
    );
}

#[test]
fn test_tabbed_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let out = dir.path().join("out.tsv");
    std::fs::write(&input, "John likes pizza.\n").unwrap();

    let output = oie(
        &[
            input.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--output-format",
            "tabbed",
        ],
        b"",
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let written = std::fs::read_to_string(out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("confidence\targ1\trel\targ2"));
    assert!(lines[1].contains("\tJohn\tlikes\tpizza\t"));
}

#[test]
fn test_stdin_to_tabbed_file_is_clean() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.tsv");

    let output = oie(
        &[
            "-o",
            out.to_str().unwrap(),
            "--output-format",
            "tabbed",
            "-c",
            "None",
        ],
        b"John likes pizza.\n",
    );
    assert!(output.status.success());

    let written = std::fs::read_to_string(out).unwrap();
    assert!(!written.contains("> "));
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("0.000\tJohn\tlikes\tpizza\t"));
    assert!(written.ends_with('\n'));
}

#[test]
fn test_split_with_dependencies_fails() {
    let output = oie(&["-s", "--dependencies"], b"");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("cannot be used together"));
    assert!(stderr.contains("--help"));
}

#[test]
fn test_bad_encoding_reports_remediation() {
    let output = oie(&["--output-format", "tabbed"], b"caf\xE9\n");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("UTF-8"));
    assert!(stderr.contains("--encoding"));
}

#[test]
fn test_usage_flag() {
    let output = oie(&["--usage"], b"");

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("--output-format"));
}
