use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use pretty_assertions::assert_eq;

fn run(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_extract-input-value"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn tmp_file(name: &str, contents: &[u8]) -> PathBuf {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_reads_stdin() {
    let output = run(
        &["email"],
        br#"<form><input type="text" name="email" value="a@b.com"></form>"#,
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "a@b.com\n");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
}

#[test]
fn test_reads_file() {
    let path = tmp_file(
        "test_reads_file.html",
        b"<input name=x value=1>\n<input name=y value=2>\n<input name=x value='3'>",
    );
    let output = run(&["x", path.to_str().unwrap()], b"");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n3\n");
}

#[test]
fn test_missing_value_prints_empty_line() {
    let output = run(&["check"], br#"<input name="check" type="checkbox">"#);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\n");
}

#[test]
fn test_no_match_is_success() {
    let output = run(&["anything"], b"<p>no inputs here</p>");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"");
}

#[test]
fn test_output_is_raw_bytes() {
    let output = run(&["q"], b"<input name=q value=\"\xff\xfe\">");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"\xff\xfe\n");
}

#[test]
fn test_missing_file() {
    let path = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("does-not-exist.html");
    let output = run(&["q", path.to_str().unwrap()], b"");
    assert!(!output.status.success());
    assert_eq!(output.stdout, b"");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error: can't read "), "{}", stderr);
    assert!(stderr.contains("--help"), "{}", stderr);
}

#[test]
fn test_missing_fieldname() {
    let output = run(&[], b"");
    assert!(!output.status.success());
    assert_eq!(output.stdout, b"");
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_too_many_arguments() {
    let output = run(&["a", "b", "c"], b"");
    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn test_help() {
    let output = run(&["--help"], b"");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fieldname"), "{}", stdout);
    assert!(stdout.contains("infile"), "{}", stdout);
}

#[test]
fn test_short_help() {
    let output = run(&["-h"], b"");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fieldname"), "{}", stdout);
}

#[test]
fn test_fieldname_named_help() {
    let output = run(&["help"], b"<input name=help value=1>");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "");
}

#[test]
fn test_fieldname_starting_with_dash() {
    let output = run(&["--", "-q"], b"<input name=-q value=1>");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
}
