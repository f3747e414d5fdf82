//! Integration tests for blockstats CLI

use std::io::Write;
use std::process::{Command, Stdio};

const WORLD: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/world.json");

fn cargo_command(args: &[&str]) -> Command {
    let mut cmd_args = vec!["run", "-q", "-p", "blockstats", "--"];
    cmd_args.extend(args);

    let mut cmd = Command::new("cargo");
    cmd.args(&cmd_args)
        .current_dir(env!("CARGO_MANIFEST_DIR").to_string() + "/..");
    cmd
}

fn run_blockstats(args: &[&str]) -> (String, String, bool) {
    let output = cargo_command(args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

fn run_blockstats_with_stdin(args: &[&str], script: &str) -> (String, String, bool) {
    let mut child = cargo_command(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(script.as_bytes())
        .expect("Failed to write script");
    let output = child.wait_with_output().expect("Failed to wait for command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();

    (stdout, stderr, success)
}

#[test]
fn test_cli_help() {
    let (stdout, _, success) = run_blockstats(&["--help"]);

    assert!(success);
    assert!(stdout.contains("blockstats"));
    assert!(stdout.contains("--world"));
    assert!(stdout.contains("--output-dir"));
    assert!(stdout.contains("--format"));
    assert!(stdout.contains("chunk-radius"));
}

#[test]
fn test_cli_version() {
    let (stdout, _, success) = run_blockstats(&["--version"]);

    assert!(success);
    assert!(stdout.contains("blockstats"));
}

#[test]
fn test_box_then_query() {
    let (stdout, _, success) = run_blockstats(&[
        "--world", WORLD, "--format", "simple", "count", "box", "0", "0", "0", "15", "0", "15",
        ";", "query",
    ]);

    assert!(success);
    assert!(stdout.contains("Block stats:"));
    assert!(stdout.contains("minecraft:stone, 256"));
    assert!(stdout.contains("In total there were 256 blocks in 1 chunks"));
}

#[test]
fn test_ascii_table_is_rectangular() {
    let (stdout, _, success) = run_blockstats(&[
        "--world", WORLD, "count", "range", "16", "4", "16", ";", "query",
    ]);

    assert!(success);
    let lines: Vec<&str> = stdout.lines().collect();
    assert!(lines.len() > 5);
    assert!(lines[0].starts_with("+-"));
    let width = lines[0].chars().count();
    assert!(lines.iter().all(|l| l.chars().count() == width));
    // Stone outnumbers everything else, so it is the first data row
    assert!(lines[5].contains("minecraft:stone"));
}

#[test]
fn test_sessions_per_requester() {
    let script = "\
# alice scans the stone floor, bob the gold block
@alice count box 0 0 0 15 0 15
@bob count box 20 0 5 20 0 5
@alice query --format csv
";
    let (stdout, _, success) = run_blockstats_with_stdin(&["--world", WORLD], script);

    assert!(success);
    assert!(stdout.contains("minecraft:stone,256"));
    assert!(!stdout.contains("minecraft:gold_block"));
}

#[test]
fn test_counts_accumulate() {
    let script = "\
count box 20 0 5 20 0 5
count box 20 0 5 20 0 5
query --format simple
";
    let (stdout, _, success) = run_blockstats_with_stdin(&["--world", WORLD], script);

    assert!(success);
    assert!(stdout.contains("minecraft:gold_block, 2"));
    assert!(stdout.contains("In total there were 2 blocks in 2 chunks"));
}

#[test]
fn test_block_entities() {
    let (stdout, _, success) = run_blockstats(&[
        "--world",
        WORLD,
        "count",
        "-e",
        "all-loaded-chunks",
        ";",
        "query",
        "-e",
        "--format",
        "csv",
    ]);

    assert!(success);
    assert!(stdout.contains("Loaded BlockEntities by type:"));
    assert!(stdout.contains("BlockEntity type,Count"));
    assert!(stdout.contains("minecraft:chest,2"));
    assert!(stdout.contains("minecraft:furnace,1"));
    assert!(stdout.contains("In total there were 3 loaded BlockEntities in 2 chunks"));
}

#[test]
fn test_other_dimension() {
    let (stdout, _, success) = run_blockstats(&[
        "--world", WORLD, "--format", "simple", "count", "range", "10", "10", "10", "-1", "0",
        "0", "0", ";", "query",
    ]);

    assert!(success);
    assert!(stdout.contains("minecraft:netherrack, 64"));
    assert!(!stdout.contains("minecraft:stone"));
}

#[test]
fn test_query_with_filter() {
    let (stdout, _, success) = run_blockstats(&[
        "--world",
        WORLD,
        "count",
        "box",
        "0",
        "0",
        "0",
        "15",
        "1",
        "15",
        ";",
        "query",
        "--format",
        "simple",
        "minecraft:wool",
    ]);

    assert!(success);
    assert!(stdout.contains("minecraft:wool:14, 2"));
    assert!(stdout.contains("minecraft:wool:2, 1"));
    assert!(!stdout.contains("minecraft:stone"));
    // Filtered queries have no summary line
    assert!(!stdout.contains("In total"));
}

#[test]
fn test_dump_csv_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().to_str().unwrap();
    let (stdout, _, success) = run_blockstats(&[
        "--world",
        WORLD,
        "--output-dir",
        out,
        "count",
        "box",
        "0",
        "0",
        "0",
        "15",
        "0",
        "15",
        ";",
        "dump-csv",
    ]);

    assert!(success);
    assert!(stdout.contains("Output written to file"));

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);
    let name = files[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("block_stats_"));
    assert!(name.ends_with(".csv"));

    let contents = std::fs::read_to_string(&files[0]).unwrap();
    assert!(contents.contains("Block,Count"));
    assert!(contents.contains("minecraft:stone,256"));
}

#[test]
fn test_unknown_dimension_fails_but_script_continues() {
    let script = "\
count all-loaded-chunks 5
count box 20 0 5 20 0 5
query --format simple
";
    let (stdout, stderr, success) = run_blockstats_with_stdin(&["--world", WORLD], script);

    assert!(!success);
    assert!(stderr.contains("could not resolve dimension 5"));
    assert!(stdout.contains("minecraft:gold_block, 1"));
}

#[test]
fn test_missing_world_file() {
    let (_, stderr, success) = run_blockstats(&["--world", "does/not/exist.json", "reset"]);

    assert!(!success);
    assert!(stderr.contains("could not load world"));
}

#[test]
fn test_invalid_format() {
    let (_, stderr, success) = run_blockstats(&["--world", WORLD, "--format", "xml", "reset"]);

    assert!(!success);
    assert!(stderr.contains("xml"));
}
