#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::Workspace;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn kb_list_includes_builtins() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["kb", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Promise"))
        .stdout(predicate::str::contains("HashMap"));
}

#[test]
fn kb_list_json_merges_project_file() -> Result<()> {
    // Given: A TOML knowledge base that overrides a builtin
    let ws = Workspace::new();
    let kb = ws.file(
        "types.toml",
        "[Promise]\ntype = \"class\"\ndescription = \"Project promise\"\n",
    );

    // When: Listing as JSON
    let assert = ws
        .cmd()
        .args(["kb", "list", "--format", "json", "--kb"])
        .arg(&kb)
        .assert()
        .success();
    let json: Value = serde_json::from_slice(&assert.get_output().stdout)?;

    // Then: The project entry wins, builtins remain
    assert_eq!(json["Promise"]["type"], "class");
    assert_eq!(json["Promise"]["description"], "Project promise");
    assert!(json.get("Vec").is_some());
    Ok(())
}

#[test]
fn kb_show_prints_entry() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["kb", "show", "Option"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind:        enum"));
}

#[test]
fn kb_show_unknown_fails_with_hint() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["kb", "show", "Promis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No knowledge base entry named 'Promis'"))
        .stderr(predicate::str::contains("Did you mean 'Promise'?"));
}

#[test]
fn kb_search_respects_limit() -> Result<()> {
    let ws = Workspace::new();

    let assert = ws
        .cmd()
        .args(["kb", "search", "a", "--limit", "2", "--format", "json"])
        .assert()
        .success();
    let json: Value = serde_json::from_slice(&assert.get_output().stdout)?;

    assert_eq!(json.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn missing_kb_file_is_an_error() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["kb", "list", "--kb", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load the knowledge base"));
}
