#![allow(missing_docs)]

mod common;

use anyhow::Result;
use common::Workspace;
use predicates::prelude::*;

const PAGE: &str = "# Guide

Some prose about `Map`.

```ts hover
const sizes: Map<string, number> = new Map();
```

```js
plain(Map);
```
";

#[test]
fn annotate_wraps_opted_in_blocks_only() -> Result<()> {
    // Given: A page with one opted-in and one plain fence
    let ws = Workspace::new();
    let page = ws.file("guide.md", PAGE);

    // When: Annotating to stdout
    let assert = ws.cmd().arg("annotate").arg(&page).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;

    // Then: The hover block is replaced, the rest of the page is untouched
    assert!(stdout.starts_with("# Guide\n\nSome prose about `Map`.\n\n"));
    assert!(stdout.contains(r#"<div class="hoverdoc-block" data-hoverdoc="ts">"#));
    assert!(stdout.contains(r#"class="tooltip-trigger""#));
    assert!(!stdout.contains("```ts hover"));
    assert!(stdout.contains("```js\nplain(Map);\n```\n"));
    Ok(())
}

#[test]
fn annotate_reports_summary_on_stderr() {
    let ws = Workspace::new();
    let page = ws.file("guide.md", PAGE);

    ws.cmd()
        .arg("annotate")
        .arg(&page)
        .assert()
        .success()
        .stderr(predicate::str::contains("Annotated 1 of 2 code blocks"));
}

#[test]
fn annotate_quiet_suppresses_summary() {
    let ws = Workspace::new();
    let page = ws.file("guide.md", PAGE);

    ws.cmd()
        .args(["annotate", "-q"])
        .arg(&page)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn annotate_writes_output_file() -> Result<()> {
    let ws = Workspace::new();
    let page = ws.file("guide.md", PAGE);
    let out = ws.path().join("out.md");

    ws.cmd()
        .arg("annotate")
        .arg(&page)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&out)?;
    assert!(written.contains("data-tooltip="));
    Ok(())
}

#[test]
fn annotate_reads_stdin() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["annotate", "-"])
        .write_stdin("```rust hover\nlet v: Vec<u8> = Vec::new();\n```\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"data-hoverdoc="rust""#));
}

#[test]
fn annotate_honours_configured_marker() {
    // Given: A project config that changes the opt-in flag
    let ws = Workspace::new();
    ws.file("hoverdoc.toml", "[fence]\nmarker = \"tips\"\n");
    let page = ws.file("page.md", "```ts tips\nlet p: Promise<void>;\n```\n");

    // When/Then: The custom marker opts the block in
    ws.cmd()
        .arg("annotate")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("hoverdoc-block"));
}

#[test]
fn annotate_missing_file_fails() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["annotate", "nope.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read nope.md"));
}
