// CLI guard rails: the schemadoc binary end to end against temp fixtures.
mod support;

use anyhow::{Context, Result};
use schemadoc::PageRecord;
use serde_json::{Value, json};
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use support::{DocsDir, run_command, schemadoc_bin};
use tempfile::TempDir;

fn write_schema(dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("schema.json");
    let schema = json!({
        "type": "object",
        "required": ["color"],
        "properties": {
            "color": {"$ref": "#/definitions/Color"},
            "settings": {"type": "object", "additionalProperties": {"type": "number"}}
        },
        "definitions": {"Color": {"type": "string"}}
    });
    fs::write(&path, serde_json::to_string_pretty(&schema)?)?;
    Ok(path)
}

#[test]
fn annotate_writes_schema_and_pages() -> Result<()> {
    let work = TempDir::new()?;
    let schema = write_schema(&work)?;
    let docs = DocsDir::new()?;
    docs.write("color.yaml", "title: Color\n")?;
    let out = work.path().join("annotated.json");
    let pages = work.path().join("pages.json");

    let mut cmd = Command::new(schemadoc_bin());
    cmd.arg("annotate")
        .arg("--schema")
        .arg(&schema)
        .arg("--docs")
        .arg(docs.path())
        .arg("--out")
        .arg(&out)
        .arg("--pages")
        .arg(&pages);
    run_command(cmd)?;

    let annotated: Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(annotated["definitions"]["Color"]["title"], json!("Color"));
    let records: Vec<PageRecord> = serde_json::from_str(&fs::read_to_string(&pages)?)?;
    let color = records
        .iter()
        .find(|page| page.gid == "color")
        .context("color page")?;
    assert!(color.required);
    assert!(records.iter().any(|page| page.gid == "settings.*"));
    Ok(())
}

#[test]
fn rerunning_annotate_on_its_output_changes_nothing() -> Result<()> {
    let work = TempDir::new()?;
    let schema = write_schema(&work)?;
    let docs = DocsDir::new()?;
    docs.write(
        "color.yaml",
        "examples:\n  - code: red\n",
    )?;
    let first = work.path().join("first.json");
    let second = work.path().join("second.json");

    for (input, output) in [(&schema, &first), (&first, &second)] {
        let mut cmd = Command::new(schemadoc_bin());
        cmd.arg("annotate")
            .arg("--schema")
            .arg(input)
            .arg("--docs")
            .arg(docs.path())
            .arg("--out")
            .arg(output);
        run_command(cmd)?;
    }

    assert_eq!(fs::read(&first)?, fs::read(&second)?);
    Ok(())
}

#[test]
fn strict_mode_rejects_orphan_records() -> Result<()> {
    let work = TempDir::new()?;
    let schema = write_schema(&work)?;
    let docs = DocsDir::new()?;
    docs.write("no.such.node.yaml", "title: Orphan\n")?;

    let output = Command::new(schemadoc_bin())
        .arg("annotate")
        .arg("--schema")
        .arg(&schema)
        .arg("--docs")
        .arg(docs.path())
        .arg("--strict")
        .output()
        .context("running schemadoc annotate --strict")?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no.such.node"), "stderr was: {stderr}");
    Ok(())
}

#[test]
fn gids_lists_every_page() -> Result<()> {
    let work = TempDir::new()?;
    let schema = write_schema(&work)?;

    let mut cmd = Command::new(schemadoc_bin());
    cmd.arg("gids")
        .arg("--schema")
        .arg(&schema)
        .arg("--url-prefix")
        .arg("/reference");
    let output = run_command(cmd)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "\t/reference/",
            "color\t/reference/color",
            "settings\t/reference/settings",
            "settings.*\t/reference/settings/any",
        ]
    );
    Ok(())
}

#[test]
fn validate_accepts_and_rejects_documents() -> Result<()> {
    let work = TempDir::new()?;
    let schema = write_schema(&work)?;

    let good = work.path().join("good.json");
    fs::write(&good, r#"{"color": "red", "settings": {"a": 1}}"#)?;
    let mut cmd = Command::new(schemadoc_bin());
    cmd.arg("validate").arg("--schema").arg(&schema).arg("--file").arg(&good);
    let output = run_command(cmd)?;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "valid");

    let mut child = Command::new(schemadoc_bin())
        .arg("validate")
        .arg("--schema")
        .arg(&schema)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawning schemadoc validate")?;
    child
        .stdin
        .take()
        .context("stdin handle")?
        .write_all(br#"{"settings": {"a": "not a number"}}"#)?;
    let output = child.wait_with_output()?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed schema validation"), "stderr was: {stderr}");
    Ok(())
}
