use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn folio() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("folio").unwrap()
}

#[test]
fn compile_prints_output() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("doc.fo"), "# Hi\n\nTotal .sum {2} {3} apples\n")?;

    folio()
        .current_dir(dir.path())
        .args(["compile", "doc.fo"])
        .assert()
        .success()
        .stdout("# Hi\n\nTotal 5 apples\n");
    Ok(())
}

#[test]
fn compile_writes_output_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("doc.fo"), "# One\n")?;

    folio()
        .current_dir(dir.path())
        .args(["compile", "doc.fo", "--doctype", "paged", "-o", "out.txt"])
        .assert()
        .success()
        .stdout("");
    assert_eq!(fs::read_to_string(dir.path().join("out.txt"))?, "# 1 One");
    Ok(())
}

#[test]
fn lenient_compile_succeeds_with_marker() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("doc.fo"), "Before\n\n.divide {1} {0}\n\nAfter\n")?;

    folio()
        .current_dir(dir.path())
        .args(["compile", "doc.fo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[Runtime error: Error in .divide: division by zero]"))
        .stdout(predicate::str::contains("After"));
    Ok(())
}

#[test]
fn strict_compile_exits_with_error_code() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("doc.fo"), "Before\n\n.divide {1} {0}\n")?;

    folio()
        .current_dir(dir.path())
        .args(["compile", "doc.fo", "--strict"])
        .assert()
        .code(14)
        .stdout("")
        .stderr(predicate::str::contains("Error at line 3, column 1:"))
        .stderr(predicate::str::contains("Error: Runtime error: Error in .divide: division by zero"));
    Ok(())
}

#[test]
fn config_file_sets_policy_and_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("folio.yml"),
        "policy: strict\ndocument:\n  type: slides\n",
    )?;
    fs::write(dir.path().join("doc.fo"), "# Intro\n\n.pagebreak\n\n.unknown\n")?;

    folio()
        .current_dir(dir.path())
        .args(["compile", "doc.fo"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("Unresolved reference"));
    Ok(())
}

#[test]
fn invalid_config_exits_with_config_code() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("broken.yml"), "policy: [")?;
    fs::write(dir.path().join("doc.fo"), "text\n")?;

    folio()
        .current_dir(dir.path())
        .args(["--config", "broken.yml", "compile", "doc.fo"])
        .assert()
        .code(40)
        .stderr(predicate::str::contains("Failed to load configuration"));
    Ok(())
}

#[test]
fn missing_source_file_fails() {
    let dir = tempdir().unwrap();
    folio()
        .current_dir(dir.path())
        .args(["compile", "absent.fo"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn repl_keeps_state_between_inputs() {
    folio()
        .arg("repl")
        .write_stdin("[docs]: https://example.org\n;;\n.var {n} {3}\n;;\nSee [docs][] .n times\n")
        .assert()
        .success()
        .stdout("\n\nSee docs <https://example.org> 3 times\n");
}
