use super::*;
use crate::error::FolioError;
use crate::subdocument::Subdocument;
use std::fs;

fn names(subdocuments: &[Subdocument]) -> Vec<&str> {
    subdocuments.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn test_includes_build_the_graph() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.fo"), "A includes .subdocument {b.fo}\n").unwrap();
    fs::write(dir.path().join("b.fo"), "Leaf\n").unwrap();

    let mut pipeline = pipeline_with(options_in(dir.path()));
    let doc = pipeline
        .execute(".subdocument {a.fo}\n\n.subdocument {b.fo}\n")
        .unwrap();
    assert_eq!(doc.output, "-> a\n\n-> b");

    let data = pipeline.context().subdocuments();
    let data = data.borrow();
    let main = Subdocument::root("main");
    assert_eq!(names(data.graph.vertices()), vec!["main", "a", "b"]);
    assert_eq!(names(data.graph.neighbors(&main)), vec!["a", "b"]);
    assert_eq!(names(data.graph.neighbors(&Subdocument::root("a"))), vec!["b"]);
    assert_eq!(data.graph.edge_count(), 3);

    assert_eq!(data.summary("a").unwrap().output, "A includes -> b");
    assert_eq!(data.summary("b").unwrap().output, "Leaf");
}

#[test]
fn test_subdocument_sees_parent_declarations() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("byline.fo"), "By .author\n").unwrap();

    let mut pipeline = pipeline_with(options_in(dir.path()));
    pipeline
        .execute(".var {author} {Ada}\n\n.subdocument {byline.fo}\n")
        .unwrap();

    let data = pipeline.context().subdocuments();
    assert_eq!(data.borrow().summary("byline").unwrap().output, "By Ada");
}

#[test]
fn test_self_inclusion_is_cut() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("loop.fo"), "Again .subdocument {loop.fo}\n").unwrap();

    let mut pipeline = pipeline_with(options_in(dir.path()));
    let doc = pipeline.execute(".subdocument {loop.fo}\n").unwrap();
    assert_eq!(doc.output, "-> loop");

    let data = pipeline.context().subdocuments();
    let summary = data.borrow().summary("loop").unwrap().output.clone();
    assert!(summary.starts_with("Again [Pipeline error:"), "{}", summary);

    let mut strict = pipeline_with(options_in(dir.path()).with_policy(crate::config::ErrorPolicy::Strict));
    let err = strict.execute(".subdocument {loop.fo}\n").unwrap_err();
    assert!(matches!(err, FolioError::Pipeline { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_missing_subdocument_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = compile_with(
        options_in(dir.path()).with_policy(crate::config::ErrorPolicy::Strict),
        ".subdocument {absent.fo}\n",
    )
    .unwrap_err();
    assert!(matches!(err, FolioError::Io { .. }));
}

#[test]
fn test_failed_subdocument_is_retried() {
    let dir = tempfile::tempdir().unwrap();
    let mut pipeline = pipeline_with(options_in(dir.path()).with_policy(crate::config::ErrorPolicy::Strict));
    assert!(pipeline.execute(".subdocument {late.fo}\n").is_err());

    fs::write(dir.path().join("late.fo"), "Here now\n").unwrap();
    let doc = pipeline.execute(".subdocument {late.fo}\n").unwrap();
    assert_eq!(doc.output, "-> late");
}

#[test]
fn test_execute_subdocument_from_source() {
    let mut pipeline = pipeline();
    let doc = pipeline
        .execute_subdocument(Subdocument::from_source("notes", "# Notes\n\n.uppercase {shared}"))
        .unwrap();
    assert_eq!(doc.output, "# Notes\n\nSHARED");

    let data = pipeline.context().subdocuments();
    let data = data.borrow();
    assert_eq!(names(data.graph.neighbors(&Subdocument::root("main"))), vec!["notes"]);
}
