use std::fs;

use notes_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("chapter_notes.html", b"old").unwrap();
    let second = writer.write("chapter_notes.html", b"new").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "new");
}

#[test]
fn write_new_numbers_conflicting_names() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let a = writer.write_new("chat.txt", b"1").unwrap();
    let b = writer.write_new("chat.txt", b"2").unwrap();
    let c = writer.write_new("chat.txt", b"3").unwrap();
    let names: Vec<_> = [&a, &b, &c]
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["chat.txt", "chat (1).txt", "chat (2).txt"]);
    assert_eq!(fs::read_to_string(&a).unwrap(), "1");
    assert_eq!(fs::read_to_string(&c).unwrap(), "3");
}

#[test]
fn rejects_paths_that_escape_the_directory() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    for name in ["../x.txt", "a/b.txt", "a\\b.txt", "..", ""] {
        assert!(
            matches!(writer.write_new(name, b"x"), Err(PersistError::InvalidFilename(_))),
            "{name:?} should be rejected"
        );
    }
}

#[test]
fn no_partial_file_when_directory_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("doc.txt", b"data").is_err());
    assert!(!file_path.with_file_name("doc.txt").exists());
}
