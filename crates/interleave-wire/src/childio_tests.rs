use super::*;
use tempfile::TempDir;

#[test]
fn move_file_to_renames_within_same_filesystem() {
    let src_dir = TempDir::new().expect("tempdir");
    let dest_dir = TempDir::new().expect("tempdir");
    let file = src_dir.path().join("trace.txt");
    std::fs::write(&file, b"trace data").expect("write");

    let moved = move_file_to(&file, dest_dir.path()).expect("move_file_to");
    assert!(!file.exists());
    assert!(moved.exists());
    assert_eq!(std::fs::read(&moved).expect("read"), b"trace data");
}

#[test]
fn discard_logs_removes_both_files_and_tolerates_missing() {
    let dir = TempDir::new().expect("tempdir");
    let stdout = dir.path().join("out.log");
    let stderr = dir.path().join("err.log");
    std::fs::write(&stdout, b"out").expect("write");
    // stderr deliberately absent

    discard_logs(&stdout, &stderr);
    assert!(!stdout.exists());
}
