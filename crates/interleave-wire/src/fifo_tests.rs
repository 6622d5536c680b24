use super::*;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[test]
fn create_pair_makes_two_fifo_special_files() {
    use std::os::unix::fs::FileTypeExt;

    let dir = TempDir::new().expect("tempdir");
    let fifo_in = dir.path().join("job_in");
    let fifo_out = dir.path().join("job_out");
    create_pair(&fifo_in, &fifo_out).expect("create_pair");

    assert!(std::fs::metadata(&fifo_in).expect("stat in").file_type().is_fifo());
    assert!(std::fs::metadata(&fifo_out).expect("stat out").file_type().is_fifo());
}

#[tokio::test]
async fn driver_and_child_can_exchange_a_byte_through_the_pair() {
    let dir = TempDir::new().expect("tempdir");
    let fifo_in = dir.path().join("job_in");
    let fifo_out = dir.path().join("job_out");
    create_pair(&fifo_in, &fifo_out).expect("create_pair");

    let fifo_in2 = fifo_in.clone();
    let fifo_out2 = fifo_out.clone();

    let child = tokio::spawn(async move {
        // Mirror image of the driver's open order: the child's write end
        // (fifo_out) first, matching the driver's read-first-out open, then
        // the child's read end (fifo_in).
        let mut w = tokio::fs::File::create(&fifo_out2).await.expect("child open write");
        let mut r = tokio::fs::File::open(&fifo_in2).await.expect("child open read");
        w.write_all(b"ping").await.expect("child write");
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf).await.expect("child read");
        assert_eq!(&buf, b"pong");
    });

    let (mut r, mut w) = open_driver_side(&fifo_in, &fifo_out).await.expect("open_driver_side");
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).await.expect("driver read");
    assert_eq!(&buf, b"ping");
    w.write_all(b"pong").await.expect("driver write");

    child.await.expect("child task");
    remove_pair(&fifo_in, &fifo_out).expect("remove_pair");
    assert!(!fifo_in.exists());
    assert!(!fifo_out.exists());
}

#[test]
fn remove_pair_is_idempotent_on_missing_files() {
    let dir = TempDir::new().expect("tempdir");
    let fifo_in = dir.path().join("missing_in");
    let fifo_out = dir.path().join("missing_out");
    assert!(remove_pair(&fifo_in, &fifo_out).is_ok());
}
