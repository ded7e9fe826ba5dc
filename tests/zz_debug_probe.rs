use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::test]
async fn probe_shutdown_eof() {
    let (a, b) = tokio::io::duplex(1024);
    let (a_read, mut a_write) = tokio::io::split(a);
    let (b_read, _b_write) = tokio::io::split(b);

    a_write.write_all(b"hello\n").await.unwrap();
    a_write.flush().await.unwrap();
    let _keep = a_read;

    a_write.shutdown().await.unwrap();
    drop(a_write);
    eprintln!("shut down a_write");

    let mut lines = BufReader::new(b_read).lines();
    eprintln!("first: {:?}", lines.next_line().await.unwrap());
    eprintln!("second (None=EOF): {:?}", lines.next_line().await.unwrap());
}
