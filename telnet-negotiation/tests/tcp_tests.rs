use std::io::{Read, Write};
use std::time::Duration;

use telnet_negotiation::{ConnectionBuilder, TelnetError};

mod common;
use common::spawn_server;

#[test]
fn test_hello_telnet_over_tcp() {
    let (addr, server) = spawn_server(|mut stream| {
        stream.write_all(b"Hello telnet").unwrap();
    });

    let mut conn = ConnectionBuilder::new()
        .connect_timeout(Duration::from_secs(5))
        .connect(addr.as_str())
        .unwrap();
    server.join().unwrap();

    let mut received = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let n = conn.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        received.extend_from_slice(&buf[..n]);
    }
    assert_eq!(received, b"Hello telnet");

    conn.close().unwrap();
    assert!(matches!(conn.read_data(&mut buf), Err(TelnetError::NotReady)));
}

#[test]
fn test_server_sees_negotiation_replies() {
    let (addr, server) = spawn_server(|mut stream| {
        stream.write_all(&[255, 253, 31, 255, 251, 1]).unwrap();
        stream.write_all(b"ready").unwrap();

        let mut reply = [0u8; 15];
        stream.read_exact(&mut reply).unwrap();
        assert_eq!(
            reply,
            [255, 251, 31, 255, 250, 31, 0, 100, 0, 30, 255, 240, 255, 253, 1]
        );
    });

    let mut conn = ConnectionBuilder::new()
        .window_size(100, 30)
        .connect(addr.as_str())
        .unwrap();

    let mut received = Vec::new();
    let mut buf = [0u8; 16];
    while received.len() < 5 {
        let n = conn.read(&mut buf).unwrap();
        assert!(n > 0);
        received.extend_from_slice(&buf[..n]);
    }
    assert_eq!(received, b"ready");

    server.join().unwrap();
}

#[test]
fn test_writer_handle_sends_application_data() {
    let (addr, server) = spawn_server(|mut stream| {
        let mut line = [0u8; 6];
        stream.read_exact(&mut line).unwrap();
        assert_eq!(&line, b"look\r\n");
    });

    let mut conn = ConnectionBuilder::new().connect(addr.as_str()).unwrap();
    let mut writer = conn.get_ref().writer();
    writer.write_all(b"look\r\n").unwrap();
    server.join().unwrap();

    conn.close().unwrap();
    assert!(writer.is_closed());
    assert!(writer.write_all(b"x").is_err());
}
