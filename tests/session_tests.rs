mod common;

use std::io::{Read, Write};

use telnet_client::session::{ClientSession, pump_input, pump_output};

#[test]
fn test_window_size_waits_for_do_naws() {
    let (mut config, server) = common::spawn_server(|mut stream| {
        // Only DONT ECHO goes out before the server asks for anything
        let mut opening = [0u8; 3];
        stream.read_exact(&mut opening).unwrap();
        assert_eq!(opening, [255, 254, 1]);

        stream.write_all(&[255, 253, 31]).unwrap();
        let mut naws = [0u8; 12];
        stream.read_exact(&mut naws).unwrap();
        assert_eq!(naws, [255, 251, 31, 255, 250, 31, 0, 100, 0, 30, 255, 240]);
    });
    config.terminal.width = 100;
    config.terminal.height = 30;
    config.negotiation.disable_remote_echo = true;

    let session = ClientSession::new(config);
    let mut conn = session.connect().unwrap();

    let mut screen = Vec::new();
    assert_eq!(pump_output(&mut conn, &mut screen).unwrap(), 0);
    server.join().unwrap();
    conn.close().unwrap();
}

#[test]
fn test_server_output_reaches_the_terminal() {
    let (config, server) = common::spawn_server(|mut stream| {
        stream.write_all(&[255, 251, 1, 255, 251, 3]).unwrap();
        stream.write_all(b"Welcome\r\n").unwrap();

        let mut replies = [0u8; 6];
        stream.read_exact(&mut replies).unwrap();
        assert_eq!(replies, [255, 253, 1, 255, 253, 3]);
    });

    let session = ClientSession::new(config);
    let mut conn = session.connect().unwrap();

    let mut screen = Vec::new();
    let received = pump_output(&mut conn, &mut screen).unwrap();
    server.join().unwrap();

    assert_eq!(screen, b"Welcome\r\n");
    assert_eq!(received, 9);
}

#[test]
fn test_typed_lines_reach_the_server() {
    let (config, server) = common::spawn_server(|mut stream| {
        let mut line = [0u8; 6];
        stream.read_exact(&mut line).unwrap();
        assert_eq!(&line, b"look\r\n");
    });

    let session = ClientSession::new(config);
    let mut conn = session.connect().unwrap();
    let mut writer = conn.get_ref().writer();

    assert_eq!(pump_input(&b"look\n"[..], &mut writer).unwrap(), 5);
    server.join().unwrap();

    writer.close().unwrap();
    let mut screen = Vec::new();
    assert_eq!(pump_output(&mut conn, &mut screen).unwrap(), 0);
}
