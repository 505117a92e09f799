use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use telnet_client::config::ClientConfig;

/// Loopback server running `script` on the first connection, plus a config
/// pointing at it with size detection off
pub fn spawn_server<F>(script: F) -> (ClientConfig, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        script(stream);
    });

    let mut config = ClientConfig::default();
    config.server.host = addr.ip().to_string();
    config.server.port = addr.port();
    config.terminal.detect_size = false;
    (config, handle)
}
