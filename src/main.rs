use telnet_client::config::{CONFIG_FILE, ClientConfig};
use telnet_client::errors::{ClientError, ClientResult};
use telnet_client::init_logging;
use telnet_client::session::ClientSession;
use tracing::{error, info};

fn main() {
    init_logging();

    if let Err(e) = run() {
        error!("{}", e);
        eprintln!("telnet-client: {}", e);
        std::process::exit(1);
    }
}

fn run() -> ClientResult<()> {
    let mut config = ClientConfig::load_from_file(CONFIG_FILE)?;
    apply_args(&mut config, std::env::args().skip(1))?;
    config.validate()?;

    let mut session = ClientSession::new(config);
    match session.run() {
        Err(ClientError::Disconnected) => {
            info!("Server disconnected");
            Ok(())
        }
        other => other,
    }
}

/// `telnet-client [host] [port]`
fn apply_args<I>(config: &mut ClientConfig, args: I) -> ClientResult<()>
where
    I: Iterator<Item = String>,
{
    let args: Vec<String> = args.collect();
    match args.as_slice() {
        [] => {}
        [host] => config.server.host = host.clone(),
        [host, port] => {
            config.server.host = host.clone();
            config.server.port = port
                .parse()
                .map_err(|_| ClientError::Usage(format!("invalid port {:?}", port)))?;
        }
        _ => {
            return Err(ClientError::Usage(
                "telnet-client [host] [port]".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_args_override_config() {
        let mut config = ClientConfig::default();
        apply_args(&mut config, args(&["mud.example.org", "4000"])).unwrap();
        assert_eq!(config.address(), "mud.example.org:4000");

        apply_args(&mut config, args(&["localhost"])).unwrap();
        assert_eq!(config.address(), "localhost:4000");
    }

    #[test]
    fn test_bad_args() {
        let mut config = ClientConfig::default();
        assert!(matches!(
            apply_args(&mut config, args(&["host", "port"])),
            Err(ClientError::Usage(_))
        ));
        assert!(matches!(
            apply_args(&mut config, args(&["a", "1", "b"])),
            Err(ClientError::Usage(_))
        ));
    }
}
