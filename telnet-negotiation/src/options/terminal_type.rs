//! # Terminal Type Option Implementation (RFC 1091)
//!
//! The Terminal Type option lets the server ask which terminal the client runs.
//!
//! ## Sub-negotiation Protocol
//!
//! ### Query Terminal Type (server → client)
//! ```text
//! IAC SB TERMINAL_TYPE SEND IAC SE
//! ```
//!
//! ### Terminal Type Response (client → server)
//! ```text
//! IAC SB TERMINAL_TYPE IS <terminal-type-string> IAC SE
//! ```
//!
//! The client answers with the value of `TERM`. When no terminal type is known
//! the query is left unanswered.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::{OptionHandler, Session, Subnegotiation};
use crate::error::Result;
use crate::protocol::{OptionCode, Operation};

/// Environment variable holding the local terminal type
pub const TERM_VARIABLE: &str = "TERM";

/// Named string lookup used to answer terminal-type queries.
///
/// A missing value is a normal outcome, not an error.
pub trait Environment: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Sub-negotiation handler for TERMINAL-TYPE
#[derive(Clone)]
pub struct TerminalTypeHandler {
    environment: Arc<dyn Environment>,
}

impl TerminalTypeHandler {
    /// Handler answering from the given environment
    pub fn new(environment: Arc<dyn Environment>) -> Self {
        Self { environment }
    }

    /// Terminal type that would be reported right now
    pub fn terminal_type(&self) -> Option<String> {
        self.environment.lookup(TERM_VARIABLE)
    }
}

impl Default for TerminalTypeHandler {
    fn default() -> Self {
        Self::new(Arc::new(ProcessEnvironment))
    }
}

impl std::fmt::Debug for TerminalTypeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalTypeHandler").finish_non_exhaustive()
    }
}

impl OptionHandler for TerminalTypeHandler {
    fn handle(&self, session: &mut dyn Session, command: &[u8]) -> Result<()> {
        let Some(sb) = Subnegotiation::parse(command) else {
            debug!("Ignoring malformed TERMINAL-TYPE sub-negotiation: {:?}", command);
            return Ok(());
        };

        match sb.operation() {
            Some(Operation::SEND) => match self.terminal_type() {
                Some(term) => {
                    debug!("Reporting terminal type {:?}", term);
                    session.send_subnegotiation(
                        OptionCode::TERMINAL_TYPE,
                        Some(Operation::IS),
                        term.as_bytes(),
                    )
                }
                None => {
                    debug!("No terminal type available, leaving SEND unanswered");
                    Ok(())
                }
            },
            Some(Operation::IS) => {
                debug!(
                    "Peer reported terminal type {:?}",
                    String::from_utf8_lossy(&sb.value())
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::WindowSize;
    use crate::protocol::{TelnetCommand, subnegotiation};

    #[derive(Default)]
    struct RecordingSession {
        sent: Vec<Vec<u8>>,
    }

    impl Session for RecordingSession {
        fn send_subnegotiation(
            &mut self,
            option: OptionCode,
            operation: Option<Operation>,
            payload: &[u8],
        ) -> Result<()> {
            self.sent.push(subnegotiation(option, operation, payload));
            Ok(())
        }

        fn send_negotiation(&mut self, verb: TelnetCommand, option: OptionCode) -> Result<()> {
            self.sent.push(vec![255, verb.to_byte(), option.to_byte()]);
            Ok(())
        }

        fn window_size(&self) -> WindowSize {
            WindowSize::default()
        }
    }

    fn handler_with(term: Option<&str>) -> TerminalTypeHandler {
        let mut env = HashMap::new();
        if let Some(term) = term {
            env.insert(TERM_VARIABLE.to_string(), term.to_string());
        }
        TerminalTypeHandler::new(Arc::new(env))
    }

    #[test]
    fn test_send_is_answered_with_term() {
        let handler = handler_with(Some("xterm"));
        let mut session = RecordingSession::default();

        handler.handle(&mut session, &[255, 250, 24, 1, 255, 240]).unwrap();

        assert_eq!(
            session.sent,
            vec![vec![255, 250, 24, 0, b'x', b't', b'e', b'r', b'm', 255, 240]]
        );
    }

    #[test]
    fn test_send_without_term_is_ignored() {
        let handler = handler_with(None);
        let mut session = RecordingSession::default();

        handler.handle(&mut session, &[255, 250, 24, 1, 255, 240]).unwrap();

        assert!(session.sent.is_empty());
    }

    #[test]
    fn test_is_triggers_nothing() {
        let handler = handler_with(Some("xterm"));
        let mut session = RecordingSession::default();

        handler
            .handle(&mut session, &[255, 250, 24, 0, b'v', b't', 255, 240])
            .unwrap();

        assert!(session.sent.is_empty());
    }

    #[test]
    fn test_malformed_block_is_ignored() {
        let handler = handler_with(Some("xterm"));
        let mut session = RecordingSession::default();

        handler.handle(&mut session, &[255, 250, 24]).unwrap();
        handler.handle(&mut session, &[255, 250, 24, 255, 240]).unwrap();

        assert!(session.sent.is_empty());
    }

    #[test]
    fn test_process_environment_lookup_of_missing_variable() {
        let env = ProcessEnvironment;
        assert_eq!(env.lookup("TELNET_NEGOTIATION_SURELY_UNSET_VARIABLE"), None);
    }
}
