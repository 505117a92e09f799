//! # Option Negotiation Engine
//!
//! Decides how a client answers the peer's WILL/DO requests, following the
//! symmetric negotiation rule of RFC 854: each direction of an option is
//! answered on its own.
//!
//! ## Reply Rules
//!
//! | Received      | Option unknown | `we_will` / `peer_do` true | false  |
//! |---------------|----------------|----------------------------|--------|
//! | `DO <opt>`    | `WONT <opt>`   | `WILL <opt>`               | `WONT` |
//! | `WILL <opt>`  | `DONT <opt>`   | `DO <opt>`                 | `DONT` |
//!
//! WONT and DONT from the peer are acknowledgements and get no reply.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::options::OptionHandler;
use crate::protocol::{OptionCode, TelnetCommand};

/// Locally configured policy for one option code
#[derive(Clone, Default)]
pub struct OptionEntry {
    /// We offer to perform the option (answer DO with WILL)
    pub we_will: bool,
    /// We allow the peer to perform the option (answer WILL with DO)
    pub peer_do: bool,
    /// Invoked with the full `IAC SB ... IAC SE` block
    pub subnegotiation: Option<Arc<dyn OptionHandler>>,
    /// Invoked after any reply to a peer `DO`, whether `WILL` or `WONT`
    pub on_accept: Option<Arc<dyn OptionHandler>>,
}

impl OptionEntry {
    /// Entry with the given flags and no handlers
    pub fn new(we_will: bool, peer_do: bool) -> Self {
        Self {
            we_will,
            peer_do,
            subnegotiation: None,
            on_accept: None,
        }
    }

    /// Attach a sub-negotiation handler
    pub fn with_subnegotiation(mut self, handler: Arc<dyn OptionHandler>) -> Self {
        self.subnegotiation = Some(handler);
        self
    }

    /// Attach a post-acceptance handler
    pub fn with_on_accept(mut self, handler: Arc<dyn OptionHandler>) -> Self {
        self.on_accept = Some(handler);
        self
    }
}

impl fmt::Debug for OptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionEntry")
            .field("we_will", &self.we_will)
            .field("peer_do", &self.peer_do)
            .field("subnegotiation", &self.subnegotiation.is_some())
            .field("on_accept", &self.on_accept.is_some())
            .finish()
    }
}

/// Option code → entry. At most one entry per code; the last insert wins.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    entries: HashMap<OptionCode, OptionEntry>,
}

impl OptionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the entry for `code`
    pub fn insert(&mut self, code: OptionCode, entry: OptionEntry) {
        self.entries.insert(code, entry);
    }

    /// Entry configured for `code`
    pub fn get(&self, code: OptionCode) -> Option<&OptionEntry> {
        self.entries.get(&code)
    }

    /// True if `code` has an entry
    pub fn contains(&self, code: OptionCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Number of configured options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no options are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Verb to answer a peer `DO <code>` with
    pub fn reply_to_do(&self, code: OptionCode) -> TelnetCommand {
        match self.get(code) {
            Some(entry) if entry.we_will => TelnetCommand::WILL,
            _ => TelnetCommand::WONT,
        }
    }

    /// Verb to answer a peer `WILL <code>` with
    pub fn reply_to_will(&self, code: OptionCode) -> TelnetCommand {
        match self.get(code) {
            Some(entry) if entry.peer_do => TelnetCommand::DO,
            _ => TelnetCommand::DONT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_option_is_declined() {
        let table = OptionTable::new();
        assert_eq!(table.reply_to_do(OptionCode(88)), TelnetCommand::WONT);
        assert_eq!(table.reply_to_will(OptionCode(88)), TelnetCommand::DONT);
    }

    #[test]
    fn test_directions_are_independent() {
        let mut table = OptionTable::new();
        table.insert(OptionCode::ECHO, OptionEntry::new(false, true));

        assert_eq!(table.reply_to_do(OptionCode::ECHO), TelnetCommand::WONT);
        assert_eq!(table.reply_to_will(OptionCode::ECHO), TelnetCommand::DO);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut table = OptionTable::new();
        table.insert(OptionCode(88), OptionEntry::new(true, true));
        table.insert(OptionCode(88), OptionEntry::new(false, false));

        assert_eq!(table.len(), 1);
        let entry = table.get(OptionCode(88)).unwrap();
        assert!(!entry.we_will);
        assert!(!entry.peer_do);
    }

    #[test]
    fn test_entry_debug_hides_handlers() {
        let entry = OptionEntry::new(true, false);
        let text = format!("{:?}", entry);
        assert!(text.contains("we_will: true"));
        assert!(text.contains("on_accept: false"));
    }
}
