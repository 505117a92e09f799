//! Local terminal queries

use crossterm::terminal;
use tracing::debug;

use crate::config::TerminalConfig;

/// Window size to report through NAWS: the local terminal's when detection is
/// enabled and works, the configured fallback otherwise
pub fn window_size(config: &TerminalConfig) -> (u16, u16) {
    let fallback = (config.width, config.height);
    if !config.detect_size {
        return fallback;
    }

    match terminal::size() {
        Ok((width, height)) if width > 0 && height > 0 => (width, height),
        Ok(size) => {
            debug!("Terminal reported unusable size {:?}, using {:?}", size, fallback);
            fallback
        }
        Err(e) => {
            debug!("Could not detect terminal size ({}), using {:?}", e, fallback);
            fallback
        }
    }
}
