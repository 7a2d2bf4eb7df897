use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use crossterm::{execute, style::Print};
use std::io;

/// Copy text through the terminal (OSC 52), which also works over SSH
pub fn copy(text: &str) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, Print(osc52_sequence(text))).context("Failed to write to clipboard")
}

fn osc52_sequence(text: &str) -> String {
    let encoded = STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x1b\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence_encodes_utf8() {
        assert_eq!(osc52_sequence("fn main() {}"), "\x1b]52;c;Zm4gbWFpbigpIHt9\x1b\\");
        assert_eq!(osc52_sequence("日本"), "\x1b]52;c;5pel5pys\x1b\\");
    }
}
