//! Control sequences for full-screen sessions and text output normalisation.

use std::borrow::Cow;

/// Switch to the alternate screen buffer, home the cursor, clear the
/// screen, and hide the cursor.
pub const ENTER_FULL_SCREEN: &[u8] = b"\x1b[?1049h\x1b[H\x1b[2J\x1b[?25l";

/// Show the cursor and return to the primary screen buffer.
pub const EXIT_FULL_SCREEN: &[u8] = b"\x1b[?25h\x1b[?1049l";

/// Convert bare `\n` into `\r\n`.
///
/// Remote terminal emulators in raw mode do not return the carriage on a
/// line feed. Sequences that already carry `\r\n` are left alone. Only for
/// text the gateway writes itself; PTY output is forwarded untouched.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let needs_fix = bytes
        .iter()
        .enumerate()
        .any(|(i, &b)| b == b'\n' && (i == 0 || bytes[i - 1] != b'\r'));
    if !needs_fix {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut prev = '\0';
    for ch in text.chars() {
        if ch == '\n' && prev != '\r' {
            out.push('\r');
        }
        out.push(ch);
        prev = ch;
    }
    Cow::Owned(out)
}

/// Tracks whether the remote display is currently in full-screen mode so
/// the preamble and its reversal are each emitted at most once.
#[derive(Debug, Default)]
pub struct ScreenMode {
    full_screen: bool,
}

impl ScreenMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    /// Bytes to send for entering full-screen mode, or `None` if already in it.
    pub fn enter(&mut self) -> Option<&'static [u8]> {
        if self.full_screen {
            return None;
        }
        self.full_screen = true;
        Some(ENTER_FULL_SCREEN)
    }

    /// Bytes to send for leaving full-screen mode, or `None` if not in it.
    pub fn exit(&mut self) -> Option<&'static [u8]> {
        if !self.full_screen {
            return None;
        }
        self.full_screen = false;
        Some(EXIT_FULL_SCREEN)
    }
}
