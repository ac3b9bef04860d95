//! System clipboard access.
//!
//! Writes are synchronous. Reads are requests: the host answers later with a
//! [`UiEvent::ClipboardPaste`](super::UiEvent::ClipboardPaste).

use log::trace;

use super::events::ClipboardContent;

pub trait Clipboard {
    fn write(&mut self, text: &str);
    /// Asks the host for the clipboard content. Returns false if the request was refused.
    fn request(&mut self) -> bool;
}

/// Process-local clipboard with a request flag the host polls.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: String,
    pending: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn set_contents(&mut self, text: &str) {
        self.contents = text.to_string();
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending
    }

    /// Clears the pending request and returns the content to deliver for it.
    pub fn take_request(&mut self) -> Option<ClipboardContent> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(ClipboardContent::text(&self.contents))
    }
}

impl Clipboard for MemoryClipboard {
    fn write(&mut self, text: &str) {
        trace!("clipboard: wrote {} bytes", text.len());
        self.contents = text.to_string();
    }

    fn request(&mut self) -> bool {
        self.pending = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_single_shot() {
        let mut clipboard = MemoryClipboard::new();
        clipboard.write("abc");
        assert!(clipboard.take_request().is_none());
        assert!(clipboard.request());
        assert_eq!(clipboard.take_request(), Some(ClipboardContent::text("abc")));
        assert!(clipboard.take_request().is_none());
    }
}
