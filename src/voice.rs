//! Voice query capture.
//!
//! Transcription is a capability the host may or may not have, so the
//! GUI talks to it through a trait. Events stream over a channel: zero
//! or more `Partial` updates (live preview, each replacing the last)
//! followed by one `Final` segment appended to the query.

use crate::error::CaptureError;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// How long one capture runs before the provider stops on its own.
pub const CAPTURE_WINDOW: Duration = Duration::from_secs(5);

/// One transcription update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// In-progress hypothesis; replaces any previous partial.
    Partial(String),
    /// Committed text for this capture. Ends the stream.
    Final(String),
}

/// A speech-to-text capture source.
pub trait Transcriber {
    /// Whether capture can work at all on this host. The mic button is
    /// disabled when this returns false.
    fn available(&self) -> bool;

    /// Begin a capture window. Events arrive on the returned channel
    /// until the provider sends a `Final` or drops the sender.
    fn start(&mut self) -> Result<Receiver<TranscriptEvent>, CaptureError>;
}

/// Placeholder for hosts with no speech backend.
#[derive(Debug, Default)]
pub struct UnsupportedTranscriber;

impl Transcriber for UnsupportedTranscriber {
    fn available(&self) -> bool {
        false
    }

    fn start(&mut self) -> Result<Receiver<TranscriptEvent>, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

/// Fold a transcript event into the query text. A partial shows as a
/// live suffix after the committed text; a final commits the segment
/// with a joining space.
pub fn fold_event(committed: &mut String, partial: &mut String, event: TranscriptEvent) {
    match event {
        TranscriptEvent::Partial(text) => {
            *partial = text;
        }
        TranscriptEvent::Final(text) => {
            partial.clear();
            if !text.is_empty() {
                if !committed.is_empty() {
                    committed.push(' ');
                }
                committed.push_str(&text);
            }
        }
    }
}

/// The query text as displayed: committed text plus any live partial.
pub fn display_text(committed: &str, partial: &str) -> String {
    if partial.is_empty() {
        committed.to_owned()
    } else if committed.is_empty() {
        partial.to_owned()
    } else {
        format!("{} {}", committed, partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    /// Test provider that replays a fixed event sequence.
    struct ScriptedTranscriber {
        script: Vec<TranscriptEvent>,
    }

    impl Transcriber for ScriptedTranscriber {
        fn available(&self) -> bool {
            true
        }

        fn start(&mut self) -> Result<Receiver<TranscriptEvent>, CaptureError> {
            let (tx, rx) = mpsc::channel();
            for event in self.script.drain(..) {
                let _ = tx.send(event);
            }
            Ok(rx)
        }
    }

    #[test]
    fn test_unsupported_is_unavailable() {
        let mut t = UnsupportedTranscriber;
        assert!(!t.available());
        assert!(matches!(t.start(), Err(CaptureError::Unavailable)));
    }

    #[test]
    fn test_partials_replace_then_final_commits() {
        let mut t = ScriptedTranscriber {
            script: vec![
                TranscriptEvent::Partial("show".into()),
                TranscriptEvent::Partial("show the login".into()),
                TranscriptEvent::Final("show the login flow".into()),
            ],
        };
        let rx = t.start().unwrap();

        let mut committed = String::new();
        let mut partial = String::new();
        for event in rx.try_iter() {
            fold_event(&mut committed, &mut partial, event);
        }

        assert_eq!(committed, "show the login flow");
        assert!(partial.is_empty());
    }

    #[test]
    fn test_partial_displays_as_live_suffix() {
        let mut committed = String::from("show the");
        let mut partial = String::new();
        fold_event(&mut committed, &mut partial, TranscriptEvent::Partial("login".into()));
        assert_eq!(display_text(&committed, &partial), "show the login");
        // Committed text is untouched until the final arrives.
        assert_eq!(committed, "show the");
    }

    #[test]
    fn test_final_appends_with_space() {
        let mut committed = String::from("diagram of");
        let mut partial = String::from("auth");
        fold_event(&mut committed, &mut partial, TranscriptEvent::Final("auth module".into()));
        assert_eq!(committed, "diagram of auth module");
        assert_eq!(display_text(&committed, &partial), committed);
    }

    #[test]
    fn test_empty_final_is_ignored() {
        let mut committed = String::from("query");
        let mut partial = String::from("noise");
        fold_event(&mut committed, &mut partial, TranscriptEvent::Final(String::new()));
        assert_eq!(committed, "query");
        assert!(partial.is_empty());
    }
}
