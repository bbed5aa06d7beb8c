//! Transcription Capability
//!
//! The host platform's speech-to-text is modelled as a polymorphic source
//! with start/stop and an event stream: interim partials first, then the
//! final phrase. Platforms without support get the [`UnavailableTranscriber`],
//! which surfaces a notice instead of failing.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info};

use crate::session::SessionState;

/// Notice shown when the platform lacks speech recognition
pub const UNSUPPORTED_NOTICE: &str = "Speech recognition is not supported on this platform.";

/// Events emitted by a transcription source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Listening has begun
    Started,
    /// An interim hypothesis; may be revised
    Partial(String),
    /// A finalized phrase
    Final(String),
    /// Listening has ended
    Ended,
    /// A user-facing notice or failure
    Error(String),
}

/// A speech-to-text capability with start/stop and evented results
pub trait TranscriptionSource {
    /// Begin listening (continuous, interim results enabled)
    fn start(&mut self);
    /// Stop listening
    fn stop(&mut self);
    fn is_listening(&self) -> bool;
    /// The event stream for this source
    fn events(&self) -> Receiver<TranscriptEvent>;
}

/// Variant for platforms without speech support. Starting it produces a
/// notice event; it never listens.
pub struct UnavailableTranscriber {
    sender: Sender<TranscriptEvent>,
    receiver: Receiver<TranscriptEvent>,
}

impl UnavailableTranscriber {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }
}

impl Default for UnavailableTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionSource for UnavailableTranscriber {
    fn start(&mut self) {
        let _ = self
            .sender
            .send(TranscriptEvent::Error(UNSUPPORTED_NOTICE.to_string()));
    }

    fn stop(&mut self) {}

    fn is_listening(&self) -> bool {
        false
    }

    fn events(&self) -> Receiver<TranscriptEvent> {
        self.receiver.clone()
    }
}

/// Deterministic source replaying canned phrases, used by tests and demos.
///
/// Each phrase is delivered as growing word-prefix partials followed by the
/// final phrase, matching the interim-results behavior of the platform API.
pub struct ScriptedTranscriber {
    phrases: Vec<String>,
    listening: bool,
    sender: Sender<TranscriptEvent>,
    receiver: Receiver<TranscriptEvent>,
}

impl ScriptedTranscriber {
    pub fn new(phrases: Vec<String>) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            phrases,
            listening: false,
            sender,
            receiver,
        }
    }
}

impl TranscriptionSource for ScriptedTranscriber {
    fn start(&mut self) {
        if self.listening {
            return;
        }
        self.listening = true;
        let _ = self.sender.send(TranscriptEvent::Started);

        for phrase in &self.phrases {
            let words: Vec<&str> = phrase.split_whitespace().collect();
            let mut partial = String::new();
            for word in &words[..words.len().saturating_sub(1)] {
                if !partial.is_empty() {
                    partial.push(' ');
                }
                partial.push_str(word);
                let _ = self.sender.send(TranscriptEvent::Partial(partial.clone()));
            }
            let _ = self.sender.send(TranscriptEvent::Final(phrase.clone()));
        }
        debug!("Scripted transcriber replayed {} phrases", self.phrases.len());
    }

    fn stop(&mut self) {
        if self.listening {
            self.listening = false;
            let _ = self.sender.send(TranscriptEvent::Ended);
        }
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    fn events(&self) -> Receiver<TranscriptEvent> {
        self.receiver.clone()
    }
}

/// Spawn a thread that applies finalized phrases to the session as on-canvas
/// text. Partials and notices are logged only. The thread exits when the
/// source ends or disconnects.
pub fn spawn_session_pump(
    session: Arc<RwLock<SessionState>>,
    events: Receiver<TranscriptEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for event in events.iter() {
            match event {
                TranscriptEvent::Final(text) => {
                    debug!("Transcript finalized: {}", text);
                    session.write().apply_transcript(&text);
                }
                TranscriptEvent::Partial(text) => debug!("Transcript partial: {}", text),
                TranscriptEvent::Error(notice) => info!("Transcription notice: {}", notice),
                TranscriptEvent::Started => {}
                TranscriptEvent::Ended => break,
            }
        }
    })
}
