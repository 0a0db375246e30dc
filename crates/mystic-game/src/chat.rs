//! Free-text answers to an offer
//!
//! Chat arrives on whatever thread the platform delivers it on. Senders
//! only push into a channel; the registry drains it on the tick thread
//! before touching any state.

use std::sync::mpsc;

use mystic_core::EntityId;

/// What a chat line means for a pending offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatResponse {
    Accept,
    Reject,
}

/// Classify a chat line. Affirmative tokens win over negative ones.
pub fn classify(message: &str) -> Option<ChatResponse> {
    let message = message.trim().to_lowercase();
    if message.contains("accept") || message.contains("yes") || message == "y" {
        Some(ChatResponse::Accept)
    } else if message.contains("reject") || message.contains("no") || message == "n" {
        Some(ChatResponse::Reject)
    } else {
        None
    }
}

/// A chat line from a target
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub target: EntityId,
    pub text: String,
}

/// Cloneable, `Send` handle for submitting chat from any thread
#[derive(Debug, Clone)]
pub struct ChatSender {
    sender: mpsc::Sender<ChatMessage>,
}

impl ChatSender {
    /// Queue a line for the tick thread. Returns `false` if the engine is gone.
    pub fn submit(&self, target: EntityId, text: impl Into<String>) -> bool {
        self.sender
            .send(ChatMessage {
                target,
                text: text.into(),
            })
            .is_ok()
    }
}

/// Receiving end, owned by the registry
pub struct ChatInbox {
    sender: mpsc::Sender<ChatMessage>,
    receiver: mpsc::Receiver<ChatMessage>,
}

impl ChatInbox {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> ChatSender {
        ChatSender {
            sender: self.sender.clone(),
        }
    }

    /// Everything queued so far, without blocking
    pub fn drain(&self) -> Vec<ChatMessage> {
        self.receiver.try_iter().collect()
    }
}

impl Default for ChatInbox {
    fn default() -> Self {
        Self::new()
    }
}
