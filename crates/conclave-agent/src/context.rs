use conclave_core::Message;

/// Ordered, append-only history of the messages an agent has exchanged.
///
/// Nothing is ever dropped from storage; callers bound what reaches the
/// backend with [`ConversationBuffer::windowed`].
#[derive(Debug, Clone, Default)]
pub struct ConversationBuffer {
    messages: Vec<Message>,
}

impl ConversationBuffer {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `message` at the end.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The last `k` messages in insertion order, or all of them if fewer exist.
    pub fn windowed(&self, k: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(k);
        &self.messages[start..]
    }

    /// Full history, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when nothing has been exchanged yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Rough token estimation (4 chars ≈ 1 token) over the last `k` messages.
    pub fn estimated_tokens(&self, k: usize) -> usize {
        self.windowed(k).iter().map(|m| m.content.len() / 4).sum()
    }
}
