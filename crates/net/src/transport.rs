use std::collections::VecDeque;
use std::io::Write;

use crate::wire::{Envelope, InboundMessage, NetError, PlayerState};

/// The real-time transport as seen by the session.
pub trait Transport {
    /// Send the local player's state. Called once per rendered frame.
    fn publish(&mut self, state: &PlayerState) -> Result<(), NetError>;

    /// Messages delivered since the last call, in delivery order.
    fn poll_inbound(&mut self) -> Vec<InboundMessage>;
}

/// In-process transport: records what was published and replays whatever
/// inbound messages were pushed into it.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    published: Vec<PlayerState>,
    inbound: VecDeque<InboundMessage>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message as if the server had delivered it.
    pub fn deliver(&mut self, message: InboundMessage) {
        self.inbound.push_back(message);
    }

    pub fn published(&self) -> &[PlayerState] {
        &self.published
    }

    pub fn last_published(&self) -> Option<&PlayerState> {
        self.published.last()
    }
}

impl Transport for MemoryTransport {
    fn publish(&mut self, state: &PlayerState) -> Result<(), NetError> {
        self.published.push(*state);
        Ok(())
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.inbound.drain(..).collect()
    }
}

/// Writes each published state as an `{"event":"player","data":...}` line.
/// Inbound messages can be seeded with [`JsonLinesTransport::deliver`].
pub struct JsonLinesTransport<W: Write> {
    out: W,
    inbound: VecDeque<InboundMessage>,
    lines_written: u64,
}

impl<W: Write> JsonLinesTransport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            inbound: VecDeque::new(),
            lines_written: 0,
        }
    }

    pub fn deliver(&mut self, message: InboundMessage) {
        self.inbound.push_back(message);
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Transport for JsonLinesTransport<W> {
    fn publish(&mut self, state: &PlayerState) -> Result<(), NetError> {
        let envelope = Envelope::player(state)?;
        serde_json::to_writer(&mut self.out, &envelope)?;
        self.out.write_all(b"\n")?;
        self.lines_written += 1;
        tracing::trace!(lines = self.lines_written, "published player state");
        Ok(())
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.inbound.drain(..).collect()
    }
}
