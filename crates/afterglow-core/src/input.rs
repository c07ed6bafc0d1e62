//! Pointer events and the inbox that carries them across threads.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use glam::Vec2;
use tracing::trace;

/// Moves buffered between two frames before further moves are dropped.
pub const INBOX_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerSpace {
    /// Surface pixels, origin at the top-left corner.
    Pixel,
    /// Already in `[0, 1]²` field space.
    Normalized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Vec2,
    pub space: PointerSpace,
    /// Host clock at which the move happened.
    pub at_ms: u64,
}

impl PointerEvent {
    pub fn pixel(x: f32, y: f32, at_ms: u64) -> Self {
        Self {
            position: Vec2::new(x, y),
            space: PointerSpace::Pixel,
            at_ms,
        }
    }

    pub fn normalized(u: f32, v: f32, at_ms: u64) -> Self {
        Self {
            position: Vec2::new(u, v),
            space: PointerSpace::Normalized,
            at_ms,
        }
    }
}

/// Cloneable handle for hosts that deliver moves off the frame thread.
/// Queued moves are applied in order at the start of the next frame.
#[derive(Debug, Clone)]
pub struct PointerSender {
    sender: Sender<PointerEvent>,
}

impl PointerSender {
    /// Returns `false` when the move was dropped: inbox full or engine gone.
    pub fn send(&self, event: PointerEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("pointer inbox full; move dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

pub(crate) struct PointerInbox {
    sender: Sender<PointerEvent>,
    receiver: Receiver<PointerEvent>,
}

impl PointerInbox {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(INBOX_CAPACITY);
        Self { sender, receiver }
    }

    pub(crate) fn sender(&self) -> PointerSender {
        PointerSender {
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn try_next(&self) -> Option<PointerEvent> {
        self.receiver.try_recv().ok()
    }

    pub(crate) fn pending(&self) -> usize {
        self.receiver.len()
    }
}
