use std::f32::consts::TAU;

use afterglow_core::{PointerEvent, PointerSender};
use afterglow_platform::{InputSource, Result};
use glam::Vec2;
use tracing::info;

/// Replays a precomputed pointer path through an engine's inbox, the way a
/// real host thread would deliver mouse moves.
pub struct ScriptedInput {
    path: Vec<PointerEvent>,
    cursor: usize,
    sender: Option<PointerSender>,
    running: bool,
    dropped: usize,
}

impl ScriptedInput {
    pub fn new(path: Vec<PointerEvent>, sender: PointerSender) -> Self {
        Self {
            path,
            cursor: 0,
            sender: Some(sender),
            running: false,
            dropped: 0,
        }
    }

    /// A loop around the surface center, one move every `step_ms` until
    /// `until_ms`, then silence so the trail can fade out.
    pub fn orbit(width: f32, height: f32, until_ms: u64, step_ms: u64) -> Vec<PointerEvent> {
        let center = Vec2::new(width, height) * 0.5;
        let radius = center.min_element() * 0.6;
        let step_ms = step_ms.max(1);
        (0..=until_ms / step_ms)
            .map(|i| {
                let at_ms = i * step_ms;
                let turn = at_ms as f32 / 2_000.0 * TAU;
                let point = center + Vec2::new(turn.cos(), (turn * 2.0).sin() * 0.5) * radius;
                PointerEvent::pixel(point.x, point.y, at_ms)
            })
            .collect()
    }

    /// Sends every scripted move with `at_ms <= now_ms`. Returns how many
    /// were accepted by the inbox.
    pub fn pump(&mut self, now_ms: u64) -> usize {
        if !self.running {
            return 0;
        }
        let Some(sender) = self.sender.as_ref() else {
            return 0;
        };
        let mut sent = 0;
        while let Some(event) = self.path.get(self.cursor) {
            if event.at_ms > now_ms {
                break;
            }
            if sender.send(*event) {
                sent += 1;
            } else {
                self.dropped += 1;
            }
            self.cursor += 1;
        }
        sent
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.path.len()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl InputSource for ScriptedInput {
    fn start(&mut self) -> Result<()> {
        info!(moves = self.path.len(), "scripted input start");
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        info!(sent = self.cursor, dropped = self.dropped, "scripted input stop");
        self.running = false;
        self.sender = None;
        Ok(())
    }
}
