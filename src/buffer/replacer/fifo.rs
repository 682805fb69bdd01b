//! FIFO (First-In-First-Out) replacement policy.

use std::collections::VecDeque;

use crate::buffer::{FrameDescriptor, FrameState};
use crate::common::FrameId;

use super::ReplacementPolicy;

/// Evicts pages in the order they were loaded.
///
/// Re-pinning a resident page does not move it in the queue. Empty frames
/// are always used before any resident page is evicted, and pinned frames
/// are skipped. There is no `Referenced` state: an unpinned frame goes
/// straight back to `Available`.
#[derive(Debug, Default, Clone)]
pub struct Fifo {
    /// Resident frames in load order (front = oldest).
    queue: VecDeque<FrameId>,
}

impl Fifo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident frames being tracked.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl ReplacementPolicy for Fifo {
    fn on_new(&mut self, desc: &mut FrameDescriptor) {
        if !self.queue.contains(&desc.index()) {
            self.queue.push_back(desc.index());
        }
    }

    fn on_free(&mut self, desc: &mut FrameDescriptor) {
        let index = desc.index();
        self.queue.retain(|&fid| fid != index);
        desc.set_state(FrameState::Available);
    }

    fn on_pin(&mut self, desc: &mut FrameDescriptor) {
        desc.set_state(FrameState::Pinned);
    }

    fn on_unpin(&mut self, desc: &mut FrameDescriptor) {
        if desc.pin_count() == 0 {
            desc.set_state(FrameState::Available);
        }
    }

    fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId> {
        if let Some(empty) = frames
            .iter()
            .find(|d| !d.is_resident() && d.pin_count() == 0)
        {
            return Some(empty.index());
        }

        let pos = self
            .queue
            .iter()
            .position(|fid| frames[fid.0].pin_count() == 0)?;
        self.queue.remove(pos)
    }

    fn name(&self) -> &'static str {
        "fifo"
    }
}
