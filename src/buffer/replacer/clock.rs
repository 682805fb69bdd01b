//! CLOCK (second chance) replacement policy.

use crate::buffer::{FrameDescriptor, FrameState};
use crate::common::FrameId;

use super::ReplacementPolicy;

/// Clock sweep over the frame array.
///
/// A single hand rotates over the frames and keeps its position between
/// calls. Unpinning a frame marks it `Referenced`; when the hand passes a
/// referenced frame it demotes it to `Available` instead of taking it, so a
/// recently used page survives one full sweep. Pinned frames are skipped.
///
/// ```text
///            head
///             ↓
///   [Pinned] [Referenced] [Available] [Referenced]
///                 │            │
///           demote, move on   victim
/// ```
///
/// The sweep is bounded to two revolutions: the first is enough to demote
/// every referenced frame, the second lands on one of them. Finding nothing
/// in that bound means every frame is pinned.
#[derive(Debug, Clone)]
pub struct Clock {
    /// Frame the hand visited last. Starts on the final frame so the first
    /// sweep begins at frame 0.
    head: usize,
}

impl Clock {
    /// Create a clock for a pool of `num_frames` frames.
    pub fn new(num_frames: usize) -> Self {
        Self {
            head: num_frames.saturating_sub(1),
        }
    }

    /// Index of the frame the hand last visited.
    pub fn head(&self) -> usize {
        self.head
    }
}

impl ReplacementPolicy for Clock {
    fn on_new(&mut self, _desc: &mut FrameDescriptor) {
        // The manager already bound the frame as pinned.
    }

    fn on_free(&mut self, desc: &mut FrameDescriptor) {
        desc.set_state(FrameState::Available);
    }

    fn on_pin(&mut self, desc: &mut FrameDescriptor) {
        desc.set_state(FrameState::Pinned);
    }

    fn on_unpin(&mut self, desc: &mut FrameDescriptor) {
        if desc.pin_count() == 0 {
            desc.set_state(FrameState::Referenced);
        }
    }

    fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId> {
        let num_frames = frames.len();
        if num_frames == 0 {
            return None;
        }

        for _ in 0..2 * num_frames {
            self.head = (self.head + 1) % num_frames;
            let desc = &mut frames[self.head];
            match desc.state() {
                FrameState::Available => return Some(desc.index()),
                FrameState::Referenced => desc.set_state(FrameState::Available),
                FrameState::Pinned => {}
            }
        }

        None
    }

    fn name(&self) -> &'static str {
        "clock"
    }
}
