//! Replacement policies (replacers).
//!
//! A policy is told about every pin, unpin, free and newly loaded page, and
//! picks the victim frame when the pool needs room. It only ever reads and
//! writes [`FrameDescriptor`] state; the page table and page store belong to
//! the manager.
//!
//! Implementations:
//! - [`Clock`] - clock sweep with second chance (default)
//! - [`Fifo`] - evict in load order

mod clock;
mod fifo;

pub use clock::Clock;
pub use fifo::Fifo;

use crate::buffer::FrameDescriptor;
use crate::common::FrameId;

/// Victim-selection strategy for a buffer pool.
///
/// Policies are swappable at runtime through
/// [`BufferManager::set_policy`](crate::BufferManager::set_policy), so they
/// must not assume they have seen every event since the pool was created.
pub trait ReplacementPolicy: Send {
    /// A frame was just bound to a page loaded on a miss.
    fn on_new(&mut self, desc: &mut FrameDescriptor);

    /// A frame was emptied by an explicit free.
    fn on_free(&mut self, desc: &mut FrameDescriptor);

    /// A frame's pin count was incremented (or set to 1 on load).
    fn on_pin(&mut self, desc: &mut FrameDescriptor);

    /// A frame's pin count was decremented.
    fn on_unpin(&mut self, desc: &mut FrameDescriptor);

    /// Choose a frame to (re)use, or `None` if every frame is pinned.
    ///
    /// Must never return a frame whose pin count is non-zero.
    fn pick_victim(&mut self, frames: &mut [FrameDescriptor]) -> Option<FrameId>;

    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;
}
