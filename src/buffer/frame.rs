//! Frame descriptors - per-slot bookkeeping for the buffer pool.
//!
//! A [`FrameDescriptor`] records which page a frame holds and how it is
//! being used:
//! - Which page is resident (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Replacement state, owned by the [`ReplacementPolicy`](super::ReplacementPolicy)
//!
//! The page bytes themselves live in a [`Frame`], one per descriptor.

use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::common::{FrameId, PageId};
use crate::storage::Page;

/// Page bytes of one frame, behind the frame latch.
///
/// `tag` names the page the bytes belong to. It is only changed while the
/// latch is held for writing, so anyone holding the latch sees a stable tag.
pub(crate) struct Frame {
    pub(crate) data: RwLock<Page>,
    tag: AtomicU32,
}

impl Frame {
    pub(crate) fn new() -> Self {
        Self {
            data: RwLock::new(Page::new()),
            tag: AtomicU32::new(PageId::INVALID.as_u32()),
        }
    }

    /// Page currently held. Only meaningful with the latch held.
    #[inline]
    pub(crate) fn tag(&self) -> PageId {
        PageId::new(self.tag.load(Ordering::Relaxed))
    }

    /// Retag the frame. Caller holds the write latch.
    #[inline]
    pub(crate) fn set_tag(&self, page_id: PageId) {
        self.tag.store(page_id.as_u32(), Ordering::Relaxed);
    }
}

/// Replacement-policy bookkeeping for one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Unpinned and eligible to be chosen as a victim.
    #[default]
    Available,
    /// Unpinned but recently used; gets one reprieve from the clock hand.
    Referenced,
    /// At least one outstanding pin. Never a victim.
    Pinned,
}

/// Metadata for one frame in the buffer pool.
///
/// Descriptors are created once per frame when the pool is built and reused
/// for the life of the pool. The page bytes live beside them in the
/// manager's frame array; the descriptor only describes them.
///
/// Invariants maintained by the manager and its policy:
/// - `pin_count > 0` implies `state == Pinned`
/// - `pin_count == 0` implies `state` is `Available` or `Referenced`
/// - an empty frame (`page_id == INVALID`) is clean and unpinned
#[derive(Debug, Clone)]
pub struct FrameDescriptor {
    index: FrameId,
    page_id: PageId,
    pin_count: u32,
    dirty: bool,
    state: FrameState,
}

impl FrameDescriptor {
    /// Create the descriptor for an empty frame.
    pub fn new(index: FrameId) -> Self {
        Self {
            index,
            page_id: PageId::INVALID,
            pin_count: 0,
            dirty: false,
            state: FrameState::Available,
        }
    }

    #[inline]
    pub fn index(&self) -> FrameId {
        self.index
    }

    /// Resident page, or [`PageId::INVALID`] if the frame is empty.
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    #[inline]
    pub fn set_state(&mut self, state: FrameState) {
        self.state = state;
    }

    /// Check if a page is loaded in this frame.
    #[inline]
    pub fn is_resident(&self) -> bool {
        self.page_id.is_valid()
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    /// Bind the frame to a freshly loaded page, pinned once and clean.
    pub(crate) fn bind(&mut self, page_id: PageId) {
        self.page_id = page_id;
        self.pin_count = 1;
        self.dirty = false;
        self.state = FrameState::Pinned;
    }

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub(crate) fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.pin_count
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the pin count is already 0; the manager checks first.
    #[inline]
    pub(crate) fn unpin(&mut self) -> u32 {
        assert!(self.pin_count > 0, "pin count underflow");
        self.pin_count -= 1;
        self.pin_count
    }

    #[inline]
    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Return the frame to the empty state.
    pub(crate) fn reset(&mut self) {
        self.page_id = PageId::INVALID;
        self.pin_count = 0;
        self.dirty = false;
        self.state = FrameState::Available;
    }
}
