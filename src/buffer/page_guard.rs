//! Access to pinned pages.
//!
//! - [`PageHandle`] - Borrowed view of a pinned frame; the caller unpins
//!   explicitly, through the handle or [`BufferManager::unpin_page`]
//! - [`PageReadGuard`] - Shared read access, unpins clean on drop
//! - [`PageWriteGuard`] - Exclusive write access, unpins dirty on drop
//!
//! A frame latch taken through any of these may be held across other
//! manager calls while the page stays pinned: the manager only waits on the
//! latch of a pinned frame without holding the pool lock. The exception is
//! flushing: `flush_page` and `flush_all` wait for the latch of every dirty
//! page they write, so a thread must not flush a dirty page it has latched.
//!
//! Latching through a handle after its pin is released is a bug and panics
//! once the frame has been reused.

use std::fmt;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use crate::common::{FrameId, PageId, Result};
use crate::storage::Page;

use super::buffer_manager::BufferManager;
use super::frame::Frame;

/// A pinned page, aliasing the frame that holds it.
///
/// Returned by [`BufferManager::pin_page`] and [`BufferManager::new_page`].
/// Reads and writes go straight to the pool's frame (no copy). The view is
/// only valid until the matching unpin, either [`PageHandle::unpin`] (which
/// consumes the handle) or [`BufferManager::unpin_page`]. After that the
/// frame may be reused for a different page.
pub struct PageHandle<'a> {
    bpm: &'a BufferManager,
    frame: &'a Frame,
    frame_id: FrameId,
    page_id: PageId,
}

impl<'a> PageHandle<'a> {
    pub(crate) fn new(bpm: &'a BufferManager, frame: &'a Frame, frame_id: FrameId, page_id: PageId) -> Self {
        Self {
            bpm,
            frame,
            frame_id,
            page_id,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Latch the frame for reading.
    ///
    /// # Panics
    /// Panics if the frame no longer holds this page, i.e. the handle
    /// outlived its pin and the frame was reused.
    pub fn read(&self) -> RwLockReadGuard<'a, Page> {
        let guard = self.frame.data.read();
        self.check_tag();
        guard
    }

    /// Latch the frame for writing.
    ///
    /// Writing does not mark the page dirty; unpin with `is_dirty = true`
    /// for that.
    ///
    /// # Panics
    /// As [`read`](Self::read).
    pub fn write(&self) -> RwLockWriteGuard<'a, Page> {
        let guard = self.frame.data.write();
        self.check_tag();
        guard
    }

    /// Release this handle's pin, marking the page dirty if `is_dirty`.
    pub fn unpin(self, is_dirty: bool) -> Result<()> {
        self.bpm.unpin_page(self.page_id, is_dirty)
    }

    fn check_tag(&self) {
        let held = self.frame.tag();
        assert!(
            held == self.page_id,
            "stale page handle: {} now holds {}, not {}",
            self.frame_id,
            held,
            self.page_id
        );
    }
}

impl fmt::Debug for PageHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHandle")
            .field("page_id", &self.page_id)
            .field("frame_id", &self.frame_id)
            .finish()
    }
}

/// Guard for read-only page access.
///
/// Multiple `PageReadGuard`s can exist for the same page simultaneously.
/// The page is unpinned (clean) when the guard is dropped.
///
/// # Example
/// ```
/// use clockpool::{BufferManager, Page};
/// use clockpool::storage::MemoryStore;
///
/// let bpm = BufferManager::new(4, MemoryStore::new());
/// let pid = bpm.new_page(&Page::from_prefix(b"abc"), 1).unwrap().page_id();
/// bpm.unpin_page(pid, true).unwrap();
///
/// let guard = bpm.fetch_page_read(pid).unwrap();
/// assert_eq!(&guard.as_slice()[..3], b"abc");
/// ```
pub struct PageReadGuard<'a> {
    bpm: &'a BufferManager,
    frame_id: FrameId,
    page_id: PageId,
    lock: ManuallyDrop<RwLockReadGuard<'a, Page>>,
}

impl<'a> PageReadGuard<'a> {
    pub(crate) fn new(
        bpm: &'a BufferManager,
        frame_id: FrameId,
        page_id: PageId,
        lock: RwLockReadGuard<'a, Page>,
    ) -> Self {
        Self {
            bpm,
            frame_id,
            page_id,
            lock: ManuallyDrop::new(lock),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: `lock` is never touched again after this point. The latch
        // must be released before unpinning, which takes the pool lock.
        unsafe { ManuallyDrop::drop(&mut self.lock) };
        release(self.bpm, self.page_id, false);
    }
}

/// Guard for exclusive write access to a page.
///
/// Only one `PageWriteGuard` can exist for a page at a time. The page is
/// unpinned and marked dirty when the guard is dropped.
pub struct PageWriteGuard<'a> {
    bpm: &'a BufferManager,
    frame_id: FrameId,
    page_id: PageId,
    lock: ManuallyDrop<RwLockWriteGuard<'a, Page>>,
}

impl<'a> PageWriteGuard<'a> {
    pub(crate) fn new(
        bpm: &'a BufferManager,
        frame_id: FrameId,
        page_id: PageId,
        lock: RwLockWriteGuard<'a, Page>,
    ) -> Self {
        Self {
            bpm,
            frame_id,
            page_id,
            lock: ManuallyDrop::new(lock),
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        &mut self.lock
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: as for `PageReadGuard`.
        unsafe { ManuallyDrop::drop(&mut self.lock) };
        release(self.bpm, self.page_id, true);
    }
}

fn release(bpm: &BufferManager, page_id: PageId, is_dirty: bool) {
    // Only fails if someone else unpinned this page behind the guard's back.
    if let Err(err) = bpm.unpin_page(page_id, is_dirty) {
        warn!(%page_id, error = %err, "page guard could not unpin");
    }
}
