//! Buffer Manager - the page caching layer.
//!
//! The [`BufferManager`] provides:
//! - Page caching between a page store and memory
//! - Pin-based reference counting
//! - Dirty page write-back before frame reuse
//! - Pluggable replacement policies (clock by default)

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::frame::Frame;
use crate::buffer::replacer::{Clock, ReplacementPolicy};
use crate::buffer::{
    BufferPoolStats, FrameDescriptor, PageHandle, PageReadGuard, PageTable, PageWriteGuard,
};
use crate::common::config::BufferPoolConfig;
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::{Page, PageStore};

/// How a miss populates the frame in [`BufferManager::pin_page`].
#[derive(Debug, Clone, Copy)]
pub enum PinMode<'a> {
    /// Read the page from the page store.
    Read,
    /// Copy the page from a caller buffer without touching the store.
    ///
    /// Reserved for first-time installation of a page; refused with
    /// [`Error::DoublePin`] if the page is already resident.
    Install(&'a Page),
}

/// Everything guarded by the pool lock.
struct PoolState {
    descriptors: Vec<FrameDescriptor>,
    page_table: PageTable,
    policy: Box<dyn ReplacementPolicy>,
    store: Box<dyn PageStore>,
}

/// Manages a pool of buffer frames for caching pages.
///
/// # Architecture
/// ```text
/// ┌─────────────────────────────────────────────────────────────┐
/// │                       BufferManager                         │
/// │  ┌─────────────── state: Mutex<PoolState> ───────────────┐  │
/// │  │ page_table      descriptors          policy   store   │  │
/// │  │ PageId → Fid ─▶ [Desc0][Desc1]...    Clock    dyn     │  │
/// │  └───────────────────────────────────────────────────────┘  │
/// │  frames: Vec<Frame>          [Frame0] [Frame1] [Frame2] ... │
/// └─────────────────────────────────────────────────────────────┘
/// ```
///
/// # Thread Safety
/// - `state`: one coarse `Mutex` over descriptors, page table, policy
///   cursor and page store
/// - `frames`: a latch per frame, so pinned pages are read and written
///   without the pool lock
/// - `stats`: atomic counters
///
/// Eviction writes back and refills the victim while holding both the pool
/// lock and the victim's write latch; the victim is unpinned, so no page
/// guard can be holding that latch. Flushing works the other way round: it
/// pins each dirty frame under the pool lock, releases the lock, waits for
/// the frame latch, and only then takes the pool lock again to write. A
/// thread holding a frame latch can therefore make other manager calls.
///
/// # Usage
/// ```
/// use clockpool::{BufferManager, Page, PinMode};
/// use clockpool::storage::MemoryStore;
///
/// let bpm = BufferManager::new(3, MemoryStore::new());
///
/// // Allocate and install a new page; it comes back pinned once.
/// let handle = bpm.new_page(&Page::from_prefix(b"hello"), 1).unwrap();
/// let pid = handle.page_id();
/// handle.write().as_mut_slice()[0] = b'j';
/// bpm.unpin_page(pid, true).unwrap();
///
/// // Pin it again and read through the frame.
/// let handle = bpm.pin_page(pid, PinMode::Read).unwrap().unwrap();
/// assert_eq!(&handle.read().as_slice()[..5], b"jello");
/// bpm.unpin_page(pid, false).unwrap();
/// ```
pub struct BufferManager {
    /// Page bytes, one latch per frame.
    frames: Vec<Frame>,

    state: Mutex<PoolState>,

    stats: BufferPoolStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

impl BufferManager {
    /// Create a buffer manager using the clock policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, store: impl PageStore + 'static) -> Self {
        Self::with_policy(pool_size, store, Box::new(Clock::new(pool_size)))
    }

    /// Create a buffer manager from a [`BufferPoolConfig`].
    pub fn from_config(config: BufferPoolConfig, store: impl PageStore + 'static) -> Self {
        Self::with_policy(config.pool_size, store, config.policy.build(config.pool_size))
    }

    /// Create a buffer manager with an explicit replacement policy.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn with_policy(
        pool_size: usize,
        store: impl PageStore + 'static,
        policy: Box<dyn ReplacementPolicy>,
    ) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames = (0..pool_size).map(|_| Frame::new()).collect();
        let descriptors = (0..pool_size)
            .map(|i| FrameDescriptor::new(FrameId::new(i)))
            .collect();

        debug!(pool_size, policy = policy.name(), "buffer manager created");

        Self {
            frames,
            state: Mutex::new(PoolState {
                descriptors,
                page_table: PageTable::with_capacity(pool_size),
                policy,
                store: Box::new(store),
            }),
            stats: BufferPoolStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: Create and free pages
    // ========================================================================

    /// Allocate `run_length` contiguous pages and pin the first one, filled
    /// from `initial`.
    ///
    /// The returned handle is pinned once and carries the new page id. If
    /// the pin fails, the run is deallocated before the error is returned.
    ///
    /// # Errors
    /// - `Error::InvalidRunLength` if `run_length` is 0
    /// - `Error::OutOfSpace` if the store cannot hold the run
    /// - `Error::PoolExhausted` if every frame is pinned
    pub fn new_page(&self, initial: &Page, run_length: u32) -> Result<PageHandle<'_>> {
        let mut state = self.state.lock();
        let first = state.store.allocate(run_length)?;

        match self.pin_locked(&mut state, first, PinMode::Install(initial)) {
            Ok(frame_id) => {
                debug!(page_id = %first, run_length, "new page");
                Ok(self.handle(frame_id, first))
            }
            Err(err) => {
                warn!(page_id = %first, run_length, error = %err, "new page not pinned, releasing run");
                if let Err(release_err) = state.store.deallocate(first, run_length) {
                    warn!(page_id = %first, run_length, error = %release_err, "could not release run");
                }
                Err(err)
            }
        }
    }

    /// Deallocate a page, dropping it from the pool if it is resident.
    ///
    /// The page is released on the store whether or not it was resident.
    ///
    /// # Errors
    /// - `Error::InvalidPageId` for the sentinel id
    /// - `Error::PageBusy` if the page is resident and pinned
    /// - store errors (e.g. `Error::PageNotFound` if it was never allocated)
    pub fn free_page(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id));
        }

        let mut state = self.state.lock();
        let PoolState {
            descriptors,
            page_table,
            policy,
            store,
        } = &mut *state;

        if let Some(frame_id) = page_table.get(page_id) {
            let desc = &mut descriptors[frame_id.0];
            if desc.is_pinned() {
                return Err(Error::PageBusy {
                    page_id,
                    pin_count: desc.pin_count(),
                });
            }
            page_table.remove(page_id);
            desc.reset();
            policy.on_free(desc);
            debug!(%page_id, %frame_id, "freed resident page");
        }

        store.deallocate(page_id, 1)
    }

    // ========================================================================
    // Public API: Pin and unpin
    // ========================================================================

    /// Pin a page, loading it into a frame on a miss.
    ///
    /// Returns `Ok(None)` for [`PageId::INVALID`], which is a no-op.
    ///
    /// # Errors
    /// - `Error::DoublePin` for `PinMode::Install` on a resident page
    /// - `Error::PoolExhausted` if every frame is pinned
    /// - store errors from writing back the victim or reading the page
    pub fn pin_page(&self, page_id: PageId, mode: PinMode<'_>) -> Result<Option<PageHandle<'_>>> {
        if !page_id.is_valid() {
            return Ok(None);
        }

        let mut state = self.state.lock();
        let frame_id = self.pin_locked(&mut state, page_id, mode)?;
        Ok(Some(self.handle(frame_id, page_id)))
    }

    /// Release one pin on a page, marking it dirty if `is_dirty`.
    ///
    /// Dirtiness is sticky: a clean unpin never clears an earlier dirty one.
    /// [`PageId::INVALID`] is a no-op.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the page is not in the pool
    /// - `Error::PageNotPinned` if its pin count is already 0
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<()> {
        if !page_id.is_valid() {
            return Ok(());
        }

        let mut state = self.state.lock();
        let PoolState {
            descriptors,
            page_table,
            policy,
            ..
        } = &mut *state;

        let frame_id = page_table
            .get(page_id)
            .ok_or(Error::PageNotResident(page_id))?;
        let desc = &mut descriptors[frame_id.0];
        if !desc.is_pinned() {
            return Err(Error::PageNotPinned(page_id));
        }

        let pin_count = desc.unpin();
        if is_dirty {
            desc.mark_dirty();
        }
        policy.on_unpin(desc);

        trace!(%page_id, pin_count, dirty = desc.is_dirty(), "unpin");
        Ok(())
    }

    // ========================================================================
    // Public API: RAII access
    // ========================================================================

    /// Pin a page and latch it for reading. Unpinned clean on drop.
    ///
    /// # Errors
    /// As [`pin_page`](Self::pin_page), plus `Error::InvalidPageId` for the
    /// sentinel id.
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let frame_id = self.pin_for_guard(page_id)?;
        let lock = self.frames[frame_id.0].data.read();

        Ok(PageReadGuard::new(self, frame_id, page_id, lock))
    }

    /// Pin a page and latch it for writing. Unpinned dirty on drop.
    ///
    /// # Errors
    /// As [`fetch_page_read`](Self::fetch_page_read).
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        let frame_id = self.pin_for_guard(page_id)?;
        let lock = self.frames[frame_id.0].data.write();

        Ok(PageWriteGuard::new(self, frame_id, page_id, lock))
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Write a resident page back to the store if it is dirty.
    ///
    /// No-op if the page is not resident or is clean. [`PageId::INVALID`]
    /// is a no-op.
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Ok(());
        }

        let pinned = {
            let mut state = self.state.lock();
            let PoolState {
                descriptors,
                page_table,
                policy,
                ..
            } = &mut *state;

            match page_table.get(page_id) {
                Some(frame_id) => Self::pin_if_dirty(policy.as_mut(), &mut descriptors[frame_id.0]),
                None => None,
            }
        };

        match pinned {
            Some(frame_id) => self.flush_pinned(frame_id).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Write every dirty resident page back to the store.
    ///
    /// Every dirty page is attempted even if one write fails; the first
    /// error is returned and the failed pages stay dirty.
    pub fn flush_all(&self) -> Result<()> {
        let pinned: Vec<FrameId> = {
            let mut state = self.state.lock();
            let PoolState {
                descriptors,
                policy,
                ..
            } = &mut *state;

            descriptors
                .iter_mut()
                .filter_map(|desc| Self::pin_if_dirty(policy.as_mut(), desc))
                .collect()
        };

        let mut written = 0;
        let mut first_err = None;
        for frame_id in pinned {
            match self.flush_pinned(frame_id) {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(%frame_id, error = %err, "flush failed");
                    first_err.get_or_insert(err);
                }
            }
        }

        debug!(written, "flushed all dirty pages");
        first_err.map_or(Ok(()), Err)
    }

    // ========================================================================
    // Public API: Policy
    // ========================================================================

    /// Replace the replacement policy at runtime.
    ///
    /// The new policy is brought up to date by replaying every frame: each
    /// resident frame is reported new and then pinned or unpinned, each
    /// empty frame is reported freed.
    pub fn set_policy(&self, mut policy: Box<dyn ReplacementPolicy>) {
        let mut state = self.state.lock();

        for desc in state.descriptors.iter_mut() {
            if desc.is_resident() {
                policy.on_new(desc);
                if desc.is_pinned() {
                    policy.on_pin(desc);
                } else {
                    policy.on_unpin(desc);
                }
            } else {
                policy.on_free(desc);
            }
        }

        let old = std::mem::replace(&mut state.policy, policy);
        debug!(from = old.name(), to = state.policy.name(), "replacement policy swapped");
    }

    /// Name of the active replacement policy.
    pub fn policy_name(&self) -> &'static str {
        self.state.lock().policy.name()
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferPoolStats {
        &self.stats
    }

    /// Total number of frames in the pool.
    pub fn buffer_count(&self) -> usize {
        self.pool_size
    }

    /// Number of frames with a pin count of 0, counted now.
    pub fn unpinned_count(&self) -> usize {
        self.state
            .lock()
            .descriptors
            .iter()
            .filter(|d| !d.is_pinned())
            .count()
    }

    /// Number of pages currently resident.
    pub fn resident_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// Pin count of a resident page, or `None` if it is not resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        self.descriptor(page_id).map(|d| d.pin_count())
    }

    /// Dirty flag of a resident page, or `None` if it is not resident.
    pub fn is_dirty(&self, page_id: PageId) -> Option<bool> {
        self.descriptor(page_id).map(|d| d.is_dirty())
    }

    /// Copy of the descriptor of the frame holding `page_id`.
    pub fn descriptor(&self, page_id: PageId) -> Option<FrameDescriptor> {
        let state = self.state.lock();
        state
            .page_table
            .get(page_id)
            .map(|fid| state.descriptors[fid.0].clone())
    }

    /// Copy of every frame descriptor, in frame order.
    pub fn descriptors(&self) -> Vec<FrameDescriptor> {
        self.state.lock().descriptors.clone()
    }

    // ========================================================================
    // Internal: Core pin logic
    // ========================================================================

    fn handle(&self, frame_id: FrameId, page_id: PageId) -> PageHandle<'_> {
        PageHandle::new(self, &self.frames[frame_id.0], frame_id, page_id)
    }

    fn pin_for_guard(&self, page_id: PageId) -> Result<FrameId> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id));
        }
        let mut state = self.state.lock();
        self.pin_locked(&mut state, page_id, PinMode::Read)
    }

    /// Pin `page_id` with the pool lock held, returning its frame.
    fn pin_locked(&self, state: &mut PoolState, page_id: PageId, mode: PinMode<'_>) -> Result<FrameId> {
        let PoolState {
            descriptors,
            page_table,
            policy,
            store,
        } = state;

        // Hit: bump the pin count on the resident copy.
        if let Some(frame_id) = page_table.get(page_id) {
            if let PinMode::Install(_) = mode {
                return Err(Error::DoublePin(page_id));
            }
            let desc = &mut descriptors[frame_id.0];
            let pin_count = desc.pin();
            policy.on_pin(desc);

            BufferPoolStats::bump(&self.stats.hits);
            trace!(%page_id, %frame_id, pin_count, "pin hit");
            return Ok(frame_id);
        }

        // Miss: take a victim frame.
        BufferPoolStats::bump(&self.stats.misses);
        let frame_id = policy
            .pick_victim(descriptors)
            .ok_or(Error::PoolExhausted {
                frames: self.pool_size,
            })?;
        let desc = &mut descriptors[frame_id.0];
        debug_assert!(!desc.is_pinned(), "policy chose pinned {}", frame_id);

        let frame = &self.frames[frame_id.0];
        let mut data = frame.data.write();

        if desc.is_resident() {
            let victim = desc.page_id();
            if desc.is_dirty() {
                if let Err(err) = store.write_page(victim, &data) {
                    // Victim stays resident and dirty; hand it back to the policy.
                    policy.on_new(desc);
                    return Err(err);
                }
                BufferPoolStats::bump(&self.stats.pages_written);
                BufferPoolStats::bump(&self.stats.dirty_evictions);
            }
            page_table.remove(victim);
            desc.reset();
            frame.set_tag(PageId::INVALID);
            BufferPoolStats::bump(&self.stats.evictions);
            debug!(%victim, %frame_id, "evicted page");
        }

        match mode {
            PinMode::Install(src) => {
                data.copy_from(src);
                BufferPoolStats::bump(&self.stats.pages_installed);
            }
            PinMode::Read => {
                if let Err(err) = store.read_page(page_id, &mut data) {
                    // Frame stays empty.
                    policy.on_free(desc);
                    return Err(err);
                }
                BufferPoolStats::bump(&self.stats.pages_read);
            }
        }
        frame.set_tag(page_id);
        drop(data);

        desc.bind(page_id);
        page_table.insert(page_id, frame_id);
        policy.on_new(desc);
        policy.on_pin(desc);

        debug!(%page_id, %frame_id, "pin miss, page loaded");
        Ok(frame_id)
    }

    /// Pin a resident dirty frame so it stays put while it is flushed.
    fn pin_if_dirty(policy: &mut dyn ReplacementPolicy, desc: &mut FrameDescriptor) -> Option<FrameId> {
        if !desc.is_resident() || !desc.is_dirty() {
            return None;
        }
        desc.pin();
        policy.on_pin(desc);
        Some(desc.index())
    }

    /// Write back a frame pinned by [`pin_if_dirty`](Self::pin_if_dirty),
    /// then drop that pin. Returns whether a write happened.
    ///
    /// The frame latch is taken before the pool lock. A pinned frame is
    /// never an eviction victim, so nothing holding the pool lock waits on
    /// this latch.
    fn flush_pinned(&self, frame_id: FrameId) -> Result<bool> {
        let data = self.frames[frame_id.0].data.read();

        let mut state = self.state.lock();
        let PoolState {
            descriptors,
            policy,
            store,
            ..
        } = &mut *state;
        let desc = &mut descriptors[frame_id.0];
        let page_id = desc.page_id();

        // Another flush may have cleaned it while we waited for the latch.
        let result = if desc.is_dirty() {
            store.write_page(page_id, &data).map(|()| {
                desc.clear_dirty();
                BufferPoolStats::bump(&self.stats.pages_written);
                trace!(%page_id, "flushed page");
                true
            })
        } else {
            Ok(false)
        };
        drop(data);

        desc.unpin();
        policy.on_unpin(desc);
        result
    }
}
