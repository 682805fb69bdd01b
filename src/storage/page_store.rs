//! The page-store seam between the buffer manager and persistent space.

use crate::common::config::MAX_PAGES;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Backing store of fixed-size pages.
///
/// The buffer manager only ever talks to storage through this trait: it
/// allocates and releases runs of pages, and moves whole pages between a
/// frame and the store. Calls are synchronous and block for the duration
/// of the I/O.
pub trait PageStore: Send {
    /// Allocate `run_length` contiguous pages and return the first one.
    fn allocate(&mut self, run_length: u32) -> Result<PageId>;

    /// Release `run_length` contiguous pages starting at `first`.
    fn deallocate(&mut self, first: PageId, run_length: u32) -> Result<()>;

    /// Read the stored contents of `page_id` into `dest`.
    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> Result<()>;

    /// Write `src` as the stored contents of `page_id`.
    fn write_page(&mut self, page_id: PageId, src: &Page) -> Result<()>;
}

impl<S: PageStore + ?Sized> PageStore for Box<S> {
    fn allocate(&mut self, run_length: u32) -> Result<PageId> {
        (**self).allocate(run_length)
    }

    fn deallocate(&mut self, first: PageId, run_length: u32) -> Result<()> {
        (**self).deallocate(first, run_length)
    }

    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> Result<()> {
        (**self).read_page(page_id, dest)
    }

    fn write_page(&mut self, page_id: PageId, src: &Page) -> Result<()> {
        (**self).write_page(page_id, src)
    }
}

/// First-fit allocation map shared by the page store implementations.
///
/// One flag per page the store has ever handed out. A run is placed in the
/// first gap of deallocated pages long enough to hold it; otherwise it
/// extends the store, absorbing any free pages already at the tail.
#[derive(Debug, Clone)]
pub(crate) struct AllocationMap {
    allocated: Vec<bool>,
    limit: u64,
}

impl AllocationMap {
    pub(crate) fn new() -> Self {
        Self::with_limit(MAX_PAGES)
    }

    pub(crate) fn with_limit(limit: u64) -> Self {
        Self {
            allocated: Vec::new(),
            limit: limit.min(MAX_PAGES),
        }
    }

    /// Map for a store that already holds `page_count` live pages.
    pub(crate) fn fully_allocated(page_count: u32) -> Self {
        let mut map = Self::new();
        map.allocated = vec![true; page_count as usize];
        map
    }

    /// Number of pages the store spans, allocated or not.
    pub(crate) fn len(&self) -> u32 {
        self.allocated.len() as u32
    }

    pub(crate) fn is_allocated(&self, page_id: PageId) -> bool {
        self.allocated
            .get(page_id.as_u32() as usize)
            .copied()
            .unwrap_or(false)
    }

    /// Reserve a run. Returns the first page of the run.
    ///
    /// The store grows to `len()` afterwards; callers compare `len()` before
    /// and after to learn how many pages to materialize.
    pub(crate) fn allocate(&mut self, run_length: u32) -> Result<PageId> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }
        let run = run_length as usize;

        let mut gap_start = 0;
        let mut gap_len = 0;
        for (idx, &used) in self.allocated.iter().enumerate() {
            if used {
                gap_len = 0;
                gap_start = idx + 1;
                continue;
            }
            gap_len += 1;
            if gap_len == run {
                self.mark(gap_start, run, true);
                return Ok(PageId::new(gap_start as u32));
            }
        }

        // No interior gap fits: extend, reusing a free tail if there is one.
        let start = self.allocated.len() - gap_len;
        if (start + run) as u64 > self.limit {
            return Err(Error::OutOfSpace {
                requested: run_length,
            });
        }
        self.allocated.resize(start + run, false);
        self.mark(start, run, true);
        Ok(PageId::new(start as u32))
    }

    /// Release a run. Every page in it must currently be allocated.
    pub(crate) fn deallocate(&mut self, first: PageId, run_length: u32) -> Result<()> {
        if run_length == 0 {
            return Err(Error::InvalidRunLength(run_length));
        }
        for n in 0..run_length {
            let page_id = first.offset(n);
            if !self.is_allocated(page_id) {
                return Err(Error::PageNotFound(page_id));
            }
        }
        self.mark(first.as_u32() as usize, run_length as usize, false);
        Ok(())
    }

    fn mark(&mut self, start: usize, run: usize, value: bool) {
        self.allocated[start..start + run].fill(value);
    }
}

impl Default for AllocationMap {
    fn default() -> Self {
        Self::new()
    }
}
