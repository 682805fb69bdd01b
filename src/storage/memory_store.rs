//! In-memory [`PageStore`] with an observable I/O log.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::page_store::{AllocationMap, PageStore};

/// One call made against a [`MemoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoEvent {
    Allocate { first: PageId, run_length: u32 },
    Deallocate { first: PageId, run_length: u32 },
    Read(PageId),
    Write(PageId),
}

/// Shared, append-only record of the I/O a store has performed.
///
/// Cloning yields another handle onto the same log, so a test can keep one
/// after moving the store into a buffer manager.
#[derive(Debug, Clone, Default)]
pub struct IoLog {
    events: Arc<Mutex<Vec<IoEvent>>>,
}

impl IoLog {
    fn push(&self, event: IoEvent) {
        self.events.lock().push(event);
    }

    /// Copy of every event so far, oldest first.
    pub fn events(&self) -> Vec<IoEvent> {
        self.events.lock().clone()
    }

    pub fn writes(&self) -> usize {
        self.count(|e| matches!(e, IoEvent::Write(_)))
    }

    pub fn reads(&self) -> usize {
        self.count(|e| matches!(e, IoEvent::Read(_)))
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn count(&self, pred: impl Fn(&IoEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }
}

/// A page store held entirely in memory.
///
/// Uses the same first-fit run allocation as [`DiskManager`](crate::DiskManager).
/// Every successful call is appended to its [`IoLog`].
///
/// # Example
/// ```
/// use clockpool::storage::{IoEvent, MemoryStore, PageStore};
/// use clockpool::{Page, PageId};
///
/// let mut store = MemoryStore::new();
/// let log = store.io_log();
///
/// let pid = store.allocate(1).unwrap();
/// store.write_page(pid, &Page::from_prefix(b"hi")).unwrap();
///
/// assert_eq!(log.events().last(), Some(&IoEvent::Write(PageId::new(0))));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    pages: Vec<Option<Box<Page>>>,
    allocation: AllocationMap,
    log: IoLog,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses to grow beyond `max_pages` pages.
    pub fn with_page_limit(max_pages: u64) -> Self {
        Self {
            allocation: AllocationMap::with_limit(max_pages),
            ..Self::default()
        }
    }

    /// Handle onto this store's I/O log.
    pub fn io_log(&self) -> IoLog {
        self.log.clone()
    }

    fn page_mut(&mut self, page_id: PageId) -> Result<&mut Page> {
        self.pages
            .get_mut(page_id.as_u32() as usize)
            .and_then(|slot| slot.as_deref_mut())
            .ok_or(Error::PageNotFound(page_id))
    }
}

impl PageStore for MemoryStore {
    fn allocate(&mut self, run_length: u32) -> Result<PageId> {
        let first = self.allocation.allocate(run_length)?;
        let len = self.allocation.len() as usize;
        if self.pages.len() < len {
            self.pages.resize_with(len, || None);
        }
        for n in 0..run_length {
            self.pages[first.offset(n).as_u32() as usize] = Some(Box::new(Page::new()));
        }
        self.log.push(IoEvent::Allocate { first, run_length });
        Ok(first)
    }

    fn deallocate(&mut self, first: PageId, run_length: u32) -> Result<()> {
        self.allocation.deallocate(first, run_length)?;
        for n in 0..run_length {
            self.pages[first.offset(n).as_u32() as usize] = None;
        }
        self.log.push(IoEvent::Deallocate { first, run_length });
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> Result<()> {
        dest.copy_from(self.page_mut(page_id)?);
        self.log.push(IoEvent::Read(page_id));
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, src: &Page) -> Result<()> {
        self.page_mut(page_id)?.copy_from(src);
        self.log.push(IoEvent::Write(page_id));
        Ok(())
    }
}
