//! Disk Manager - file-backed [`PageStore`].
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating and deallocating runs of pages
//! - Managing the database file

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::debug;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::page_store::{AllocationMap, PageStore};

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// Pages are laid out sequentially; page N lives at offset `N × PAGE_SIZE`:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// ```
///
/// # Allocation
/// The allocation map is kept in memory only. Reopening a file treats every
/// page in it as allocated; deallocated pages are reused first-fit within a
/// session.
///
/// # Thread Safety
/// `DiskManager` is single-threaded. The `BufferManager` serializes access
/// to it behind its pool lock.
pub struct DiskManager {
    file: File,
    allocation: AllocationMap,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            allocation: AllocationMap::new(),
        })
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as u32;
        debug!(page_count, "opened database file");

        Ok(Self {
            file,
            allocation: AllocationMap::fully_allocated(page_count),
        })
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of pages the file spans, allocated or not.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.allocation.len()
    }

    /// Whether `page_id` is currently allocated.
    #[inline]
    pub fn is_allocated(&self, page_id: PageId) -> bool {
        self.allocation.is_allocated(page_id)
    }

    /// Total size of the database file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count() as u64) * (PAGE_SIZE as u64)
    }

    fn seek_to(&mut self, page_id: PageId) -> Result<()> {
        if !self.allocation.is_allocated(page_id) {
            return Err(Error::PageNotFound(page_id));
        }
        let offset = (page_id.as_u32() as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl PageStore for DiskManager {
    fn allocate(&mut self, run_length: u32) -> Result<PageId> {
        let old_len = self.allocation.len();
        let first = self.allocation.allocate(run_length)?;

        // Zero the run so reads see a clean page, extending the file if the
        // run reached past the old end.
        let zeros = Page::new();
        for n in 0..run_length {
            let offset = (first.offset(n).as_u32() as u64) * (PAGE_SIZE as u64);
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.write_all(zeros.as_slice())?;
        }
        self.file.sync_data()?;

        debug!(%first, run_length, grew = self.allocation.len() - old_len, "allocated run");
        Ok(first)
    }

    fn deallocate(&mut self, first: PageId, run_length: u32) -> Result<()> {
        self.allocation.deallocate(first, run_length)?;
        debug!(%first, run_length, "deallocated run");
        Ok(())
    }

    fn read_page(&mut self, page_id: PageId, dest: &mut Page) -> Result<()> {
        self.seek_to(page_id)?;
        self.file.read_exact(dest.as_mut_slice())?;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, src: &Page) -> Result<()> {
        self.seek_to(page_id)?;
        self.file.write_all(src.as_slice())?;
        self.file.sync_data()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let dm = DiskManager::create(&path).unwrap();
        assert_eq!(dm.page_count(), 0);
        assert_eq!(dm.file_size(), 0);
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        DiskManager::create(&path).unwrap();
        assert!(DiskManager::create(&path).is_err());
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.db");

        assert!(DiskManager::open(&path).is_err());
    }

    #[test]
    fn test_allocate_run_and_read_zeroed() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();

        let first = dm.allocate(3).unwrap();
        assert_eq!(first, PageId::new(0));
        assert_eq!(dm.page_count(), 3);
        assert_eq!(dm.file_size(), 3 * PAGE_SIZE as u64);

        let mut page = Page::from_prefix(&[0xAA; 8]);
        dm.read_page(PageId::new(2), &mut page).unwrap();
        assert_eq!(page, Page::new());
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let page_id = dm.allocate(1).unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xAB;
        page.as_mut_slice()[4095] = 0xEF;
        dm.write_page(page_id, &page).unwrap();

        let mut read_back = Page::new();
        dm.read_page(page_id, &mut read_back).unwrap();
        assert_eq!(read_back, page);
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::create(&path).unwrap();
            let page_id = dm.allocate(1).unwrap();
            dm.write_page(page_id, &Page::from_prefix(&[0x42])).unwrap();
        }

        {
            let mut dm = DiskManager::open(&path).unwrap();
            assert_eq!(dm.page_count(), 1);

            let mut page = Page::new();
            dm.read_page(PageId::new(0), &mut page).unwrap();
            assert_eq!(page.as_slice()[0], 0x42);
        }
    }

    #[test]
    fn test_deallocated_page_is_unreadable_and_reused() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        dm.allocate(3).unwrap();
        dm.write_page(PageId::new(1), &Page::from_prefix(b"stale"))
            .unwrap();

        dm.deallocate(PageId::new(1), 1).unwrap();
        assert!(!dm.is_allocated(PageId::new(1)));

        let mut page = Page::new();
        assert!(matches!(
            dm.read_page(PageId::new(1), &mut page),
            Err(Error::PageNotFound(_))
        ));

        // Reallocation hands back the hole, zeroed.
        assert_eq!(dm.allocate(1).unwrap(), PageId::new(1));
        dm.read_page(PageId::new(1), &mut page).unwrap();
        assert_eq!(page, Page::new());
        assert_eq!(dm.page_count(), 3);
    }

    #[test]
    fn test_write_unallocated_page_fails() {
        let dir = tempdir().unwrap();
        let mut dm = DiskManager::create(dir.path().join("test.db")).unwrap();

        let result = dm.write_page(PageId::new(0), &Page::new());
        assert!(matches!(result, Err(Error::PageNotFound(_))));
    }

    #[test]
    fn test_open_or_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::open_or_create(&path).unwrap();
            assert_eq!(dm.page_count(), 0);
            dm.allocate(2).unwrap();
        }

        {
            let dm = DiskManager::open_or_create(&path).unwrap();
            assert_eq!(dm.page_count(), 2);
            assert!(dm.is_allocated(PageId::new(1)));
        }
    }
}
