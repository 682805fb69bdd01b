//! Error types for clockpool.

use thiserror::Error;

use crate::common::PageId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Every error the buffer manager and its page stores can report.
///
/// Most variants are caller-contract violations (pinning, unpinning or
/// freeing in the wrong state). They are returned to the caller of the
/// triggering operation and never retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Install-from-memory pin requested for a page that is already resident.
    ///
    /// That mode is reserved for first-time installation of a new page.
    #[error("{0} is already resident; install-from-memory pin refused")]
    DoublePin(PageId),

    /// Every frame is pinned, so no victim could be chosen on a miss.
    #[error("buffer pool exhausted: all {frames} frames are pinned")]
    PoolExhausted { frames: usize },

    /// Unpin requested for a page that is not in the page table.
    #[error("{0} is not resident in the buffer pool")]
    PageNotResident(PageId),

    /// Free requested for a page that still has outstanding pins.
    #[error("{page_id} is busy (pin count {pin_count})")]
    PageBusy { page_id: PageId, pin_count: u32 },

    /// Unpin requested for a resident page whose pin count is already zero.
    #[error("{0} is not pinned")]
    PageNotPinned(PageId),

    /// Page does not exist (or is deallocated) on the backing store.
    #[error("{0} not found on the page store")]
    PageNotFound(PageId),

    /// The sentinel page id was passed where a real page is required.
    #[error("invalid page id: {0}")]
    InvalidPageId(PageId),

    /// A page run must contain at least one page.
    #[error("invalid run length: {0}")]
    InvalidRunLength(u32),

    /// The page store cannot hold another run of the requested length.
    #[error("page store out of space (requested {requested} pages)")]
    OutOfSpace { requested: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PageNotFound(PageId::new(42));
        assert_eq!(format!("{}", err), "Page(42) not found on the page store");

        let err = Error::PoolExhausted { frames: 3 };
        assert_eq!(
            format!("{}", err),
            "buffer pool exhausted: all 3 frames are pinned"
        );

        let err = Error::PageBusy {
            page_id: PageId::new(7),
            pin_count: 2,
        };
        assert_eq!(format!("{}", err), "Page(7) is busy (pin count 2)");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_contract_errors_have_no_source() {
        let err = Error::PageNotPinned(PageId::new(1));
        assert!(std::error::Error::source(&err).is_none());
    }
}
