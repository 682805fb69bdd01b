//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache between clients and the page
//! store. It manages a fixed pool of frames, each holding at most one page.
//!
//! # Components
//! - [`BufferManager`] - The page cache
//! - [`FrameDescriptor`] - Per-frame metadata (page, pin count, dirty, state)
//! - [`PageTable`] - Resident page to frame lookup
//! - [`PageHandle`] - A pinned page, unpinned explicitly
//! - [`PageReadGuard`] / [`PageWriteGuard`] - RAII guards for page access
//! - [`BufferPoolStats`] - Counters
//! - [`replacer`] - Replacement policy implementations

mod buffer_manager;
mod frame;
mod page_guard;
mod page_table;
pub mod replacer;
mod stats;

pub use buffer_manager::{BufferManager, PinMode};
pub use frame::{FrameDescriptor, FrameState};
pub use page_guard::{PageHandle, PageReadGuard, PageWriteGuard};
pub use page_table::PageTable;
pub use replacer::ReplacementPolicy;
pub use stats::{BufferPoolStats, StatsSnapshot};
