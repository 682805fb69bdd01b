//! clockpool - a page-cache buffer manager with clock-sweep replacement.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            clients                              │
//! │          new_page / pin_page / unpin_page / free_page           │
//! │                   flush_page / flush_all                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │             Buffer Pool (buffer/)                        │   │
//! │  │   BufferManager + FrameDescriptor + PageTable + Stats    │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │  Replacement Policies: CLOCK | FIFO             │   │   │
//! │  │   │            (swappable at runtime)               │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │             Storage Layer (storage/)                     │   │
//! │  │    PageStore trait: DiskManager | MemoryStore + Page     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - Buffer manager and replacement policies
//! - [`storage`] - Page store implementations and the page type
//!
//! # Quick Start
//! ```no_run
//! use clockpool::{BufferManager, DiskManager, Page, PinMode};
//!
//! let dm = DiskManager::open_or_create("my_database.db").unwrap();
//! let bpm = BufferManager::new(64, dm);
//!
//! let pid = {
//!     let handle = bpm.new_page(&Page::from_prefix(b"hello"), 1).unwrap();
//!     handle.page_id()
//! };
//! bpm.unpin_page(pid, true).unwrap();
//! bpm.flush_all().unwrap();
//!
//! let handle = bpm.pin_page(pid, PinMode::Read).unwrap().unwrap();
//! assert_eq!(&handle.read().as_slice()[..5], b"hello");
//! bpm.unpin_page(pid, false).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result};

pub use buffer::{BufferManager, BufferPoolStats, PageHandle, PinMode, StatsSnapshot};
pub use storage::{DiskManager, MemoryStore, Page, PageStore};
