//! Storage layer - the page store behind the buffer manager.
//!
//! - [`Page`] - The raw 4KB data container
//! - [`PageStore`] - Allocate / deallocate / read / write seam
//! - [`DiskManager`] - File-backed page store
//! - [`MemoryStore`] - In-memory page store with an I/O log

mod disk_manager;
mod memory_store;
mod page;
mod page_store;

pub use disk_manager::DiskManager;
pub use memory_store::{IoEvent, IoLog, MemoryStore};
pub use page::Page;
pub use page_store::PageStore;
