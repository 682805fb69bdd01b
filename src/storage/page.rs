//! Page - the fixed-size unit of storage.
//!
//! A [`Page`] is a raw 4KB byte block. The buffer manager treats it as
//! opaque: frames hold one each, page stores read into and write out of
//! them, and install-from-memory pins copy one into a frame.

use crate::common::config::PAGE_SIZE;

/// A page of data (4KB, 4KB-aligned).
///
/// # Clone Implementation
/// `Page` does not implement `Clone`. Copying 4KB should be explicit,
/// so use [`Page::copy_from`] instead.
///
/// # Example
/// ```
/// use clockpool::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
///
/// let mut copy = Page::new();
/// copy.copy_from(&page);
/// assert_eq!(copy.as_slice()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Build a page whose leading bytes are `bytes`, zero-filled after.
    ///
    /// # Panics
    /// Panics if `bytes` is longer than [`PAGE_SIZE`].
    pub fn from_prefix(bytes: &[u8]) -> Self {
        assert!(bytes.len() <= PAGE_SIZE, "prefix longer than a page");
        let mut page = Self::new();
        page.data[..bytes.len()].copy_from_slice(bytes);
        page
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Overwrite this page with the contents of `other`.
    #[inline]
    pub fn copy_from(&mut self, other: &Page) {
        self.data.copy_from_slice(&other.data);
    }

    /// Zero out the entire page.
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    #[inline]
    pub const fn size() -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.data[..] == other.data[..]
    }
}

impl Eq for Page {}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 4KB of bytes is useless in a panic message; show the head only.
        f.debug_struct("Page")
            .field("head", &&self.data[..16])
            .finish_non_exhaustive()
    }
}
