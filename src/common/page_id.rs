//! Page identifier type.

use std::fmt;

/// Identifies a page on the backing page store.
///
/// An opaque `u32` handle. [`PageId::INVALID`] is reserved to mean
/// "no page": it is never looked up in the page table and never pinned.
///
/// # Example
/// ```
/// use clockpool::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.as_u32(), 42);
/// assert!(!PageId::INVALID.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Sentinel for "no page".
    pub const INVALID: PageId = PageId(u32::MAX);

    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Integer projection, usable as a file offset index or map key.
    #[inline]
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// The page `n` positions after this one within a contiguous run.
    ///
    /// Returns [`PageId::INVALID`] if the result would overflow into the
    /// sentinel.
    #[inline]
    pub fn offset(&self, n: u32) -> PageId {
        match self.0.checked_add(n) {
            Some(id) if id != u32::MAX => PageId(id),
            _ => Self::INVALID,
        }
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_invalid() {
        assert!(!PageId::INVALID.is_valid());
        assert_eq!(PageId::default(), PageId::INVALID);
        assert!(PageId::new(0).is_valid());
    }

    #[test]
    fn test_page_id_offset() {
        assert_eq!(PageId::new(10).offset(3), PageId::new(13));
        assert_eq!(PageId::new(u32::MAX - 1).offset(1), PageId::INVALID);
        assert_eq!(PageId::new(u32::MAX - 1).offset(5), PageId::INVALID);
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(42)), "Page(42)");
        assert_eq!(format!("{}", PageId::INVALID), "Page(INVALID)");
    }
}
