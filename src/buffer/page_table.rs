//! Page table - resident page lookup.

use std::collections::HashMap;

use crate::common::{FrameId, PageId};

/// Maps each resident page to the frame holding it.
///
/// A page appears at most once, so there is never more than one resident
/// copy of a page in the pool. [`PageId::INVALID`] is never a key.
#[derive(Debug, Default)]
pub struct PageTable {
    map: HashMap<PageId, FrameId>,
}

impl PageTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn get(&self, page_id: PageId) -> Option<FrameId> {
        self.map.get(&page_id).copied()
    }

    #[inline]
    pub fn contains(&self, page_id: PageId) -> bool {
        self.map.contains_key(&page_id)
    }

    /// Record that `page_id` now lives in `frame_id`.
    ///
    /// # Panics
    /// Panics on the sentinel id or if the page already has a frame; either
    /// means the caller broke the one-resident-copy rule.
    pub fn insert(&mut self, page_id: PageId, frame_id: FrameId) {
        assert!(page_id.is_valid(), "invalid page id in page table");
        let prev = self.map.insert(page_id, frame_id);
        assert!(
            prev.is_none(),
            "{} already resident in {:?}",
            page_id,
            prev
        );
    }

    /// Drop the entry for `page_id`, returning the frame it occupied.
    #[inline]
    pub fn remove(&mut self, page_id: PageId) -> Option<FrameId> {
        self.map.remove(&page_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PageId, FrameId)> + '_ {
        self.map.iter().map(|(&pid, &fid)| (pid, fid))
    }
}
