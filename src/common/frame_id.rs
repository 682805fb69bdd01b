//! Frame identifier type.

use std::fmt;

/// Index of a frame (and its descriptor) in the buffer pool.
///
/// Frame ids are assigned once at pool construction and never change, so
/// they index straight into the frame and descriptor arrays:
/// `descriptors[frame_id.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub usize);

impl FrameId {
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
