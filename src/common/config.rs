//! Configuration for clockpool.
//!
//! Compile-time constants describing the page format, plus
//! [`BufferPoolConfig`] for sizing a pool and choosing its replacement policy.

use crate::buffer::replacer::{Clock, Fifo, ReplacementPolicy};

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, so a page maps onto one
/// aligned block for direct I/O.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of addressable pages.
///
/// `u32::MAX` is reserved for [`PageId::INVALID`](crate::PageId::INVALID).
pub const MAX_PAGES: u64 = u32::MAX as u64;

/// Pool size used by [`BufferPoolConfig::default`].
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Which replacement policy a pool starts with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Clock sweep with second chance.
    #[default]
    Clock,
    /// First-in first-out by load order.
    Fifo,
}

impl PolicyKind {
    /// Build a fresh policy instance for a pool of `pool_size` frames.
    pub fn build(self, pool_size: usize) -> Box<dyn ReplacementPolicy> {
        match self {
            PolicyKind::Clock => Box::new(Clock::new(pool_size)),
            PolicyKind::Fifo => Box::new(Fifo::new()),
        }
    }
}

/// Settings for constructing a [`BufferManager`](crate::BufferManager).
///
/// # Example
/// ```
/// use clockpool::common::config::{BufferPoolConfig, PolicyKind};
///
/// let config = BufferPoolConfig::default()
///     .with_pool_size(16)
///     .with_policy(PolicyKind::Fifo);
/// assert_eq!(config.pool_size, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPoolConfig {
    /// Number of frames in the pool. Must be greater than zero.
    pub pool_size: usize,
    /// Initial replacement policy.
    pub policy: PolicyKind,
}

impl BufferPoolConfig {
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            policy: PolicyKind::default(),
        }
    }
}
