//! Property tests: random pin/unpin sequences against a pin-count model.

use std::collections::HashSet;

use clockpool::buffer::FrameState;
use clockpool::storage::MemoryStore;
use clockpool::{BufferManager, Error, Page, PageId, PinMode};
use proptest::prelude::*;

const POOL_SIZE: usize = 3;
const NUM_PAGES: u8 = 6;

#[derive(Debug, Clone)]
enum Op {
    Pin(u8),
    Unpin(u8, bool),
    Flush(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..NUM_PAGES).prop_map(Op::Pin),
        4 => (0..NUM_PAGES, any::<bool>()).prop_map(|(p, d)| Op::Unpin(p, d)),
        1 => (0..NUM_PAGES).prop_map(Op::Flush),
    ]
}

fn setup() -> (BufferManager, Vec<PageId>) {
    let bpm = BufferManager::new(POOL_SIZE, MemoryStore::new());
    let pages = (0..NUM_PAGES)
        .map(|i| {
            let pid = bpm
                .new_page(&Page::from_prefix(&[i]), 1)
                .unwrap()
                .page_id();
            bpm.unpin_page(pid, true).unwrap();
            pid
        })
        .collect();
    (bpm, pages)
}

fn check_invariants(bpm: &BufferManager, pins: &[u32], pages: &[PageId]) -> Result<(), TestCaseError> {
    let pinned_pages = pins.iter().filter(|&&p| p > 0).count();
    prop_assert_eq!(bpm.unpinned_count(), POOL_SIZE - pinned_pages);
    prop_assert_eq!(bpm.buffer_count(), POOL_SIZE);

    let mut seen = HashSet::new();
    for desc in bpm.descriptors() {
        if desc.is_resident() {
            prop_assert!(seen.insert(desc.page_id()), "{} in two frames", desc.page_id());
        } else {
            prop_assert_eq!(desc.pin_count(), 0);
            prop_assert!(!desc.is_dirty());
        }
        if desc.pin_count() > 0 {
            prop_assert_eq!(desc.state(), FrameState::Pinned);
        } else {
            prop_assert_ne!(desc.state(), FrameState::Pinned);
        }
    }
    prop_assert_eq!(seen.len(), bpm.resident_count());

    for (i, &pid) in pages.iter().enumerate() {
        if pins[i] > 0 {
            prop_assert_eq!(bpm.pin_count(pid), Some(pins[i]));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_pin_unpin_matches_model(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let (bpm, pages) = setup();
        let mut pins = vec![0u32; NUM_PAGES as usize];

        for op in ops {
            match op {
                Op::Pin(i) => {
                    let pid = pages[i as usize];
                    let resident = bpm.pin_count(pid).is_some();
                    let pinned_pages = pins.iter().filter(|&&p| p > 0).count();

                    match bpm.pin_page(pid, PinMode::Read) {
                        Ok(Some(handle)) => {
                            prop_assert!(resident || pinned_pages < POOL_SIZE);
                            prop_assert_eq!(handle.read().as_slice()[0], i);
                            pins[i as usize] += 1;
                        }
                        Ok(None) => prop_assert!(false, "valid page id returned no handle"),
                        Err(Error::PoolExhausted { frames }) => {
                            prop_assert_eq!(frames, POOL_SIZE);
                            prop_assert!(!resident);
                            prop_assert_eq!(pinned_pages, POOL_SIZE);
                        }
                        Err(err) => prop_assert!(false, "unexpected error: {}", err),
                    }
                }
                Op::Unpin(i, dirty) => {
                    let pid = pages[i as usize];
                    let resident = bpm.pin_count(pid).is_some();

                    match bpm.unpin_page(pid, dirty) {
                        Ok(()) => {
                            prop_assert!(pins[i as usize] > 0);
                            pins[i as usize] -= 1;
                            if dirty {
                                prop_assert!(bpm.descriptor(pid).unwrap().is_dirty());
                            }
                        }
                        Err(Error::PageNotPinned(_)) => {
                            prop_assert_eq!(pins[i as usize], 0);
                            prop_assert!(resident);
                        }
                        Err(Error::PageNotResident(_)) => prop_assert!(!resident),
                        Err(err) => prop_assert!(false, "unexpected error: {}", err),
                    }
                }
                Op::Flush(i) => {
                    let pid = pages[i as usize];
                    bpm.flush_page(pid).unwrap();
                    if let Some(desc) = bpm.descriptor(pid) {
                        prop_assert!(!desc.is_dirty());
                    }
                }
            }

            check_invariants(&bpm, &pins, &pages)?;
        }

        // Everything written back survives a full flush and reload.
        for (i, &pid) in pages.iter().enumerate() {
            while pins[i] > 0 {
                bpm.unpin_page(pid, false).unwrap();
                pins[i] -= 1;
            }
        }
        bpm.flush_all().unwrap();
        for (i, &pid) in pages.iter().enumerate() {
            let guard = bpm.fetch_page_read(pid).unwrap();
            prop_assert_eq!(guard.as_slice()[0], i as u8);
        }
    }
}
