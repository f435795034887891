use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use blockfall::core::{GameEvent, GameSession, ModeConfig, ModeKey};
use blockfall::types::Intent;

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

/// Slide the active piece against one wall and drop it. Pieces stacked this way never
/// reach the middle columns, so no row can complete.
fn drop_at_wall(session: &mut GameSession, left: bool) {
    let step = if left { Intent::MoveLeft } else { Intent::MoveRight };
    while session.apply_intent(step) {}
    assert!(session.apply_intent(Intent::HardDrop));
}

#[test]
fn core_hot_paths_do_not_allocate() {
    let config = ModeConfig::select(ModeKey::default()).unwrap();
    let mut session = GameSession::new(config, 1).unwrap();
    let mut events: Vec<GameEvent> = Vec::with_capacity(16);

    // Warm-up: the intent queue grows once, and after seven drops the bag has
    // rolled over, so later bags reuse the exhausted one's buffer.
    for _ in 0..8 {
        session.push_intent(Intent::MoveLeft);
    }
    session.tick(16);
    for i in 0..7 {
        drop_at_wall(&mut session, i % 2 == 0);
        session.drain_events_into(&mut events);
        events.clear();
    }
    let spawned = session.pieces_spawned();

    let allocs = with_alloc_counting(|| {
        // 100 ticks at level 0 gravity is under two rows of fall, so nothing locks.
        for i in 0..100 {
            session.push_intent(if i % 2 == 0 {
                Intent::MoveRight
            } else {
                Intent::RotateCw
            });
            session.tick(16);
        }
    });
    assert_eq!(allocs, 0, "unexpected allocations in tick/move hot path");
    assert_eq!(session.pieces_spawned(), spawned);

    let allocs = with_alloc_counting(|| {
        // Lock, clear check, bag refill and respawn, crossing a bag boundary.
        for i in 0..6 {
            drop_at_wall(&mut session, i % 2 == 1);
            session.drain_events_into(&mut events);
            events.clear();
        }
    });
    assert_eq!(allocs, 0, "unexpected allocations in hard drop/lock/respawn path");
    assert_eq!(session.pieces_spawned(), spawned + 6);
    assert_eq!(session.lines(), 0);
    assert!(!session.is_over());
}
