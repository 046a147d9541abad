use core::mem::size_of;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use libc::c_int;
use log::{info, warn};
use spin::Once;

use crate::internal::align_up;
use crate::os;
use crate::types::*;

// --------------------------------------------------------
// Process-wide state: the CPU count and the heap table,
// which lives in the first superblocks of the arena itself.
// --------------------------------------------------------

static INIT: Once<c_int> = Once::new();
static HEAPS: AtomicPtr<Heap> = AtomicPtr::new(ptr::null_mut());
static NHEAPS: AtomicUsize = AtomicUsize::new(0);
static NCPUS: AtomicUsize = AtomicUsize::new(0);

// Set up the arena and the per-CPU heap table. Idempotent; every call
// after the first reports the first call's outcome.
pub fn heap_init() -> c_int {
    *INIT.call_once(init_once)
}

fn init_once() -> c_int {
    if os::arena_init() != 0 {
        return -1;
    }

    // Pad the break to the next 8 KiB boundary so every superblock
    // carved from here on is superblock-aligned and masking an
    // interior pointer lands on its header.
    let lo = os::arena_hi() as usize;
    let pad = lo.wrapping_neg() & SUPERBLOCK_MASK;
    if pad > 0 && os::arena_grow(pad).is_null() {
        return -1;
    }

    let ncpus = os::cpu_count();
    let nheaps = ncpus + 1; // index 0 is the global heap

    let bytes = align_up(nheaps * size_of::<Heap>(), SUPERBLOCK_SIZE);
    let base = os::arena_grow(bytes) as *mut Heap;
    if base.is_null() {
        warn!("cannot carve {} heap records from the arena", nheaps);
        return -1;
    }
    unsafe {
        let mut i = 0;
        while i < nheaps {
            ptr::write(base.add(i), Heap::new());
            i += 1;
        }
    }

    NCPUS.store(ncpus, Ordering::Release);
    NHEAPS.store(nheaps, Ordering::Release);
    HEAPS.store(base, Ordering::Release);
    info!(
        "heap table ready: {} cpus, {} heaps, arena at {:p}",
        ncpus,
        nheaps,
        os::arena_lo()
    );
    0
}

pub fn is_initialized() -> bool {
    !HEAPS.load(Ordering::Acquire).is_null()
}

pub fn ncpus() -> usize {
    NCPUS.load(Ordering::Acquire)
}

pub fn nheaps() -> usize {
    NHEAPS.load(Ordering::Acquire)
}

// Heap record by id. Id 0 is the global heap; the front-end only ever
// allocates from ids 1..=ncpus.
pub unsafe fn heap(id: u32) -> &'static Heap {
    let base = HEAPS.load(Ordering::Acquire);
    debug_assert!(!base.is_null());
    debug_assert!((id as usize) < nheaps());
    &*base.add(id as usize)
}
