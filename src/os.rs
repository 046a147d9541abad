use core::ptr::null_mut;

use libc::{c_int, MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE};
use log::warn;
use spin::Mutex;

use crate::types::ARENA_RESERVE;

/* -----------------------------------------------------------
  Arena provider
  One contiguous reservation, grown by bumping a break pointer
  and never shrunk. Growing under a single spinlock keeps the
  region monotonic, which is what lets interior pointers be
  masked back to their superblock header.
----------------------------------------------------------- */

struct Arena {
    lo: *mut u8,
    hi: *mut u8,
    end: *mut u8,
}

unsafe impl Send for Arena {}

static ARENA: Mutex<Arena> = Mutex::new(Arena {
    lo: null_mut(),
    hi: null_mut(),
    end: null_mut(),
});

#[cfg(target_os = "linux")]
const MAP_FLAGS: c_int = MAP_PRIVATE | MAP_ANONYMOUS | libc::MAP_NORESERVE;
#[cfg(not(target_os = "linux"))]
const MAP_FLAGS: c_int = MAP_PRIVATE | MAP_ANONYMOUS;

// Reserve the backing region. Idempotent; returns -1 if the OS turned
// the reservation down.
pub fn arena_init() -> c_int {
    let mut arena = ARENA.lock();
    if !arena.lo.is_null() {
        return 0;
    }
    let p = unsafe { libc::mmap(null_mut(), ARENA_RESERVE, PROT_READ | PROT_WRITE, MAP_FLAGS, -1, 0) };
    if p == MAP_FAILED {
        warn!(
            "arena reservation failed: size {:#x}, errno: {}",
            ARENA_RESERVE,
            errno::errno()
        );
        return -1;
    }
    arena.lo = p as *mut u8;
    arena.hi = p as *mut u8;
    arena.end = (p as usize + ARENA_RESERVE) as *mut u8;
    0
}

// Extend the arena by exactly `size` bytes and return the start of the
// new region, or null once the reservation is exhausted.
pub fn arena_grow(size: usize) -> *mut u8 {
    let mut arena = ARENA.lock();
    if arena.lo.is_null() {
        return null_mut();
    }
    let remaining = arena.end as usize - arena.hi as usize;
    if size > remaining {
        warn!("arena exhausted: requested {:#x}, remaining {:#x}", size, remaining);
        return null_mut();
    }
    let p = arena.hi;
    arena.hi = (p as usize + size) as *mut u8;
    p
}

pub fn arena_lo() -> *mut u8 {
    ARENA.lock().lo
}

pub fn arena_hi() -> *mut u8 {
    ARENA.lock().hi
}

/* -----------------------------------------------------------
  CPU detection
----------------------------------------------------------- */

pub fn cpu_count() -> usize {
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n < 1 {
        1
    } else {
        n as usize
    }
}

// The CPU the calling thread is running on right now. The index does
// not have to be dense; callers reduce it modulo the CPU count.
#[cfg(target_os = "linux")]
pub fn current_cpu() -> usize {
    let cpu = unsafe { libc::sched_getcpu() };
    if cpu < 0 {
        0
    } else {
        cpu as usize
    }
}

#[cfg(not(target_os = "linux"))]
pub fn current_cpu() -> usize {
    0
}
