use core::ptr::null_mut;

use crate::init::{heap, ncpus};
use crate::internal::*;
use crate::os;
use crate::stats::{stat_decrease, stat_increase, stats};
use crate::superblock::*;
use crate::types::*;

/* -----------------------------------------------------------
  Small allocation
----------------------------------------------------------- */

pub unsafe fn small_alloc(heap_id: u32, size: usize) -> *mut u8 {
    let class = size_class(size);
    let h = heap(heap_id);

    // Fast path: a partially used superblock of this class.
    {
        let mut bases = h.sizebases[class].lock();
        let pr = bases.first;
        if !pr.is_null() {
            let p = pop_block(pr);
            if (*pr).count == 0 {
                // That was the last free block; park the superblock on
                // the complete list until a block comes back.
                let mut complete = h.complete_pages.lock();
                list_remove(&mut bases, pr);
                list_push(&mut complete, pr);
            }
            stat_increase(&stats().small, 1);
            return p;
        }
    }

    // Refill: a free superblock from this heap, then from the global
    // heap, then fresh arena.
    let mut pr = {
        let mut fp = h.free_pages.lock();
        free_pop(&mut fp)
    };
    if pr.is_null() {
        let mut gfp = heap(0).free_pages.lock();
        pr = free_pop(&mut gfp);
    }
    if pr.is_null() {
        pr = os::arena_grow(SUPERBLOCK_SIZE) as *mut PageRef;
        if pr.is_null() {
            return null_mut();
        }
        stat_increase(&stats().superblocks, 1);
    }

    format(pr, class, heap_id);
    let p = pop_block(pr);
    {
        let mut bases = h.sizebases[class].lock();
        list_push(&mut bases, pr);
    }
    stat_increase(&stats().small, 1);
    p
}

/* -----------------------------------------------------------
  Small free
----------------------------------------------------------- */

pub unsafe fn small_free(pr: *mut PageRef, p: *mut u8) {
    let class = (*pr).block_type as usize;
    debug_assert!(class < NUM_SIZE_CLASSES);
    let heap_id = (*pr).heap_id;
    let h = heap(heap_id);
    let cap = block_capacity(class);

    // Which list the superblock sits on depends on `count`, which can
    // only be read once both list locks are held; taking them together
    // (class list first) keeps a concurrent allocator from moving the
    // superblock between the reads.
    let mut bases = h.sizebases[class].lock();
    let mut complete = h.complete_pages.lock();
    push_block(pr, p);
    stat_decrease(&stats().small, 1);

    if (*pr).count == cap {
        // Fully free. The superblock had free blocks before this one,
        // so it is on the class list, not the complete list; that lock
        // can go while the class list stays held through the detach.
        drop(complete);
        list_remove(&mut bases, pr);
        (*pr).block_type = BLOCK_FREE;
        drop(bases);
        move_to_free(heap_id, pr);
    } else if (*pr).count == 1 {
        // First block back: the superblock leaves the complete list.
        list_remove(&mut complete, pr);
        drop(complete);
        list_push(&mut bases, pr);
    }
    // Otherwise it stays put on the class list.
}

/* -----------------------------------------------------------
  Large allocation and free
  A run of whole superblocks with a single header up front. Runs
  always come straight from the arena and break back into single
  free superblocks on release.
----------------------------------------------------------- */

pub unsafe fn large_alloc(heap_id: u32, size: usize) -> *mut u8 {
    if size >= ARENA_RESERVE {
        return null_mut();
    }
    let npages = large_run_pages(size);
    let pr = os::arena_grow(npages * SUPERBLOCK_SIZE) as *mut PageRef;
    if pr.is_null() {
        return null_mut();
    }
    stat_increase(&stats().superblocks, npages as i64);

    (*pr).next = null_mut();
    (*pr).prev = null_mut();
    (*pr).flist = null_mut();
    (*pr).block_type = BLOCK_LARGE;
    (*pr).count = npages as u32;
    (*pr).heap_id = heap_id;

    let h = heap(heap_id);
    {
        let mut large = h.large_pages.lock();
        list_push(&mut large, pr);
    }
    stat_increase(&stats().large, 1);
    blocks_start(pr)
}

pub unsafe fn large_free(pr: *mut PageRef) {
    let heap_id = (*pr).heap_id;
    let h = heap(heap_id);
    {
        let mut large = h.large_pages.lock();
        list_remove(&mut large, pr);
    }
    let (head, tail, npages) = split_run(pr, heap_id);
    {
        let mut fp = h.free_pages.lock();
        free_push_run(&mut fp, head, tail, npages);
    }
    stat_decrease(&stats().large, 1);
    migrate(heap_id);
}

/* -----------------------------------------------------------
  Free superblock migration
----------------------------------------------------------- */

// Put a fully free superblock on its heap's free list, then shed any
// surplus to the global heap.
pub unsafe fn move_to_free(heap_id: u32, pr: *mut PageRef) {
    let h = heap(heap_id);
    {
        let mut fp = h.free_pages.lock();
        free_push(&mut fp, pr);
    }
    migrate(heap_id);
}

// Hand one superblock to the global heap when the local free list has
// slack past MAX_LOCAL_FREE. Pointless on a single-CPU system, where
// every thread already shares one heap. The local lock is released
// before the global lock is taken; when both orderings ever overlap,
// local comes first.
pub unsafe fn migrate(heap_id: u32) {
    if ncpus() == 1 || heap_id == 0 {
        return;
    }
    let h = heap(heap_id);
    let pr = {
        let mut fp = h.free_pages.lock();
        if fp.count > MAX_LOCAL_FREE {
            free_pop(&mut fp)
        } else {
            null_mut()
        }
    };
    if pr.is_null() {
        return;
    }
    let g = heap(0);
    {
        let mut gfp = g.free_pages.lock();
        (*pr).heap_id = 0;
        free_push(&mut gfp, pr);
    }
    stat_increase(&stats().migrations, 1);
}
