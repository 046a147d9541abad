use core::ptr::null_mut;

use crate::internal::*;
use crate::types::*;

/* -----------------------------------------------------------
  Blocks within a superblock
  The free blocks of a size-classed superblock form an intrusive
  singly-linked list threaded through the blocks themselves; only
  the first word of a freed block is ever written.
----------------------------------------------------------- */

// Format a superblock for one size class: stamp the header and build
// the block free-list. Blocks link downward in address order, so the
// list head is the highest block and block 0 is the tail.
pub unsafe fn format(pr: *mut PageRef, class: usize, heap_id: u32) {
    let size = SIZE_CLASSES[class];
    let cap = block_capacity(class);
    let base = blocks_start(pr);
    let mut link: *mut Block = null_mut();
    let mut i = 0;
    while i < cap as usize {
        let b = base.add(i * size) as *mut Block;
        (*b).next = link;
        link = b;
        i += 1;
    }
    (*pr).next = null_mut();
    (*pr).prev = null_mut();
    (*pr).flist = link;
    (*pr).block_type = class as u32;
    (*pr).count = cap;
    (*pr).heap_id = heap_id;
}

pub unsafe fn pop_block(pr: *mut PageRef) -> *mut u8 {
    debug_assert!((*pr).count > 0);
    debug_assert!(!(*pr).flist.is_null());
    let b = (*pr).flist;
    (*pr).flist = (*b).next;
    (*pr).count -= 1;
    b as *mut u8
}

pub unsafe fn push_block(pr: *mut PageRef, p: *mut u8) {
    let b = p as *mut Block;
    (*b).next = (*pr).flist;
    (*pr).flist = b;
    (*pr).count += 1;
}

// Walk the block free-list; must agree with `count`.
pub unsafe fn flist_len(pr: *const PageRef) -> u32 {
    let mut n = 0;
    let mut b = (*pr).flist;
    while !b.is_null() {
        n += 1;
        b = (*b).next;
    }
    n
}

/* -----------------------------------------------------------
  Superblock lists
  Doubly-linked through the header, LIFO at the head. A member can
  be detached from anywhere, which the complete and large lists
  need.
----------------------------------------------------------- */

pub unsafe fn list_contains(list: &PageList, pr: *const PageRef) -> bool {
    let mut s = list.first;
    while !s.is_null() {
        if s as *const PageRef == pr {
            return true;
        }
        debug_assert!((*s).next.is_null() || (*(*s).next).prev == s);
        s = (*s).next;
    }
    false
}

pub unsafe fn list_push(list: &mut PageList, pr: *mut PageRef) {
    debug_assert!(!list_contains(list, pr));
    (*pr).prev = null_mut();
    (*pr).next = list.first;
    if !list.first.is_null() {
        (*list.first).prev = pr;
    }
    list.first = pr;
}

pub unsafe fn list_remove(list: &mut PageList, pr: *mut PageRef) {
    debug_assert!(list_contains(list, pr));
    if (*pr).prev.is_null() {
        list.first = (*pr).next;
    } else {
        (*(*pr).prev).next = (*pr).next;
    }
    if !(*pr).next.is_null() {
        (*(*pr).next).prev = (*pr).prev;
    }
    (*pr).next = null_mut();
    (*pr).prev = null_mut();
}

/* -----------------------------------------------------------
  Free superblock lists
  Singly-linked; `prev` stays null while a superblock is free.
----------------------------------------------------------- */

pub unsafe fn free_push(list: &mut FreeList, pr: *mut PageRef) {
    (*pr).prev = null_mut();
    (*pr).next = list.first;
    list.first = pr;
    list.count += 1;
}

pub unsafe fn free_pop(list: &mut FreeList) -> *mut PageRef {
    let pr = list.first;
    if !pr.is_null() {
        list.first = (*pr).next;
        (*pr).next = null_mut();
        list.count -= 1;
    }
    pr
}

// Splice a pre-linked chain of `n` free superblocks onto the head.
pub unsafe fn free_push_run(list: &mut FreeList, head: *mut PageRef, tail: *mut PageRef, n: usize) {
    (*tail).next = list.first;
    list.first = head;
    list.count += n;
}

/* -----------------------------------------------------------
  Large runs
----------------------------------------------------------- */

// Break a large run back into individual free superblocks: a header
// is written at every 8 KiB boundary inside the run and the headers
// are chained through `next`. Returns the chain head, its tail and
// the number of superblocks.
pub unsafe fn split_run(pr: *mut PageRef, heap_id: u32) -> (*mut PageRef, *mut PageRef, usize) {
    let npages = (*pr).count as usize;
    debug_assert!(npages >= 1);
    let mut i = 0;
    while i < npages {
        let h = (pr as usize + i * SUPERBLOCK_SIZE) as *mut PageRef;
        (*h).next = if i + 1 < npages {
            (pr as usize + (i + 1) * SUPERBLOCK_SIZE) as *mut PageRef
        } else {
            null_mut()
        };
        (*h).prev = null_mut();
        (*h).flist = null_mut();
        (*h).block_type = BLOCK_FREE;
        (*h).count = 0;
        (*h).heap_id = heap_id;
        i += 1;
    }
    let tail = (pr as usize + (npages - 1) * SUPERBLOCK_SIZE) as *mut PageRef;
    (pr, tail, npages)
}
