use crate::types::*;

#[inline]
pub fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

// Superblock header owning the pointer. Relies on every superblock
// starting at an 8 KiB boundary of the arena.
#[inline]
pub fn ptr_pageref(p: *const u8) -> *mut PageRef {
    (p as usize & !SUPERBLOCK_MASK) as *mut PageRef
}

// First usable byte of a superblock, just past the header.
#[inline]
pub fn blocks_start(pr: *const PageRef) -> *mut u8 {
    (pr as usize + HEADER_SIZE) as *mut u8
}

// Smallest class that fits `size`. The dispatcher keeps oversized
// requests on the large path; reaching here with one is a bug.
#[inline]
pub fn size_class(size: usize) -> usize {
    assert!(size <= MAX_SMALL_SIZE, "size {} has no size class", size);
    let mut class = 0;
    while SIZE_CLASSES[class] < size {
        class += 1;
    }
    class
}

// Number of blocks a superblock of the given class holds.
#[inline]
pub fn block_capacity(class: usize) -> u32 {
    ((SUPERBLOCK_SIZE - HEADER_SIZE) / SIZE_CLASSES[class]) as u32
}

// Superblocks needed to carry a header plus `size` user bytes.
#[inline]
pub fn large_run_pages(size: usize) -> usize {
    align_up(HEADER_SIZE + size, SUPERBLOCK_SIZE) / SUPERBLOCK_SIZE
}
