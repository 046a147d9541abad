use core::ptr;

use spin::Mutex;

// ------------------------------------------------------
// Main tuning parameters
// ------------------------------------------------------

// Superblocks are two OS pages. The size must stay a power of two:
// header recovery on free masks interior pointers down to it.
pub const SUPERBLOCK_SHIFT: usize = 13; // 8 KiB
pub const SUPERBLOCK_SIZE: usize = 1 << SUPERBLOCK_SHIFT;
pub const SUPERBLOCK_MASK: usize = SUPERBLOCK_SIZE - 1;

// Block sizes served from size-classed superblocks. Anything larger
// goes to the large path as a run of whole superblocks.
pub const NUM_SIZE_CLASSES: usize = 9;
pub const SIZE_CLASSES: [usize; NUM_SIZE_CLASSES] = [8, 16, 32, 64, 128, 256, 512, 1024, 2048];
pub const MAX_SMALL_SIZE: usize = 2048;

// Every returned pointer is aligned to this; larger alignments are
// not supported.
pub const MIN_ALIGN: usize = 8;

// A local heap keeps at most this many fully free superblocks; the
// surplus migrates to the global heap.
pub const MAX_LOCAL_FREE: usize = 2;

// Virtual reservation backing the arena. Never unmapped.
#[cfg(target_pointer_width = "64")]
pub const ARENA_RESERVE: usize = 1 << 32; // 4 GiB
#[cfg(target_pointer_width = "32")]
pub const ARENA_RESERVE: usize = 1 << 28; // 256 MiB

// `block_type` values past the size-class indices 0..8.
pub const BLOCK_FREE: u32 = NUM_SIZE_CLASSES as u32;
pub const BLOCK_LARGE: u32 = BLOCK_FREE + 1;

// ------------------------------------------------------
// In-band structures
// ------------------------------------------------------

// Free block inside a superblock. The link lives in the first word of
// the (unused) block itself, so no class may be narrower than a
// pointer; the smallest class of 8 guarantees that on 64-bit.
#[repr(C)]
pub struct Block {
    pub next: *mut Block,
}

// Header at the start of every superblock. For size-classed
// superblocks `count` is the number of free blocks and `flist` heads
// their intrusive list; for a large run `count` is the number of
// consecutive superblocks; for a free superblock only `next` and
// `heap_id` are meaningful.
#[repr(C)]
pub struct PageRef {
    pub next: *mut PageRef,
    pub prev: *mut PageRef, // nulled while on the singly-linked free list
    pub flist: *mut Block,
    pub block_type: u32, // 0..8, BLOCK_FREE or BLOCK_LARGE
    pub count: u32,
    pub heap_id: u32,
}

// Offset of the first usable byte of a superblock.
pub const HEADER_SIZE: usize = core::mem::size_of::<PageRef>();

// ------------------------------------------------------
// Heap lists
// ------------------------------------------------------

// Doubly-linked list of superblocks, manipulated only at the head or
// by detaching a known member.
pub struct PageList {
    pub first: *mut PageRef,
}

// Singly-linked (via `next`) list of fully free superblocks, with its
// length tracked under the same lock.
pub struct FreeList {
    pub first: *mut PageRef,
    pub count: usize,
}

unsafe impl Send for PageList {}
unsafe impl Send for FreeList {}

// One heap per CPU plus the global heap at index 0. Every list has
// its own spinlock; no operation holds more than two at once. The
// alignment keeps concurrently pounded heaps on distinct cache-line
// groups.
#[repr(C, align(64))]
pub struct Heap {
    pub free_pages: Mutex<FreeList>,
    pub complete_pages: Mutex<PageList>,
    pub large_pages: Mutex<PageList>,
    pub sizebases: [Mutex<PageList>; NUM_SIZE_CLASSES],
}

const EMPTY_LIST: Mutex<PageList> = Mutex::new(PageList {
    first: ptr::null_mut(),
});

impl Heap {
    pub const fn new() -> Self {
        Heap {
            free_pages: Mutex::new(FreeList {
                first: ptr::null_mut(),
                count: 0,
            }),
            complete_pages: EMPTY_LIST,
            large_pages: EMPTY_LIST,
            sizebases: [EMPTY_LIST; NUM_SIZE_CLASSES],
        }
    }
}
