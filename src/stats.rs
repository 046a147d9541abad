use core::sync::atomic::{AtomicI64, Ordering};

// One counter with running totals plus current and peak levels.
pub struct StatCount {
    pub allocated: AtomicI64,
    pub freed: AtomicI64,
    pub peak: AtomicI64,
    pub current: AtomicI64,
}

impl StatCount {
    pub const fn new() -> Self {
        StatCount {
            allocated: AtomicI64::new(0),
            freed: AtomicI64::new(0),
            peak: AtomicI64::new(0),
            current: AtomicI64::new(0),
        }
    }
}

pub struct Stats {
    pub small: StatCount,       // live size-classed blocks
    pub large: StatCount,       // live large runs
    pub superblocks: StatCount, // superblocks carved from the arena
    pub migrations: StatCount,  // superblocks handed to the global heap
}

static STATS: Stats = Stats {
    small: StatCount::new(),
    large: StatCount::new(),
    superblocks: StatCount::new(),
    migrations: StatCount::new(),
};

pub fn stats() -> &'static Stats {
    &STATS
}

pub fn stat_increase(stat: &StatCount, amount: i64) {
    stat_update(stat, amount);
}

pub fn stat_decrease(stat: &StatCount, amount: i64) {
    stat_update(stat, -amount);
}

fn stat_update(stat: &StatCount, amount: i64) {
    if amount == 0 {
        return;
    }
    let current = stat.current.fetch_add(amount, Ordering::Relaxed) + amount;
    stat.peak.fetch_max(current, Ordering::Relaxed);
    if amount > 0 {
        stat.allocated.fetch_add(amount, Ordering::Relaxed);
    } else {
        stat.freed.fetch_add(-amount, Ordering::Relaxed);
    }
}
