#![cfg(feature = "metrics")]

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};

/* ───────────── Raw latencies ────────────────────────── */

static TIMES: Lazy<Mutex<Vec<(&'static str, u128)>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Call at the end of a wrapper operation: `record("Buffer::create", t);`
pub fn record(name: &'static str, start: Instant) {
    let dur = start.elapsed().as_micros();
    TIMES.lock().unwrap().push((name, dur));
}

/* ───────────── Buffer allocations ───────────────────── */

/// Cumulative buffer creations routed through this layer.
pub static ALLOCS: AtomicUsize = AtomicUsize::new(0);
/// Cumulative bytes requested by those creations.
pub static ALLOC_BYTES: AtomicUsize = AtomicUsize::new(0);

/* ───────────── Summary output ───────────────────────── */

/// Call once at program end, e.g. in `main()`.
pub fn summary() {
    let mut map: HashMap<&str, Vec<u128>> = HashMap::new();
    {
        let mut times = TIMES.lock().unwrap();
        for (name, us) in times.drain(..) {
            map.entry(name).or_default().push(us);
        }
    }

    println!("── metrics summary ──");
    for (name, mut v) in map {
        v.sort_unstable();
        let mean = v.iter().sum::<u128>() / v.len() as u128;
        let p95 = v[((v.len() * 95) / 100).saturating_sub(1)];

        println!("{:<22} mean={:>5} µs   p95={:>5} µs", name, mean, p95);
    }

    let allocs = ALLOCS.load(Ordering::Relaxed);
    let bytes = ALLOC_BYTES.load(Ordering::Relaxed);
    println!("buffer creations: {}   ({} MiB)", allocs, bytes / 1024 / 1024);
}
