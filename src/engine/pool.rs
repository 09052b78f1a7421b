// src/engine/pool.rs
//
// Global thread pool for the row-parallel filter passes.
//
// A single pool is shared by every session instead of building one per
// filter call. It is initialized lazily on first use; the thread count is
// taken from `configure_pool()` if it ran first, otherwise from
// `available_parallelism()`. Changes after initialization have NO effect.

use rayon::ThreadPool;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Minimum number of rayon threads to ensure at least some parallelism
const MIN_RAYON_THREADS: usize = 1;

static GLOBAL_THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();
static REQUESTED_THREADS: OnceLock<usize> = OnceLock::new();

/// Request a worker count for the global pool. Only the first request before
/// the pool is built is honoured.
pub fn configure_pool(threads: Option<usize>) {
    if let Some(n) = threads {
        if REQUESTED_THREADS.set(n.max(MIN_RAYON_THREADS)).is_err()
            || GLOBAL_THREAD_POOL.get().is_some()
        {
            debug!(target: "trent::pool", threads = n, "pool already configured; request ignored");
        }
    }
}

pub fn get_pool() -> &'static ThreadPool {
    GLOBAL_THREAD_POOL.get_or_init(|| {
        let num_threads = REQUESTED_THREADS.get().copied().unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(MIN_RAYON_THREADS)
        });

        match rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("trent-worker-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!(target: "trent::pool", error = %e, num_threads, "falling back to a single worker");
                // A one-thread pool only fails when the OS refuses to spawn at
                // all; there is nothing useful left to do in that case.
                rayon::ThreadPoolBuilder::new()
                    .num_threads(MIN_RAYON_THREADS)
                    .build()
                    .unwrap_or_else(|e| panic!("failed to create fallback thread pool: {e}"))
            }
        }
    })
}
