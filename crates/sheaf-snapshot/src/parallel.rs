//! Order-preserving parallel map.

use rayon::prelude::*;
use tracing::warn;

/// Map `items` with `f`, returning results in input order.
///
/// `threads` follows the config convention: 0 uses the global rayon pool,
/// 1 runs serially, anything else builds a dedicated pool.
pub(crate) fn map_ordered<T, R, F>(items: &[T], threads: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    match threads {
        0 => items.par_iter().map(f).collect(),
        1 => items.iter().map(f).collect(),
        n => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
            Ok(pool) => pool.install(|| items.par_iter().map(&f).collect()),
            Err(err) => {
                warn!("Falling back to serial reads: {err}");
                items.iter().map(f).collect()
            }
        },
    }
}
