use anyhow::Result;

#[cfg(feature = "mt")]
use rayon::prelude::*;

/// Applies `f` to every position index, in parallel with the `mt` feature.
///
/// Results keep position order. `threads == 0` lets the pool pick its size.
pub fn map_positions<T, F>(n: usize, threads: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    #[cfg(feature = "mt")]
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build thread pool: {}", e))?;
        pool.install(|| (0..n).into_par_iter().map(&f).collect())
    }

    #[cfg(not(feature = "mt"))]
    {
        let _ = threads;
        (0..n).map(f).collect()
    }
}
