use rayon::prelude::*;

/// Smallest chunk handed to a single task; keeps per-task overhead low on
/// short inputs.
const MIN_CHUNK: usize = 256;

fn chunk_len(total: usize) -> usize {
    let tasks = rayon::current_num_threads().max(1) * 4;
    total.div_ceil(tasks).max(MIN_CHUNK)
}

/// Fills every slot of a pre-sized output in parallel.
///
/// The slice is split into disjoint contiguous chunks, one per task, and `f`
/// receives the absolute slot index together with the slot to write. Returns
/// once every task has finished, so the call is a barrier between phases.
pub fn fill_slots<T, F>(slots: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    if slots.is_empty() {
        return;
    }
    let chunk = chunk_len(slots.len());
    slots
        .par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(c, part)| {
            let base = c * chunk;
            for (i, slot) in part.iter_mut().enumerate() {
                f(base + i, slot);
            }
        });
}

/// Builds a vector of `len` elements where element `i` is `f(i)`.
pub fn map_slots<T, F>(len: usize, f: F) -> Vec<T>
where
    T: Default + Clone + Send,
    F: Fn(usize) -> T + Sync,
{
    let mut out = vec![T::default(); len];
    fill_slots(&mut out, |i, slot| *slot = f(i));
    out
}
