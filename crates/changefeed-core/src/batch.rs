//! Slicing envelopes into transport-sized batches.

use std::num::NonZeroUsize;

/// Splits `items` into consecutive slices of at most `max_items`.
///
/// Every slice but the last holds exactly `max_items`; an empty input yields
/// no slices at all. The iterator is lazy and borrows `items`, so calling
/// `chunk` again restarts from the beginning.
pub fn chunk<T>(items: &[T], max_items: NonZeroUsize) -> impl Iterator<Item = &[T]> {
    items.chunks(max_items.get())
}
