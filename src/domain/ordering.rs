use crate::error::{DeckError, Result};

/// A record that occupies a position within its parent
pub trait Positioned {
    fn order(&self) -> i64;
    fn set_order(&mut self, order: i64);
}

impl<T: Positioned + ?Sized> Positioned for &mut T {
    fn order(&self) -> i64 {
        (**self).order()
    }

    fn set_order(&mut self, order: i64) {
        (**self).set_order(order);
    }
}

/// Moves one element of an ordered sequence to a new position
///
/// The element at `removed_index` is taken out and re-inserted at
/// `added_index`, which is measured against the sequence after removal.
/// The `order` fields of the elements are left untouched; call [`restamp`]
/// afterwards to renumber them.
///
/// # Examples
/// ```
/// use deck_core::domain::ordering::apply_order;
///
/// let moved = apply_order(vec!['a', 'b', 'c'], 2, 0).unwrap();
/// assert_eq!(moved, vec!['c', 'a', 'b']);
/// ```
pub fn apply_order<T>(
    mut sequence: Vec<T>,
    removed_index: usize,
    added_index: usize,
) -> Result<Vec<T>> {
    let len = sequence.len();
    if removed_index >= len || added_index >= len {
        return Err(DeckError::InvalidReorder {
            removed: removed_index,
            added: added_index,
            len,
        });
    }

    let moved = sequence.remove(removed_index);
    sequence.insert(added_index, moved);
    Ok(sequence)
}

/// Sets every element's `order` to its index
pub fn restamp<T: Positioned>(sequence: &mut [T]) {
    for (index, item) in sequence.iter_mut().enumerate() {
        item.set_order(index as i64);
    }
}

/// Sorts ascending by `order`, keeping the existing relative position of ties
pub fn sort_by_order<T: Positioned>(sequence: &mut [T]) {
    sequence.sort_by_key(|item| item.order());
}
