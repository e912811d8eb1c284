use crate::{
    domain::{ordering, Child, Entity},
    error::Result,
};
use std::collections::HashMap;

/// Flat, id-indexed collection of one entity type
///
/// Records are kept in a `Vec` with a side index from id to slot. The slot
/// order carries no meaning; ordered views are derived by sorting on
/// `order` every time they are requested.
#[derive(Debug, Clone)]
pub struct Collection<T: Entity> {
    items: Vec<T>,
    index: HashMap<T::Id, usize>,
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.index.get(&id).map(|&slot| &self.items[slot])
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        match self.index.get(&id) {
            Some(&slot) => Some(&mut self.items[slot]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    /// Upsert by id, merging into an existing record
    pub fn add(&mut self, entity: T) {
        match self.get_mut(entity.id()) {
            Some(existing) => existing.merge_from(entity),
            None => {
                self.index.insert(entity.id(), self.items.len());
                self.items.push(entity);
            }
        }
    }

    /// Replaces an existing record in place; returns false when the id is unknown
    pub fn update(&mut self, entity: T) -> bool {
        match self.get_mut(entity.id()) {
            Some(existing) => {
                *existing = entity;
                true
            }
            None => false,
        }
    }

    /// Removes a record by id
    pub fn delete(&mut self, id: T::Id) -> Option<T> {
        let slot = self.index.remove(&id)?;
        let removed = self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(moved.id(), slot);
        }
        Some(removed)
    }

    /// Drops every record and ingests `entities` with upsert semantics
    pub fn replace_all(&mut self, entities: impl IntoIterator<Item = T>) {
        self.items.clear();
        self.index.clear();
        for entity in entities {
            self.add(entity);
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Child> Collection<T> {
    /// Records under `parent`, ascending by `order` then id
    pub fn by_parent(&self, parent: T::ParentId) -> Vec<&T> {
        let mut view: Vec<&T> = self
            .items
            .iter()
            .filter(|item| item.parent_id() == parent)
            .collect();
        view.sort_by_key(|item| (item.order(), item.id()));
        view
    }

    /// Moves one record within its parent and renumbers the whole partition
    ///
    /// Local only: nothing is sent to the server.
    pub fn reorder(
        &mut self,
        parent: T::ParentId,
        removed_index: usize,
        added_index: usize,
    ) -> Result<()> {
        let view = self.partition_mut(parent);
        let mut view = ordering::apply_order(view, removed_index, added_index)?;
        ordering::restamp(&mut view);
        Ok(())
    }

    /// Puts `id` at `position` within its parent, located by identity
    ///
    /// `position` is clamped to the partition. When `id` is no longer under
    /// `parent` the partition is only renumbered. Returns whether `id` moved.
    pub fn resettle(&mut self, parent: T::ParentId, id: T::Id, position: usize) -> Result<bool> {
        let view = self.partition_mut(parent);
        let current = view.iter().position(|item| item.id() == id);

        let mut view = match current {
            Some(current) => {
                let target = position.min(view.len() - 1);
                ordering::apply_order(view, current, target)?
            }
            None => view,
        };
        ordering::restamp(&mut view);
        Ok(current.is_some())
    }

    fn partition_mut(&mut self, parent: T::ParentId) -> Vec<&mut T> {
        let mut view: Vec<&mut T> = self
            .items
            .iter_mut()
            .filter(|item| item.parent_id() == parent)
            .collect();
        view.sort_by_key(|item| (item.order(), item.id()));
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoardId, Stack, StackId};
    use crate::error::DeckError;

    fn stack(id: i64, board: i64, order: i64) -> Stack {
        Stack::new(StackId::new(id), BoardId::new(board), format!("S{}", id), order)
    }

    fn ids(view: &[&Stack]) -> Vec<i64> {
        view.iter().map(|s| s.id.get()).collect()
    }

    #[test]
    fn test_add_upserts_without_duplicates() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 0));
        stacks.add(stack(2, 1, 1));
        stacks.add(stack(1, 1, 0));
        stacks.add(stack(2, 1, 1));
        stacks.add(stack(1, 1, 5));

        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks.get(StackId::new(1)).unwrap().order, 5);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 0));
        let before = stacks.get(StackId::new(1)).cloned();
        stacks.add(stack(1, 1, 0));
        assert_eq!(stacks.get(StackId::new(1)).cloned(), before);
    }

    #[test]
    fn test_update_replaces_and_discards_stale_fields() {
        let mut stacks = Collection::new();
        let mut cached = stack(1, 1, 0);
        cached
            .extra
            .insert("stale".to_string(), serde_json::Value::from(true));
        stacks.add(cached);

        assert!(stacks.update(stack(1, 1, 0)));
        assert!(stacks.get(StackId::new(1)).unwrap().extra.is_empty());
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 0));
        assert!(!stacks.update(stack(9, 1, 0)));
        assert_eq!(stacks.len(), 1);
        assert!(!stacks.contains(StackId::new(9)));
    }

    #[test]
    fn test_delete_keeps_index_consistent() {
        let mut stacks = Collection::new();
        for id in 1..=4 {
            stacks.add(stack(id, 1, id - 1));
        }

        assert!(stacks.delete(StackId::new(2)).is_some());
        assert!(stacks.delete(StackId::new(2)).is_none());

        assert_eq!(stacks.len(), 3);
        for id in [1, 3, 4] {
            assert_eq!(stacks.get(StackId::new(id)).unwrap().id.get(), id);
        }
    }

    #[test]
    fn test_by_parent_filters_and_sorts() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 2));
        stacks.add(stack(2, 2, 0));
        stacks.add(stack(3, 1, 0));
        stacks.add(stack(4, 1, 1));

        assert_eq!(ids(&stacks.by_parent(BoardId::new(1))), vec![3, 4, 1]);
        assert_eq!(ids(&stacks.by_parent(BoardId::new(2))), vec![2]);
        assert!(stacks.by_parent(BoardId::new(3)).is_empty());
    }

    #[test]
    fn test_by_parent_reflects_latest_state() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 0));
        assert_eq!(stacks.by_parent(BoardId::new(1)).len(), 1);

        stacks.add(stack(2, 1, 1));
        assert_eq!(stacks.by_parent(BoardId::new(1)).len(), 2);

        stacks.delete(StackId::new(1));
        assert_eq!(ids(&stacks.by_parent(BoardId::new(1))), vec![2]);
    }

    #[test]
    fn test_reorder_restamps_partition() {
        let mut stacks = Collection::new();
        // Gapped orders from the server are renumbered on reorder
        stacks.add(stack(1, 1, 0));
        stacks.add(stack(2, 1, 10));
        stacks.add(stack(3, 1, 20));
        stacks.add(stack(9, 2, 0));

        stacks.reorder(BoardId::new(1), 2, 0).unwrap();

        let view = stacks.by_parent(BoardId::new(1));
        assert_eq!(ids(&view), vec![3, 1, 2]);
        let orders: Vec<i64> = view.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        assert_eq!(stacks.get(StackId::new(9)).unwrap().order, 0);
    }

    #[test]
    fn test_reorder_out_of_range_leaves_store_untouched() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 0));
        stacks.add(stack(2, 1, 1));

        let result = stacks.reorder(BoardId::new(1), 0, 2);
        assert!(matches!(result, Err(DeckError::InvalidReorder { .. })));
        assert_eq!(ids(&stacks.by_parent(BoardId::new(1))), vec![1, 2]);
    }

    #[test]
    fn test_equal_orders_fall_back_to_id() {
        let mut stacks = Collection::new();
        for id in 1..=4 {
            stacks.add(stack(id, 1, 0));
        }
        // swap_remove moves stack 4 into the freed slot
        stacks.delete(StackId::new(1));

        assert_eq!(ids(&stacks.by_parent(BoardId::new(1))), vec![2, 3, 4]);

        stacks.reorder(BoardId::new(1), 0, 2).unwrap();
        assert_eq!(ids(&stacks.by_parent(BoardId::new(1))), vec![3, 4, 2]);
    }

    #[test]
    fn test_resettle_clamps_and_renumbers() {
        let mut stacks = Collection::new();
        stacks.add(stack(3, 1, 0));
        stacks.add(stack(2, 1, 2));

        assert!(stacks.resettle(BoardId::new(1), StackId::new(3), 2).unwrap());

        let view = stacks.by_parent(BoardId::new(1));
        assert_eq!(ids(&view), vec![2, 3]);
        let orders: Vec<i64> = view.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_resettle_missing_record_only_renumbers() {
        let mut stacks = Collection::new();
        stacks.add(stack(2, 1, 4));
        stacks.add(stack(3, 1, 9));

        assert!(!stacks.resettle(BoardId::new(1), StackId::new(7), 0).unwrap());

        let orders: Vec<i64> = stacks
            .by_parent(BoardId::new(1))
            .iter()
            .map(|s| s.order)
            .collect();
        assert_eq!(orders, vec![0, 1]);
        assert!(!stacks.resettle(BoardId::new(5), StackId::new(7), 0).unwrap());
    }

    #[test]
    fn test_replace_all() {
        let mut stacks = Collection::new();
        stacks.add(stack(1, 1, 0));
        stacks.replace_all(vec![stack(5, 1, 0), stack(6, 1, 1), stack(5, 1, 2)]);

        assert_eq!(stacks.len(), 2);
        assert!(!stacks.contains(StackId::new(1)));
        assert_eq!(stacks.get(StackId::new(5)).unwrap().order, 2);
    }
}
