use std::collections::HashSet;
use std::hash::Hash;
use std::ops::Deref;

use crate::error::{Error, Result};

/// What to do when an accumulator sees an entry it already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnDuplicate {
    /// Keep the existing entry, drop the new one.
    #[default]
    Skip,
    /// Fail with [`Error::DuplicateEntry`].
    Error,
}

/// An ordered collection of distinct elements.
///
/// Insertion order is preserved and significant: it decides the order in
/// which flags, files and targets are serialized. Re-adding a present
/// element is a silent no-op. Membership is tracked in a `HashSet` shadow
/// so checks stay O(1).
#[derive(Debug, Clone)]
pub struct UniqueList<T> {
    items: Vec<T>,
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> UniqueList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Append `item` iff it is not already present; chains.
    pub fn add(&mut self, item: T) -> &mut Self {
        self.push(item);
        self
    }

    /// Append `item` iff it is not already present.
    pub fn push(&mut self, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    /// Insert `item` at `index` iff it is not already present. A present
    /// item is skipped entirely, never reordered.
    pub fn insert(&mut self, index: usize, item: T) {
        if self.seen.insert(item.clone()) {
            self.items.insert(index, item);
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|x| x == item)
    }

    pub fn contains(&self, item: &T) -> bool {
        self.seen.contains(item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl UniqueList<String> {
    /// Shared add path of every `add_*` accumulator method: prefix each
    /// entry, then append under the duplicate policy.
    pub fn add_entries<S: AsRef<str>>(
        &mut self,
        list_name: &'static str,
        prefix: &str,
        policy: OnDuplicate,
        entries: &[S],
    ) -> Result<()> {
        for entry in entries {
            let entry = format!("{prefix}{}", entry.as_ref());
            if self.contains(&entry) {
                match policy {
                    OnDuplicate::Skip => continue,
                    OnDuplicate::Error => {
                        return Err(Error::DuplicateEntry {
                            entry,
                            list: list_name,
                        });
                    }
                }
            }
            self.push(entry);
        }
        Ok(())
    }
}

impl<T: Eq + Hash + Clone> Default for UniqueList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for UniqueList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for UniqueList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for UniqueList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: Eq + Hash + Clone> From<Vec<T>> for UniqueList<T> {
    fn from(items: Vec<T>) -> Self {
        items.into_iter().collect()
    }
}

impl<T> IntoIterator for UniqueList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a UniqueList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Eq + Hash> PartialEq for UniqueList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq + Hash> Eq for UniqueList<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_iter_keeps_first_occurrence_order() {
        let ul: UniqueList<i32> = [1, 2, 3, 2, 4, 1, 5].into_iter().collect();
        assert_eq!(&ul[..], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn add_and_push_are_idempotent() {
        let mut ul: UniqueList<i32> = [1, 2, 3, 4, 5].into_iter().collect();
        ul.add(6);
        ul.add(3);
        assert_eq!(&ul[..], &[1, 2, 3, 4, 5, 6]);
        ul.push(7);
        ul.push(1);
        assert_eq!(&ul[..], &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(ul.len(), 7);
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut ul: UniqueList<i32> = [1, 2, 3].into_iter().collect();
        ul.extend([3, 4, 4, 5]);
        assert_eq!(&ul[..], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn insert_of_present_item_does_not_reorder() {
        let mut ul: UniqueList<i32> = [1, 2, 3].into_iter().collect();
        ul.insert(0, 3);
        assert_eq!(&ul[..], &[1, 2, 3]);
        ul.insert(1, 9);
        assert_eq!(&ul[..], &[1, 9, 2, 3]);
    }

    #[test]
    fn first_and_last_on_empty_collection() {
        let ul: UniqueList<i32> = UniqueList::new();
        assert_eq!(ul.first(), None);
        assert_eq!(ul.last(), None);

        let ul: UniqueList<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(ul.first(), Some(&1));
        assert_eq!(ul.last(), Some(&3));
    }

    #[test]
    fn positional_access_and_slicing() {
        let ul: UniqueList<i32> = [1, 2, 3, 4, 5, 6, 7].into_iter().collect();
        assert_eq!(ul.index_of(&3), Some(2));
        assert_eq!(ul.index_of(&42), None);
        assert!(ul.contains(&4));
        assert_eq!(&ul[..3], &[1, 2, 3]);
        assert_eq!(ul[1], 2);
    }

    #[test]
    fn add_entries_prefixes_and_honors_policy() {
        let mut ul: UniqueList<String> = UniqueList::new();
        ul.add_entries("include_dirs", "-I", OnDuplicate::Skip, &["/tmp", "/tmp"])
            .unwrap();
        assert_eq!(&ul[..], &["-I/tmp".to_string()]);

        let err = ul
            .add_entries("include_dirs", "-I", OnDuplicate::Error, &["/tmp"])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry { .. }));
        assert_eq!(ul.len(), 1);
    }
}
