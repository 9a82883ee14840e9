//! A strict one-to-one bidirectional map.
//!
//! The variant registry needs to answer both "which type does this header
//! name?" and "which header names this type?" without ever letting the two
//! directions drift apart. [`BiMap`] keeps two parallel hash maps and only
//! ever mutates them as a unit: an insert that would collide on *either*
//! side fails without touching either map.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Which side of an attempted association was already taken.
///
/// This is the registry-level conflict error: callers that need strict
/// uniqueness surface it, bulk-registration call sites may treat it as
/// "skip and move on".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Occupied {
    /// The left key already has an association.
    #[error("left key already has an association")]
    Left,
    /// The right key already has an association.
    #[error("right key already has an association")]
    Right,
}

/// Two parallel mappings (`L → R` and `R → L`) kept consistent as a unit.
#[derive(Debug, Clone)]
pub struct BiMap<L, R> {
    left_to_right: HashMap<L, R>,
    right_to_left: HashMap<R, L>,
}

impl<L, R> BiMap<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            left_to_right: HashMap::new(),
            right_to_left: HashMap::new(),
        }
    }

    /// Inserts an association, all-or-nothing.
    ///
    /// # Errors
    /// Returns [`Occupied`] naming the colliding side if either `left` or
    /// `right` already participates in an association. Neither direction is
    /// mutated on failure.
    pub fn try_insert(&mut self, left: L, right: R) -> Result<(), Occupied> {
        if self.left_to_right.contains_key(&left) {
            return Err(Occupied::Left);
        }
        if self.right_to_left.contains_key(&right) {
            return Err(Occupied::Right);
        }

        self.left_to_right.insert(left.clone(), right.clone());
        self.right_to_left.insert(right, left);
        Ok(())
    }

    /// Looks up the right value associated with `left`.
    pub fn get_by_left<Q>(&self, left: &Q) -> Option<&R>
    where
        L: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.left_to_right.get(left)
    }

    /// Looks up the left value associated with `right`.
    pub fn get_by_right<Q>(&self, right: &Q) -> Option<&L>
    where
        R: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.right_to_left.get(right)
    }

    /// Returns `true` if `left` participates in an association.
    pub fn contains_left<Q>(&self, left: &Q) -> bool
    where
        L: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.left_to_right.contains_key(left)
    }

    /// Returns `true` if `right` participates in an association.
    pub fn contains_right<Q>(&self, right: &Q) -> bool
    where
        R: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.right_to_left.contains_key(right)
    }

    /// Removes the association keyed by `left`, returning its right value.
    ///
    /// Both directions are removed together; a later insert may reuse either
    /// key.
    pub fn remove_by_left<Q>(&mut self, left: &Q) -> Option<R>
    where
        L: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let right = self.left_to_right.remove(left)?;
        self.right_to_left.remove(&right);
        Some(right)
    }

    /// Removes the association keyed by `right`, returning its left value.
    pub fn remove_by_right<Q>(&mut self, right: &Q) -> Option<L>
    where
        R: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        let left = self.right_to_left.remove(right)?;
        self.left_to_right.remove(&left);
        Some(left)
    }

    /// Number of associations.
    pub fn len(&self) -> usize {
        self.left_to_right.len()
    }

    /// Returns `true` if no associations exist.
    pub fn is_empty(&self) -> bool {
        self.left_to_right.is_empty()
    }
}

impl<L, R> Default for BiMap<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup_both_directions() {
        let mut map = BiMap::new();
        map.try_insert("ping".to_string(), 1u32).unwrap();

        assert_eq!(map.get_by_left("ping"), Some(&1));
        assert_eq!(map.get_by_right(&1), Some(&"ping".to_string()));
        assert!(map.contains_left("ping"));
        assert!(map.contains_right(&1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_duplicate_left_key_rejected() {
        let mut map = BiMap::new();
        map.try_insert("ping".to_string(), 1u32).unwrap();

        let err = map.try_insert("ping".to_string(), 2).unwrap_err();
        assert_eq!(err, Occupied::Left);
        // the original association is untouched
        assert_eq!(map.get_by_left("ping"), Some(&1));
        assert!(!map.contains_right(&2));
    }

    #[test]
    fn test_duplicate_right_key_rejected() {
        let mut map = BiMap::new();
        map.try_insert("ping".to_string(), 1u32).unwrap();

        let err = map.try_insert("pong".to_string(), 1).unwrap_err();
        assert_eq!(err, Occupied::Right);
        assert_eq!(map.get_by_right(&1), Some(&"ping".to_string()));
        assert!(!map.contains_left("pong"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_failed_insert_mutates_neither_side() {
        let mut map = BiMap::new();
        map.try_insert("a".to_string(), 1u32).unwrap();
        map.try_insert("b".to_string(), 2).unwrap();

        // collides on left against "a" and on right against 2
        assert!(map.try_insert("a".to_string(), 2).is_err());
        assert_eq!(map.len(), 2);
        assert_eq!(map.get_by_left("a"), Some(&1));
        assert_eq!(map.get_by_right(&2), Some(&"b".to_string()));
    }

    #[test]
    fn test_lookup_of_absent_key_is_none() {
        let map: BiMap<String, u32> = BiMap::new();
        assert_eq!(map.get_by_left("missing"), None);
        assert_eq!(map.get_by_right(&9), None);
    }

    #[test]
    fn test_remove_frees_both_keys_for_reuse() {
        let mut map = BiMap::new();
        map.try_insert("ping".to_string(), 1u32).unwrap();

        assert_eq!(map.remove_by_left("ping"), Some(1));
        assert!(map.is_empty());

        // both keys are insertable again, in any combination
        map.try_insert("ping".to_string(), 7).unwrap();
        map.try_insert("pong".to_string(), 1).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_remove_by_right() {
        let mut map = BiMap::new();
        map.try_insert("ping".to_string(), 1u32).unwrap();

        assert_eq!(map.remove_by_right(&1), Some("ping".to_string()));
        assert!(!map.contains_left("ping"));
        assert_eq!(map.remove_by_right(&1), None);
    }
}
