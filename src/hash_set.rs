use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::chain_table::ChainTable;
use crate::chain_table::DEFAULT_CAPACITY;
use crate::chain_table::Entry;
use crate::chain_table::Growth;

/// A hash set implemented using the separate-chaining `ChainTable` as the
/// underlying storage.
///
/// `HashSet<T, S>` stores values of type `T` where `T` implements `Hash + Eq`
/// and uses a configurable hasher builder `S` to hash values. Placement and
/// capacity follow [`HashMap`](crate::HashMap): a value lives in bucket
/// `abs(hash) mod capacity` and the bucket count stays fixed unless the set
/// is built with [`Growth::Rehash`].
#[derive(Clone)]
pub struct HashSet<T, S = DefaultHashBuilder> {
    table: ChainTable<T>,
    hash_builder: S,
}

impl<T, S> PartialEq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S> Eq for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, S> Debug for HashSet<T, S>
where
    T: Debug + Hash + Eq,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash set with the default capacity (16 buckets) and the
    /// given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use std::collections::hash_map::RandomState;
    ///
    /// use chain_hash::hash_set::HashSet;
    ///
    /// let set: HashSet<i32, _> = HashSet::with_hasher(RandomState::new());
    /// assert!(set.is_empty());
    /// assert_eq!(set.capacity(), 16);
    /// # }
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hash_builder)
    }

    /// Creates a new hash set with the specified capacity, rounded up to a
    /// power of two, and hasher builder.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_growth_and_hasher(capacity, Growth::Fixed, hash_builder)
    }

    /// Creates a new hash set with the specified capacity, growth policy and
    /// hasher builder.
    pub fn with_capacity_growth_and_hasher(capacity: usize, growth: Growth, hash_builder: S) -> Self {
        Self {
            table: ChainTable::with_capacity_and_growth(capacity, growth),
            hash_builder,
        }
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the growth policy.
    pub fn growth(&self) -> Growth {
        self.table.growth()
    }

    /// Returns the current ratio of elements to buckets.
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Removes all elements from the set, keeping its bucket count.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Grows the bucket array so that `additional` more elements fit within
    /// the default load factor. Never shrinks the set.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. An equal value already
    /// in the set is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::HashSet;
    ///
    /// let mut set: HashSet<i32> = HashSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// assert_eq!(set.len(), 1);
    /// # }
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| v == &value) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Returns `true` if the set contains a value.
    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns a reference to the stored value equal to `value`, if any.
    pub fn get(&self, value: &T) -> Option<&T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v == value)
    }

    /// Removes a value from the set. Returns whether the value was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`, if any.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v == value)
    }

    /// Returns an iterator over the values of the set, bucket by bucket.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes and yields every value; the set is empty afterwards.
    pub fn drain(&mut self) -> Drain<'_, T> {
        Drain {
            inner: self.table.drain(),
        }
    }
}

impl<T, S> HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash set with 16 buckets using the default hasher
    /// builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a new hash set with the specified capacity using the default
    /// hasher builder.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a `HashSet`.
pub struct Iter<'a, T> {
    inner: crate::chain_table::Iter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a `HashSet`.
pub struct Drain<'a, T> {
    inner: crate::chain_table::Drain<'a, T>,
}

impl<T> Iterator for Drain<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a, T, S> IntoIterator for &'a HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, S> Extend<T> for HashSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::chain_table::LoadFactor;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            Self {
                k1: OsRng.try_next_u64().unwrap_or(0),
                k2: OsRng.try_next_u64().unwrap_or(0),
            }
        }
    }

    #[test]
    fn test_new_and_with_hasher() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 16);

        let set2 = HashSet::<i32, _>::with_hasher(SipHashBuilder::default());
        assert!(set2.is_empty());
    }

    #[test]
    fn test_with_capacity() {
        let set: HashSet<i32, SipHashBuilder> = HashSet::with_capacity(100);
        assert_eq!(set.capacity(), 128);

        let set2 = HashSet::<i32, _>::with_capacity_and_hasher(0, SipHashBuilder::default());
        assert_eq!(set2.capacity(), 1);
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());

        assert!(set.insert(1));
        assert!(set.insert(2));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 2);

        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_remove_and_take() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert("a".to_string());
        set.insert("b".to_string());

        assert!(set.remove(&"a".to_string()));
        assert!(!set.remove(&"a".to_string()));
        assert_eq!(set.take(&"b".to_string()), Some("b".to_string()));
        assert_eq!(set.take(&"b".to_string()), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_get() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(42);
        assert_eq!(set.get(&42), Some(&42));
        assert_eq!(set.get(&7), None);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut set = HashSet::with_capacity_and_hasher(32, SipHashBuilder::default());
        for i in 0..100 {
            set.insert(i);
        }
        assert_eq!(set.capacity(), 32);

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 32);
        assert!(!set.contains(&1));
    }

    #[test]
    fn test_reserve() {
        let mut set = HashSet::<i32, _>::with_hasher(SipHashBuilder::default());
        set.reserve(100);
        assert!(set.capacity() >= 100);
    }

    #[test]
    fn test_growth_policies() {
        let mut fixed = HashSet::with_capacity_and_hasher(4, SipHashBuilder::default());
        assert_eq!(fixed.growth(), Growth::Fixed);
        for i in 0..64 {
            fixed.insert(i);
        }
        assert_eq!(fixed.capacity(), 4);

        let load_factor = LoadFactor::new(0.25).unwrap();
        let mut growing = HashSet::with_capacity_growth_and_hasher(
            1,
            Growth::Rehash(load_factor),
            SipHashBuilder::default(),
        );
        assert_eq!(growing.growth(), Growth::Rehash(load_factor));
        for i in 0..64 {
            assert!(growing.insert(i));
            assert!(growing.load_factor() <= 0.25);
        }
        assert_eq!(growing.capacity(), 256);
        for i in 0..64 {
            assert!(growing.contains(&i));
        }
    }

    #[test]
    fn test_iter_and_drain() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            set.insert(i);
        }

        assert_eq!(set.iter().len(), 10);
        let mut seen: Vec<i32> = (&set).into_iter().copied().collect();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        let mut drained: Vec<i32> = set.drain().collect();
        drained.sort();
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(set.is_empty());
    }

    #[test]
    fn test_collision_handling() {
        let mut set = HashSet::with_capacity_and_hasher(1, SipHashBuilder::default());
        for i in 0..50 {
            assert!(set.insert(i));
        }
        assert_eq!(set.capacity(), 1);
        for i in 0..50 {
            assert!(set.contains(&i));
        }
        for i in (0..50).step_by(2) {
            assert!(set.remove(&i));
        }
        for i in 0..50 {
            assert_eq!(set.contains(&i), i % 2 == 1);
        }
        assert_eq!(set.len(), 25);
    }

    #[test]
    fn test_equality_ignores_order() {
        let builder = SipHashBuilder::default();
        let mut a = HashSet::with_capacity_and_hasher(4, builder.clone());
        let mut b = HashSet::with_capacity_and_hasher(4, builder);
        for word in ["x", "y", "z"] {
            a.insert(word);
        }
        for word in ["z", "x", "y"] {
            b.insert(word);
        }
        assert_eq!(a, b);

        b.remove(&"z");
        assert_ne!(a, b);
    }

    #[test]
    fn test_extend_collect_and_clone() {
        let set: HashSet<String, SipHashBuilder> =
            vec!["a", "b", "a"].into_iter().map(String::from).collect();
        assert_eq!(set.len(), 2);

        let mut cloned = set.clone();
        cloned.extend(["c".to_string()]);
        assert_eq!(cloned.len(), 3);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_debug_output() {
        let mut set = HashSet::with_hasher(SipHashBuilder::default());
        set.insert(5);
        assert_eq!(alloc::format!("{set:?}"), "{5}");
    }
}
