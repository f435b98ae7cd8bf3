use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::error::TryReserveError;
use crate::hash::hash_bytes;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;
use crate::policy::LoadPolicy;

#[inline]
fn hash_key(key: &[u8]) -> u64 {
    hash_bytes(key) as u64
}

/// A map keyed by byte spans, stored in a linear-probing [`HashTable`].
///
/// A key is anything exposing its bytes through [`AsRef<[u8]>`]: `Vec<u8>`,
/// `String`, fixed-size arrays, or a caller type serialised into one. Two
/// keys are equal when their byte spans have the same length and content;
/// they are hashed with [`hash_bytes`].
///
/// Insertion never overwrites: inserting an existing key fails and leaves the
/// stored value alone. Use [`update`](Self::update) to replace a value.
///
/// The map owns its keys and values. Removing an entry hands both back;
/// dropping the map drops everything still in it.
///
/// # Examples
///
/// ```rust
/// use linear_hash::ByteMap;
///
/// let mut map = ByteMap::new();
/// assert!(map.insert("alpha", 1));
/// assert!(map.insert("beta", 2));
/// assert!(!map.insert("alpha", 3));
///
/// assert_eq!(map.get("alpha"), Some(&1));
/// assert_eq!(map.update("beta", 20), Ok(2));
/// assert_eq!(map.remove("alpha"), Some(1));
/// assert_eq!(map.len(), 1);
/// ```
#[derive(Clone)]
pub struct ByteMap<K, V> {
    table: HashTable<(K, V)>,
}

impl<K, V> Debug for ByteMap<K, V>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V> Default for ByteMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ByteMap<K, V> {
    /// Creates an empty map with the default [`LoadPolicy`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let map: ByteMap<Vec<u8>, u32> = ByteMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 32);
    /// ```
    pub fn new() -> Self {
        Self {
            table: HashTable::new(),
        }
    }

    /// Fallible version of [`new`](Self::new).
    pub fn try_new() -> Result<Self, TryReserveError> {
        Self::try_with_policy(LoadPolicy::default())
    }

    /// Creates an empty map sized and resized according to `policy`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    /// use linear_hash::LoadPolicy;
    ///
    /// let policy = LoadPolicy::new(8, 0.5, 0.1).unwrap();
    /// let map: ByteMap<String, u32> = ByteMap::with_policy(policy);
    /// assert_eq!(map.capacity(), 8);
    /// ```
    pub fn with_policy(policy: LoadPolicy) -> Self {
        Self {
            table: HashTable::with_policy(policy),
        }
    }

    /// Fallible version of [`with_policy`](Self::with_policy).
    pub fn try_with_policy(policy: LoadPolicy) -> Result<Self, TryReserveError> {
        Ok(Self {
            table: HashTable::try_with_policy(policy)?,
        })
    }

    /// Creates an empty map that holds at least `capacity` entries without
    /// resizing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let map: ByteMap<String, u32> = ByteMap::with_capacity(100);
    /// assert!(map.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashTable::with_capacity(capacity),
        }
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            table: HashTable::try_with_capacity(capacity)?,
        })
    }

    /// Creates an empty map under `policy` that holds at least `capacity`
    /// entries without resizing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    /// use linear_hash::LoadPolicy;
    ///
    /// let policy = LoadPolicy::new(4, 0.75, 0.25).unwrap();
    /// let map: ByteMap<String, u32> = ByteMap::with_capacity_and_policy(100, policy);
    /// assert_eq!(map.capacity(), 256);
    /// assert_eq!(map.policy(), &policy);
    /// ```
    pub fn with_capacity_and_policy(capacity: usize, policy: LoadPolicy) -> Self {
        Self {
            table: HashTable::with_capacity_and_policy(capacity, policy),
        }
    }

    /// Fallible version of
    /// [`with_capacity_and_policy`](Self::with_capacity_and_policy).
    pub fn try_with_capacity_and_policy(
        capacity: usize,
        policy: LoadPolicy,
    ) -> Result<Self, TryReserveError> {
        Ok(Self {
            table: HashTable::try_with_capacity_and_policy(capacity, policy)?,
        })
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of slots in the underlying table.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of tombstoned slots in the underlying table.
    pub fn tombstones(&self) -> usize {
        self.table.tombstones()
    }

    /// Returns the map's sizing policy.
    pub fn policy(&self) -> &LoadPolicy {
        self.table.policy()
    }

    /// Removes every entry, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Reserves room for at least `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Fallible version of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table.try_reserve(additional)
    }

    /// Shrinks the table as far as the load policy allows, dropping all
    /// tombstones.
    pub fn shrink_to_fit(&mut self) {
        self.table.shrink_to_fit();
    }

    /// Returns an iterator over `(&key, &value)` pairs in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let map: ByteMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();
    ///
    /// let mut pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [("a", 1), ("b", 2)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over `(&key, &mut value)` pairs in slot order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Collects every key, in iteration order.
    ///
    /// Returns `None` for an empty map; otherwise the vector holds exactly
    /// [`len`](Self::len) keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// assert_eq!(map.collect_keys(), None);
    ///
    /// map.insert(b"k1".to_vec(), 1);
    /// map.insert(b"k2".to_vec(), 2);
    /// let mut keys = map.collect_keys().unwrap();
    /// keys.sort();
    /// assert_eq!(keys, [b"k1", b"k2"]);
    /// ```
    pub fn collect_keys(&self) -> Option<Vec<&K>> {
        if self.is_empty() {
            return None;
        }
        Some(self.keys().collect())
    }

    /// Collects every value, in iteration order.
    ///
    /// Returns `None` for an empty map; otherwise the vector holds exactly
    /// [`len`](Self::len) values, in the same order as
    /// [`collect_keys`](Self::collect_keys).
    pub fn collect_values(&self) -> Option<Vec<&V>> {
        if self.is_empty() {
            return None;
        }
        Some(self.values().collect())
    }

    /// Removes and yields every entry. The capacity is kept.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Computes the probe-distance histogram of the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::stats::ProbeHistogram {
        self.table.probe_histogram()
    }

    /// Returns utilisation statistics for the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        self.table.debug_stats()
    }
}

impl<K, V> ByteMap<K, V>
where
    K: AsRef<[u8]>,
{
    /// Inserts `value` under `key`.
    ///
    /// Returns `false`, dropping both arguments, if `key` is empty or already
    /// present; an existing entry is never overwritten. May grow the table.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts on allocation failure; see
    /// [`try_insert`](Self::try_insert).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// assert!(map.insert(vec![1u8, 2, 3], "first"));
    /// assert!(!map.insert(vec![1u8, 2, 3], "second"));
    /// assert!(!map.insert(Vec::new(), "empty"));
    ///
    /// assert_eq!(map.get(&[1u8, 2, 3]), Some(&"first"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        if key.as_ref().is_empty() {
            log::debug!("rejecting insert with an empty key");
            return false;
        }

        let hash = hash_key(key.as_ref());
        match self
            .table
            .entry(hash, |(k, _)| k.as_ref() == key.as_ref())
        {
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                true
            }
            TableEntry::Occupied(_) => false,
        }
    }

    /// Fallible version of [`insert`](Self::insert). On error the map is
    /// unchanged and `key` and `value` are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// assert_eq!(map.try_insert("key", 1), Ok(true));
    /// assert_eq!(map.try_insert("key", 2), Ok(false));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<bool, TryReserveError> {
        if key.as_ref().is_empty() {
            log::debug!("rejecting insert with an empty key");
            return Ok(false);
        }

        let hash = hash_key(key.as_ref());
        match self
            .table
            .try_entry(hash, |(k, _)| k.as_ref() == key.as_ref())?
        {
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                Ok(true)
            }
            TableEntry::Occupied(_) => Ok(false),
        }
    }

    /// Replaces the value stored under `key`.
    ///
    /// Returns `Ok` with the previous value if `key` was present, or hands
    /// `value` back in `Err` if it was not. Never inserts and never resizes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// map.insert("key", 1);
    ///
    /// assert_eq!(map.update("key", 2), Ok(1));
    /// assert_eq!(map.get("key"), Some(&2));
    /// assert_eq!(map.update("missing", 3), Err(3));
    /// assert!(!map.contains_key("missing"));
    /// ```
    pub fn update<Q>(&mut self, key: &Q, value: V) -> Result<V, V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        match self.get_mut(key) {
            Some(slot) => Ok(core::mem::replace(slot, value)),
            None => Err(value),
        }
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// map.insert(String::from("key"), 42);
    ///
    /// assert_eq!(map.get("key"), Some(&42));
    /// assert_eq!(map.get(b"key"), Some(&42));
    /// assert_eq!(map.get("other"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        if key.is_empty() {
            return None;
        }

        self.table
            .find(hash_key(key), |(k, _)| k.as_ref() == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// map.insert("counter", 0);
    ///
    /// if let Some(count) = map.get_mut("counter") {
    ///     *count += 1;
    /// }
    /// assert_eq!(map.get("counter"), Some(&1));
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        if key.is_empty() {
            return None;
        }

        self.table
            .find_mut(hash_key(key), |(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map holds an entry for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// The slot is tombstoned; the table may shrink afterwards.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::ByteMap;
    ///
    /// let mut map = ByteMap::new();
    /// map.insert("key", 42);
    ///
    /// assert_eq!(map.remove("key"), Some(42));
    /// assert_eq!(map.remove("key"), None);
    /// assert_eq!(map.tombstones(), 1);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes the entry for `key`, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let key = key.as_ref();
        if key.is_empty() {
            return None;
        }

        self.table
            .remove(hash_key(key), |(k, _)| k.as_ref() == key)
    }
}

impl<K, V> FromIterator<(K, V)> for ByteMap<K, V>
where
    K: AsRef<[u8]>,
{
    /// Builds a map from `(key, value)` pairs. Like
    /// [`insert`](ByteMap::insert), the first pair for a key wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for ByteMap<K, V>
where
    K: AsRef<[u8]>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a ByteMap<K, V> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut ByteMap<K, V> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An iterator over the entries of a [`ByteMap`].
///
/// Created by [`ByteMap::iter`].
pub struct Iter<'a, K, V> {
    inner: crate::hash_table::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

/// A mutable iterator over the entries of a [`ByteMap`].
///
/// Created by [`ByteMap::iter_mut`].
pub struct IterMut<'a, K, V> {
    inner: crate::hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`ByteMap`].
///
/// Created by [`ByteMap::keys`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`ByteMap`].
///
/// Created by [`ByteMap::values`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a [`ByteMap`].
///
/// Created by [`ByteMap::values_mut`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the entries of a [`ByteMap`].
///
/// Created by [`ByteMap::drain`].
pub struct Drain<'a, K, V> {
    inner: crate::hash_table::Drain<'a, (K, V)>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V> FusedIterator for Drain<'_, K, V> {}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::Cell;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use test_log::test;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Foo {
        a: i64,
        b: i64,
        c: i16,
    }

    impl Foo {
        fn key(&self) -> [u8; 18] {
            let mut bytes = [0; 18];
            bytes[..8].copy_from_slice(&self.a.to_le_bytes());
            bytes[8..16].copy_from_slice(&self.b.to_le_bytes());
            bytes[16..].copy_from_slice(&self.c.to_le_bytes());
            bytes
        }
    }

    #[test]
    fn struct_keys_reject_duplicates() {
        let x = Foo { a: 12, b: 14, c: 1 };
        let y = Foo { a: 23, b: 25, c: 3 };
        let z = Foo { a: 12, b: 14, c: 1 };

        let mut map = ByteMap::new();
        assert!(map.insert(x.key(), "x"));
        assert!(map.insert(y.key(), "y"));
        assert!(!map.insert(z.key(), "z"));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&x.key()), Some(&"x"));
        assert_eq!(map.get(&z.key()), Some(&"x"));
        assert_eq!(map.get(&y.key()), Some(&"y"));

        let mut values = map.collect_values().unwrap();
        values.sort();
        assert_eq!(values, [&"x", &"y"]);
        assert_eq!(map.collect_keys().unwrap().len(), 2);
    }

    #[test]
    fn round_trip() {
        let mut map = ByteMap::new();
        for i in 0..500u32 {
            assert!(map.insert(i.to_be_bytes(), i * 3));
        }
        for i in 0..500u32 {
            assert_eq!(map.get(&i.to_be_bytes()), Some(&(i * 3)));
            assert!(map.contains_key(&i.to_be_bytes()));
        }
        assert!(!map.contains_key(&500u32.to_be_bytes()));
    }

    #[test]
    fn keys_differing_in_length_are_distinct() {
        let mut map = ByteMap::new();
        // All-zero spans share a digest; only the length tells them apart.
        assert!(map.insert(vec![0u8], 1));
        assert!(map.insert(vec![0u8, 0], 2));
        assert!(map.insert(vec![0u8, 0, 0], 3));

        assert_eq!(map.get(&[0u8]), Some(&1));
        assert_eq!(map.get(&[0u8, 0]), Some(&2));
        assert_eq!(map.get(&[0u8, 0, 0]), Some(&3));
        assert_eq!(map.get(&[0u8, 0, 0, 0]), None);
    }

    #[test]
    fn empty_key_is_rejected() {
        let mut map: ByteMap<Vec<u8>, i32> = ByteMap::new();
        assert!(!map.insert(Vec::new(), 1));
        assert_eq!(map.try_insert(Vec::new(), 1), Ok(false));
        assert!(map.is_empty());

        assert_eq!(map.get(b""), None);
        assert!(!map.contains_key(b""));
        assert_eq!(map.remove(b""), None);
        assert_eq!(map.update(b"", 5), Err(5));
    }

    #[test]
    fn update_replaces_without_inserting() {
        let mut map = ByteMap::new();
        map.insert("a".to_string(), 1);

        assert_eq!(map.update("a", 10), Ok(1));
        assert_eq!(map.get("a"), Some(&10));
        assert_eq!(map.update("b", 20), Err(20));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn remove_then_reinsert() {
        let mut map = ByteMap::new();
        for i in 0..10u8 {
            map.insert([i, i], i);
        }

        assert_eq!(map.remove(&[3u8, 3]), Some(3));
        assert_eq!(map.get(&[3u8, 3]), None);
        assert_eq!(map.remove(&[3u8, 3]), None);
        assert_eq!(map.len(), 9);

        for i in (0..10u8).filter(|&i| i != 3) {
            assert_eq!(map.get(&[i, i]), Some(&i));
        }

        assert!(map.insert([3, 3], 30));
        assert_eq!(map.get(&[3u8, 3]), Some(&30));
        assert_eq!(map.len(), 10);

        assert_eq!(map.remove_entry(&[3u8, 3]), Some(([3, 3], 30)));
    }

    #[test]
    fn resizing_preserves_entries() {
        let mut map = ByteMap::new();
        let mut capacities = vec![map.capacity()];
        for i in 0..2000u32 {
            let before = map.len();
            map.insert(i.to_string(), i);
            assert_eq!(map.len(), before + 1);
            assert!(map.capacity().is_power_of_two());
            if capacities.last() != Some(&map.capacity()) {
                capacities.push(map.capacity());
            }
        }
        assert_eq!(capacities, [32, 64, 128, 256, 512, 1024, 2048, 4096]);

        for i in 0..2000u32 {
            assert_eq!(map.get(&i.to_string()), Some(&i));
        }

        map.shrink_to_fit();
        for i in 0..1990u32 {
            assert_eq!(map.remove(&i.to_string()), Some(i));
            assert!(map.capacity() >= map.policy().min_capacity());
        }
        assert_eq!(map.len(), 10);
        for i in 1990..2000u32 {
            assert_eq!(map.get(&i.to_string()), Some(&i));
        }
    }

    #[test]
    fn iteration_is_complete() {
        let mut map = ByteMap::new();
        for i in 0..100u16 {
            map.insert(i.to_le_bytes(), i);
        }
        for i in (0..100u16).step_by(3) {
            map.remove(&i.to_le_bytes());
        }

        let mut seen: Vec<u16> = map.iter().map(|(_, v)| *v).collect();
        seen.sort();
        let expected: Vec<u16> = (0..100u16).filter(|i| i % 3 != 0).collect();
        assert_eq!(seen, expected);
        assert_eq!(map.iter().len(), map.len());

        let keys = map.collect_keys().unwrap();
        let values = map.collect_values().unwrap();
        assert_eq!(keys.len(), map.len());
        for (k, v) in keys.iter().zip(values.iter()) {
            assert_eq!(u16::from_le_bytes(**k), **v);
        }

        for (_, v) in &mut map {
            *v += 1000;
        }
        assert!(map.values().all(|&v| v >= 1000));
    }

    #[test]
    fn collect_on_empty_map() {
        let mut map: ByteMap<String, u32> = ByteMap::new();
        assert_eq!(map.collect_keys(), None);
        assert_eq!(map.collect_values(), None);

        map.insert("a".into(), 1);
        map.remove("a");
        assert_eq!(map.collect_keys(), None);
        assert_eq!(map.collect_values(), None);
    }

    #[test]
    fn drain_and_clear() {
        let mut map: ByteMap<String, u32> =
            (0..50u32).map(|i| (i.to_string(), i)).collect();
        assert_eq!(map.len(), 50);

        let mut drained: Vec<(String, u32)> = map.drain().collect();
        drained.sort_by_key(|(_, v)| *v);
        assert_eq!(drained.len(), 50);
        assert_eq!(drained[7], ("7".to_string(), 7));
        assert!(map.is_empty());

        map.extend([("x".to_string(), 1), ("x".to_string(), 2)]);
        assert_eq!(map.get("x"), Some(&1));
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.get("x"), None);
    }

    #[test]
    fn debug_formats_as_map() {
        let mut map = ByteMap::new();
        map.insert("k", 1);
        assert_eq!(alloc::format!("{map:?}"), r#"{"k": 1}"#);
    }

    struct Tracked(Rc<Cell<usize>>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct TrackedKey(Vec<u8>, Rc<Cell<usize>>);

    impl AsRef<[u8]> for TrackedKey {
        fn as_ref(&self) -> &[u8] {
            &self.0
        }
    }

    impl Drop for TrackedKey {
        fn drop(&mut self) {
            self.1.set(self.1.get() + 1);
        }
    }

    #[test]
    fn keys_and_values_dropped_once() {
        let key_drops = Rc::new(Cell::new(0));
        let value_drops = Rc::new(Cell::new(0));
        {
            let mut map = ByteMap::new();
            for i in 0..200u32 {
                let key = TrackedKey(i.to_le_bytes().to_vec(), key_drops.clone());
                assert!(map.insert(key, Tracked(value_drops.clone())));
            }

            // A rejected duplicate drops its own key and value immediately.
            let dup = TrackedKey(7u32.to_le_bytes().to_vec(), key_drops.clone());
            assert!(!map.insert(dup, Tracked(value_drops.clone())));
            assert_eq!((key_drops.get(), value_drops.get()), (1, 1));

            for i in 0..100u32 {
                assert!(map.remove(&i.to_le_bytes()).is_some());
            }
            assert_eq!(key_drops.get(), 101);
            assert_eq!(value_drops.get(), 101);

            let replaced = map.update(&150u32.to_le_bytes(), Tracked(value_drops.clone()));
            assert!(replaced.is_ok());
            drop(replaced);
            assert_eq!(value_drops.get(), 102);
        }
        assert_eq!(key_drops.get(), 201);
        assert_eq!(value_drops.get(), 202);
    }

    #[test]
    fn random_operations_match_model() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut map: ByteMap<Vec<u8>, u32> = ByteMap::new();
        let mut model: hashbrown::HashMap<Vec<u8>, u32> = hashbrown::HashMap::new();

        for step in 0..20_000u32 {
            let len = rng.random_range(1..=4);
            let key: Vec<u8> = (0..len).map(|_| rng.random_range(0..8u8)).collect();

            match rng.random_range(0..4) {
                0 | 1 => {
                    let inserted = map.insert(key.clone(), step);
                    let absent = !model.contains_key(&key);
                    if absent {
                        model.insert(key.clone(), step);
                    }
                    assert_eq!(inserted, absent, "insert {key:?}");
                }
                2 => {
                    assert_eq!(map.remove(&key), model.remove(&key), "remove {key:?}");
                }
                _ => {
                    let expected = match model.get_mut(&key) {
                        Some(v) => Ok(core::mem::replace(v, step)),
                        None => Err(step),
                    };
                    assert_eq!(map.update(&key, step), expected, "update {key:?}");
                }
            }

            assert_eq!(map.len(), model.len());
            assert!(map.capacity().is_power_of_two());
            assert!(map.len() + map.tombstones() < map.capacity());
        }

        for (k, v) in &model {
            assert_eq!(map.get(k), Some(v));
        }
        assert_eq!(map.iter().count(), model.len());
    }

    #[test]
    fn custom_policy_thresholds() {
        let policy = LoadPolicy::new(4, 0.75, 0.25).unwrap();
        let mut map = ByteMap::with_policy(policy);
        for i in 1..=3u8 {
            map.insert([i], i);
        }
        assert_eq!(map.capacity(), 4);
        map.insert([4], 4);
        assert_eq!(map.capacity(), 8);
        assert_eq!(map.debug_stats().populated, 4);
    }

    #[test]
    fn presized_with_custom_policy() {
        let policy = LoadPolicy::new(4, 0.75, 0.25).unwrap();
        let mut map: ByteMap<Vec<u8>, u32> = ByteMap::with_capacity_and_policy(100, policy);
        assert_eq!(map.capacity(), 256);
        assert_eq!(map.policy().max_load(), 0.75);

        for i in 0..192u32 {
            assert!(map.insert(i.to_le_bytes().to_vec(), i));
        }
        assert_eq!(map.capacity(), 256);
        map.insert(192u32.to_le_bytes().to_vec(), 192);
        assert_eq!(map.capacity(), 512);

        assert!(matches!(
            ByteMap::<Vec<u8>, u32>::try_with_capacity_and_policy(usize::MAX, policy),
            Err(TryReserveError::CapacityOverflow)
        ));
    }

    #[test]
    fn string_keys() {
        let mut map: ByteMap<String, usize> = ByteMap::new();
        for word in "the quick brown fox jumps over the lazy dog".split(' ') {
            let n = map.len();
            map.insert(word.to_string(), n);
        }
        assert_eq!(map.len(), 8);
        assert_eq!(map.get("the"), Some(&0));
        assert_eq!(map.get("dog"), Some(&7));
    }
}
