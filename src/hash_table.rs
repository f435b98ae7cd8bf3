//! A raw open-addressing hash table using linear probing and tombstones.
//!
//! [`HashTable<V>`] stores values of type `V` and is driven entirely by the
//! caller: every keyed operation takes the hash of the key and an equality
//! predicate. [`ByteMap`](crate::ByteMap) is the keyed wrapper most users
//! want.
//!
//! ## Layout
//!
//! The table is a power-of-two array of slots. Each slot is empty, occupied
//! (value plus its cached hash), or a tombstone left behind by a removal. A
//! key's home slot is `hash & (capacity - 1)`; its probe chain walks forward
//! from there, wrapping at the end, and stops at the first empty slot or at
//! the occupied slot holding the key. Tombstones never stop a walk and their
//! contents are never inspected.
//!
//! ## Resizing
//!
//! Load counts tombstones: `(occupied + tombstones) / capacity`. An insert
//! that would push the load above the policy's max load doubles the table
//! first; a removal that drops the load below the min load halves it. Both
//! rebuild the slot array from scratch, re-probing every live entry against
//! the new capacity and discarding every tombstone.

use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;

use crate::error::Fallibility;
use crate::error::TryReserveError;
use crate::policy::LoadPolicy;

#[derive(Clone)]
enum Slot<V> {
    Empty,
    Occupied { hash: u64, value: V },
    Tombstone,
}

/// Where a probe chain ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Probe {
    /// The occupied slot holding the key.
    Found(usize),
    /// The first empty slot of the chain; the key is absent.
    Vacant(usize),
}

fn try_vec<T>(len: usize, fallibility: Fallibility) -> Result<Vec<T>, TryReserveError> {
    let layout = Layout::array::<T>(len).map_err(|_| fallibility.capacity_overflow())?;
    let mut vec = Vec::new();
    vec.try_reserve_exact(len)
        .map_err(|_| fallibility.alloc_err(layout))?;
    Ok(vec)
}

fn empty_slots<V>(capacity: usize, fallibility: Fallibility) -> Result<Vec<Slot<V>>, TryReserveError> {
    debug_assert!(capacity.is_power_of_two());
    let mut slots = try_vec(capacity, fallibility)?;
    slots.resize_with(capacity, || Slot::Empty);
    Ok(slots)
}

/// Allocations for a rebuild, obtained before the table is touched.
struct Storage<V> {
    slots: Vec<Slot<V>>,
    pending: Vec<(u64, V)>,
}

#[inline(always)]
fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => unreachable!("infallible allocation reported an error"),
    }
}

/// A hash table using open addressing with linear probing.
///
/// `HashTable<V>` does not know how to hash or compare its values: like a raw
/// table, each operation receives the key's hash and a predicate selecting
/// the matching value. The caller must hash a given key to the same value
/// every time.
///
/// ## Example
///
/// ```rust
/// use core::hash::BuildHasher;
///
/// use linear_hash::hash::ShiftAddBuildHasher;
/// use linear_hash::hash_table::Entry;
/// use linear_hash::hash_table::HashTable;
///
/// #[derive(Debug, PartialEq)]
/// struct Person {
///     id: u64,
///     name: String,
/// }
///
/// let state = ShiftAddBuildHasher::default();
/// let mut table = HashTable::new();
/// let hash = state.hash_one(123u64);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert_eq!(table.find(hash, |p| p.id == 123).unwrap().name, "Alice");
/// ```
#[derive(Clone)]
pub struct HashTable<V> {
    slots: Vec<Slot<V>>,
    occupied: usize,
    tombstones: usize,
    policy: LoadPolicy,
}

impl<V> Debug for HashTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        // One row per 16 slots: `..` empty, `xx` tombstone, otherwise the
        // entry's distance from its home slot.
        let mask = self.mask();
        let rows = self
            .slots
            .chunks(16)
            .enumerate()
            .map(|(row, chunk)| {
                let mut line = String::new();
                for (offset, slot) in chunk.iter().enumerate() {
                    if offset != 0 {
                        line.push_str(", ");
                    }
                    match slot {
                        Slot::Empty => line.push_str(".."),
                        Slot::Tombstone => line.push_str("xx"),
                        Slot::Occupied { hash, .. } => {
                            let index = row * 16 + offset;
                            let distance = index.wrapping_sub(*hash as usize) & mask;
                            line.push_str(&format!("{:02x}", distance.min(0xff)));
                        }
                    }
                }
                line
            })
            .collect::<Vec<_>>();

        f.debug_struct("HashTable")
            .field("slots", &rows)
            .field("occupied", &self.occupied)
            .field("tombstones", &self.tombstones)
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HashTable<V> {
    /// Creates an empty table at the default policy's minimum capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<String> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 32);
    /// ```
    pub fn new() -> Self {
        Self::with_policy(LoadPolicy::default())
    }

    /// Creates an empty table at `policy`'s minimum capacity.
    pub fn with_policy(policy: LoadPolicy) -> Self {
        infallible(Self::create(policy.min_capacity(), policy, Fallibility::Infallible))
    }

    /// Fallible version of [`with_policy`](Self::with_policy).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LoadPolicy;
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<u32> = HashTable::try_with_policy(LoadPolicy::default()).unwrap();
    /// assert_eq!(table.capacity(), 32);
    /// ```
    pub fn try_with_policy(policy: LoadPolicy) -> Result<Self, TryReserveError> {
        Self::create(policy.min_capacity(), policy, Fallibility::Fallible)
    }

    /// Creates a table that can hold at least `capacity` values without
    /// growing.
    ///
    /// The slot count is the smallest power of two, no smaller than the
    /// default minimum, that keeps `capacity` values under the max load.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// assert!(table.capacity().is_power_of_two());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        infallible(Self::sized(capacity, LoadPolicy::default(), Fallibility::Infallible))
    }

    /// Fallible version of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::sized(capacity, LoadPolicy::default(), Fallibility::Fallible)
    }

    /// Creates a table under `policy` that can hold at least `capacity`
    /// values without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::LoadPolicy;
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let policy = LoadPolicy::new(8, 0.5, 0.2).unwrap();
    /// let table: HashTable<u64> = HashTable::with_capacity_and_policy(10, policy);
    /// assert_eq!(table.capacity(), 32);
    /// assert_eq!(table.policy(), &policy);
    /// ```
    pub fn with_capacity_and_policy(capacity: usize, policy: LoadPolicy) -> Self {
        infallible(Self::sized(capacity, policy, Fallibility::Infallible))
    }

    /// Fallible version of
    /// [`with_capacity_and_policy`](Self::with_capacity_and_policy).
    pub fn try_with_capacity_and_policy(
        capacity: usize,
        policy: LoadPolicy,
    ) -> Result<Self, TryReserveError> {
        Self::sized(capacity, policy, Fallibility::Fallible)
    }

    fn sized(
        capacity: usize,
        policy: LoadPolicy,
        fallibility: Fallibility,
    ) -> Result<Self, TryReserveError> {
        let slots = policy
            .capacity_for(capacity)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        Self::create(slots, policy, fallibility)
    }

    fn create(
        capacity: usize,
        policy: LoadPolicy,
        fallibility: Fallibility,
    ) -> Result<Self, TryReserveError> {
        Ok(Self {
            slots: empty_slots(capacity, fallibility)?,
            occupied: 0,
            tombstones: 0,
            policy,
        })
    }

    /// Returns the number of values in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.len(), 0);
    ///
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if the table contains no values.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Returns the number of slots. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones left by removals since the last
    /// rebuild.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the sizing policy the table was created with.
    pub fn policy(&self) -> &LoadPolicy {
        &self.policy
    }

    #[inline(always)]
    fn mask(&self) -> usize {
        self.slots.len() - 1
    }

    /// Walks the probe chain for `hash` until it reaches the value matching
    /// `eq` or an empty slot.
    #[inline]
    fn probe(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Probe {
        let mask = self.mask();
        let mut index = hash as usize & mask;

        // The load policy keeps at least one slot empty, so this terminates.
        for _ in 0..self.slots.len() {
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(index),
                Slot::Occupied {
                    hash: stored,
                    value,
                } if *stored == hash && eq(value) => return Probe::Found(index),
                Slot::Occupied { .. } | Slot::Tombstone => {}
            }
            index = (index + 1) & mask;
        }

        unreachable!("probe chain visited every slot without reaching an empty one")
    }

    /// Walks the probe chain for `hash` to its first empty slot.
    #[inline]
    fn find_vacant(&self, hash: u64) -> usize {
        let mask = self.mask();
        let mut index = hash as usize & mask;

        for _ in 0..self.slots.len() {
            if let Slot::Empty = self.slots[index] {
                return index;
            }
            index = (index + 1) & mask;
        }

        unreachable!("probe chain visited every slot without reaching an empty one")
    }

    /// Finds a value by hash and equality predicate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.find(42, |&n| n == 42), Some(&42));
    /// assert_eq!(table.find(99, |&n| n == 99), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        if self.occupied == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => match &self.slots[index] {
                Slot::Occupied { value, .. } => Some(value),
                _ => unreachable!(),
            },
            Probe::Vacant(_) => None,
        }
    }

    /// Finds a value by hash and equality predicate, returning a mutable
    /// reference.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// if let Some(value) = table.find_mut(42, |&n| n == 42) {
    ///     *value = 100;
    /// }
    /// assert_eq!(table.find(42, |&n| n == 100), Some(&100));
    /// ```
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        if self.occupied == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => match &mut self.slots[index] {
                Slot::Occupied { value, .. } => Some(value),
                _ => unreachable!(),
            },
            Probe::Vacant(_) => None,
        }
    }

    /// Gets the entry for the given hash and equality predicate.
    ///
    /// Looking up an entry never changes the table. Inserting into a vacant
    /// entry grows the table first if the new value would push the load
    /// past the max load.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts on allocation failure; see
    /// [`try_entry`](Self::try_entry).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::Entry;
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    ///
    /// match table.entry(7, |s: &String| s == "hello") {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert("hello".to_string());
    ///     }
    ///     Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "updated".to_string();
    ///     }
    /// }
    /// assert_eq!(table.len(), 1);
    /// ```
    #[inline]
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        infallible(self.entry_impl(hash, eq, Fallibility::Infallible))
    }

    /// Fallible version of [`entry`](Self::entry).
    ///
    /// Any storage the insert would need is allocated here, so inserting
    /// into the returned vacant entry cannot fail. The table itself is only
    /// rebuilt by that insert; on error, or if the entry is dropped, it is
    /// unchanged.
    #[inline]
    pub fn try_entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
    ) -> Result<Entry<'_, V>, TryReserveError> {
        self.entry_impl(hash, eq, Fallibility::Fallible)
    }

    #[inline]
    fn entry_impl(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        fallibility: Fallibility,
    ) -> Result<Entry<'_, V>, TryReserveError> {
        match self.probe(hash, eq) {
            Probe::Found(index) => Ok(Entry::Occupied(OccupiedEntry { table: self, index })),
            Probe::Vacant(index) => {
                let reserved = match fallibility {
                    Fallibility::Fallible => self.reserve_for_insert(fallibility)?,
                    Fallibility::Infallible => None,
                };
                Ok(Entry::Vacant(VacantEntry {
                    table: self,
                    index,
                    hash,
                    reserved,
                }))
            }
        }
    }

    /// Grows the table if one more occupied slot would exceed the max load.
    /// Returns whether the slot array was rebuilt.
    fn grow_for_insert(&mut self, fallibility: Fallibility) -> Result<bool, TryReserveError> {
        match self.reserve_for_insert(fallibility)? {
            Some(storage) => {
                self.rebuild(storage);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Allocates the storage for the rebuild one more occupied slot would
    /// trigger, or `None` if the insert fits.
    fn reserve_for_insert(
        &self,
        fallibility: Fallibility,
    ) -> Result<Option<Storage<V>>, TryReserveError> {
        let used = self.occupied + self.tombstones + 1;
        if !self.policy.exceeds_max(used, self.capacity()) {
            return Ok(None);
        }

        // Tombstones do not survive the rebuild, so only live entries count
        // against the new capacity.
        let mut capacity = self.capacity();
        loop {
            capacity = capacity
                .checked_mul(2)
                .ok_or_else(|| fallibility.capacity_overflow())?;
            if !self.policy.exceeds_max(self.occupied + 1, capacity) {
                break;
            }
        }

        self.allocate(capacity, fallibility).map(Some)
    }

    /// Removes the value matching `eq` and returns it.
    ///
    /// The slot becomes a tombstone. If the load then falls below the min
    /// load the table is halved; should that allocation fail the table keeps
    /// its current capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(99, |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        if self.occupied == 0 {
            return None;
        }

        match self.probe(hash, eq) {
            Probe::Found(index) => Some(self.remove_at(index)),
            Probe::Vacant(_) => None,
        }
    }

    fn remove_at(&mut self, index: usize) -> V {
        let Slot::Occupied { value, .. } = mem::replace(&mut self.slots[index], Slot::Tombstone)
        else {
            unreachable!("removing a slot that is not occupied");
        };
        self.occupied -= 1;
        self.tombstones += 1;

        self.maybe_shrink();
        value
    }

    fn maybe_shrink(&mut self) {
        let capacity = self.capacity();
        if !self
            .policy
            .below_min(self.occupied + self.tombstones, capacity)
        {
            return;
        }

        if let Err(err) = self.resize(capacity / 2, Fallibility::Fallible) {
            log::debug!("keeping {capacity} slots, shrink failed: {err}");
        }
    }

    /// Rebuilds the table with `capacity` slots.
    ///
    /// Every allocation happens before the table is touched, so on error the
    /// table is exactly as it was.
    ///
    /// # Panics
    ///
    /// Panics if the number of live entries changes across the rebuild,
    /// which can only mean the table's bookkeeping is corrupt.
    fn resize(&mut self, capacity: usize, fallibility: Fallibility) -> Result<(), TryReserveError> {
        let storage = self.allocate(capacity, fallibility)?;
        self.rebuild(storage);
        Ok(())
    }

    fn allocate(
        &self,
        capacity: usize,
        fallibility: Fallibility,
    ) -> Result<Storage<V>, TryReserveError> {
        debug_assert!(capacity.is_power_of_two());
        debug_assert!(capacity > self.occupied);

        Ok(Storage {
            pending: try_vec(self.occupied, fallibility)?,
            slots: empty_slots(capacity, fallibility)?,
        })
    }

    /// Moves every live entry into `storage`'s slot array, dropping all
    /// tombstones. Cannot fail: `storage` already holds every allocation.
    fn rebuild(&mut self, storage: Storage<V>) {
        let Storage { slots, mut pending } = storage;
        let live = self.occupied;
        let capacity = slots.len();

        log::trace!(
            "resizing hash table from {} to {} slots ({} live, {} tombstones dropped)",
            self.capacity(),
            capacity,
            live,
            self.tombstones
        );

        let old_slots = mem::replace(&mut self.slots, slots);
        for slot in old_slots {
            if let Slot::Occupied { hash, value } = slot {
                pending.push((hash, value));
            }
        }

        self.occupied = 0;
        self.tombstones = 0;
        for (hash, value) in pending {
            let index = self.find_vacant(hash);
            self.slots[index] = Slot::Occupied { hash, value };
            self.occupied += 1;
        }

        if self.occupied != live {
            log::error!(
                "hash table inconsistency after resizing: {} live entries before, {} after",
                live,
                self.occupied
            );
            panic!(
                "hash table inconsistency after resizing: {} live entries before, {} after",
                live, self.occupied
            );
        }
    }

    /// Reserves room for at least `additional` more values.
    ///
    /// After this returns, `additional` inserts will not resize the table.
    /// If the table is large enough but crowded with tombstones, it is
    /// rebuilt at its current capacity.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts on allocation failure; see
    /// [`try_reserve`](Self::try_reserve).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(100);
    /// let capacity = table.capacity();
    ///
    /// for i in 0..100 {
    ///     table.entry(i, |&n| n == i).or_insert(i);
    /// }
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        infallible(self.reserve_impl(additional, Fallibility::Infallible))
    }

    /// Fallible version of [`reserve`](Self::reserve). On error the table is
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::TryReserveError;
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::new();
    /// assert_eq!(
    ///     table.try_reserve(usize::MAX),
    ///     Err(TryReserveError::CapacityOverflow)
    /// );
    /// assert!(table.try_reserve(10).is_ok());
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.reserve_impl(additional, Fallibility::Fallible)
    }

    fn reserve_impl(
        &mut self,
        additional: usize,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let required = self
            .occupied
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        let used = required
            .checked_add(self.tombstones)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        if !self.policy.exceeds_max(used, self.capacity()) {
            return Ok(());
        }

        let capacity = self
            .policy
            .capacity_for(required)
            .ok_or_else(|| fallibility.capacity_overflow())?
            .max(self.capacity());
        self.resize(capacity, fallibility)
    }

    /// Shrinks the table to the smallest capacity that holds its values
    /// under the max load, dropping every tombstone.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64> = HashTable::with_capacity(1000);
    /// table.entry(5, |&v| v == 5).or_insert(5);
    /// table.entry(10, |&v| v == 10).or_insert(10);
    ///
    /// table.shrink_to_fit();
    /// assert_eq!(table.capacity(), 32);
    /// assert_eq!(table.len(), 2);
    /// ```
    pub fn shrink_to_fit(&mut self) {
        let Some(capacity) = self.policy.capacity_for(self.occupied) else {
            return;
        };
        if capacity < self.capacity() || self.tombstones > 0 {
            infallible(self.resize(capacity, Fallibility::Infallible));
        }
    }

    /// Removes all values, keeping the current capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2).or_insert(2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.tombstones(), 0);
    /// ```
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Empty;
        }
        self.occupied = 0;
        self.tombstones = 0;
    }

    /// Returns an iterator over all values, in slot order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(1, |s: &String| s == "a").or_insert("a".to_string());
    /// table.entry(2, |s: &String| s == "b").or_insert("b".to_string());
    ///
    /// let mut values: Vec<&String> = table.iter().collect();
    /// values.sort();
    /// assert_eq!(values, ["a", "b"]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            table: self,
            index: 0,
            remaining: self.occupied,
        }
    }

    /// Returns an iterator over mutable references to all values, in slot
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            slots: self.slots.iter_mut(),
            remaining: self.occupied,
        }
    }

    /// Removes and yields every value. The capacity is kept.
    ///
    /// Dropping the iterator early drops the remaining values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(1, |s: &String| s == "a").or_insert("a".to_string());
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, ["a"]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            index: 0,
        }
    }

    /// Computes a histogram of probe distances: bin `i` counts the values
    /// stored `i` slots past their home slot.
    ///
    /// Compiled with `cfg(test)` or the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self) -> crate::stats::ProbeHistogram {
        let mask = self.mask();
        let mut bins = alloc::vec::Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied { hash, .. } = slot {
                let distance = index.wrapping_sub(*hash as usize) & mask;
                if bins.len() <= distance {
                    bins.resize(distance + 1, 0);
                }
                bins[distance] += 1;
            }
        }

        crate::stats::ProbeHistogram::new(bins)
    }

    /// Returns utilisation statistics for the current table state.
    ///
    /// Compiled with `cfg(test)` or the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> crate::stats::DebugStats {
        let histogram = self.probe_histogram();
        let capacity = self.capacity();
        let slot_bytes = core::mem::size_of::<Slot<V>>();

        crate::stats::DebugStats {
            populated: self.occupied,
            tombstones: self.tombstones,
            capacity,
            load_factor: (self.occupied + self.tombstones) as f64 / capacity as f64,
            live_load_factor: self.occupied as f64 / capacity as f64,
            max_probe_length: histogram.max_distance().unwrap_or(0),
            mean_probe_length: histogram.mean_distance(),
            total_bytes: capacity * slot_bytes,
            wasted_bytes: (capacity - self.occupied) * slot_bytes,
        }
    }
}

/// A view into a single entry in the table, which may be vacant or
/// occupied.
///
/// Constructed by [`HashTable::entry`] and [`HashTable::try_entry`].
///
/// # Examples
///
/// ```rust
/// use linear_hash::hash_table::Entry;
/// use linear_hash::hash_table::HashTable;
///
/// let mut table = HashTable::new();
///
/// match table.entry(3, |s: &String| s == "key") {
///     Entry::Vacant(entry) => {
///         entry.insert("key".to_string());
///     }
///     Entry::Occupied(entry) => {
///         println!("Key already exists with value: {}", entry.get());
///     }
/// }
/// ```
pub enum Entry<'a, V> {
    /// The key is not present in the table
    Vacant(VacantEntry<'a, V>),
    /// The key is present in the table
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the entry's value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    ///
    /// let value = table.entry(1, |s: &String| s == "key").or_insert("key".to_string());
    /// assert_eq!(value, "key");
    ///
    /// let existing = table.entry(1, |s: &String| s == "key").or_insert("other".to_string());
    /// assert_eq!(existing, "key");
    /// ```
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the entry's value.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to an occupied entry's value. Vacant entries are left
    /// alone and yield `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// assert_eq!(table.entry(42, |&n: &u64| n == 42).and_modify(|v| *v += 1), None);
    ///
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    /// assert_eq!(
    ///     table.entry(42, |&n: &u64| n == 42).and_modify(|v| *v += 1),
    ///     Some(&mut 43)
    /// );
    /// ```
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the entry's value.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the table.
///
/// Holds the empty slot at the end of the key's probe chain.
pub struct VacantEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
    hash: u64,
    reserved: Option<Storage<V>>,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Inserts `value` into the vacant slot and returns a mutable reference
    /// to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry {
            table,
            mut index,
            hash,
            reserved,
        } = self;

        let rebuilt = match reserved {
            Some(storage) => {
                table.rebuild(storage);
                true
            }
            None => infallible(table.grow_for_insert(Fallibility::Infallible)),
        };
        if rebuilt {
            index = table.find_vacant(hash);
        }

        table.occupied += 1;

        let slot = &mut table.slots[index];
        debug_assert!(matches!(slot, Slot::Empty));
        *slot = Slot::Occupied { hash, value };
        match slot {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }
}

/// A view into an occupied entry in the table.
pub struct OccupiedEntry<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        match &self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        match &mut self.table.slots[self.index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Converts the entry into a mutable reference to the value with the
    /// lifetime of the entry.
    pub fn into_mut(self) -> &'a mut V {
        let OccupiedEntry { table, index } = self;
        match &mut table.slots[index] {
            Slot::Occupied { value, .. } => value,
            _ => unreachable!(),
        }
    }

    /// Replaces the entry's value, returning the previous one.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the table and returns its value. May shrink
    /// the table, like [`HashTable::remove`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use linear_hash::hash_table::Entry;
    /// use linear_hash::hash_table::HashTable;
    ///
    /// let mut table = HashTable::new();
    /// table.entry(1, |s: &String| s == "key").or_insert("key".to_string());
    ///
    /// let removed = match table.entry(1, |s: &String| s == "key") {
    ///     Entry::Occupied(entry) => entry.remove(),
    ///     Entry::Vacant(_) => unreachable!(),
    /// };
    /// assert_eq!(removed, "key");
    /// assert!(table.is_empty());
    /// ```
    pub fn remove(self) -> V {
        self.table.remove_at(self.index)
    }
}

/// An iterator over the values of a [`HashTable`], in slot order.
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, V> {
    table: &'a HashTable<V>,
    index: usize,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let table = self.table;
        while let Some(slot) = table.slots.get(self.index) {
            self.index += 1;
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            table: self.table,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

/// A mutable iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, V> {
    slots: core::slice::IterMut<'a, Slot<V>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        for slot in self.slots.by_ref() {
            if let Slot::Occupied { value, .. } = slot {
                self.remaining -= 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::drain`]. Drained slots turn into tombstones while
/// the iterator is alive, so probe chains stay intact even if it is leaked;
/// dropping it empties every slot.
pub struct Drain<'a, V> {
    table: &'a mut HashTable<V>,
    index: usize,
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.table.occupied == 0 {
            return None;
        }

        while let Some(slot) = self.table.slots.get_mut(self.index) {
            self.index += 1;
            if let Slot::Occupied { .. } = slot {
                let Slot::Occupied { value, .. } = mem::replace(slot, Slot::Tombstone) else {
                    unreachable!();
                };
                self.table.occupied -= 1;
                self.table.tombstones += 1;
                return Some(value);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.occupied, Some(self.table.occupied))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}

impl<V> FusedIterator for Drain<'_, V> {}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
        self.table.clear();
    }
}
