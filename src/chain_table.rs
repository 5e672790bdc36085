use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::MapError;

/// Bucket count used when no capacity is requested.
pub const DEFAULT_CAPACITY: usize = 1 << 4;

/// Upper bound on the number of buckets. Requests above it are clamped.
pub const MAX_CAPACITY: usize = 1 << 30;

const OCCUPIED: &str = "occupied entries always point at a linked node";

/// Rounds `requested` up to the next power of two, clamped to
/// [`MAX_CAPACITY`].
///
/// Uses the 32-bit bit smear: decrement, fold every set bit into the bits
/// below it, increment. A request of zero would decrement below zero and
/// yields `1`.
///
/// # Examples
///
/// ```rust
/// # use chain_hash::chain_table::MAX_CAPACITY;
/// # use chain_hash::chain_table::round_up_to_power_of_two;
/// #
/// assert_eq!(round_up_to_power_of_two(3), 4);
/// assert_eq!(round_up_to_power_of_two(17), 32);
/// assert_eq!(round_up_to_power_of_two(MAX_CAPACITY + 1), MAX_CAPACITY);
/// ```
pub const fn round_up_to_power_of_two(requested: usize) -> usize {
    if requested == 0 {
        return 1;
    }
    if requested > MAX_CAPACITY {
        return MAX_CAPACITY;
    }

    // requested <= 2^30, so five shifts cover every bit below the top one.
    let mut n = requested - 1;
    n |= n >> 1;
    n |= n >> 2;
    n |= n >> 4;
    n |= n >> 8;
    n |= n >> 16;
    n + 1
}

/// Ratio of stored elements to buckets that triggers a rehash.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct LoadFactor(f64);

impl LoadFactor {
    /// The conventional `0.75`.
    pub const DEFAULT: LoadFactor = LoadFactor(0.75);

    /// Validates a load factor.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidLoadFactor`] unless `value` is finite and
    /// strictly positive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::MapError;
    /// # use chain_hash::chain_table::LoadFactor;
    /// #
    /// assert_eq!(LoadFactor::new(0.5).map(LoadFactor::get), Ok(0.5));
    /// assert_eq!(LoadFactor::new(0.0), Err(MapError::InvalidLoadFactor(0.0)));
    /// ```
    pub fn new(value: f64) -> Result<Self, MapError> {
        if value.is_finite() && value > 0.0 {
            Ok(LoadFactor(value))
        } else {
            Err(MapError::InvalidLoadFactor(value))
        }
    }

    /// Returns the ratio.
    pub fn get(self) -> f64 {
        self.0
    }

    #[inline(always)]
    fn exceeded_by(self, len: usize, capacity: usize) -> bool {
        len as f64 > self.0 * capacity as f64
    }

    /// Smallest bucket count that holds `len` elements without exceeding
    /// this ratio, before power-of-two rounding.
    fn buckets_for(self, len: usize) -> usize {
        let exact = len as f64 / self.0;
        if exact >= MAX_CAPACITY as f64 {
            return MAX_CAPACITY;
        }
        let truncated = exact as usize;
        if (truncated as f64) < exact {
            truncated + 1
        } else {
            truncated
        }
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Growth policy applied on insertion.
///
/// [`Growth::Fixed`] keeps the bucket count chosen at construction no matter
/// how many elements are inserted, so chains lengthen as the table fills.
/// [`Growth::Rehash`] grows the bucket array (up to [`MAX_CAPACITY`])
/// before an insertion would exceed the load factor: at least doubling it,
/// and further when a small load factor needs more than one doubling.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Growth {
    /// Never rehash automatically.
    #[default]
    Fixed,
    /// Rehash when `len / capacity` would exceed the load factor.
    Rehash(LoadFactor),
}

type Link<V> = Option<Box<Node<V>>>;

struct Node<V> {
    hash: u64,
    value: V,
    next: Link<V>,
}

fn empty_buckets<V>(capacity: usize) -> Vec<Link<V>> {
    let mut buckets = Vec::with_capacity(capacity);
    buckets.resize_with(capacity, || None);
    buckets
}

/// Follows `depth` links down a chain and returns the slot found there.
fn slot_at<V>(mut slot: &mut Link<V>, depth: usize) -> &mut Link<V> {
    for _ in 0..depth {
        match slot {
            Some(node) => slot = &mut node.next,
            None => break,
        }
    }
    slot
}

/// Debug statistics for chain distribution analysis.
///
/// Available in tests and with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct ChainStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Number of buckets
    pub capacity: usize,
    /// Number of buckets holding at least one element
    pub occupied_buckets: usize,
    /// Length of the longest collision chain
    pub longest_chain: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Bucket utilization (occupied_buckets / capacity)
    pub bucket_utilization: f64,
    /// Mean chain length over occupied buckets
    pub mean_chain: f64,
}

#[cfg(any(test, feature = "stats"))]
impl ChainStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Chain Table Debug Statistics ===");
        println!(
            "Population: {}/{} buckets ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Bucket Usage: {}/{} ({:.2}% utilization)",
            self.occupied_buckets,
            self.capacity,
            self.bucket_utilization * 100.0
        );
        println!(
            "Chains: longest {}, mean {:.2} over occupied buckets",
            self.longest_chain, self.mean_chain
        );
    }
}

/// A hash table resolving collisions by separate chaining.
///
/// `ChainTable<V>` keeps a power-of-two array of buckets. Each bucket owns a
/// singly linked chain of values; the chain's nodes are owned one by the
/// next, so there are no raw pointers and no shared ownership. Like other raw
/// tables, it does not hash anything itself: every operation takes the
/// value's 64-bit hash and an equality predicate that identifies the value.
///
/// A hash is placed at `abs(hash as i64) mod capacity`. New values are
/// appended at the tail of their chain, so a chain lists its values in the
/// order they were first inserted. Overwriting a value never moves it.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::chain_table::ChainTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = ChainTable::with_capacity(100);
/// let hash = hash_id(123);
///
/// match table.entry(hash, |p: &Person| p.id == 123) {
///     chain_hash::chain_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     chain_hash::chain_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
/// assert_eq!(table.capacity(), 128);
/// ```
pub struct ChainTable<V> {
    buckets: Vec<Link<V>>,
    bucket_mask: usize,
    populated: usize,
    growth: Growth,
}

impl<V> Debug for ChainTable<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        let chains = self
            .buckets
            .iter()
            .enumerate()
            .filter(|(_, link)| link.is_some())
            .map(|(index, _)| format!("{index:02}x{:02}", self.chain(index).count()))
            .collect::<Vec<String>>();

        f.debug_struct("ChainTable")
            .field("populated", &self.populated)
            .field("capacity", &self.buckets.len())
            .field("growth", &self.growth)
            .field("chains", &chains)
            .finish()
    }
}

impl<V> Clone for ChainTable<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        let mut buckets = empty_buckets(self.buckets.len());

        for (source, target) in self.buckets.iter().zip(buckets.iter_mut()) {
            let mut tail = target;
            let mut cursor = source.as_deref();
            while let Some(node) = cursor {
                tail = &mut tail
                    .insert(Box::new(Node {
                        hash: node.hash,
                        value: node.value.clone(),
                        next: None,
                    }))
                    .next;
                cursor = node.next.as_deref();
            }
        }

        Self {
            buckets,
            bucket_mask: self.bucket_mask,
            populated: self.populated,
            growth: self.growth,
        }
    }
}

impl<V> Drop for ChainTable<V> {
    fn drop(&mut self) {
        // Unlink node by node; dropping a long chain recursively could
        // exhaust the stack.
        self.clear();
    }
}

impl<V> Default for ChainTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChainTable<V> {
    /// Creates an empty table with [`DEFAULT_CAPACITY`] buckets and
    /// [`Growth::Fixed`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let table: ChainTable<u32> = ChainTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty table whose bucket count is `capacity` rounded up to
    /// a power of two and clamped to [`MAX_CAPACITY`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let table: ChainTable<String> = ChainTable::with_capacity(100);
    /// assert_eq!(table.capacity(), 128);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_growth(capacity, Growth::Fixed)
    }

    /// Creates an empty table with a rounded bucket count and the given
    /// growth policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// # use chain_hash::chain_table::Growth;
    /// # use chain_hash::chain_table::LoadFactor;
    /// #
    /// let mut table = ChainTable::with_capacity_and_growth(4, Growth::Rehash(LoadFactor::DEFAULT));
    /// for n in 0..4u64 {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    /// assert_eq!(table.capacity(), 8);
    /// ```
    pub fn with_capacity_and_growth(capacity: usize, growth: Growth) -> Self {
        let capacity = round_up_to_power_of_two(capacity);
        Self {
            buckets: empty_buckets(capacity),
            bucket_mask: capacity - 1,
            populated: 0,
            growth,
        }
    }

    /// Returns the bucket a hash is placed in: `abs(hash) mod capacity`,
    /// reading the hash as a signed 64-bit integer.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let table: ChainTable<u8> = ChainTable::with_capacity(16);
    /// assert_eq!(table.bucket_index(35), 3);
    /// assert_eq!(table.bucket_index(-35i64 as u64), 3);
    /// ```
    #[inline(always)]
    pub fn bucket_index(&self, hash: u64) -> usize {
        ((hash as i64).unsigned_abs() & self.bucket_mask as u64) as usize
    }

    /// Returns an iterator over the chain stored in bucket `index`, from head
    /// to tail. An out-of-range index yields an empty chain.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(16);
    /// for n in [1u64, 17, 33] {
    ///     table.entry(n, |&v: &u64| v == n).or_insert(n);
    /// }
    /// let chain: Vec<u64> = table.chain(1).copied().collect();
    /// assert_eq!(chain, vec![1, 17, 33]);
    /// ```
    pub fn chain(&self, index: usize) -> Chain<'_, V> {
        Chain {
            cursor: self.buckets.get(index).and_then(|link| link.as_deref()),
        }
    }

    /// Returns an iterator over all values in the table.
    ///
    /// Values are yielded bucket by bucket, each chain from head to tail.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use chain_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table
    ///     .entry(hash_str("key1"), |s: &String| s == "key1")
    ///     .or_insert("key1".to_string());
    /// table
    ///     .entry(hash_str("key2"), |s: &String| s == "key2")
    ///     .or_insert("key2".to_string());
    ///
    /// assert_eq!(table.iter().count(), 2);
    /// ```
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            buckets: self.buckets.iter(),
            chain: Chain { cursor: None },
            remaining: self.populated,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The table is empty once the iterator is dropped, even if it was not
    /// run to completion. The bucket array is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(7, |&n: &u64| n == 7).or_insert(7);
    ///
    /// let values: Vec<u64> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, vec![7]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V> {
        Drain {
            table: self,
            bucket_index: 0,
        }
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns the number of buckets. Always a power of two.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the growth policy.
    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns the current ratio of elements to buckets.
    pub fn load_factor(&self) -> f64 {
        self.populated as f64 / self.buckets.len() as f64
    }

    /// Removes all elements from the table, keeping its bucket count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(1, |&n: &u64| n == 1).or_insert(1);
    /// table.entry(2, |&n: &u64| n == 2).or_insert(2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut link = bucket.take();
            while let Some(mut node) = link {
                link = node.next.take();
            }
        }
        self.populated = 0;
    }

    /// Grows the bucket array so that `len() + additional` elements stay
    /// within the load factor.
    ///
    /// Uses the policy's load factor, or [`LoadFactor::DEFAULT`] for
    /// [`Growth::Fixed`]. Never shrinks the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table: ChainTable<i32> = ChainTable::with_capacity(16);
    /// table.reserve(100);
    /// assert_eq!(table.capacity(), 256);
    ///
    /// table.reserve(1);
    /// assert_eq!(table.capacity(), 256);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        let load_factor = match self.growth {
            Growth::Rehash(load_factor) => load_factor,
            Growth::Fixed => LoadFactor::DEFAULT,
        };
        let required = load_factor.buckets_for(self.populated.saturating_add(additional));
        if required > self.buckets.len() {
            self.rehash(required);
        }
    }

    /// Removes and returns a value from the table.
    ///
    /// The successor of the removed node takes its place, so the rest of the
    /// chain keeps its order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(42, |&n: &u64| n == 42).or_insert(42);
    ///
    /// assert_eq!(table.remove(42, |&n| n == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(99, |&n| n == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        match self.entry_impl(hash, eq) {
            Entry::Occupied(entry) => Some(entry.remove()),
            Entry::Vacant(_) => None,
        }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// This is the insertion path. The chain in the hash's bucket is walked;
    /// if a value matches, the entry is occupied, otherwise it is vacant and
    /// positioned after the last node of the chain. With
    /// [`Growth::Rehash`], the table may grow before the chain is walked.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::Hash;
    /// # use core::hash::Hasher;
    /// #
    /// # use chain_hash::chain_table::ChainTable;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # fn hash_str(s: &str) -> u64 {
    /// #     let mut hasher = SipHasher::new();
    /// #     s.hash(&mut hasher);
    /// #     hasher.finish()
    /// # }
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// let hash = hash_str("hello");
    ///
    /// match table.entry(hash, |s: &String| s.starts_with("hello")) {
    ///     chain_hash::chain_table::Entry::Vacant(entry) => {
    ///         entry.insert("hello world".to_string());
    ///     }
    ///     chain_hash::chain_table::Entry::Occupied(mut entry) => {
    ///         *entry.get_mut() = "hello again".to_string();
    ///     }
    /// }
    ///
    /// assert_eq!(
    ///     table.find(hash, |s| s.starts_with("hello")),
    ///     Some(&"hello world".to_string())
    /// );
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        self.maybe_grow();
        self.entry_impl(hash, eq)
    }

    fn entry_impl(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V> {
        let index = self.bucket_index(hash);
        let position = self.locate(index, hash, eq);

        let Self {
            buckets, populated, ..
        } = self;
        match position {
            Ok(depth) => Entry::Occupied(OccupiedEntry {
                slot: slot_at(&mut buckets[index], depth),
                populated,
            }),
            Err(depth) => Entry::Vacant(VacantEntry {
                slot: slot_at(&mut buckets[index], depth),
                populated,
                hash,
            }),
        }
    }

    /// Walks the chain of bucket `index`. Returns `Ok(depth)` of the matching
    /// node, or `Err(length)` of the chain when nothing matches.
    fn locate(&self, index: usize, hash: u64, eq: impl Fn(&V) -> bool) -> Result<usize, usize> {
        let mut depth = 0;
        let mut cursor = self.buckets[index].as_deref();
        while let Some(node) = cursor {
            if node.hash == hash && eq(&node.value) {
                return Ok(depth);
            }
            depth += 1;
            cursor = node.next.as_deref();
        }
        Err(depth)
    }

    /// Finds a value in the table.
    ///
    /// This is the lookup path: the same bucket as [`entry`](Self::entry) is
    /// walked from head to tail. Returns `None` when the bucket is empty or
    /// no value in its chain matches.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(5, |&n: &u64| n == 5).or_insert(5);
    ///
    /// assert_eq!(table.find(5, |&n| n == 5), Some(&5));
    /// assert_eq!(table.find(6, |&n| n == 6), None);
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let mut cursor = self.buckets[self.bucket_index(hash)].as_deref();
        while let Some(node) = cursor {
            if node.hash == hash && eq(&node.value) {
                return Some(&node.value);
            }
            cursor = node.next.as_deref();
        }
        None
    }

    /// Finds a value in the table and returns a mutable reference to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    /// table.entry(5, |&(k, _): &(u64, u64)| k == 5).or_insert((5, 1));
    ///
    /// if let Some((_, count)) = table.find_mut(5, |&(k, _)| k == 5) {
    ///     *count += 1;
    /// }
    /// assert_eq!(table.find(5, |&(k, _)| k == 5), Some(&(5, 2)));
    /// ```
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.bucket_index(hash);
        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(node) = cursor {
            if node.hash == hash && eq(&node.value) {
                return Some(&mut node.value);
            }
            cursor = node.next.as_deref_mut();
        }
        None
    }

    fn maybe_grow(&mut self) {
        if let Growth::Rehash(load_factor) = self.growth {
            let capacity = self.buckets.len();
            let len = self.populated + 1;
            if capacity < MAX_CAPACITY && load_factor.exceeded_by(len, capacity) {
                self.rehash(load_factor.buckets_for(len).max(capacity * 2));
            }
        }
    }

    /// Relinks every node into a larger bucket array.
    ///
    /// Nodes that share a bucket after the rehash keep their relative order.
    fn rehash(&mut self, capacity: usize) {
        let capacity = round_up_to_power_of_two(capacity);
        if capacity <= self.buckets.len() {
            return;
        }

        let mut nodes = Vec::with_capacity(self.populated);
        for bucket in self.buckets.iter_mut() {
            let mut link = bucket.take();
            while let Some(mut node) = link {
                link = node.next.take();
                nodes.push(node);
            }
        }

        self.buckets = empty_buckets(capacity);
        self.bucket_mask = capacity - 1;

        // Pushing at the head in reverse order leaves every chain in forward
        // order without tracking a tail per bucket.
        for mut node in nodes.into_iter().rev() {
            let index = self.bucket_index(node.hash);
            node.next = self.buckets[index].take();
            self.buckets[index] = Some(node);
        }
    }

    /// Computes a histogram of chain lengths: `histogram[n]` is the number
    /// of buckets whose chain holds exactly `n` values.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let mut hist = alloc::vec![0usize; 1];
        for index in 0..self.buckets.len() {
            let length = self.chain(index).count();
            if length >= hist.len() {
                hist.resize(length + 1, 0);
            }
            hist[length] += 1;
        }
        hist
    }

    /// Returns chain distribution statistics for debugging.
    ///
    /// Available in tests and with the `stats` feature.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> ChainStats {
        let hist = self.chain_histogram();
        let capacity = self.buckets.len();
        let occupied_buckets = capacity - hist[0];

        ChainStats {
            populated: self.populated,
            capacity,
            occupied_buckets,
            longest_chain: hist.len() - 1,
            load_factor: self.load_factor(),
            bucket_utilization: occupied_buckets as f64 / capacity as f64,
            mean_chain: if occupied_buckets == 0 {
                0.0
            } else {
                self.populated as f64 / occupied_buckets as f64
            },
        }
    }

    /// Pretty-prints the chain-length histogram horizontally using stdout.
    ///
    /// Requires the `std` feature. Each row is a chain length, the bar its
    /// bucket count. Empty buckets are left out.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_histogram();
        let max = hist.iter().skip(1).copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!(
            "chain histogram ({} entries, {} empty buckets):",
            self.populated, hist[0]
        );

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let full = units / 8;
            let rem = units % 8;
            let mut bar = "█".repeat(full);
            if rem > 0 {
                let ch = match rem {
                    1 => '▏',
                    2 => '▎',
                    3 => '▍',
                    4 => '▌',
                    5 => '▋',
                    6 => '▊',
                    _ => '▉',
                };
                bar.push(ch);
            }
            bar
        };

        for (length, &count) in hist.iter().enumerate().skip(1) {
            if count == 0 {
                continue;
            }
            println!("{:>3} | {} ({})", length, make_bar(count), count);
        }
    }
}

/// A view into a single entry in the table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`ChainTable`].
///
/// [`entry`]: ChainTable::entry
///
/// # Examples
///
/// ```rust
/// # use chain_hash::chain_table::ChainTable;
/// # use chain_hash::chain_table::Entry;
/// #
/// let mut table = ChainTable::with_capacity(10);
///
/// match table.entry(3, |&n: &u64| n == 3) {
///     Entry::Vacant(entry) => {
///         entry.insert(3);
///     }
///     Entry::Occupied(entry) => {
///         println!("already present: {}", entry.get());
///     }
/// }
/// assert_eq!(table.len(), 1);
/// ```
pub enum Entry<'a, V> {
    /// The value is not present; inserting appends it to the chain tail
    Vacant(VacantEntry<'a, V>),
    /// The value is present in its bucket's chain
    Occupied(OccupiedEntry<'a, V>),
}

impl<'a, V> Entry<'a, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
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

    /// Inserts the value computed by `default` if the entry is vacant and
    /// returns a mutable reference to the value in the entry.
    ///
    /// The closure is not called when the entry is occupied.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to an occupied entry and returns a mutable reference to
    /// it. Returns `None` without inserting when the entry is vacant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::chain_table::ChainTable;
    /// #
    /// let mut table = ChainTable::with_capacity(10);
    ///
    /// let result = table.entry(42, |&(k, _): &(u64, u64)| k == 42).and_modify(|v| v.1 += 1);
    /// assert!(result.is_none());
    ///
    /// table.entry(42, |&(k, _): &(u64, u64)| k == 42).or_insert((42, 0));
    /// let result = table.entry(42, |&(k, _): &(u64, u64)| k == 42).and_modify(|v| v.1 += 1);
    /// assert_eq!(result, Some(&mut (42, 1)));
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
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the table.
///
/// Holds the empty link at the end of the target chain: either the empty
/// bucket head or the `next` link of the chain's last node.
pub struct VacantEntry<'a, V> {
    slot: &'a mut Link<V>,
    populated: &'a mut usize,
    hash: u64,
}

impl<'a, V> VacantEntry<'a, V> {
    /// Appends `value` at the tail of its bucket's chain and returns a
    /// mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        *self.populated += 1;
        let node = self.slot.insert(Box::new(Node {
            hash: self.hash,
            value,
            next: None,
        }));
        &mut node.value
    }
}

/// A view into an occupied entry in the table.
pub struct OccupiedEntry<'a, V> {
    slot: &'a mut Link<V>,
    populated: &'a mut usize,
}

impl<'a, V> OccupiedEntry<'a, V> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.slot.as_deref().expect(OCCUPIED).value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.slot.as_deref_mut().expect(OCCUPIED).value
    }

    /// Converts the entry into a mutable reference to its value, bound to
    /// the table's lifetime.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.slot.as_deref_mut().expect(OCCUPIED).value
    }

    /// Unlinks the entry from its chain and returns the value.
    pub fn remove(self) -> V {
        let node = self.slot.take().expect(OCCUPIED);
        let Node { value, next, .. } = *node;
        *self.slot = next;
        *self.populated -= 1;
        value
    }
}

/// An iterator over one bucket's chain, head to tail.
///
/// Created by [`ChainTable::chain`].
pub struct Chain<'a, V> {
    cursor: Option<&'a Node<V>>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.cursor?;
        self.cursor = node.next.as_deref();
        Some(&node.value)
    }
}

/// An iterator over the values of a [`ChainTable`].
///
/// Created by [`ChainTable::iter`]. Yields values bucket by bucket, each
/// chain from head to tail.
pub struct Iter<'a, V> {
    buckets: core::slice::Iter<'a, Link<V>>,
    chain: Chain<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.chain.next() {
                self.remaining -= 1;
                return Some(value);
            }
            self.chain = Chain {
                cursor: self.buckets.next()?.as_deref(),
            };
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

/// A draining iterator over the values of a [`ChainTable`].
///
/// Created by [`ChainTable::drain`]. Yields owned values and unlinks them
/// as it goes; dropping it empties whatever is left.
pub struct Drain<'a, V> {
    table: &'a mut ChainTable<V>,
    bucket_index: usize,
}

impl<V> Drop for Drain<'_, V> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<V> Iterator for Drain<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(bucket) = self.table.buckets.get_mut(self.bucket_index) {
            if let Some(node) = bucket.take() {
                let Node { value, next, .. } = *node;
                *bucket = next;
                self.table.populated -= 1;
                return Some(value);
            }
            self.bucket_index += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V> ExactSizeIterator for Drain<'_, V> {}
