//! The hash-indexed resource table.
//!
//! Buckets are intrusive chains, so installing a record never allocates; the
//! table grows by linear hashing, splitting one bucket at a time instead of
//! rehashing everything at a high-water mark.

use core::fmt;
use core::mem;
use core::ptr::NonNull;

use log::{debug, warn};

use crate::config::TableConfig;
use crate::data::{Chain, ChainPtrs, Resource, ResourceId};
use crate::error::{DuplicateId, ResidentError};
use crate::hint::{likely, unlikely};
use crate::index::IndexOps;

/// Hash-indexed container of caller-owned records.
///
/// The table borrows records between [`add`](ResourceTable::add) and
/// [`remove`](ResourceTable::remove); it owns nothing but its bucket array.
/// Callers serialize access externally.
pub struct ResourceTable<T: Resource> {
    // Physical length is always hash_ix_split_mask + 1. Buckets at or past
    // table_size() are empty until the current split round reaches them.
    buckets: Vec<Chain<T>>,

    // Records currently linked into any chain.
    n_in_use: usize,

    // Low-bit mask of the previous power-of-two size: the region whose
    // buckets may still be waiting to split.
    hash_ix_mask: usize,

    // Low-bit mask of the doubled region, one bit wider.
    hash_ix_split_mask: usize,

    // The bucket that splits next. Buckets below it already split in this
    // round and index with the wide mask; the rest still share pairs.
    next_split_index: usize,
}

impl<T: Resource> ResourceTable<T> {
    /// An empty table sized one split step past the identifier's minimum
    /// width.
    pub fn new() -> Result<Self, ResidentError> {
        Self::with_config(&TableConfig::default())
    }

    pub fn with_config(config: &TableConfig) -> Result<Self, ResidentError> {
        let bits = config.table_index_bits::<T::Id>();
        let len = 1usize << bits;
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(len)
            .map_err(|_| ResidentError::TableAllocation(len))?;
        buckets.resize_with(len, Chain::default);
        Ok(ResourceTable {
            buckets,
            n_in_use: 0,
            hash_ix_mask: (len >> 1) - 1,
            hash_ix_split_mask: len - 1,
            // The starting round is complete: every bucket is addressable
            // through the wide mask, and the first overflow doubles.
            next_split_index: len >> 1,
        })
    }

    /// Logical bucket count: previously split region plus this round's
    /// progress.
    #[inline]
    fn table_size(&self) -> usize {
        self.hash_ix_mask + 1 + self.next_split_index
    }

    /// Buckets currently in use for indexing.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.table_size()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.n_in_use
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_in_use == 0
    }

    // The classical linear-hashing selection rule: buckets below the split
    // index already split this round and use the wider mask; the rest still
    // share their pair.
    #[inline]
    fn bucket_index_raw(&self, h: usize) -> usize {
        let b = h & self.hash_ix_mask;
        if b >= self.next_split_index {
            b
        } else {
            h & self.hash_ix_split_mask
        }
    }

    #[inline]
    fn bucket_index(&self, id: &T::Id) -> usize {
        self.bucket_index_raw(id.index_hash())
    }

    fn chain_contains(&self, bucket: usize, id: &T::Id) -> bool {
        self.buckets[bucket]
            .iter_ptrs()
            .any(|res| unsafe { res.as_ref() }.id() == id)
    }

    /// Install `res`.
    ///
    /// Returns [`DuplicateId`] (record untouched) if an equal identifier is
    /// already live. At most one split step runs per call, so the work is
    /// bounded by the target chain length plus one bucket's rehash.
    ///
    /// # Safety
    ///
    /// Until removed again, the record must stay at this address, stay
    /// alive, and must not be handed to any other table (or to this one
    /// twice).
    pub unsafe fn add(&mut self, res: &mut T) -> Result<(), DuplicateId> {
        let bucket = self.bucket_index(res.id());
        if self.chain_contains(bucket, res.id()) {
            return Err(DuplicateId);
        }
        if unlikely(self.n_in_use > self.table_size()) {
            self.split_bucket();
        }
        // The split may have moved this identifier's bucket.
        let bucket = self.bucket_index(res.id());
        self.buckets[bucket].push_front(NonNull::from(res));
        self.n_in_use += 1;
        Ok(())
    }

    /// The first installed record with an equal identifier, if any.
    #[inline]
    pub fn lookup(&self, id: &T::Id) -> Option<&T> {
        self.find(id.index_hash(), |record| likely(record.id() == id))
    }

    /// Probe with precomputed index material.
    ///
    /// Useful when an identifier of the record's exact type cannot be built
    /// for the probe, such as querying an owned-string table with a
    /// short-lived borrowed name.
    pub fn find(&self, hash: usize, mut eq: impl FnMut(&T) -> bool) -> Option<&T> {
        let bucket = self.bucket_index_raw(hash);
        for res in self.buckets[bucket].iter_ptrs() {
            let record = unsafe { &*res.as_ptr() };
            if eq(record) {
                return Some(record);
            }
        }
        None
    }

    /// Unlink and return the record installed under `id`, if any.
    pub fn remove(&mut self, id: &T::Id) -> Option<&mut T> {
        let bucket = self.bucket_index(id);
        let hit = unsafe { self.buckets[bucket].find_unlink(|res| res.id() == id) }?;
        self.n_in_use -= 1;
        Some(unsafe { &mut *hit.as_ptr() })
    }

    /// Visit every installed record exactly once, in bucket order.
    ///
    /// Each record's successor is captured before `op` runs, so `op` may
    /// unlink the record it was handed. Installing new records during the
    /// traversal is impossible (the table stays mutably borrowed).
    pub fn traverse(&mut self, mut op: impl FnMut(&mut T)) {
        for bucket in 0..self.table_size() {
            let mut cursor = self.buckets[bucket].iter_ptrs();
            while let Some(res) = cursor.next() {
                op(unsafe { &mut *res.as_ptr() });
            }
        }
    }

    /// Unlink every record, handing each to `op` after it has left the
    /// table.
    pub fn remove_all(&mut self, mut op: impl FnMut(&mut T)) {
        for bucket in 0..self.table_size() {
            unsafe {
                while let Some(res) = self.buckets[bucket].pop_front() {
                    op(&mut *res.as_ptr());
                }
            }
        }
        self.n_in_use = 0;
    }

    /// Restartable forward iterator over every installed record, ascending
    /// bucket order. Mutating the table mid-iteration is undefined.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            buckets: &self.buckets[..self.table_size()],
            next_bucket: 0,
            cursor: ChainPtrs::done(),
            remaining: self.n_in_use,
        }
    }

    /// Chain occupancy statistics over the in-use buckets.
    pub fn occupancy(&self) -> Occupancy {
        let buckets = self.table_size();
        let mut entries = 0usize;
        let mut max = 0usize;
        let mut sum_sq = 0f64;
        for chain in &self.buckets[..buckets] {
            let n = chain.len();
            entries += n;
            max = max.max(n);
            sum_sq += (n * n) as f64;
        }
        let mean = entries as f64 / buckets as f64;
        let stddev = (sum_sq / buckets as f64 - mean * mean).max(0.0).sqrt();
        Occupancy {
            buckets,
            entries,
            mean,
            stddev,
            max,
        }
    }

    /// Write human-readable diagnostics to stdout. Level 3 and up also asks
    /// each record to show itself.
    pub fn show(&self, level: usize) {
        println!("{}", self.occupancy());
        if level >= 3 {
            for record in self.iter() {
                record.show(level);
            }
        }
    }

    // One linear-hashing split step: double the head array if the previous
    // round finished, then rehash exactly one bucket.
    fn split_bucket(&mut self) {
        if self.next_split_index > self.hash_ix_mask {
            let new_len = self.buckets.len() * 2;
            if new_len.trailing_zeros() > T::Id::MAX_INDEX_BITS {
                // The identifier has no hash bits left to split on.
                return;
            }
            let old = mem::replace(&mut self.buckets, Vec::new());
            let mut grown = Vec::new();
            if grown.try_reserve_exact(new_len).is_err() {
                // Load stays above target until a later add retries the
                // doubling; correctness is unaffected.
                warn!(
                    "bucket array growth to {} chain heads failed; split deferred",
                    new_len
                );
                self.buckets = old;
                return;
            }
            // Moving the heads transfers the chains; no record is touched.
            grown.extend(old);
            grown.resize_with(new_len, Chain::default);
            self.buckets = grown;
            self.hash_ix_mask = self.hash_ix_split_mask;
            self.hash_ix_split_mask = new_len - 1;
            self.next_split_index = 0;
            debug!("doubled bucket array to {} chain heads", new_len);
        }

        // Rehash only the records of the bucket being split; each lands back
        // where it was or in its shadow bucket one old-table-size higher.
        let mut detached = mem::take(&mut self.buckets[self.next_split_index]);
        self.next_split_index += 1;
        unsafe {
            while let Some(res) = detached.pop_front() {
                let bucket = self.bucket_index(res.as_ref().id());
                self.buckets[bucket].push_front(res);
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(debug_assertions)] {
        impl<T: Resource> ResourceTable<T> {
            /// Walk every chain and assert the table invariants: mask
            /// arithmetic, per-record bucket placement, and the installed
            /// count.
            pub fn verify(&self) {
                assert_eq!(self.buckets.len(), self.hash_ix_split_mask + 1);
                assert_eq!(self.hash_ix_split_mask, 2 * (self.hash_ix_mask + 1) - 1);
                assert!(self.next_split_index <= self.hash_ix_mask + 1);
                let mut counted = 0;
                for bucket in 0..self.buckets.len() {
                    for res in self.buckets[bucket].iter_ptrs() {
                        let record = unsafe { res.as_ref() };
                        assert!(bucket < self.table_size());
                        assert_eq!(self.bucket_index(record.id()), bucket);
                        counted += 1;
                    }
                }
                assert_eq!(counted, self.n_in_use);
            }
        }
    } else {
        impl<T: Resource> ResourceTable<T> {
            /// Invariant checks are compiled out of release builds.
            #[inline]
            pub fn verify(&self) {}
        }
    }
}

impl<T: Resource> IndexOps for ResourceTable<T> {
    #[inline]
    fn len(&self) -> usize {
        self.n_in_use
    }
}

unsafe impl<T: Resource + Send> Send for ResourceTable<T> {}
unsafe impl<T: Resource + Sync> Sync for ResourceTable<T> {}

/// Per-bucket chain statistics, as printed by
/// [`show`](ResourceTable::show).
#[derive(Clone, Debug)]
pub struct Occupancy {
    pub buckets: usize,
    pub entries: usize,
    pub mean: f64,
    pub stddev: f64,
    pub max: usize,
}

impl fmt::Display for Occupancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buckets, {} entries installed, chain occupancy mean {:.2} stddev {:.2} max {}",
            self.buckets, self.entries, self.mean, self.stddev, self.max
        )
    }
}

/// Forward iterator over every installed record.
pub struct Iter<'a, T: Resource> {
    buckets: &'a [Chain<T>],
    next_bucket: usize,
    cursor: ChainPtrs<T>,
    remaining: usize,
}

impl<'a, T: Resource> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(res) = self.cursor.next() {
                self.remaining -= 1;
                return Some(unsafe { &*res.as_ptr() });
            }
            if self.next_bucket >= self.buckets.len() {
                return None;
            }
            self.cursor = self.buckets[self.next_bucket].iter_ptrs();
            self.next_bucket += 1;
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Resource> ExactSizeIterator for Iter<'_, T> {}
impl<T: Resource> core::iter::FusedIterator for Iter<'_, T> {}

unsafe impl<T: Resource + Sync> Send for Iter<'_, T> {}
unsafe impl<T: Resource + Sync> Sync for Iter<'_, T> {}
