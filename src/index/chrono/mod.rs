//! Resource table keyed by table-allocated chronological identifiers.

use crate::data::ChronoResource;
use crate::error::ResidentError;
use crate::ident::ChronoId;
use crate::index::resource::{Iter, ResourceTable};
use crate::index::IndexOps;

/// A [`ResourceTable`] that numbers its records itself.
///
/// Every installed record gets the next value of a monotonic counter as its
/// identifier. The counter wraps after 2^32 allocations; the only job of the
/// retry loop in [`add`](ChronoTable::add) is to step over identifiers from
/// the previous lap that are still installed.
pub struct ChronoTable<T: ChronoResource> {
    table: ResourceTable<T>,
    alloc_id: u32,
}

impl<T: ChronoResource> ChronoTable<T> {
    pub fn new() -> Result<Self, ResidentError> {
        Self::with_first_id(1)
    }

    /// Start numbering at `first` instead of 1.
    pub fn with_first_id(first: u32) -> Result<Self, ResidentError> {
        Ok(ChronoTable {
            table: ResourceTable::new()?,
            alloc_id: first,
        })
    }

    /// Install `res` under a freshly allocated identifier and return it.
    ///
    /// # Safety
    ///
    /// Same contract as [`ResourceTable::add`]: the record must stay at this
    /// address, stay alive, and stay out of other tables until removed.
    pub unsafe fn add(&mut self, res: &mut T) -> ChronoId {
        loop {
            let id = ChronoId::new(self.alloc_id);
            self.alloc_id = self.alloc_id.wrapping_add(1);
            res.set_id(id);
            if self.table.add(&mut *res).is_ok() {
                return id;
            }
            // Wrapped onto a still-installed identifier; keep counting.
        }
    }

    #[inline]
    pub fn lookup(&self, id: &ChronoId) -> Option<&T> {
        self.table.lookup(id)
    }

    #[inline]
    pub fn remove(&mut self, id: &ChronoId) -> Option<&mut T> {
        self.table.remove(id)
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.table.iter()
    }

    #[inline]
    pub fn traverse(&mut self, op: impl FnMut(&mut T)) {
        self.table.traverse(op)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn show(&self, level: usize) {
        self.table.show(level)
    }

    #[inline]
    pub fn verify(&self) {
        self.table.verify()
    }
}

impl<T: ChronoResource> IndexOps for ChronoTable<T> {
    #[inline]
    fn len(&self) -> usize {
        self.table.len()
    }
}
