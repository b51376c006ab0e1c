//! Identifier adapters: the value types the tables hash and compare.

use std::ffi::{CStr, CString};

use crate::data::ResourceId;
use crate::error::{ResidentError, Result};
use crate::hash::pearson::string_index_hash;
use crate::hash::{fold_bits, IdInt};

/// Fixed-width unsigned integer identifier.
///
/// `MIN_BITS` sets the smallest meaningful table width; the largest is the
/// integer's own width. The default floor of four bits keeps freshly built
/// integer tables at 32 buckets.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct IntId<N: IdInt, const MIN_BITS: u32 = 4>(N);

impl<N: IdInt, const MIN_BITS: u32> IntId<N, MIN_BITS> {
    #[inline]
    pub const fn new(value: N) -> Self {
        IntId(value)
    }

    #[inline]
    pub fn value(self) -> N {
        self.0
    }
}

impl<N: IdInt, const MIN_BITS: u32> From<N> for IntId<N, MIN_BITS> {
    #[inline]
    fn from(value: N) -> Self {
        IntId(value)
    }
}

impl<N: IdInt, const MIN_BITS: u32> ResourceId for IntId<N, MIN_BITS> {
    const MIN_INDEX_BITS: u32 = MIN_BITS;
    const MAX_INDEX_BITS: u32 = N::BITS;

    #[inline]
    fn index_hash(&self) -> usize {
        fold_bits(self.0, MIN_BITS).as_index()
    }
}

/// Identifier allocated by a [`ChronoTable`](crate::ChronoTable) counter.
///
/// Same semantics as an integer identifier; only the width bounds differ
/// (eight bit floor, so chronological tables start at 512 buckets).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct ChronoId(u32);

impl ChronoId {
    #[inline]
    pub const fn new(value: u32) -> Self {
        ChronoId(value)
    }

    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl ResourceId for ChronoId {
    const MIN_INDEX_BITS: u32 = 8;
    const MAX_INDEX_BITS: u32 = 32;

    #[inline]
    fn index_hash(&self) -> usize {
        fold_bits(self.0, Self::MIN_INDEX_BITS).as_index()
    }
}

/// NUL-terminated byte-string identifier.
///
/// `Owned` copies the bytes on construction and frees them on drop; with
/// `Borrowed` the lifetime obligates the caller to keep the bytes alive for
/// the record's entire table membership. The two compare by content, so an
/// owned id and a borrowed id with equal bytes collide as duplicates.
#[derive(Clone, Debug)]
pub enum StringId<'a> {
    Owned(CString),
    Borrowed(&'a CStr),
}

impl StringId<'_> {
    /// Copy `name` into identifier-owned storage.
    pub fn owned(name: &CStr) -> Result<StringId<'static>> {
        let bytes = name.to_bytes_with_nul();
        let mut copy = Vec::new();
        copy.try_reserve_exact(bytes.len())
            .map_err(|_| ResidentError::IdAllocation(bytes.len()))?;
        copy.extend_from_slice(bytes);
        // SAFETY: the bytes came out of a CStr, so they hold exactly one
        // NUL, at the end.
        let copy = unsafe { CString::from_vec_with_nul_unchecked(copy) };
        Ok(StringId::Owned(copy))
    }

    #[inline]
    pub fn borrowed(name: &CStr) -> StringId<'_> {
        StringId::Borrowed(name)
    }

    #[inline]
    pub fn as_c_str(&self) -> &CStr {
        match self {
            StringId::Owned(name) => name.as_c_str(),
            StringId::Borrowed(name) => name,
        }
    }
}

impl PartialEq for StringId<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_c_str() == other.as_c_str()
    }
}

impl Eq for StringId<'_> {}

impl ResourceId for StringId<'_> {
    const MIN_INDEX_BITS: u32 = 8;
    const MAX_INDEX_BITS: u32 = 32;

    #[inline]
    fn index_hash(&self) -> usize {
        string_index_hash(self.as_c_str().to_bytes()).as_index()
    }
}
