pub mod link;

pub use link::Link;
pub(crate) use link::{Chain, ChainPtrs};

use crate::ident::ChronoId;

/// Identifier contract consumed by the resource tables.
///
/// Key material behind an identifier (for example the backing bytes of a
/// borrowed string) must stay valid for as long as any installed record
/// carries it.
pub trait ResourceId: PartialEq {
    /// Smallest meaningful table width in bits; sets the initial bucket
    /// count.
    const MIN_INDEX_BITS: u32;
    /// Largest meaningful table width in bits; bounds mixer folding and
    /// table growth.
    const MAX_INDEX_BITS: u32;

    /// Unmasked bucket index material; the table masks it to its current
    /// width.
    fn index_hash(&self) -> usize;
}

/// Record contract: caller-owned storage embedding an identifier and the
/// intrusive chain link.
///
/// The table borrows records between `add` and `remove` and never allocates
/// per entry. A record must not be chained into more than one table, or
/// twice into the same table, at a time.
pub trait Resource: Sized {
    type Id: ResourceId;

    fn id(&self) -> &Self::Id;
    fn link(&self) -> &Link<Self>;
    fn link_mut(&mut self) -> &mut Link<Self>;

    /// Per-record diagnostics hook, reached from `show` at level >= 3.
    fn show(&self, _level: usize) {}
}

/// Records keyed by table-allocated chronological identifiers.
pub trait ChronoResource: Resource<Id = ChronoId> {
    fn set_id(&mut self, id: ChronoId);
}
