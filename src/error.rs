use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResidentError {
    #[error("allocation of a {0} entry bucket array failed")]
    TableAllocation(usize),
    #[error("copy of a {0} byte string identifier failed")]
    IdAllocation(usize),
}

pub type Result<T> = std::result::Result<T, ResidentError>;

/// `add` found a live record with an equal identifier.
///
/// This is an ordinary domain outcome, not an environmental failure; the
/// caller's record is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("identifier is already installed")]
pub struct DuplicateId;
