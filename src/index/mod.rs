pub mod chrono;
pub mod resource;

/// Operations shared by the resource indexes.
pub trait IndexOps {
    /// Number of records currently installed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
