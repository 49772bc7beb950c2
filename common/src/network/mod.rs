pub mod probe;
pub mod range;
pub(crate) mod target;
