mod geo;
pub(crate) mod id;

pub use geo::*;
