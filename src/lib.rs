pub mod permutable;
pub mod group;

pub use group::chain::{BasePoint, Closure, Level, Sifted, StabilizerChain};
pub use group::PermGroup;
pub use permutable::*;
