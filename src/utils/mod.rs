//! Commonly used utilities.

pub mod hash;

pub mod prelude {
    pub use super::hash::{hash, hash32, FastHashMap, FastHashSet};
}
