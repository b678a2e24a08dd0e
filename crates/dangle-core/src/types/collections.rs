//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;

/// SmallVec sized for pattern captures (patterns rarely exceed 8 elements).
pub type SmallVec8<T> = SmallVec<[T; 8]>;

/// SmallVec sized for function parameter lists.
pub type SmallVec4<T> = SmallVec<[T; 4]>;
