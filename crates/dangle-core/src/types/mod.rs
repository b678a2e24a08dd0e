//! Data structures and identifiers shared across dangle.
//! FxHashMap, SmallVec, index-backed and Spur-backed ID types.

pub mod collections;
pub mod identifiers;

pub use collections::{FxHashMap, FxHashSet, SmallVec};
pub use identifiers::{FileId, FunctionId, ScopeId, TokenId, VarId};
