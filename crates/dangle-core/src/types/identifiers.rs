//! Typed identifiers.
//!
//! Arena indices are wrapped in distinct newtypes so a `VarId` cannot be
//! passed where a `TokenId` is expected. `FileId` wraps an interned
//! `lasso::Spur` instead of an index.

use lasso::Spur;
use serde::{Deserialize, Serialize};

macro_rules! define_index_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an ID from an arena index.
            ///
            /// Arenas hold at most `u32::MAX` entries. A larger index panics
            /// in debug builds and saturates to `u32::MAX` otherwise.
            pub fn new(index: usize) -> Self {
                let raw = u32::try_from(index);
                debug_assert!(raw.is_ok(), "arena index {index} exceeds u32::MAX");
                Self(raw.unwrap_or(u32::MAX))
            }

            /// The arena index this ID points at.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::new(index)
            }
        }
    };
}

define_index_id!(
    /// Position of a token in its token list.
    TokenId
);

define_index_id!(
    /// Variable identifier assigned by the symbol database.
    VarId
);

define_index_id!(
    /// Scope identifier, in declaration order.
    ScopeId
);

define_index_id!(
    /// Function descriptor identifier.
    FunctionId
);

/// Interned source file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub Spur);

impl FileId {
    pub fn new(spur: Spur) -> Self {
        Self(spur)
    }

    pub fn inner(self) -> Spur {
        self.0
    }
}

impl From<Spur> for FileId {
    fn from(spur: Spur) -> Self {
        Self(spur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_ids_round_trip_through_usize() {
        let id = TokenId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(VarId::from(7usize), VarId(7));
    }

    #[test]
    fn largest_index_fits() {
        let last = u32::MAX as usize;
        assert_eq!(TokenId::new(last).index(), last);
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "exceeds u32::MAX")]
    fn oversized_index_is_rejected() {
        let _ = VarId::new(u32::MAX as usize + 1);
    }

    #[test]
    fn index_ids_order_by_position() {
        assert!(ScopeId::new(1) < ScopeId::new(2));
    }
}
