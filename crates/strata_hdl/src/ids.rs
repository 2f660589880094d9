//! Opaque ID newtypes for arena-stored design objects.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, `Ord`, and
//! `Serialize`/`Deserialize`. IDs are handed out by
//! [`Arena::alloc`](crate::arena::Arena::alloc) in increasing order, so
//! ordering by ID is ordering by creation.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Identity of a value node in a [`ValueDb`](crate::db::ValueDb).
    ///
    /// Two IDs are equal only if they name the same node; numerically equal
    /// constants built separately have distinct IDs.
    ValueId
);

define_id!(
    /// Identity of an [`Array`](crate::array::Array) in a [`ValueDb`](crate::db::ValueDb).
    ArrayId
);
