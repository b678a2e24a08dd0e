//! Token pattern matching.
//!
//! A small pattern language evaluated against a forward token sequence.
//! Patterns are compiled once and shared by every rule that uses them.
//!
//! | Element     | Matches                                              |
//! |-------------|------------------------------------------------------|
//! | `text`      | a token with exactly that text                       |
//! | `%var%`     | any name token                                       |
//! | `%type%`    | a name token without a variable id, except `delete`  |
//! | `%any%`     | any token                                            |
//! | `%num%`     | a number literal                                     |
//! | `%str%`     | a string literal                                     |
//! | `[;{}]`     | any single-character token listed inside the brackets|
//! | `a\|b`      | either alternative                                   |
//! | `a\|`       | `a`, or nothing (the element is skipped)             |
//! | `!!a`       | any token other than `a`, or the end of the list     |

pub mod pattern;

pub use pattern::{Captures, Pattern};
