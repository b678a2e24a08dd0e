//! Symbol database: scopes, functions and variables resolved over a token
//! list, plus the storage/kind predicates the checks query.

mod builder;
pub mod classifier;
pub mod database;
mod keywords;

pub use classifier::SymbolClassifier;
pub use database::{Function, ReturnCategory, Scope, ScopeKind, SymbolDatabase, Variable};
