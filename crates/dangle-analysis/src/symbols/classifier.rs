//! Storage and kind predicates over resolved variables.
//!
//! Every predicate takes the optional variable id carried by a token, so
//! an unresolved token simply answers `false`.

use dangle_core::types::VarId;

use super::database::{SymbolDatabase, Variable};
use crate::tokens::TokenList;

#[derive(Debug, Clone, Copy)]
pub struct SymbolClassifier<'a> {
    db: &'a SymbolDatabase,
}

impl<'a> SymbolClassifier<'a> {
    pub fn new(db: &'a SymbolDatabase) -> Self {
        Self { db }
    }

    pub fn variable(&self, id: Option<VarId>) -> Option<&'a Variable> {
        self.db.variable_for(id)
    }

    /// Local, non-static and not a reference: storage dies with the frame.
    pub fn is_auto_var(&self, id: Option<VarId>) -> bool {
        self.variable(id)
            .is_some_and(|v| v.is_local && !v.is_static && !v.is_reference)
    }

    /// Local, non-static array.
    pub fn is_auto_var_array(&self, id: Option<VarId>) -> bool {
        self.variable(id)
            .is_some_and(|v| v.is_local && !v.is_static && v.is_array)
    }

    pub fn is_ref_arg(&self, id: Option<VarId>) -> bool {
        self.variable(id).is_some_and(|v| v.is_argument && v.is_reference)
    }

    pub fn is_ptr_arg(&self, id: Option<VarId>) -> bool {
        self.variable(id).is_some_and(|v| v.is_argument && v.is_pointer)
    }

    /// First constructor argument of a `NAME ( ... )` declaration.
    /// Copy-initialization `NAME = ...` is an ordinary local and has none.
    pub fn constructor_argument(&self, var: &Variable, tokens: &TokenList) -> Option<usize> {
        let name = var.name_token.index();
        (tokens.text_at(name, 1) == "(").then_some(name + 2)
    }

    /// Whether `&var` followed by the token at `next` takes the address of
    /// the whole object rather than of a member reached through it.
    ///
    /// A following `.` is tolerated only for non-pointer variables whose
    /// type is either builtin or a class declared in this program; two
    /// tokens later there must be no `.` either.
    pub fn takes_whole_object_address(&self, var: &Variable, tokens: &TokenList, next: usize) -> bool {
        let member_access_ok = tokens.text(next) != "."
            || (!var.is_pointer && (!var.is_class || var.type_scope.is_some()));
        member_access_ok && tokens.text_at(next, 2) != "."
    }
}
