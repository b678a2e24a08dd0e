//! Symbol database types.

use dangle_core::types::collections::SmallVec4;
use dangle_core::types::{FunctionId, ScopeId, TokenId, VarId};

/// A declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: VarId,
    pub name: String,
    pub name_token: TokenId,
    /// First token of the declared type (specifiers included).
    pub type_start: TokenId,
    /// Last token before the name, e.g. the `&` in `int & r`.
    pub type_end: TokenId,
    /// Innermost named scope the declaration belongs to.
    pub scope: ScopeId,
    /// Last name token of the type, e.g. `string` for `std::string`.
    pub type_name: String,
    pub is_local: bool,
    pub is_static: bool,
    pub is_argument: bool,
    pub is_reference: bool,
    pub is_pointer: bool,
    pub is_array: bool,
    pub is_class: bool,
    /// Class scope declared in this program for `type_name`, if any.
    pub type_scope: Option<ScopeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Namespace,
    Class,
    Function,
}

/// A lexical region. For braced scopes `start` is the `{` and `end` the
/// matching `}`; the global scope spans the whole token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub name: String,
    pub start: TokenId,
    pub end: TokenId,
    pub parent: Option<ScopeId>,
    pub function: Option<FunctionId>,
}

impl Scope {
    pub fn is_function(&self) -> bool {
        self.kind == ScopeKind::Function
    }
}

/// Return category of a function, read from the tokens before its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCategory {
    ByValue,
    Pointer,
    Reference,
    /// `const char *`; also counts as pointer-returning.
    ConstCharPointer,
}

impl ReturnCategory {
    pub fn returns_pointer(self) -> bool {
        matches!(self, Self::Pointer | Self::ConstCharPointer)
    }

    pub fn returns_reference(self) -> bool {
        self == Self::Reference
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub id: FunctionId,
    pub name: String,
    pub name_token: TokenId,
    pub return_category: ReturnCategory,
    pub scope: ScopeId,
    pub arguments: SmallVec4<VarId>,
}

/// Scopes, functions and variables of one token list. Immutable once built.
#[derive(Debug, Default)]
pub struct SymbolDatabase {
    pub(crate) scopes: Vec<Scope>,
    pub(crate) functions: Vec<Function>,
    pub(crate) variables: Vec<Variable>,
}

impl SymbolDatabase {
    /// All scopes in declaration order, the global scope first.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Function body scopes in declaration order.
    pub fn function_scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().filter(|s| s.is_function())
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    /// The function descriptor owning `scope`, if it is a function scope.
    pub fn function_of(&self, scope: &Scope) -> Option<&Function> {
        scope.function.and_then(|id| self.function(id))
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Variable bound to an optional id; `None` in, `None` out.
    pub fn variable_for(&self, id: Option<VarId>) -> Option<&Variable> {
        id.and_then(|id| self.variable(id))
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
