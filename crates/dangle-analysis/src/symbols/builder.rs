//! Builds the symbol database from a token list.
//!
//! A single forward walk recognizes namespaces, class bodies and function
//! definitions at declaration level, declares parameters and locals, and
//! stamps variable ids onto identifier tokens using lexical frames
//! (innermost declaration wins). Declarations are recognized structurally:
//! type tokens, then `*`/`&` modifiers, then a name, then one of the
//! tokens that may follow a declarator.

use dangle_core::types::collections::SmallVec4;
use dangle_core::types::{FunctionId, FxHashMap, ScopeId, TokenId, VarId};

use super::database::{Function, ReturnCategory, Scope, ScopeKind, SymbolDatabase, Variable};
use super::keywords::{is_decl_specifier, is_standard_type, is_statement_keyword};
use crate::tokens::TokenList;

type Frame = FxHashMap<String, VarId>;

/// Result of recognizing one declarator.
struct DeclHead {
    type_start: usize,
    name: usize,
    /// Token right after the declared name.
    terminator: usize,
    type_name: String,
    is_static: bool,
    is_pointer: bool,
    is_reference: bool,
}

#[derive(Clone, Copy)]
enum DeclKind {
    Local,
    Argument,
    /// Globals and class members.
    Member,
}

impl SymbolDatabase {
    /// Build the database and stamp variable ids onto `tokens`.
    pub fn build(tokens: &mut TokenList) -> SymbolDatabase {
        let end = tokens.len();
        let mut builder = Builder {
            tokens,
            db: SymbolDatabase::default(),
            frames: vec![Frame::default()],
            class_scopes: FxHashMap::default(),
            class_members: FxHashMap::default(),
        };
        let global = builder.new_scope(ScopeKind::Global, String::new(), 0, end, None);
        builder.declarations(0, end, global);
        builder.resolve_class_types();

        let db = builder.db;
        tracing::debug!(
            scopes = db.scopes.len(),
            functions = db.functions.len(),
            variables = db.variables.len(),
            "symbol database built"
        );
        db
    }
}

struct Builder<'t> {
    tokens: &'t mut TokenList,
    db: SymbolDatabase,
    frames: Vec<Frame>,
    class_scopes: FxHashMap<String, ScopeId>,
    class_members: FxHashMap<String, Frame>,
}

impl Builder<'_> {
    fn t(&self, i: usize) -> &str {
        self.tokens.text(i)
    }

    fn is_name(&self, i: usize) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is_name())
    }

    fn is_string(&self, i: usize) -> bool {
        self.tokens
            .get(i)
            .is_some_and(|t| t.kind == crate::tokens::TokenKind::StringLit)
    }

    fn link(&self, i: usize) -> Option<usize> {
        self.tokens.link_of(i)
    }

    fn new_scope(
        &mut self,
        kind: ScopeKind,
        name: String,
        start: usize,
        end: usize,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let id = ScopeId::new(self.db.scopes.len());
        self.db.scopes.push(Scope {
            id,
            kind,
            name,
            start: TokenId::new(start),
            end: TokenId::new(end),
            parent,
            function: None,
        });
        id
    }

    fn lookup(&self, name: &str) -> Option<VarId> {
        self.frames.iter().rev().find_map(|f| f.get(name).copied())
    }

    // ---------------------------------------------------------------
    // Declaration level: global, namespace and class bodies
    // ---------------------------------------------------------------

    fn declarations(&mut self, start: usize, end: usize, scope: ScopeId) {
        let mut i = start;
        while i < end {
            let text = self.t(i).to_owned();
            i = match text.as_str() {
                ";" | "}" => i + 1,
                "public" | "private" | "protected" if self.t(i + 1) == ":" => i + 2,
                "namespace" => self.namespace(i, end, scope),
                "extern" if self.is_string(i + 1) && self.t(i + 2) == "{" => {
                    match self.link(i + 2) {
                        Some(close) => {
                            self.declarations(i + 3, close, scope);
                            close + 1
                        }
                        None => i + 1,
                    }
                }
                "template" if self.t(i + 1) == "<" => {
                    self.skip_template(i + 1, end).unwrap_or(i + 2)
                }
                "typedef" | "using" | "enum" => self.skip_statement(i, end),
                "class" | "struct" | "union" => match self.class(i, end, scope) {
                    Some(next) => next,
                    None => self.statement(i, end, scope),
                },
                _ => self.statement(i, end, scope),
            };
        }
    }

    fn namespace(&mut self, i: usize, end: usize, scope: ScopeId) -> usize {
        let mut j = i + 1;
        while j < end && !matches!(self.t(j), "{" | ";") {
            j += 1;
        }
        let Some(close) = (self.t(j) == "{").then(|| self.link(j)).flatten() else {
            return j + 1;
        };
        let name = if self.is_name(i + 1) {
            self.t(i + 1).to_owned()
        } else {
            String::new()
        };
        let id = self.new_scope(ScopeKind::Namespace, name, j, close, Some(scope));
        self.frames.push(Frame::default());
        self.declarations(j + 1, close, id);
        self.frames.pop();
        close + 1
    }

    /// `class|struct|union [NAME] [: bases] { ... }`; `None` when no body follows.
    fn class(&mut self, i: usize, end: usize, scope: ScopeId) -> Option<usize> {
        let mut j = i + 1;
        while j < end && !matches!(self.t(j), "{" | ";" | "(" | "=" | ")") {
            j = if self.t(j) == "<" {
                self.skip_template(j, end)?
            } else {
                j + 1
            };
        }
        if self.t(j) != "{" {
            return None;
        }
        let close = self.link(j)?;
        let name = if self.is_name(i + 1) {
            self.t(i + 1).to_owned()
        } else {
            String::new()
        };
        let id = self.new_scope(ScopeKind::Class, name.clone(), j, close, Some(scope));
        if !name.is_empty() {
            self.class_scopes.entry(name.clone()).or_insert(id);
        }

        self.frames.push(Frame::default());
        self.declarations(j + 1, close, id);
        let members = self.frames.pop().unwrap_or_default();
        if !name.is_empty() {
            self.class_members.entry(name).or_insert(members);
        }

        // `} a, *b;` declares objects; anything else starts a new declaration.
        let mut k = close + 1;
        while k < end && (self.is_name(k) || matches!(self.t(k), "*" | "&" | ",")) {
            k += 1;
        }
        Some(if self.t(k) == ";" { k + 1 } else { close + 1 })
    }

    fn statement(&mut self, i: usize, end: usize, scope: ScopeId) -> usize {
        if let Some(next) = self.function(i, end, scope) {
            return next;
        }
        self.declaration(i, end, scope, DeclKind::Member);
        self.skip_statement(i, end)
    }

    // ---------------------------------------------------------------
    // Functions
    // ---------------------------------------------------------------

    /// Recognize a function definition starting at `i` and process its body.
    fn function(&mut self, i: usize, end: usize, scope: ScopeId) -> Option<usize> {
        let mut p = i;
        let mut name_idx = None;
        while p < end {
            match self.t(p) {
                "(" => break,
                "operator" => {
                    let mut q = p + 1;
                    if matches!((self.t(q), self.t(q + 1)), ("(", ")") | ("[", "]")) {
                        q += 2;
                    } else {
                        q += 1;
                    }
                    if self.t(q) != "(" {
                        return None;
                    }
                    name_idx = Some(p);
                    p = q;
                    break;
                }
                ";" | "{" | "}" | "=" | "[" => return None,
                "<" => p = self.skip_template(p, end).unwrap_or(p + 1),
                _ => p += 1,
            }
        }
        if p >= end || p == i {
            return None;
        }
        let open = p;
        let name_idx = match name_idx {
            Some(idx) => idx,
            None => {
                let idx = open - 1;
                let text = self.t(idx);
                if !self.is_name(idx) || is_statement_keyword(text) || is_decl_specifier(text) {
                    return None;
                }
                if is_standard_type(text) {
                    return None;
                }
                idx
            }
        };
        let close = self.link(open)?;

        let body = self.function_body_start(close + 1, end)?;
        let body_end = self.link(body)?;

        let mut name_start = name_idx;
        while name_start >= i + 2 && self.t(name_start - 1) == "::" && self.is_name(name_start - 2) {
            name_start -= 2;
        }
        if name_start > i && self.t(name_start - 1) == "~" {
            name_start -= 1;
        }
        let return_category = self.return_category(i, name_start);
        let qualifier = (name_start < name_idx && self.t(name_idx - 1) == "::")
            .then(|| self.t(name_idx - 2).to_owned());
        let name = if self.t(name_idx) == "operator" {
            (name_idx..open).map(|k| self.t(k)).collect::<String>()
        } else {
            self.t(name_idx).to_owned()
        };

        let scope_id = self.new_scope(ScopeKind::Function, name.clone(), body, body_end, Some(scope));
        let fid = FunctionId::new(self.db.functions.len());
        self.db.functions.push(Function {
            id: fid,
            name,
            name_token: TokenId::new(name_idx),
            return_category,
            scope: scope_id,
            arguments: SmallVec4::new(),
        });
        self.db.scopes[scope_id.index()].function = Some(fid);

        let depth = self.frames.len();
        if let Some(members) = qualifier.and_then(|q| self.class_members.get(&q).cloned()) {
            self.frames.push(members);
        }
        self.frames.push(Frame::default());
        let arguments = self.parameters(open, close, scope_id);
        self.db.functions[fid.index()].arguments = arguments;
        self.function_body(body + 1, body_end, scope_id);
        self.frames.truncate(depth);

        Some(body_end + 1)
    }

    /// Skip trailing qualifiers and constructor initializers after the
    /// parameter list; returns the `{` of the body if there is one.
    fn function_body_start(&self, mut q: usize, end: usize) -> Option<usize> {
        loop {
            match self.t(q) {
                "const" | "volatile" | "override" | "final" | "&" | "&&" | "mutable" => q += 1,
                "noexcept" | "throw" => {
                    q += 1;
                    if self.t(q) == "(" {
                        q = self.link(q)? + 1;
                    }
                }
                // trailing return type (`->` is tokenized as `.`)
                "." => {
                    while q < end && !matches!(self.t(q), "{" | ";") {
                        q += 1;
                    }
                }
                _ => break,
            }
        }
        if self.t(q) == ":" {
            q += 1;
            loop {
                while self.is_name(q) || self.t(q) == "::" {
                    q += 1;
                }
                if self.t(q) == "<" {
                    q = self.skip_template(q, end)?;
                }
                if !matches!(self.t(q), "(" | "{") {
                    return None;
                }
                q = self.link(q)? + 1;
                if self.t(q) == "," {
                    q += 1;
                    continue;
                }
                break;
            }
        }
        (q < end && self.t(q) == "{").then_some(q)
    }

    fn return_category(&self, statement_start: usize, name_start: usize) -> ReturnCategory {
        if name_start >= statement_start + 3
            && self.t(name_start - 3) == "const"
            && self.t(name_start - 2) == "char"
            && self.t(name_start - 1) == "*"
        {
            return ReturnCategory::ConstCharPointer;
        }
        if name_start <= statement_start {
            return ReturnCategory::ByValue;
        }
        match self.t(name_start - 1) {
            "*" => ReturnCategory::Pointer,
            "&" => ReturnCategory::Reference,
            _ => ReturnCategory::ByValue,
        }
    }

    fn parameters(&mut self, open: usize, close: usize, scope: ScopeId) -> SmallVec4<VarId> {
        let mut args = SmallVec4::new();
        let mut segment = open + 1;
        let mut j = open + 1;
        while j <= close {
            if j == close || self.t(j) == "," {
                if segment < j {
                    if let Some(id) = self.parameter(segment, j, scope) {
                        args.push(id);
                    }
                }
                segment = j + 1;
                j += 1;
                continue;
            }
            j = match self.t(j) {
                "(" | "[" | "{" => self.link(j).map_or(j + 1, |l| l + 1),
                "<" => self.skip_template(j, close).unwrap_or(j + 1),
                _ => j + 1,
            };
        }
        args
    }

    fn parameter(&mut self, start: usize, end: usize, scope: ScopeId) -> Option<VarId> {
        let head = self.scan_declarator(start, end)?;
        let term = head.terminator;
        if term != end && !matches!(self.t(term), "=" | "[") {
            return None;
        }
        let is_array = term != end && self.t(term) == "[";
        Some(self.add_variable(&head, DeclKind::Argument, is_array, scope))
    }

    // ---------------------------------------------------------------
    // Function bodies
    // ---------------------------------------------------------------

    fn function_body(&mut self, start: usize, end: usize, scope: ScopeId) {
        let base = self.frames.len();
        let mut i = start;
        let mut statement_start = true;
        while i < end {
            let text = self.t(i).to_owned();
            match text.as_str() {
                "{" => {
                    self.frames.push(Frame::default());
                    statement_start = true;
                    i += 1;
                    continue;
                }
                "}" => {
                    if self.frames.len() > base {
                        self.frames.pop();
                    }
                    statement_start = true;
                    i += 1;
                    continue;
                }
                ";" => {
                    statement_start = true;
                    i += 1;
                    continue;
                }
                "for" if self.t(i + 1) == "(" => {
                    statement_start = true;
                    i += 2;
                    continue;
                }
                "class" | "struct" | "union" | "enum" if statement_start => {
                    if let Some(next) = self.skip_local_type(i, end) {
                        statement_start = false;
                        i = next;
                        continue;
                    }
                }
                _ => {}
            }

            if statement_start {
                statement_start = false;
                if let Some(next) = self.declaration(i, end, scope, DeclKind::Local) {
                    i = next;
                    continue;
                }
            }

            let resolvable = self.is_name(i)
                && self.tokens.var_id(i).is_none()
                && !matches!(self.tokens.text_at(i, -1), "." | "::");
            if resolvable {
                if let Some(id) = self.lookup(&text) {
                    self.tokens.set_var_id(i, id);
                }
            }

            statement_start = match text.as_str() {
                "else" | "do" => true,
                ")" => self
                    .link(i)
                    .is_some_and(|open| matches!(self.tokens.text_at(open, -1), "if" | "while" | "switch" | "for")),
                _ => false,
            };
            i += 1;
        }
        self.frames.truncate(base);
    }

    /// Skip a local `struct S { ... }` definition.
    fn skip_local_type(&self, i: usize, end: usize) -> Option<usize> {
        let mut j = i + 1;
        while j < end && !matches!(self.t(j), "{" | ";" | "=" | "(") {
            j += 1;
        }
        (self.t(j) == "{").then(|| self.link(j)).flatten().map(|close| close + 1)
    }

    // ---------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------

    /// Declare every declarator of the declaration starting at `i`.
    /// Returns the index right after the first declared name.
    fn declaration(&mut self, i: usize, end: usize, scope: ScopeId, kind: DeclKind) -> Option<usize> {
        let head = self.scan_declarator(i, end)?;
        let term = self.t(head.terminator);
        let accepted = match kind {
            DeclKind::Local => matches!(term, ";" | "=" | "[" | "," | "(" | "{" | ":"),
            _ => matches!(term, ";" | "=" | "[" | "," | "{" | ":"),
        };
        if !accepted {
            return None;
        }
        let is_array = term == "[";
        self.add_variable(&head, kind, is_array, scope);
        let after_first = head.name + 1;

        let mut j = head.terminator;
        loop {
            j = self.skip_initializer(j, end);
            if j >= end || self.t(j) != "," {
                break;
            }
            let mut m = j + 1;
            let mut is_pointer = false;
            let mut is_reference = false;
            while m < end {
                match self.t(m) {
                    "*" => is_pointer = true,
                    "&" | "&&" => is_reference = true,
                    "const" | "volatile" => {}
                    _ => break,
                }
                m += 1;
            }
            if !self.is_name(m) || is_statement_keyword(self.t(m)) {
                break;
            }
            let next_term = self.t(m + 1);
            if !matches!(next_term, ";" | "=" | "[" | "," | "(" | "{") {
                break;
            }
            let sibling = DeclHead {
                type_start: head.type_start,
                name: m,
                terminator: m + 1,
                type_name: head.type_name.clone(),
                is_static: head.is_static,
                is_pointer,
                is_reference,
            };
            let is_array = next_term == "[";
            self.add_variable(&sibling, kind, is_array, scope);
            j = m + 1;
        }
        Some(after_first)
    }

    /// Recognize `type-tokens [*&]* NAME` starting at `start`.
    fn scan_declarator(&self, start: usize, limit: usize) -> Option<DeclHead> {
        if !self.is_name(start) || is_statement_keyword(self.t(start)) {
            return None;
        }
        let mut k = start;
        while k < limit {
            let text = self.t(k);
            if self.is_name(k) {
                if is_statement_keyword(text) {
                    return None;
                }
                k += 1;
                continue;
            }
            match text {
                "::" | "*" | "&" | "&&" => k += 1,
                "<" => k = self.skip_template(k, limit)?,
                _ => break,
            }
        }
        if k <= start + 1 || k > limit {
            return None;
        }

        let name = k - 1;
        let name_text = self.t(name);
        if !self.is_name(name)
            || is_decl_specifier(name_text)
            || is_standard_type(name_text)
            || self.t(name - 1) == "::"
        {
            return None;
        }

        let mut head = DeclHead {
            type_start: start,
            name,
            terminator: k,
            type_name: String::new(),
            is_static: false,
            is_pointer: false,
            is_reference: false,
        };
        let mut has_type = false;
        let mut idx = start;
        while idx < name {
            match self.t(idx) {
                "*" => head.is_pointer = true,
                "&" | "&&" => head.is_reference = true,
                "static" | "extern" => head.is_static = true,
                "<" => {
                    idx = self.skip_template(idx, name)?;
                    continue;
                }
                text if self.is_name(idx) && !is_decl_specifier(text) => {
                    has_type = true;
                    head.type_name = text.to_owned();
                }
                _ => {}
            }
            idx += 1;
        }
        has_type.then_some(head)
    }

    fn add_variable(&mut self, head: &DeclHead, kind: DeclKind, is_array: bool, scope: ScopeId) -> VarId {
        let id = VarId::new(self.db.variables.len());
        let name = self.t(head.name).to_owned();
        let is_class =
            !is_standard_type(&head.type_name) && !head.is_pointer && !head.is_reference;
        self.db.variables.push(Variable {
            id,
            name: name.clone(),
            name_token: TokenId::new(head.name),
            type_start: TokenId::new(head.type_start),
            type_end: TokenId::new(head.name.saturating_sub(1)),
            scope,
            type_name: head.type_name.clone(),
            is_local: matches!(kind, DeclKind::Local),
            is_static: head.is_static,
            is_argument: matches!(kind, DeclKind::Argument),
            is_reference: head.is_reference,
            is_pointer: head.is_pointer,
            is_array,
            is_class,
            type_scope: None,
        });
        self.tokens.set_var_id(head.name, id);
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name, id);
        }
        id
    }

    fn resolve_class_types(&mut self) {
        for var in self.db.variables.iter_mut().filter(|v| v.is_class) {
            var.type_scope = self.class_scopes.get(&var.type_name).copied();
        }
    }

    // ---------------------------------------------------------------
    // Skipping helpers
    // ---------------------------------------------------------------

    /// Skip a `<...>` template argument list starting at `open`; returns the
    /// index after the closing `>`, or `None` if this is not a template list.
    fn skip_template(&self, open: usize, limit: usize) -> Option<usize> {
        let mut depth: i32 = 0;
        let mut j = open;
        while j < limit {
            match self.t(j) {
                "<" => depth += 1,
                ">" => depth -= 1,
                ">>" => depth -= 2,
                "(" | "[" => {
                    j = self.link(j)? + 1;
                    continue;
                }
                ";" | "{" | "}" | ")" | "]" => return None,
                _ => {}
            }
            j += 1;
            if depth <= 0 {
                return Some(j);
            }
        }
        None
    }

    /// Advance to the next top-level `,` or `;` of a declaration.
    fn skip_initializer(&self, mut j: usize, end: usize) -> usize {
        while j < end {
            match self.t(j) {
                "," | ";" | ")" | "]" | "}" => return j,
                "(" | "[" | "{" => j = self.link(j).map_or(j + 1, |l| l + 1),
                _ => j += 1,
            }
        }
        end
    }

    /// Index after the statement starting at `i`.
    fn skip_statement(&self, i: usize, end: usize) -> usize {
        let mut j = i;
        while j < end {
            match self.t(j) {
                ";" => return j + 1,
                "{" => {
                    let Some(close) = self.link(j) else {
                        return j + 1;
                    };
                    let after = close + 1;
                    return if self.t(after) == ";" { after + 1 } else { after };
                }
                "(" | "[" => j = self.link(j).map_or(j + 1, |l| l + 1),
                "}" => return j + 1,
                _ => j += 1,
            }
        }
        end.max(i + 1)
    }
}
