//! Keyword tables used by the declaration recognizer.

/// Builtin types; a variable of one of these is never a class object.
pub(crate) fn is_standard_type(text: &str) -> bool {
    matches!(
        text,
        "bool"
            | "char"
            | "char16_t"
            | "char32_t"
            | "wchar_t"
            | "short"
            | "int"
            | "long"
            | "float"
            | "double"
            | "void"
            | "size_t"
            | "signed"
            | "unsigned"
    )
}

/// Declaration specifiers that may precede or follow the type name.
pub(crate) fn is_decl_specifier(text: &str) -> bool {
    matches!(
        text,
        "static"
            | "extern"
            | "const"
            | "volatile"
            | "register"
            | "mutable"
            | "constexpr"
            | "inline"
            | "thread_local"
            | "struct"
            | "class"
            | "union"
            | "enum"
            | "typename"
            | "virtual"
            | "explicit"
            | "friend"
    )
}

/// Words that can never be part of a declaration's type or name.
pub(crate) fn is_statement_keyword(text: &str) -> bool {
    matches!(
        text,
        "return"
            | "delete"
            | "new"
            | "throw"
            | "goto"
            | "case"
            | "default"
            | "else"
            | "do"
            | "if"
            | "while"
            | "for"
            | "switch"
            | "break"
            | "continue"
            | "sizeof"
            | "typedef"
            | "using"
            | "namespace"
            | "template"
            | "operator"
            | "this"
            | "true"
            | "false"
            | "nullptr"
            | "public"
            | "private"
            | "protected"
            | "try"
            | "catch"
            | "static_assert"
            | "asm"
    )
}
