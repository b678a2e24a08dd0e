//! Symbol database construction over tokenized sources.

use dangle_analysis::symbols::{ReturnCategory, ScopeKind, SymbolDatabase, Variable};
use dangle_analysis::Program;

fn parse(source: &str) -> Program {
    Program::parse("test.cpp", source).unwrap()
}

fn var<'a>(db: &'a SymbolDatabase, name: &str) -> &'a Variable {
    db.variables()
        .iter()
        .find(|v| v.name == name)
        .unwrap_or_else(|| panic!("no variable named {name}"))
}

#[test]
fn return_categories() {
    let program = parse(
        "int a() { return 0; }\n\
         int *b() { return 0; }\n\
         int &c(int &x) { return x; }\n\
         const char *d() { return 0; }\n\
         char *e() { return 0; }",
    );
    let db = &program.symbols;
    let category = |name: &str| db.find_function(name).unwrap().return_category;
    assert_eq!(category("a"), ReturnCategory::ByValue);
    assert_eq!(category("b"), ReturnCategory::Pointer);
    assert_eq!(category("c"), ReturnCategory::Reference);
    assert_eq!(category("d"), ReturnCategory::ConstCharPointer);
    assert_eq!(category("e"), ReturnCategory::Pointer);
    assert!(ReturnCategory::ConstCharPointer.returns_pointer());
}

#[test]
fn qualified_definition_reads_category_before_qualifier() {
    let program = parse("class A { int *f(); };\nint *A::f() { return 0; }");
    let f = program.symbols.find_function("f").unwrap();
    assert_eq!(f.return_category, ReturnCategory::Pointer);
}

#[test]
fn prototypes_are_not_function_scopes() {
    let program = parse("void f(int);\nvoid g() { }");
    let names: Vec<_> = program
        .symbols
        .function_scopes()
        .filter_map(|s| program.symbols.function_of(s))
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(names, vec!["g"]);
}

#[test]
fn scopes_are_in_declaration_order() {
    let program = parse("namespace n { struct S { int m; }; void f() { } }\nvoid g() { }");
    let kinds: Vec<_> = program.symbols.scopes().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ScopeKind::Global,
            ScopeKind::Namespace,
            ScopeKind::Class,
            ScopeKind::Function,
            ScopeKind::Function,
        ]
    );
    let body = program.symbols.function_scopes().next().unwrap();
    assert_eq!(program.tokens.text(body.start.index()), "{");
    assert_eq!(program.tokens.text(body.end.index()), "}");
}

#[test]
fn parameters_are_recorded_in_order() {
    let program = parse("void f(int **res, const std::string &s, char buf[], int n = 3) { }");
    let db = &program.symbols;
    let f = db.find_function("f").unwrap();
    let names: Vec<_> = f
        .arguments
        .iter()
        .map(|id| db.variable(*id).unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["res", "s", "buf", "n"]);

    let res = var(db, "res");
    assert!(res.is_argument && res.is_pointer && !res.is_local);
    let s = var(db, "s");
    assert!(s.is_reference && !s.is_class);
    assert_eq!(s.type_name, "string");
    assert_eq!(program.tokens.text(s.type_end.index()), "&");
    assert!(var(db, "buf").is_array);
}

#[test]
fn void_parameter_list_declares_nothing() {
    let program = parse("int f(void) { return 1; }");
    assert!(program.symbols.find_function("f").unwrap().arguments.is_empty());
    assert!(program.symbols.variables().is_empty());
}

#[test]
fn local_declarations() {
    let program = parse(
        "void f() {\n\
             int a, *b, c[4];\n\
             static int s;\n\
             extern int e;\n\
             int &r = a;\n\
             std::vector<int> v;\n\
             for (int i = 0; i < 3; i++) { }\n\
         }",
    );
    let db = &program.symbols;
    assert!(var(db, "a").is_local);
    assert!(var(db, "b").is_pointer);
    assert!(var(db, "c").is_array);
    assert!(var(db, "s").is_static);
    assert!(var(db, "e").is_static);
    assert!(var(db, "r").is_reference);
    assert_eq!(var(db, "v").type_name, "vector");
    assert!(var(db, "i").is_local);
}

#[test]
fn uses_resolve_to_innermost_declaration() {
    let program = parse(
        "int x;\n\
         void f() {\n\
             x = 1;\n\
             int x;\n\
             { char x; x = 2; }\n\
             x = 3;\n\
         }",
    );
    let tokens = &program.tokens;
    let db = &program.symbols;
    let uses: Vec<_> = (0..tokens.len())
        .filter(|&i| tokens.text(i) == "x" && tokens.text_at(i, 1) == "=")
        .map(|i| db.variable_for(tokens.var_id(i)).unwrap())
        .collect();
    assert_eq!(uses.len(), 3);
    assert!(!uses[0].is_local);
    assert_eq!(uses[1].type_name, "char");
    assert_eq!(uses[2].type_name, "int");
    assert!(uses[2].is_local);
}

#[test]
fn member_names_after_dot_are_not_resolved() {
    let program = parse("struct P { int a; };\nvoid f(P *p) { int a; p->a = a; }");
    let tokens = &program.tokens;
    let dot = (0..tokens.len()).find(|&i| tokens.text(i) == ".").unwrap();
    assert_eq!(tokens.var_id(dot + 1), None);
    assert!(tokens.var_id(dot + 3).is_some());
}

#[test]
fn class_types_link_to_their_scope() {
    let program = parse("struct S { int a; };\nvoid f() { S s; T t; S *p; }");
    let db = &program.symbols;
    let s = var(db, "s");
    assert!(s.is_class);
    assert!(s.type_scope.is_some());
    let t = var(db, "t");
    assert!(t.is_class);
    assert!(t.type_scope.is_none());
    assert!(!var(db, "p").is_class);
}

#[test]
fn out_of_line_members_see_class_fields() {
    let program = parse(
        "class Fred {\n\
             int m;\n\
             void set();\n\
         };\n\
         void Fred::set() { m = 1; }",
    );
    let tokens = &program.tokens;
    let m_use = (0..tokens.len())
        .rev()
        .find(|&i| tokens.text(i) == "m")
        .unwrap();
    let m = program.symbols.variable_for(tokens.var_id(m_use)).unwrap();
    assert!(!m.is_local && !m.is_argument);
}

#[test]
fn constructors_with_initializer_lists() {
    let program = parse("class A { int x; A() : x(0) { int y; } };");
    let ctor = program.symbols.find_function("A").unwrap();
    assert_eq!(ctor.return_category, ReturnCategory::ByValue);
    assert!(var(&program.symbols, "y").is_local);
}
