//! End-to-end tests for the auto-variable escape check.

use dangle_analysis::{Analyzer, Check, CheckRegistry, AutoVariablesCheck};
use dangle_core::errors::AnalysisError;
use dangle_core::{CheckSettings, Confidence, Diagnostic, RuleId};

fn run(code: &str, inconclusive: bool) -> Vec<Diagnostic> {
    Analyzer::new(CheckSettings::new(inconclusive))
        .analyze_source("test.cpp", code)
        .unwrap()
}

/// Findings rendered one per line, the way a console reporter prints them.
fn errout(code: &str) -> String {
    render(&run(code, false))
}

fn errout_inconclusive(code: &str) -> String {
    render(&run(code, true))
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics.iter().map(|d| format!("{d}\n")).collect()
}

const ASSIGNED: &str = "(error) Address of local auto-variable assigned to a function parameter.";

// ---------------------------------------------------------------------------
// Parameter assignment
// ---------------------------------------------------------------------------

#[test]
fn pointer_parameter_receives_address_of_local() {
    let out = errout(
        "void func1(int **res)\n\
         {\n\
             int num = 2;\n\
             *res = &num;\n\
         }",
    );
    assert_eq!(out, format!("[test.cpp:4]: {ASSIGNED}\n"));
}

#[test]
fn single_line_pointer_parameter_assignment() {
    let diags = run("void f(int** out){ int x; *out = &x; }", false);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule_id, RuleId::AutoVariables);
    assert_eq!(diags[0].confidence, Confidence::Definite);
    assert_eq!(diags[0].location.line, 1);
}

#[test]
fn out_of_line_member_function() {
    let out = errout(
        "class Fred {\n\
             void func1(int **res);\n\
         }\n\
         void Fred::func1(int **res)\n\
         {\n\
             int num = 2;\n\
             *res = &num;\n\
         }",
    );
    assert_eq!(out, format!("[test.cpp:7]: {ASSIGNED}\n"));
}

#[test]
fn plain_pointer_parameter_reassignment_is_fine() {
    let out = errout(
        "void func1(int **res)\n\
         {\n\
             int num = 2;\n\
             res = &num;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn static_local_address_is_fine() {
    let out = errout(
        "void func1(int **res)\n\
         {\n\
             static int num = 2;\n\
             *res = &num;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn reference_parameter_receives_address_of_local() {
    let out = errout(
        "void foo(int*& p) {\n\
             int i;\n\
             p = &i;\n\
         }",
    );
    assert_eq!(out, format!("[test.cpp:3]: {ASSIGNED}\n"));
}

#[test]
fn reference_parameter_assigned_a_value_is_fine() {
    assert_eq!(errout("void foo(std::string& s) {\n    s = foo;\n}"), "");
}

#[test]
fn member_of_declared_class_counts_as_whole_object() {
    let out = errout(
        "struct FN {int i;};\n\
         struct FP {FN* f};\n\
         void foo(int*& p, FN* p_fp) {\n\
             FN fn;\n\
             FP fp;\n\
             p = &fn.i;\n\
             p = &p_fp->f->i;\n\
         }",
    );
    assert_eq!(out, format!("[test.cpp:6]: {ASSIGNED}\n"));
}

#[test]
fn member_of_unknown_class_is_not_reported() {
    let out = errout(
        "void foo(int*& p) {\n\
             Unknown u;\n\
             p = &u.field;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn member_through_local_pointer_is_not_reported() {
    let out = errout(
        "struct S { int x; };\n\
         void foo(int*& p) {\n\
             S *s;\n\
             p = &s->x;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn nested_member_chain_is_not_reported() {
    let out = errout(
        "struct S { int a; };\n\
         void foo(int*& p) {\n\
             S s;\n\
             p = &s.a.b;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn indexed_pointer_parameter_receives_address_of_local() {
    let out = errout(
        "void func1(int* arr[2])\n\
         {\n\
             int num=2;\n\
             arr[0]=&num;\n\
         }",
    );
    assert_eq!(out, format!("[test.cpp:4]: {ASSIGNED}\n"));
}

#[test]
fn pointer_to_pointer_parameter_receives_local_array() {
    let out = errout(
        "void foo(char **p)\n\
         {\n\
             char buf[10];\n\
             *p = buf;\n\
         }",
    );
    assert_eq!(out, format!("[test.cpp:4]: {ASSIGNED}\n"));
}

#[test]
fn single_pointer_parameter_dereference_with_array_is_fine() {
    let out = errout(
        "void foo(char *p)\n\
         {\n\
             char buf[10];\n\
             *p = buf;\n\
         }",
    );
    assert_eq!(out, "");
}

// ---------------------------------------------------------------------------
// Inconclusive member assignment
// ---------------------------------------------------------------------------

const MEMBER_ADDRESS: &str = "void foo(struct AB *ab)\n\
                              {\n\
                                  char a;\n\
                                  ab->a = &a;\n\
                              }";

const MEMBER_ARRAY: &str = "void foo(struct X *x)\n\
                            {\n\
                                char a[10];\n\
                                x->str = a;\n\
                            }";

#[test]
fn member_address_assignment_is_inconclusive() {
    assert_eq!(errout(MEMBER_ADDRESS), "");
    assert_eq!(
        errout_inconclusive(MEMBER_ADDRESS),
        format!("[test.cpp:4]: {ASSIGNED} (inconclusive)\n")
    );
    let diags = run(MEMBER_ADDRESS, true);
    assert!(diags[0].verbose().contains("might 'leak' from the function"));
}

#[test]
fn member_array_assignment_is_inconclusive() {
    assert_eq!(errout(MEMBER_ARRAY), "");
    assert_eq!(
        errout_inconclusive(MEMBER_ARRAY),
        format!("[test.cpp:4]: {ASSIGNED} (inconclusive)\n")
    );
}

#[test]
fn this_pointer_member_is_not_a_parameter() {
    let code = "struct txt_scrollpane_s * TxtScrollpane__Construct(void)\n\
                {\n\
                    struct txt_scrollpane_s * this;\n\
                    this->size = &this->size_x;\n\
                }";
    assert_eq!(errout_inconclusive(code), "");
}

#[test]
fn inconclusive_switch_only_affects_member_assignments() {
    let code = "void foo(struct AB *ab, int **res)\n\
                {\n\
                    char a;\n\
                    int num;\n\
                    ab->a = &a;\n\
                    *res = &num;\n\
                }\n\
                int *g()\n\
                {\n\
                    int arr[3];\n\
                    return arr;\n\
                }";
    let off = run(code, false);
    let on = run(code, true);
    assert_eq!(on.len(), 3);
    let on_definite: Vec<_> = on.into_iter().filter(|d| !d.is_inconclusive()).collect();
    assert_eq!(on_definite, off);
}

// ---------------------------------------------------------------------------
// Returned addresses
// ---------------------------------------------------------------------------

#[test]
fn address_of_local_returned() {
    let out = errout(
        "int* func1()\n\
         {\n\
             int num=2;\n\
             return &num;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:4]: (error) Address of an auto-variable returned.\n");
}

#[test]
fn address_of_local_returned_from_member_function() {
    let out = errout(
        "class Fred {\n\
             int* func1();\n\
         }\n\
         int* Fred::func1()\n\
         {\n\
             int num=2;\n\
             return &num;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:7]: (error) Address of an auto-variable returned.\n");
}

#[test]
fn address_of_static_array_element_is_fine() {
    let out = errout(
        "void *func1()\n\
         {\n\
             static char buf[100];\n\
             return &buf[0];\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn address_of_array_element_is_not_a_local_array_return() {
    let diags = run("int *f(int i)\n{\n    int arr[4];\n    return &arr[i];\n}", false);
    let ids: Vec<_> = diags.iter().map(|d| d.rule_id).collect();
    assert_eq!(ids, vec![RuleId::ReturnAddressOfAutoVariable]);
}

#[test]
fn extern_local_is_not_automatic() {
    let out = errout(
        "struct foo *foo() {\n\
             extern struct foo f;\n\
             return &f;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn address_of_by_value_parameter_returned() {
    let out = errout("int* foo(int y) {\n    return &y;\n}");
    assert_eq!(
        out,
        "[test.cpp:2]: (error) Address of function parameter 'y' returned.\n"
    );
    let diags = run("int* foo(int y) {\n    return &y;\n}", false);
    assert!(diags[0]
        .verbose()
        .starts_with("Address of the function parameter 'y' becomes invalid"));
}

#[test]
fn address_of_reference_parameter_is_fine() {
    assert_eq!(errout("int* foo(int& y) {\n    return &y;\n}"), "");
}

#[test]
fn member_address_of_parameter_is_not_matched() {
    assert_eq!(errout("struct S { int x; };\nint* foo(S s) {\n    return &s.x;\n}"), "");
}

// ---------------------------------------------------------------------------
// Local array returned by pointer
// ---------------------------------------------------------------------------

#[test]
fn local_array_returned() {
    let out = errout(
        "char *foo()\n\
         {\n\
             char str[100] = {0};\n\
             return str;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:4]: (error) Pointer to local array variable returned.\n");
}

#[test]
fn local_array_returned_from_member_function() {
    let out = errout(
        "class Fred {\n\
             char *foo();\n\
         };\n\
         char *Fred::foo()\n\
         {\n\
             char str[100] = {0};\n\
             return str;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:7]: (error) Pointer to local array variable returned.\n");
}

#[test]
fn static_array_returned_is_fine() {
    let out = errout(
        "char *foo()\n\
         {\n\
             static char str[100] = {0};\n\
             return str;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn local_array_returned_from_value_function_is_not_reported() {
    assert_eq!(errout("int foo()\n{\n    int a[4];\n    return a;\n}"), "");
}

#[test]
fn literal_array_return_scenario() {
    let diags = run("int* g(){ int a[4]; return a; }", false);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule_id, RuleId::ReturnLocalVariable);
}

// ---------------------------------------------------------------------------
// Returned references
// ---------------------------------------------------------------------------

#[test]
fn reference_to_local_returned() {
    let out = errout(
        "std::string &foo()\n\
         {\n\
             std::string s;\n\
             return s;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:4]: (error) Reference to auto variable returned.\n");
}

#[test]
fn reference_to_local_template_object_returned() {
    let out = errout(
        "std::vector<int> &foo()\n\
         {\n\
             std::vector<int> v;\n\
             return v;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:4]: (error) Reference to auto variable returned.\n");
}

#[test]
fn literal_reference_return_scenario() {
    let diags = run("int& h(){ int x; return x; }", false);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].rule_id, RuleId::ReturnReference);
}

#[test]
fn reference_to_static_or_parameter_is_fine() {
    assert_eq!(errout("static std::string &f()\n{\n    static std::string s;\n    return s;\n}"), "");
    assert_eq!(errout("int& f(int &x)\n{\n    return x;\n}"), "");
}

#[test]
fn reference_local_bound_elsewhere_is_not_reported() {
    assert_eq!(errout("int& f(int &p)\n{\n    int &r = p;\n    return r;\n}"), "");
}

#[test]
fn copy_initialized_local_is_reported() {
    let expected = "[test.cpp:4]: (error) Reference to auto variable returned.\n";
    assert_eq!(errout("int& f()\n{\n    int y = 0;\n    return y;\n}"), expected);
    assert_eq!(
        errout("int g;\nint& f()\n{\n    int y = g;\n    return y;\n}"),
        "[test.cpp:5]: (error) Reference to auto variable returned.\n"
    );
    assert_eq!(errout("int& f(int a, int b)\n{\n    int y = a + b;\n    return y;\n}"), expected);
    assert_eq!(
        errout("std::string& f()\n{\n    std::string s = \"ab\";\n    return s;\n}"),
        expected
    );
}

#[test]
fn local_constructed_from_local_is_followed_one_level() {
    let out = errout(
        "int& f()\n\
         {\n\
             int x;\n\
             int y(x);\n\
             return y;\n\
         }",
    );
    assert_eq!(out, "[test.cpp:5]: (error) Reference to auto variable returned.\n");
}

#[test]
fn local_constructed_from_non_local_is_not_reported() {
    assert_eq!(errout("int g;\nint& f()\n{\n    int y(g);\n    return y;\n}"), "");
    assert_eq!(errout("std::string& f()\n{\n    std::string s(\"ab\");\n    return s;\n}"), "");
}

#[test]
fn reference_to_temporary_returned() {
    let out = errout(
        "std::string hello()\n\
         {\n\
              return \"hello\";\n\
         }\n\
         \n\
         std::string &f()\n\
         {\n\
             return hello();\n\
         }",
    );
    assert_eq!(out, "[test.cpp:8]: (error) Reference to temporary returned.\n");
}

#[test]
fn call_of_unknown_function_is_not_a_temporary() {
    assert_eq!(errout("std::string &f()\n{\n    return hello();\n}"), "");
}

// ---------------------------------------------------------------------------
// Returned C strings
// ---------------------------------------------------------------------------

#[test]
fn c_string_of_temporary_returned() {
    let out = errout(
        "std::string hello()\n\
         {\n\
              return \"hello\";\n\
         }\n\
         \n\
         const char *f()\n\
         {\n\
             return hello().c_str();\n\
         }",
    );
    assert_eq!(out, "[test.cpp:8]: (error) Pointer to temporary returned.\n");
}

#[test]
fn c_string_of_static_object_is_fine() {
    let out = errout(
        "const char *f()\n\
         {\n\
             static std::string s;\n\
             return s.c_str();\n\
         }",
    );
    assert_eq!(out, "");
}

// ---------------------------------------------------------------------------
// Invalid deallocation
// ---------------------------------------------------------------------------

#[test]
fn deallocating_local_arrays() {
    let out = errout(
        "void func1() {\n\
             char tmp1[256];\n\
             free(tmp1);\n\
             char tmp2[256];\n\
             delete tmp2;\n\
             char tmp3[256];\n\
             delete tmp3;\n\
             char tmp4[256];\n\
             delete[] (tmp4);\n\
             char tmp5[256];\n\
             delete[] tmp5;\n\
         }",
    );
    let msg = "(error) Deallocation of an auto-variable results in undefined behaviour.";
    let expected: String = [3, 5, 7, 9, 11]
        .iter()
        .map(|line| format!("[test.cpp:{line}]: {msg}\n"))
        .collect();
    assert_eq!(out, expected);
}

#[test]
fn deleting_an_array_element_is_fine() {
    let out = errout(
        "void func1() {\n\
             char* tmp1[256];\n\
             init(tmp1);\n\
             delete tmp1[34];\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn deallocating_heap_memory_is_fine() {
    let out = errout(
        "void f() {\n\
             char *p = malloc(10);\n\
             free(p);\n\
             char *q = new char[10];\n\
             delete [] q;\n\
         }",
    );
    assert_eq!(out, "");
}

#[test]
fn inner_declaration_shadows_outer_array() {
    let out = errout(
        "void f() {\n\
             char psz_title[10];\n\
             {\n\
                 char *psz_title = 0;\n\
                 abc(0, psz_title);\n\
                 free(psz_title);\n\
             }\n\
         }",
    );
    assert_eq!(out, "");
}

// ---------------------------------------------------------------------------
// Ordering, suppression and the pipeline surface
// ---------------------------------------------------------------------------

#[test]
fn findings_are_grouped_by_pass() {
    let code = "int *a(int **out)\n\
                {\n\
                    int x;\n\
                    int arr[4];\n\
                    *out = &x;\n\
                    return arr;\n\
                }\n\
                int &b()\n\
                {\n\
                    int y;\n\
                    return y;\n\
                }\n\
                int *c()\n\
                {\n\
                    int z;\n\
                    return &z;\n\
                }";
    let found: Vec<_> = run(code, false)
        .iter()
        .map(|d| (d.rule_id, d.location.line))
        .collect();
    assert_eq!(
        found,
        vec![
            (RuleId::AutoVariables, 5),
            (RuleId::ReturnAddressOfAutoVariable, 16),
            (RuleId::ReturnLocalVariable, 6),
            (RuleId::ReturnReference, 11),
        ]
    );
}

#[test]
fn suppressed_rules_are_dropped() {
    let code = "int* g(){ int a[4]; return a; }\nint& h(){ int x; return x; }";
    let settings = CheckSettings::new(false).with_suppressed([RuleId::ReturnLocalVariable]);
    let diags = Analyzer::new(settings).analyze_source("test.cpp", code).unwrap();
    let ids: Vec<_> = diags.iter().map(|d| d.rule_id).collect();
    assert_eq!(ids, vec![RuleId::ReturnReference]);
}

#[test]
fn code_outside_functions_is_ignored() {
    assert_eq!(errout("int g;\nint *p = &g;\nstruct S { int *q; };"), "");
}

#[test]
fn unbalanced_source_is_a_parse_error() {
    let result = Analyzer::new(CheckSettings::default()).analyze_source("bad.c", "void f() {");
    assert!(matches!(result, Err(AnalysisError::Parse(_))));
}

#[test]
fn analyze_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("escape.c");
    std::fs::write(&path, "void f(int **out)\n{\n    int x;\n    *out = &x;\n}\n").unwrap();

    let diags = Analyzer::new(CheckSettings::default()).analyze_file(&path).unwrap();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].location.line, 4);
    assert!(diags[0].location.file.ends_with("escape.c"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Analyzer::new(CheckSettings::default()).analyze_file(&dir.path().join("nope.c"));
    assert!(matches!(
        result,
        Err(AnalysisError::Parse(dangle_core::errors::ParseError::Io { .. }))
    ));
}

#[test]
fn empty_registry_reports_nothing() {
    let analyzer = Analyzer::with_registry(CheckSettings::default(), CheckRegistry::new());
    let diags = analyzer
        .analyze_source("test.cpp", "void f(int** out){ int x; *out = &x; }")
        .unwrap();
    assert!(diags.is_empty());
}

#[test]
fn rule_catalogue_covers_every_rule_id() {
    let check = AutoVariablesCheck::new();
    let rules = check.rules();
    let mut ids: Vec<_> = rules.iter().map(|r| r.id).collect();
    ids.sort();
    let mut all = RuleId::all().to_vec();
    all.sort();
    assert_eq!(ids, all);
    assert!(rules.iter().all(|r| !r.summary().is_empty() && !r.summary().contains('\n')));

    let listed = serde_json::to_value(&rules).unwrap();
    assert_eq!(listed[0]["id"], "autoVariables");
    assert_eq!(listed[0]["severity"], "error");
}

#[test]
fn findings_serialize_to_json() {
    let mut log = dangle_core::DiagnosticLog::new();
    for d in run("int& h(){ int x; return x; }", false) {
        dangle_core::DiagnosticSink::report(&mut log, d);
    }
    let json = log.to_json().unwrap();
    assert!(json.contains("\"rule_id\": \"returnReference\""));
    assert!(json.contains("\"confidence\": \"definite\""));
}
