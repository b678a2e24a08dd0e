//! Auto-variable escape check.
//!
//! Four independent passes over every function body, in this order:
//!
//! 1. assignment escape: a parameter receives the address of a local, a
//!    function returns the address of a local or of a by-value parameter,
//!    or a local array is deallocated;
//! 2. a pointer-returning function returns a local array by name;
//! 3. a reference-returning function returns a local, or a temporary;
//! 4. a `const char *` function returns a temporary.
//!
//! Each pass is a single forward walk with an explicit cursor. Within the
//! first pass the rules are tried in a fixed order at every cursor
//! position; the first one that matches decides how far the cursor jumps.

use dangle_core::types::FxHashSet;
use dangle_core::{Confidence, Diagnostic, DiagnosticSink, RuleId, Severity};

use super::messages;
use super::{Check, CheckContext, RuleInfo};
use crate::matcher::Pattern;
use crate::symbols::{ReturnCategory, Scope, SymbolClassifier, Variable};
use crate::tokens::TokenList;

/// Outcome of trying one rule at a cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    NoMatch,
    /// The rule applied; the cursor moves `advance` tokens before the
    /// scan's regular single-token step.
    Matched { advance: usize },
}

impl Step {
    const STAY: Step = Step::Matched { advance: 0 };
}

type AssignmentRule = fn(&AutoVariablesCheck, &mut Scan<'_, '_>, usize) -> Step;

/// Rules of the assignment-escape pass, in evaluation order.
const ASSIGNMENT_RULES: &[AssignmentRule] = &[
    AutoVariablesCheck::reference_parameter_assignment,
    AutoVariablesCheck::pointer_parameter_assignment,
    AutoVariablesCheck::member_address_assignment,
    AutoVariablesCheck::member_array_assignment,
    AutoVariablesCheck::pointer_to_pointer_assignment,
    AutoVariablesCheck::indexed_parameter_assignment,
    AutoVariablesCheck::return_address_of_local,
    AutoVariablesCheck::return_address_of_parameter,
    AutoVariablesCheck::invalid_deallocation,
];

/// Compiled patterns, shared by every pass.
#[derive(Debug)]
struct Patterns {
    ref_assign: Pattern,
    deref_assign: Pattern,
    member_address_assign: Pattern,
    member_name_assign: Pattern,
    deref_name_assign: Pattern,
    indexed_start: Pattern,
    indexed_tail: Pattern,
    pointer_to_pointer: Pattern,
    return_address: Pattern,
    return_element_address: Pattern,
    bracket_end: Pattern,
    free_call: Pattern,
    delete_expr: Pattern,
    return_name: Pattern,
    return_call: Pattern,
    simple_initializer: Pattern,
    string_function: Pattern,
}

impl Patterns {
    fn new() -> Self {
        Self {
            ref_assign: Pattern::new("[;{}] %var% = & %var%"),
            deref_assign: Pattern::new("[;{}] * %var% = & %var%"),
            member_address_assign: Pattern::new("[;{}] %var% . %var% = & %var%"),
            member_name_assign: Pattern::new("[;{}] %var% . %var% = %var% ;"),
            deref_name_assign: Pattern::new("[;{}] * %var% = %var% ;"),
            indexed_start: Pattern::new("[;{}] %var% ["),
            indexed_tail: Pattern::new("] = & %var%"),
            pointer_to_pointer: Pattern::new("%type% * *"),
            return_address: Pattern::new("return & %var% ;"),
            return_element_address: Pattern::new("return & %var% ["),
            bracket_end: Pattern::new("] ;"),
            free_call: Pattern::new("free ( %var% ) ;"),
            delete_expr: Pattern::new("delete [| ]| (| %var% !!["),
            return_name: Pattern::new("return %var% ;"),
            return_call: Pattern::new("return %var% ("),
            simple_initializer: Pattern::new("%var% [);.(]"),
            string_function: Pattern::new("std :: string %var% ("),
        }
    }
}

/// Per-pass state: read-only inputs plus the sink and a finding counter.
struct Scan<'c, 's> {
    tokens: &'c TokenList,
    classifier: SymbolClassifier<'c>,
    inconclusive: bool,
    sink: &'s mut dyn DiagnosticSink,
    findings: usize,
}

impl Scan<'_, '_> {
    fn report(&mut self, anchor: usize, rule_id: RuleId, message: String, confidence: Confidence) {
        let location = self.tokens.location(anchor);
        tracing::trace!(
            rule = %rule_id,
            line = location.line,
            ?confidence,
            "finding"
        );
        self.sink.report(Diagnostic {
            location,
            severity: Severity::Error,
            rule_id,
            message,
            confidence,
        });
        self.findings += 1;
    }

    fn report_fixed(&mut self, anchor: usize, rule_id: RuleId, message: &str) {
        self.report(anchor, rule_id, message.to_string(), Confidence::Definite);
    }

    fn var_id(&self, index: usize) -> Option<dangle_core::types::VarId> {
        self.tokens.var_id(index)
    }

    fn variable_at(&self, index: usize) -> Option<&Variable> {
        self.classifier.variable(self.var_id(index))
    }

    /// `&var` followed by the token at `next` addresses the whole object.
    fn whole_object(&self, var_token: usize, next: usize) -> bool {
        self.variable_at(var_token)
            .is_some_and(|var| self.classifier.takes_whole_object_address(var, self.tokens, next))
    }
}

/// Detects addresses of automatic storage escaping their function.
#[derive(Debug)]
pub struct AutoVariablesCheck {
    patterns: Patterns,
}

impl Default for AutoVariablesCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl AutoVariablesCheck {
    pub fn new() -> Self {
        Self {
            patterns: Patterns::new(),
        }
    }

    fn scan<'c, 's>(
        &self,
        ctx: &CheckContext<'c>,
        sink: &'s mut dyn DiagnosticSink,
    ) -> Scan<'c, 's> {
        Scan {
            tokens: ctx.tokens(),
            classifier: ctx.classifier(),
            inconclusive: ctx.settings.inconclusive,
            sink,
            findings: 0,
        }
    }

    /// Function scopes whose return category satisfies `wanted`.
    fn scopes_returning<'c>(
        ctx: &CheckContext<'c>,
        wanted: impl Fn(ReturnCategory) -> bool,
    ) -> impl Iterator<Item = &'c Scope> {
        let symbols = ctx.symbols();
        symbols.function_scopes().filter(move |scope| {
            symbols
                .function_of(scope)
                .is_some_and(|f| wanted(f.return_category))
        })
    }

    /// Names `N` declared anywhere as `std :: string N (`. A `return N (...)`
    /// of such a name is treated as returning a temporary.
    fn string_returning_names(&self, tokens: &TokenList) -> FxHashSet<String> {
        (0..tokens.len())
            .filter_map(|i| self.patterns.string_function.match_at(tokens, i))
            .filter_map(|caps| caps.get(3))
            .map(|name| tokens.text(name).to_string())
            .collect()
    }

    fn returns_temporary(&self, tokens: &TokenList, index: usize, temporaries: &FxHashSet<String>) -> bool {
        self.patterns.return_call.is_match(tokens, index)
            && temporaries.contains(tokens.text(index + 1))
    }

    // -----------------------------------------------------------------
    // Pass 1: assignment escape
    // -----------------------------------------------------------------

    fn assignment_escape(&self, ctx: &CheckContext<'_>, sink: &mut dyn DiagnosticSink) {
        let mut scan = self.scan(ctx, sink);
        let mut scopes = 0usize;
        for scope in ctx.symbols().function_scopes() {
            scopes += 1;
            let mut cursor = scope.start.index();
            let end = scope.end.index();
            while cursor < end {
                let step = ASSIGNMENT_RULES
                    .iter()
                    .map(|rule| rule(self, &mut scan, cursor))
                    .find(|step| *step != Step::NoMatch);
                if let Some(Step::Matched { advance }) = step {
                    cursor += advance;
                }
                cursor += 1;
            }
        }
        tracing::debug!(scopes, findings = scan.findings, "assignment escape pass done");
    }

    /// `; ref = & local` with `ref` a reference parameter.
    fn reference_parameter_assignment(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.ref_assign.is_match(scan.tokens, tok) {
            return Step::NoMatch;
        }
        let c = scan.classifier;
        if !(c.is_ref_arg(scan.var_id(tok + 1)) && c.is_auto_var(scan.var_id(tok + 4))) {
            return Step::NoMatch;
        }
        if scan.whole_object(tok + 4, tok + 5) {
            scan.report_fixed(tok + 1, RuleId::AutoVariables, messages::AUTO_VARIABLE_ASSIGNMENT);
        }
        Step::Matched { advance: 4 }
    }

    /// `; * ptr = & local` with `ptr` a pointer parameter.
    fn pointer_parameter_assignment(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.deref_assign.is_match(scan.tokens, tok) {
            return Step::NoMatch;
        }
        let c = scan.classifier;
        if !(c.is_ptr_arg(scan.var_id(tok + 2)) && c.is_auto_var(scan.var_id(tok + 5))) {
            return Step::NoMatch;
        }
        if scan.whole_object(tok + 5, tok + 6) {
            scan.report_fixed(tok + 1, RuleId::AutoVariables, messages::AUTO_VARIABLE_ASSIGNMENT);
        }
        Step::Matched { advance: 5 }
    }

    fn is_pointer_argument(scan: &Scan<'_, '_>, index: usize) -> bool {
        scan.variable_at(index)
            .is_some_and(|v| v.is_argument && v.is_pointer)
    }

    /// `; ptr . field = & local`; inconclusive, since the parameter may be
    /// restored before returning.
    fn member_address_assignment(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.member_address_assign.is_match(scan.tokens, tok) {
            return Step::NoMatch;
        }
        if scan.inconclusive
            && Self::is_pointer_argument(scan, tok + 1)
            && scan.classifier.is_auto_var(scan.var_id(tok + 6))
            && scan.whole_object(tok + 6, tok + 7)
        {
            scan.report(
                tok + 1,
                RuleId::AutoVariables,
                messages::AUTO_VARIABLE_ASSIGNMENT_INCONCLUSIVE.to_string(),
                Confidence::Inconclusive,
            );
        }
        Step::Matched { advance: 6 }
    }

    /// `; ptr . field = array ;`; the array decays to its address.
    fn member_array_assignment(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.member_name_assign.is_match(scan.tokens, tok) {
            return Step::NoMatch;
        }
        if scan.inconclusive
            && Self::is_pointer_argument(scan, tok + 1)
            && scan.classifier.is_auto_var_array(scan.var_id(tok + 5))
        {
            scan.report(
                tok + 1,
                RuleId::AutoVariables,
                messages::AUTO_VARIABLE_ASSIGNMENT_INCONCLUSIVE.to_string(),
                Confidence::Inconclusive,
            );
        }
        Step::Matched { advance: 5 }
    }

    /// `; * pp = array ;` with `pp` declared `T ** pp`.
    fn pointer_to_pointer_assignment(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.deref_name_assign.is_match(scan.tokens, tok) {
            return Step::NoMatch;
        }
        let double_pointer_arg = scan.variable_at(tok + 2).is_some_and(|v| {
            v.is_argument
                && v.name_token
                    .index()
                    .checked_sub(3)
                    .is_some_and(|i| self.patterns.pointer_to_pointer.is_match(scan.tokens, i))
        });
        if double_pointer_arg && scan.classifier.is_auto_var_array(scan.var_id(tok + 4)) {
            scan.report_fixed(tok + 1, RuleId::AutoVariables, messages::AUTO_VARIABLE_ASSIGNMENT);
        }
        Step::Matched { advance: 4 }
    }

    /// `; ptr [ ... ] = & local` with `ptr` a pointer parameter.
    fn indexed_parameter_assignment(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.indexed_start.is_match(scan.tokens, tok) {
            return Step::NoMatch;
        }
        let Some(close) = scan.tokens.link_of(tok + 2) else {
            return Step::NoMatch;
        };
        if !self.patterns.indexed_tail.is_match(scan.tokens, close) {
            return Step::NoMatch;
        }
        let var_tok = close + 3;
        let c = scan.classifier;
        if !(c.is_ptr_arg(scan.var_id(tok + 1)) && c.is_auto_var(scan.var_id(var_tok))) {
            return Step::NoMatch;
        }
        if scan.whole_object(var_tok, var_tok + 1) {
            scan.report_fixed(tok + 1, RuleId::AutoVariables, messages::AUTO_VARIABLE_ASSIGNMENT);
        }
        Step::Matched {
            advance: var_tok - tok,
        }
    }

    /// `return & local ;` or `return & array [ ... ] ;`
    fn return_address_of_local(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        let tokens = scan.tokens;
        let c = scan.classifier;
        let whole = self.patterns.return_address.is_match(tokens, tok)
            && c.is_auto_var(scan.var_id(tok + 2));
        let element = !whole
            && self.patterns.return_element_address.is_match(tokens, tok)
            && tokens
                .link_of(tok + 3)
                .is_some_and(|close| self.patterns.bracket_end.is_match(tokens, close))
            && c.is_auto_var_array(scan.var_id(tok + 2));
        if !(whole || element) {
            return Step::NoMatch;
        }
        scan.report_fixed(
            tok,
            RuleId::ReturnAddressOfAutoVariable,
            messages::RETURN_ADDRESS_OF_AUTO_VARIABLE,
        );
        Step::STAY
    }

    /// `return & param ;` with `param` passed by value.
    fn return_address_of_parameter(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        if !self.patterns.return_address.is_match(scan.tokens, tok) || scan.var_id(tok + 2).is_none() {
            return Step::NoMatch;
        }
        let by_value_param = scan.variable_at(tok + 2).is_some_and(|v| {
            v.is_argument && scan.tokens.text(v.type_end.index()) != "&"
        });
        if by_value_param {
            let message = messages::return_address_of_function_parameter(scan.tokens.text(tok + 2));
            scan.report(
                tok,
                RuleId::ReturnAddressOfFunctionParameter,
                message,
                Confidence::Definite,
            );
        }
        Step::STAY
    }

    /// `free ( array ) ;` or `delete [] array`, with optional parentheses.
    fn invalid_deallocation(&self, scan: &mut Scan<'_, '_>, tok: usize) -> Step {
        let tokens = scan.tokens;
        if !(self.patterns.free_call.is_match(tokens, tok)
            || self.patterns.delete_expr.is_match(tokens, tok))
        {
            return Step::NoMatch;
        }
        let Some(var_tok) = (tok + 1..tokens.len()).find(|&i| tokens.get(i).is_some_and(|t| t.is_name()))
        else {
            return Step::NoMatch;
        };
        if scan.classifier.is_auto_var_array(scan.var_id(var_tok)) {
            scan.report_fixed(
                var_tok,
                RuleId::AutovarInvalidDeallocation,
                messages::INVALID_DEALLOCATION,
            );
        }
        Step::Matched {
            advance: var_tok - tok,
        }
    }

    // -----------------------------------------------------------------
    // Pass 2: pointer to local array returned
    // -----------------------------------------------------------------

    fn return_pointer_to_local_array(&self, ctx: &CheckContext<'_>, sink: &mut dyn DiagnosticSink) {
        let mut scan = self.scan(ctx, sink);
        let mut scopes = 0usize;
        for scope in Self::scopes_returning(ctx, ReturnCategory::returns_pointer) {
            scopes += 1;
            for tok in scope.start.index()..scope.end.index() {
                if self.patterns.return_name.is_match(scan.tokens, tok)
                    && scan.classifier.is_auto_var_array(scan.var_id(tok + 1))
                {
                    scan.report_fixed(tok, RuleId::ReturnLocalVariable, messages::RETURN_LOCAL_VARIABLE);
                }
            }
        }
        tracing::debug!(scopes, findings = scan.findings, "local array return pass done");
    }

    // -----------------------------------------------------------------
    // Pass 3: reference to local or temporary returned
    // -----------------------------------------------------------------

    fn return_reference(
        &self,
        ctx: &CheckContext<'_>,
        temporaries: &FxHashSet<String>,
        sink: &mut dyn DiagnosticSink,
    ) {
        let mut scan = self.scan(ctx, sink);
        let mut scopes = 0usize;
        for scope in Self::scopes_returning(ctx, ReturnCategory::returns_reference) {
            scopes += 1;
            for tok in scope.start.index()..scope.end.index() {
                if self.patterns.return_name.is_match(scan.tokens, tok) {
                    if self.returns_local(&scan, tok + 1) {
                        scan.report_fixed(tok, RuleId::ReturnReference, messages::RETURN_REFERENCE);
                    }
                } else if self.returns_temporary(scan.tokens, tok, temporaries) {
                    scan.report_fixed(tok, RuleId::ReturnTempReference, messages::RETURN_TEMP_REFERENCE);
                }
            }
        }
        tracing::debug!(scopes, findings = scan.findings, "reference return pass done");
    }

    /// The returned name is an automatic variable. When it was constructed
    /// as `NAME ( x )`, `x` must be a simple automatic variable too; any
    /// other argument is an unknown target and is not reported.
    fn returns_local(&self, scan: &Scan<'_, '_>, name_tok: usize) -> bool {
        let c = scan.classifier;
        let id = scan.var_id(name_tok);
        if !c.is_auto_var(id) {
            return false;
        }
        let Some(var) = c.variable(id) else {
            return false;
        };
        let Some(source) = c.constructor_argument(var, scan.tokens) else {
            return true;
        };
        self.patterns.simple_initializer.is_match(scan.tokens, source)
            && c.is_auto_var(scan.var_id(source))
    }

    // -----------------------------------------------------------------
    // Pass 4: temporary returned as const char *
    // -----------------------------------------------------------------

    fn return_c_string(
        &self,
        ctx: &CheckContext<'_>,
        temporaries: &FxHashSet<String>,
        sink: &mut dyn DiagnosticSink,
    ) {
        let mut scan = self.scan(ctx, sink);
        let mut scopes = 0usize;
        let const_char = |category: ReturnCategory| category == ReturnCategory::ConstCharPointer;
        for scope in Self::scopes_returning(ctx, const_char) {
            scopes += 1;
            for tok in scope.start.index()..scope.end.index() {
                if self.returns_temporary(scan.tokens, tok, temporaries) {
                    scan.report_fixed(tok, RuleId::ReturnTempPointer, messages::RETURN_TEMP_POINTER);
                }
            }
        }
        tracing::debug!(scopes, findings = scan.findings, "c-string return pass done");
    }
}

impl Check for AutoVariablesCheck {
    fn name(&self) -> &str { "autoVariables" }

    fn description(&self) -> &str {
        "Addresses and references of automatic storage escaping their function"
    }

    fn rules(&self) -> Vec<RuleInfo> {
        let rule = |id, message: &str| RuleInfo {
            id,
            severity: Severity::Error,
            message: message.to_string(),
        };
        vec![
            rule(RuleId::AutoVariables, messages::AUTO_VARIABLE_ASSIGNMENT),
            rule(RuleId::ReturnAddressOfAutoVariable, messages::RETURN_ADDRESS_OF_AUTO_VARIABLE),
            rule(
                RuleId::ReturnAddressOfFunctionParameter,
                &messages::return_address_of_function_parameter("parameter"),
            ),
            rule(RuleId::AutovarInvalidDeallocation, messages::INVALID_DEALLOCATION),
            rule(RuleId::ReturnLocalVariable, messages::RETURN_LOCAL_VARIABLE),
            rule(RuleId::ReturnReference, messages::RETURN_REFERENCE),
            rule(RuleId::ReturnTempReference, messages::RETURN_TEMP_REFERENCE),
            rule(RuleId::ReturnTempPointer, messages::RETURN_TEMP_POINTER),
        ]
    }

    fn run(&self, ctx: &CheckContext<'_>, sink: &mut dyn DiagnosticSink) {
        let temporaries = self.string_returning_names(ctx.tokens());
        self.assignment_escape(ctx, sink);
        self.return_pointer_to_local_array(ctx, sink);
        self.return_reference(ctx, &temporaries, sink);
        self.return_c_string(ctx, &temporaries, sink);
    }
}
