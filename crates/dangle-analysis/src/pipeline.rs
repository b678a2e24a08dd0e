//! Analysis entry point: parse, run the registered checks, collect findings.

use std::path::Path;
use std::time::Instant;

use dangle_core::errors::{AnalysisError, ParseError};
use dangle_core::{CheckSettings, Diagnostic, DiagnosticLog, SuppressingSink};

use crate::checks::{CheckContext, CheckRegistry};
use crate::program::Program;

/// Runs a check registry over source files.
pub struct Analyzer {
    settings: CheckSettings,
    registry: CheckRegistry,
}

impl Analyzer {
    /// Create an analyzer holding the default checks.
    pub fn new(settings: CheckSettings) -> Self {
        Self::with_registry(settings, CheckRegistry::with_defaults())
    }

    pub fn with_registry(settings: CheckSettings, registry: CheckRegistry) -> Self {
        Self { settings, registry }
    }

    pub fn settings(&self) -> &CheckSettings {
        &self.settings
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Analyze one translation unit given as text. Findings come back in
    /// the order the checks report them.
    pub fn analyze_source(&self, file_name: &str, source: &str) -> Result<Vec<Diagnostic>, AnalysisError> {
        let start = Instant::now();
        let program = Program::parse(file_name, source)?;
        let diagnostics = self.analyze_program(&program);
        tracing::info!(
            file = file_name,
            tokens = program.tokens.len(),
            functions = program.symbols.functions().len(),
            findings = diagnostics.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "analyzed"
        );
        Ok(diagnostics)
    }

    /// Read and analyze a file from disk.
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<Diagnostic>, AnalysisError> {
        let source = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        self.analyze_source(&path.display().to_string(), &source)
    }

    /// Run the registry over an already parsed program.
    pub fn analyze_program(&self, program: &Program) -> Vec<Diagnostic> {
        let ctx = CheckContext::new(program, &self.settings);
        let mut log = DiagnosticLog::new();
        let mut sink = SuppressingSink::new(&mut log, self.settings.suppressed.iter().copied());
        self.registry.run_all(&ctx, &mut sink);
        if sink.dropped() > 0 {
            tracing::debug!(dropped = sink.dropped(), "suppressed findings");
        }
        log.into_vec()
    }
}
