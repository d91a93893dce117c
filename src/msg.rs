// SPDX-License-Identifier: Apache-2.0

//! Diagnostics sink used by the parser and session.

use std::fmt;

use crate::file_region::FileRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// The current source unit cannot be read at all.
    Failure,
    Error,
    Warning,
    Info,
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Failure => "failure",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Debug => "debug",
        };
        write!(f, "{}", s)
    }
}

/// Message codes attached to diagnostics.
pub mod code {
    /// Source-unit level failures (missing file).
    pub const VLPARSER: &str = "VLPARSER";
    /// Syntax and grammar-level semantic errors.
    pub const PARS: &str = "PARS";
    /// Port/IO reconciliation errors.
    pub const PORT: &str = "PORT";
    /// Compiler directive problems reported by the scanner.
    pub const DIRECTIVE: &str = "DIRECTIVE";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub region: FileRegion,
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.region, self.severity, self.code, self.message
        )
    }
}

/// Receiver of located diagnostics.
pub trait MsgHandler {
    fn report(&mut self, region: FileRegion, severity: Severity, code: &str, message: &str);
}

/// Collects every reported diagnostic and counts errors.
#[derive(Debug, Default)]
pub struct MsgMgr {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl MsgMgr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of `Failure` and `Error` diagnostics seen so far.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Diagnostics whose message contains `needle`.
    pub fn find(&self, needle: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.message.contains(needle))
            .collect()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
    }
}

impl MsgHandler for MsgMgr {
    fn report(&mut self, region: FileRegion, severity: Severity, code: &str, message: &str) {
        match severity {
            Severity::Failure | Severity::Error => {
                self.error_count += 1;
                log::debug!("{} {} @ {}: {}", severity, code, region, message);
            }
            Severity::Warning => {
                self.warning_count += 1;
                log::debug!("{} {} @ {}: {}", severity, code, region, message);
            }
            Severity::Info | Severity::Debug => {
                log::trace!("{} {} @ {}: {}", severity, code, region, message);
            }
        }
        self.diagnostics.push(Diagnostic {
            region,
            severity,
            code: code.to_string(),
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_region::{FileId, Pos, Span};

    fn region() -> FileRegion {
        FileRegion::new(FileId(0), Span::new(Pos::new(1, 1), Pos::new(1, 4)))
    }

    #[test]
    fn test_error_count_includes_failures_only_once_each() {
        let mut mgr = MsgMgr::new();
        mgr.report(region(), Severity::Failure, code::VLPARSER, "x.v : No such file.");
        mgr.report(region(), Severity::Error, code::PARS, "syntax error");
        mgr.report(region(), Severity::Warning, code::PARS, "odd");
        mgr.report(region(), Severity::Info, code::PARS, "fyi");
        assert_eq!(mgr.error_count(), 2);
        assert_eq!(mgr.warning_count(), 1);
        assert_eq!(mgr.diagnostics().len(), 4);
        assert_eq!(mgr.find("No such file").len(), 1);
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic {
            region: region(),
            severity: Severity::Error,
            code: code::PORT.to_string(),
            message: "\"a\" is redefined.".to_string(),
        };
        assert_eq!(d.to_string(), "#0:1:1..1:4 [error] PORT: \"a\" is redefined.");
    }
}
