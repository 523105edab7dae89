// wlink - wlink-error
// Module: Error Types
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! The unified error type for wlink operations.

use std::borrow::Cow;
use std::fmt;

use crate::codes;

/// `Error` categories for wlink operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    /// Module bytes could not be read
    Load          = 1,
    /// Module bytes are not a valid module
    Compilation   = 2,
    /// Import resolution failed
    Link          = 3,
    /// Instantiation rejected a resolved import table
    Instantiation = 4,
    /// Binary format errors
    Parse         = 5,
    /// Structural validation errors
    Validation    = 6,
    /// Type errors
    Type          = 7,
    /// Runtime errors (general)
    Runtime       = 8,
    /// Traps raised while running host code
    Trap          = 9,
    /// Resource limits (memory pages, table elements)
    Resource      = 10,
    /// Parameter-related errors (invalid arguments, misaligned inputs)
    Parameter     = 11,
    /// Not supported operation errors
    NotSupported  = 12,
    /// Guest requested termination
    Exit          = 13,
}

/// wlink `Error` type
///
/// Carries a category, a code and a message. `subject` names the thing the
/// error is about when there is one: the unresolved import, the file that
/// failed to load, the offending export. Errors raised while doing
/// something on behalf of a higher level keep the lower-level error as
/// their source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// `Error` category
    pub category: ErrorCategory,
    /// `Error` code
    pub code:     u16,
    message:      Cow<'static, str>,
    subject:      Option<String>,
    source:       Option<Box<Error>>,
    exit_status:  Option<i32>,
}

impl Error {
    /// Create a new error
    pub fn new(category: ErrorCategory, code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            category,
            code,
            message: message.into(),
            subject: None,
            source: None,
            exit_status: None,
        }
    }

    /// Create a new error about a named subject
    pub fn with_subject(
        category: ErrorCategory,
        code: u16,
        message: impl Into<Cow<'static, str>>,
        subject: impl Into<String>,
    ) -> Self {
        Self::new(category, code, message).about(subject)
    }

    /// Set the subject of this error
    #[must_use]
    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attach the lower-level error that caused this one
    #[must_use]
    pub fn caused_by(mut self, source: Error) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // Taxonomy seen by embedders

    /// Module bytes could not be obtained from `path`
    pub fn module_load_failed(path: impl Into<String>, source: Error) -> Self {
        Self::with_subject(
            ErrorCategory::Load,
            codes::MODULE_LOAD_FAILED,
            "failed to load module",
            path,
        )
        .caused_by(source)
    }

    /// Module bytes did not decode or validate
    pub fn compilation_failed(source: Error) -> Self {
        Self::new(ErrorCategory::Compilation, codes::COMPILATION_FAILED, "failed to compile module")
            .caused_by(source)
    }

    /// No provider export matches the import called `name`
    pub fn unresolved_import(name: impl Into<String>) -> Self {
        Self::with_subject(ErrorCategory::Link, codes::UNRESOLVED_IMPORT, "unresolved import", name)
    }

    /// Instantiation rejected with a given code
    pub fn instantiation_failed(code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Instantiation, code, message)
    }

    // Lower-level kinds

    /// Binary format error
    pub fn parse_error(code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Parse, code, message)
    }

    /// Structural validation error
    pub fn validation_error(code: u16, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Validation, code, message)
    }

    /// Type mismatch
    pub fn type_mismatch(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Type, codes::TYPE_MISMATCH, message)
    }

    /// Out of bounds access
    pub fn out_of_bounds(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Runtime, codes::OUT_OF_BOUNDS, message)
    }

    /// Operation not supported
    pub fn not_supported(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::NotSupported, codes::NOT_SUPPORTED, message)
    }

    /// Invalid argument
    pub fn invalid_argument(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Parameter, codes::INVALID_ARGUMENT, message)
    }

    /// Trap raised by host code
    pub fn trap(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCategory::Trap, codes::TRAP, message)
    }

    /// Guest asked to exit with `status`
    pub fn exit(status: i32) -> Self {
        let mut error = Self::new(ErrorCategory::Exit, codes::PROCESS_EXIT, "process exit");
        error.exit_status = Some(status);
        error
    }

    // Accessors

    /// The error message, without subject
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The subject of the error, if any
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The lower-level error that caused this one
    pub fn cause(&self) -> Option<&Error> {
        self.source.as_deref()
    }

    /// The innermost error of the cause chain
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Some(next) = current.cause() {
            current = next;
        }
        current
    }

    /// Exit status requested by the guest, searching the cause chain
    pub fn exit_code(&self) -> Option<i32> {
        let mut current = Some(self);
        while let Some(error) = current {
            if error.exit_status.is_some() {
                return error.exit_status;
            }
            current = error.cause();
        }
        None
    }

    /// Name of the unresolved import, if this is an unresolved-import error
    pub fn unresolved_import_name(&self) -> Option<&str> {
        if self.is_unresolved_import() { self.subject() } else { None }
    }

    // Predicates

    /// Check if this is a module load failure
    pub fn is_load_failure(&self) -> bool {
        self.category == ErrorCategory::Load
    }

    /// Check if this is a compilation failure
    pub fn is_compilation_failure(&self) -> bool {
        self.category == ErrorCategory::Compilation
    }

    /// Check if this is an unresolved import
    pub fn is_unresolved_import(&self) -> bool {
        self.category == ErrorCategory::Link && self.code == codes::UNRESOLVED_IMPORT
    }

    /// Check if this is an instantiation failure
    pub fn is_instantiation_failure(&self) -> bool {
        self.category == ErrorCategory::Instantiation
    }

    /// Check if this is a type error
    pub fn is_type_error(&self) -> bool {
        self.category == ErrorCategory::Type
    }

    /// Check if this is a trap
    pub fn is_trap(&self) -> bool {
        self.category == ErrorCategory::Trap
    }

    /// Check if this is an unsupported operation
    pub fn is_not_supported(&self) -> bool {
        self.category == ErrorCategory::NotSupported
    }

    /// Check if this is a guest exit
    pub fn is_exit(&self) -> bool {
        self.category == ErrorCategory::Exit
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}][E{:04X}] {}", self.category, self.code, self.message)?;
        if let Some(subject) = &self.subject {
            write!(f, ": {}", subject)?;
        }
        if let Some(status) = self.exit_status {
            write!(f, " (status {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_subject() {
        let error = Error::unresolved_import("missing_fn");
        assert_eq!(error.to_string(), "[Link][E07D0] unresolved import: missing_fn");
    }

    #[test]
    fn test_exit_code_is_found_through_causes() {
        let error = Error::instantiation_failed(codes::START_FUNCTION_FAILED, "start failed")
            .caused_by(Error::exit(3));
        assert!(error.is_instantiation_failure());
        assert_eq!(error.exit_code(), Some(3));
        assert!(error.root_cause().is_exit());
    }

    #[test]
    fn test_unresolved_import_name_only_for_link_errors() {
        let error = Error::with_subject(
            ErrorCategory::Runtime,
            codes::EXPORT_NOT_FOUND,
            "export not found",
            "run",
        );
        assert_eq!(error.unresolved_import_name(), None);
        assert_eq!(Error::unresolved_import("run").unresolved_import_name(), Some("run"));
    }

    #[test]
    fn test_std_error_source_chain() {
        use std::error::Error as _;

        let inner = Error::parse_error(codes::INVALID_MAGIC, "bad magic");
        let outer = Error::compilation_failed(inner.clone());
        let source = outer.source().map(ToString::to_string);
        assert_eq!(source, Some(inner.to_string()));
    }
}
