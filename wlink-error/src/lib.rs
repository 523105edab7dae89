// wlink - wlink-error
// Module: Error Handling
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! wlink error handling library
//!
//! This library provides the error type shared by every crate of the wlink
//! workspace. An [`Error`] carries a category, a numeric code from
//! [`codes`], a message and, where it matters, the subject of the failure
//! (the name of an unresolved import, the path of a module that could not be
//! loaded).
//!
//! # Error Categories
//!
//! The four failures an embedder has to tell apart when bringing a guest
//! module to life each have their own category:
//!
//! - [`ErrorCategory::Load`]: module bytes were unavailable
//! - [`ErrorCategory::Compilation`]: the bytes are not a valid module
//! - [`ErrorCategory::Link`]: an import could not be resolved
//! - [`ErrorCategory::Instantiation`]: the engine rejected the import table
//!
//! The remaining categories describe failures below that level (parse and
//! validation problems inside the decoder, type mismatches and traps inside
//! the runtime) and normally end up as the source of one of the four above.
//!
//! # Usage
//!
//! ```
//! use wlink_error::{codes, Error, ErrorCategory};
//!
//! let error = Error::unresolved_import("missing_fn");
//! assert!(error.is_unresolved_import());
//! assert_eq!(error.subject(), Some("missing_fn"));
//!
//! let error = Error::new(ErrorCategory::Validation, codes::DUPLICATE_EXPORT, "duplicate export");
//! assert_eq!(error.code, codes::DUPLICATE_EXPORT);
//! ```

#![forbid(unsafe_code)] // Rule 2
#![deny(missing_docs)]

/// Error codes for wlink
pub mod codes;
/// Error and error category types
pub mod errors;
/// Constructors for the common error kinds
pub mod kinds;

// Re-export key types
pub use errors::{Error, ErrorCategory};

/// A specialized `Result` type for wlink operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error conversion trait for attaching a wlink category to foreign errors.
///
/// Implemented for the standard library errors the workspace runs into, so
/// call sites can write `.map_err(Error::from_error)`-style conversions
/// without repeating category and code.
pub trait FromError<E> {
    /// Convert from the source error type to the target error type
    fn from_error(error: E) -> Self;
}

impl FromError<std::str::Utf8Error> for Error {
    fn from_error(error: std::str::Utf8Error) -> Self {
        Error::with_subject(
            ErrorCategory::Parse,
            codes::INVALID_UTF8,
            "invalid UTF-8 in name",
            error.to_string(),
        )
    }
}

impl FromError<std::io::Error> for Error {
    fn from_error(error: std::io::Error) -> Self {
        Error::with_subject(
            ErrorCategory::Load,
            codes::IO_ERROR,
            "I/O error",
            error.to_string(),
        )
    }
}
