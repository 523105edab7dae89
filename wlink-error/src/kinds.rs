// wlink - wlink-error
// Module: Error Kinds
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Structured error kinds that carry the details of a failure.
//!
//! Each kind renders a precise message and converts into an [`Error`] with
//! the right category and code.

use core::fmt::{self, Display};

use crate::{Error, ErrorCategory, codes};

/// Input ended before a complete item was read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnexpectedEof {
    /// Offset at which more bytes were needed
    pub offset: usize,
}

impl Display for UnexpectedEof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unexpected end of input at offset {}", self.offset)
    }
}

impl From<UnexpectedEof> for Error {
    fn from(kind: UnexpectedEof) -> Self {
        Error::new(ErrorCategory::Parse, codes::UNEXPECTED_EOF, kind.to_string())
    }
}

/// An index refers past the end of its index space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfRange {
    /// Name of the index space ("type", "function", ...)
    pub space: &'static str,
    /// The offending index
    pub index: u32,
    /// Number of entries in the space
    pub len:   usize,
}

impl IndexOutOfRange {
    fn code(&self) -> u16 {
        match self.space {
            "type" => codes::INVALID_TYPE_INDEX,
            "function" => codes::INVALID_FUNCTION_INDEX,
            "table" => codes::INVALID_TABLE_INDEX,
            "memory" => codes::INVALID_MEMORY_INDEX,
            "global" => codes::INVALID_GLOBAL_INDEX,
            _ => codes::VALIDATION_ERROR,
        }
    }
}

impl Display for IndexOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} {} (only {} defined)", self.space, self.index, self.len)
    }
}

impl From<IndexOutOfRange> for Error {
    fn from(kind: IndexOutOfRange) -> Self {
        Error::new(ErrorCategory::Validation, kind.code(), kind.to_string())
    }
}

/// Linear memory access outside the current memory size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAccessOutOfBounds {
    /// Start address of the access
    pub address: u64,
    /// Length of the access in bytes
    pub length:  u64,
    /// Memory size in bytes
    pub size:    u64,
}

impl Display for MemoryAccessOutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "memory access out of bounds: {} bytes at {:#x} (memory size {:#x})",
            self.length, self.address, self.size
        )
    }
}

impl From<MemoryAccessOutOfBounds> for Error {
    fn from(kind: MemoryAccessOutOfBounds) -> Self {
        Error::out_of_bounds(kind.to_string())
    }
}

/// An active segment does not fit into its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentOutOfBounds {
    /// "data" or "element"
    pub kind:    &'static str,
    /// Segment index within the module
    pub segment: u32,
    /// Offset the segment is applied at
    pub offset:  u64,
    /// Number of bytes or elements in the segment
    pub len:     u64,
    /// Size of the target memory (bytes) or table (elements)
    pub bound:   u64,
}

impl Display for SegmentOutOfBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} segment {} out of bounds: {} entries at offset {} exceed size {}",
            self.kind, self.segment, self.len, self.offset, self.bound
        )
    }
}

impl From<SegmentOutOfBounds> for Error {
    fn from(kind: SegmentOutOfBounds) -> Self {
        Error::instantiation_failed(codes::SEGMENT_OUT_OF_BOUNDS, kind.to_string())
    }
}

/// A resolved import value does not match the declared import type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTypeMismatch {
    /// Position of the import
    pub index:    usize,
    /// Name of the import
    pub name:     String,
    /// Declared type, rendered
    pub expected: String,
    /// Type of the supplied value, rendered
    pub actual:   String,
}

impl Display for ImportTypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "import {} has incompatible type: expected {}, found {}",
            self.index, self.expected, self.actual
        )
    }
}

impl From<ImportTypeMismatch> for Error {
    fn from(kind: ImportTypeMismatch) -> Self {
        let name = kind.name.clone();
        Error::instantiation_failed(codes::IMPORT_TYPE_MISMATCH, kind.to_string()).about(name)
    }
}

/// A requested allocation is larger than the configured limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimitExceeded {
    /// What is being allocated ("memory pages", "table elements")
    pub resource:  &'static str,
    /// Requested amount
    pub requested: u64,
    /// Configured limit
    pub limit:     u64,
}

impl Display for ResourceLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} exceeds limit of {}", self.requested, self.resource, self.limit)
    }
}

impl From<ResourceLimitExceeded> for Error {
    fn from(kind: ResourceLimitExceeded) -> Self {
        Error::new(ErrorCategory::Resource, codes::RESOURCE_LIMIT_EXCEEDED, kind.to_string())
    }
}

/// No export of the requested name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportNotFound(pub String);

impl Display for ExportNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "export \"{}\" not found", self.0)
    }
}

impl From<ExportNotFound> for Error {
    fn from(kind: ExportNotFound) -> Self {
        Error::with_subject(ErrorCategory::Runtime, codes::EXPORT_NOT_FOUND, "export not found", kind.0)
    }
}
