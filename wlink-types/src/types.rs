// wlink - wlink-types
// Module: WebAssembly Type Definitions
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly value, limit and extern types.

use core::fmt;

use wlink_error::{Error, ErrorCategory, Result, codes};

/// Size of a linear memory page in bytes
pub const PAGE_SIZE: usize = 65536;

/// Largest page count a 32-bit linear memory can declare
pub const MAX_MEMORY_PAGES: u32 = 65536;

/// Represents a WebAssembly value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueType {
    /// 32-bit integer
    #[default]
    I32,
    /// 64-bit integer
    I64,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
    /// 128-bit SIMD vector
    V128,
    /// Function reference
    FuncRef,
    /// External reference
    ExternRef,
}

impl ValueType {
    /// Create a value type from its binary encoding
    pub fn from_binary(byte: u8) -> Result<Self> {
        match byte {
            0x7F => Ok(ValueType::I32),
            0x7E => Ok(ValueType::I64),
            0x7D => Ok(ValueType::F32),
            0x7C => Ok(ValueType::F64),
            0x7B => Ok(ValueType::V128),
            0x70 => Ok(ValueType::FuncRef),
            0x6F => Ok(ValueType::ExternRef),
            _ => Err(Error::with_subject(
                ErrorCategory::Parse,
                codes::MALFORMED_BYTE,
                "invalid value type byte",
                format!("{:#04x}", byte),
            )),
        }
    }

    /// Convert to the binary encoding
    #[must_use]
    pub fn to_binary(self) -> u8 {
        match self {
            ValueType::I32 => 0x7F,
            ValueType::I64 => 0x7E,
            ValueType::F32 => 0x7D,
            ValueType::F64 => 0x7C,
            ValueType::V128 => 0x7B,
            ValueType::FuncRef => 0x70,
            ValueType::ExternRef => 0x6F,
        }
    }

    /// Whether this is a reference type
    #[must_use]
    pub fn is_ref(self) -> bool {
        matches!(self, ValueType::FuncRef | ValueType::ExternRef)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
            ValueType::V128 => "v128",
            ValueType::FuncRef => "funcref",
            ValueType::ExternRef => "externref",
        })
    }
}

/// Element type of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefType {
    /// Function reference
    #[default]
    FuncRef,
    /// External reference
    ExternRef,
}

impl RefType {
    /// Create a reference type from its binary encoding
    pub fn from_binary(byte: u8) -> Result<Self> {
        match byte {
            0x70 => Ok(RefType::FuncRef),
            0x6F => Ok(RefType::ExternRef),
            _ => Err(Error::with_subject(
                ErrorCategory::Parse,
                codes::MALFORMED_BYTE,
                "invalid reference type byte",
                format!("{:#04x}", byte),
            )),
        }
    }
}

impl From<RefType> for ValueType {
    fn from(ty: RefType) -> Self {
        match ty {
            RefType::FuncRef => ValueType::FuncRef,
            RefType::ExternRef => ValueType::ExternRef,
        }
    }
}

impl fmt::Display for RefType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ValueType::from(*self).fmt(f)
    }
}

/// Mutability of a global
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mutability {
    /// Immutable
    #[default]
    Const,
    /// Mutable
    Var,
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mutability::Const => "const",
            Mutability::Var => "var",
        })
    }
}

/// Size limits of a table or memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Limits {
    /// Minimum size
    pub min: u32,
    /// Optional maximum size
    pub max: Option<u32>,
}

impl Limits {
    /// Create new limits
    pub const fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Limits subtyping: `self` (the provided size) satisfies `expected`
    /// when it is at least as large and at most as growable.
    #[must_use]
    pub fn matches(&self, expected: &Limits) -> bool {
        if self.min < expected.min {
            return false;
        }
        match (self.max, expected.max) {
            (_, None) => true,
            (Some(actual), Some(bound)) => actual <= bound,
            (None, Some(_)) => false,
        }
    }

    /// Check `min <= max` and that both stay within `range`
    pub fn validate(&self, range: u32) -> Result<()> {
        if self.min > range || self.max.is_some_and(|max| max > range) {
            return Err(Error::validation_error(
                codes::INVALID_LIMITS,
                format!("limits {} exceed {}", self, range),
            ));
        }
        if self.max.is_some_and(|max| max < self.min) {
            return Err(Error::validation_error(
                codes::INVALID_LIMITS,
                format!("size minimum must not be greater than maximum: {}", self),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Limits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.min)?;
        if let Some(max) = self.max {
            write!(f, " {}", max)?;
        }
        Ok(())
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FuncType {
    /// Parameter types
    pub params:  Vec<ValueType>,
    /// Result types
    pub results: Vec<ValueType>,
}

impl FuncType {
    /// Create a new function type
    pub fn new(
        params: impl IntoIterator<Item = ValueType>,
        results: impl IntoIterator<Item = ValueType>,
    ) -> Self {
        Self {
            params:  params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("func")?;
        for param in &self.params {
            write!(f, " {}", param)?;
        }
        f.write_str(" ->")?;
        for result in &self.results {
            write!(f, " {}", result)?;
        }
        Ok(())
    }
}

/// Global type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlobalType {
    /// Type of the stored value
    pub content:    ValueType,
    /// Whether the global can be written
    pub mutability: Mutability,
}

impl GlobalType {
    /// Create a new global type
    pub const fn new(content: ValueType, mutability: Mutability) -> Self {
        Self { content, mutability }
    }
}

impl fmt::Display for GlobalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "global {} {}", self.mutability, self.content)
    }
}

/// Table type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TableType {
    /// Element type
    pub element: RefType,
    /// Size limits in elements
    pub limits:  Limits,
}

impl TableType {
    /// Create a new table type
    pub const fn new(element: RefType, limits: Limits) -> Self {
        Self { element, limits }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table {} {}", self.limits, self.element)
    }
}

/// Memory type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MemoryType {
    /// Size limits in pages
    pub limits: Limits,
}

impl MemoryType {
    /// Create a new memory type
    pub const fn new(limits: Limits) -> Self {
        Self { limits }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory {}", self.limits)
    }
}

/// The four kinds of extern values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternKind {
    /// Function
    Func,
    /// Global
    Global,
    /// Table
    Table,
    /// Linear memory
    Memory,
}

impl ExternKind {
    /// Create an extern kind from its binary encoding
    pub fn from_binary(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(ExternKind::Func),
            0x01 => Ok(ExternKind::Table),
            0x02 => Ok(ExternKind::Memory),
            0x03 => Ok(ExternKind::Global),
            _ => Err(Error::with_subject(
                ErrorCategory::Parse,
                codes::MALFORMED_BYTE,
                "invalid external kind",
                format!("{:#04x}", byte),
            )),
        }
    }
}

impl fmt::Display for ExternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExternKind::Func => "func",
            ExternKind::Global => "global",
            ExternKind::Table => "table",
            ExternKind::Memory => "memory",
        })
    }
}

/// Type of an import or export
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExternType {
    /// Function with its signature
    Func(FuncType),
    /// Global
    Global(GlobalType),
    /// Table
    Table(TableType),
    /// Linear memory
    Memory(MemoryType),
}

impl ExternType {
    /// The kind of this extern type
    #[must_use]
    pub fn kind(&self) -> ExternKind {
        match self {
            ExternType::Func(_) => ExternKind::Func,
            ExternType::Global(_) => ExternKind::Global,
            ExternType::Table(_) => ExternKind::Table,
            ExternType::Memory(_) => ExternKind::Memory,
        }
    }

    /// Whether a value of type `self` can be bound to an import declared
    /// as `expected`.
    ///
    /// Functions need identical signatures, globals identical content type
    /// and mutability. Tables need the same element type, and tables and
    /// memories are matched with [`Limits::matches`].
    #[must_use]
    pub fn matches(&self, expected: &ExternType) -> bool {
        match (self, expected) {
            (ExternType::Func(actual), ExternType::Func(expected)) => actual == expected,
            (ExternType::Global(actual), ExternType::Global(expected)) => actual == expected,
            (ExternType::Table(actual), ExternType::Table(expected)) => {
                actual.element == expected.element && actual.limits.matches(&expected.limits)
            }
            (ExternType::Memory(actual), ExternType::Memory(expected)) => {
                actual.limits.matches(&expected.limits)
            }
            _ => false,
        }
    }

    /// The function signature, if this is a function type
    pub fn as_func(&self) -> Option<&FuncType> {
        match self {
            ExternType::Func(ty) => Some(ty),
            _ => None,
        }
    }

    /// The global type, if this is a global type
    pub fn as_global(&self) -> Option<&GlobalType> {
        match self {
            ExternType::Global(ty) => Some(ty),
            _ => None,
        }
    }

    /// The table type, if this is a table type
    pub fn as_table(&self) -> Option<&TableType> {
        match self {
            ExternType::Table(ty) => Some(ty),
            _ => None,
        }
    }

    /// The memory type, if this is a memory type
    pub fn as_memory(&self) -> Option<&MemoryType> {
        match self {
            ExternType::Memory(ty) => Some(ty),
            _ => None,
        }
    }
}

impl From<FuncType> for ExternType {
    fn from(ty: FuncType) -> Self {
        ExternType::Func(ty)
    }
}

impl From<GlobalType> for ExternType {
    fn from(ty: GlobalType) -> Self {
        ExternType::Global(ty)
    }
}

impl From<TableType> for ExternType {
    fn from(ty: TableType) -> Self {
        ExternType::Table(ty)
    }
}

impl From<MemoryType> for ExternType {
    fn from(ty: MemoryType) -> Self {
        ExternType::Memory(ty)
    }
}

impl fmt::Display for ExternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternType::Func(ty) => ty.fmt(f),
            ExternType::Global(ty) => ty.fmt(f),
            ExternType::Table(ty) => ty.fmt(f),
            ExternType::Memory(ty) => ty.fmt(f),
        }
    }
}

/// A binding a module requires: `(module, name, type)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportType {
    /// Namespace the import is declared under
    pub module: String,
    /// Import name
    pub name:   String,
    /// Required type
    pub ty:     ExternType,
}

impl ImportType {
    /// Create a new import descriptor
    pub fn new(module: impl Into<String>, name: impl Into<String>, ty: impl Into<ExternType>) -> Self {
        Self { module: module.into(), name: name.into(), ty: ty.into() }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" \"{}\": {}", self.module, self.name, self.ty)
    }
}

/// A binding a module provides: `(name, type)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportType {
    /// Export name
    pub name: String,
    /// Provided type
    pub ty:   ExternType,
}

impl ExportType {
    /// Create a new export descriptor
    pub fn new(name: impl Into<String>, ty: impl Into<ExternType>) -> Self {
        Self { name: name.into(), ty: ty.into() }
    }
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.name, self.ty)
    }
}
