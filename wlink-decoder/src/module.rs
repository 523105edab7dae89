// wlink - wlink-decoder
// Module: Decoded Module
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! In-memory representation of a decoded WebAssembly module.
//!
//! Index spaces follow the binary format: imported entities come first,
//! followed by the ones the module defines.

use wlink_error::{Result, kinds::IndexOutOfRange};
use wlink_types::{
    ExportType, ExternKind, ExternType, FuncType, GlobalType, ImportType, MemoryType, RefType,
    TableType,
};

use crate::const_expr::ConstExpr;

/// What an import refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDesc {
    /// Function of the given type index
    Func(u32),
    /// Table
    Table(TableType),
    /// Linear memory
    Memory(MemoryType),
    /// Global
    Global(GlobalType),
}

/// An import entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Namespace
    pub module: String,
    /// Name
    pub name:   String,
    /// What is imported
    pub desc:   ImportDesc,
}

/// A global defined by the module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Global {
    /// Type of the global
    pub ty:   GlobalType,
    /// Initial value
    pub init: ConstExpr,
}

/// An export entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// Export name
    pub name:  String,
    /// Kind of the exported entity
    pub kind:  ExternKind,
    /// Index into the kind's index space
    pub index: u32,
}

/// How an element segment is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementMode {
    /// Copied into `table` at `offset` during instantiation
    Active {
        /// Target table
        table:  u32,
        /// Offset expression
        offset: ConstExpr,
    },
    /// Available to `table.init`
    Passive,
    /// Only declares function references
    Declarative,
}

/// An element segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSegment {
    /// Element type
    pub ty:    RefType,
    /// Mode
    pub mode:  ElementMode,
    /// Items, one reference-valued expression each
    pub items: Vec<ConstExpr>,
}

/// How a data segment is used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataMode {
    /// Copied into `memory` at `offset` during instantiation
    Active {
        /// Target memory
        memory: u32,
        /// Offset expression
        offset: ConstExpr,
    },
    /// Available to `memory.init`
    Passive,
}

/// A data segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSegment {
    /// Mode
    pub mode: DataMode,
    /// Bytes
    pub data: Vec<u8>,
}

/// A decoded module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    /// Module name from the `name` custom section
    pub name:       Option<String>,
    /// Function types
    pub types:      Vec<FuncType>,
    /// Imports in declaration order
    pub imports:    Vec<Import>,
    /// Type indices of defined functions
    pub functions:  Vec<u32>,
    /// Defined tables
    pub tables:     Vec<TableType>,
    /// Defined memories
    pub memories:   Vec<MemoryType>,
    /// Defined globals
    pub globals:    Vec<Global>,
    /// Exports in declaration order
    pub exports:    Vec<Export>,
    /// Start function index
    pub start:      Option<u32>,
    /// Element segments
    pub elements:   Vec<ElementSegment>,
    /// Value of the data count section
    pub data_count: Option<u32>,
    /// Data segments
    pub data:       Vec<DataSegment>,
}

impl Module {
    /// Type of the function type index `index`
    pub fn func_type(&self, index: u32) -> Result<&FuncType> {
        self.types.get(index as usize).ok_or_else(|| {
            IndexOutOfRange { space: "type", index, len: self.types.len() }.into()
        })
    }

    fn imported(&self, kind: ExternKind) -> impl Iterator<Item = &ImportDesc> {
        self.imports.iter().map(|import| &import.desc).filter(move |desc| {
            matches!(
                (kind, desc),
                (ExternKind::Func, ImportDesc::Func(_))
                    | (ExternKind::Table, ImportDesc::Table(_))
                    | (ExternKind::Memory, ImportDesc::Memory(_))
                    | (ExternKind::Global, ImportDesc::Global(_))
            )
        })
    }

    /// Number of imported functions
    pub fn imported_func_count(&self) -> usize {
        self.imported(ExternKind::Func).count()
    }

    /// Number of imported tables
    pub fn imported_table_count(&self) -> usize {
        self.imported(ExternKind::Table).count()
    }

    /// Number of imported memories
    pub fn imported_memory_count(&self) -> usize {
        self.imported(ExternKind::Memory).count()
    }

    /// Number of imported globals
    pub fn imported_global_count(&self) -> usize {
        self.imported(ExternKind::Global).count()
    }

    /// Size of the function index space
    pub fn func_count(&self) -> usize {
        self.imported_func_count() + self.functions.len()
    }

    /// Size of the table index space
    pub fn table_count(&self) -> usize {
        self.imported_table_count() + self.tables.len()
    }

    /// Size of the memory index space
    pub fn memory_count(&self) -> usize {
        self.imported_memory_count() + self.memories.len()
    }

    /// Size of the global index space
    pub fn global_count(&self) -> usize {
        self.imported_global_count() + self.globals.len()
    }

    /// Type index of the function at `index` in the function index space
    pub fn func_type_index(&self, index: u32) -> Result<u32> {
        self.imported(ExternKind::Func)
            .filter_map(|desc| match desc {
                ImportDesc::Func(ty) => Some(*ty),
                _ => None,
            })
            .chain(self.functions.iter().copied())
            .nth(index as usize)
            .ok_or_else(|| {
                IndexOutOfRange { space: "function", index, len: self.func_count() }.into()
            })
    }

    /// Signature of the function at `index` in the function index space
    pub fn func_signature(&self, index: u32) -> Result<&FuncType> {
        self.func_type(self.func_type_index(index)?)
    }

    /// Type of the table at `index` in the table index space
    pub fn table_type(&self, index: u32) -> Result<TableType> {
        self.imported(ExternKind::Table)
            .filter_map(|desc| match desc {
                ImportDesc::Table(ty) => Some(*ty),
                _ => None,
            })
            .chain(self.tables.iter().copied())
            .nth(index as usize)
            .ok_or_else(|| IndexOutOfRange { space: "table", index, len: self.table_count() }.into())
    }

    /// Type of the memory at `index` in the memory index space
    pub fn memory_type(&self, index: u32) -> Result<MemoryType> {
        self.imported(ExternKind::Memory)
            .filter_map(|desc| match desc {
                ImportDesc::Memory(ty) => Some(*ty),
                _ => None,
            })
            .chain(self.memories.iter().copied())
            .nth(index as usize)
            .ok_or_else(|| {
                IndexOutOfRange { space: "memory", index, len: self.memory_count() }.into()
            })
    }

    /// Type of the global at `index` in the global index space
    pub fn global_type(&self, index: u32) -> Result<GlobalType> {
        self.imported(ExternKind::Global)
            .filter_map(|desc| match desc {
                ImportDesc::Global(ty) => Some(*ty),
                _ => None,
            })
            .chain(self.globals.iter().map(|global| global.ty))
            .nth(index as usize)
            .ok_or_else(|| {
                IndexOutOfRange { space: "global", index, len: self.global_count() }.into()
            })
    }

    /// Import descriptors with their resolved types, in declaration order
    pub fn import_types(&self) -> Result<Vec<ImportType>> {
        self.imports
            .iter()
            .map(|import| {
                let ty = match &import.desc {
                    ImportDesc::Func(index) => ExternType::Func(self.func_type(*index)?.clone()),
                    ImportDesc::Table(ty) => ExternType::Table(*ty),
                    ImportDesc::Memory(ty) => ExternType::Memory(*ty),
                    ImportDesc::Global(ty) => ExternType::Global(*ty),
                };
                Ok(ImportType::new(import.module.clone(), import.name.clone(), ty))
            })
            .collect()
    }

    /// Type of the entity an export refers to
    pub fn export_extern_type(&self, export: &Export) -> Result<ExternType> {
        Ok(match export.kind {
            ExternKind::Func => ExternType::Func(self.func_signature(export.index)?.clone()),
            ExternKind::Table => ExternType::Table(self.table_type(export.index)?),
            ExternKind::Memory => ExternType::Memory(self.memory_type(export.index)?),
            ExternKind::Global => ExternType::Global(self.global_type(export.index)?),
        })
    }

    /// Export descriptors with their resolved types, in declaration order
    pub fn export_types(&self) -> Result<Vec<ExportType>> {
        self.exports
            .iter()
            .map(|export| Ok(ExportType::new(export.name.clone(), self.export_extern_type(export)?)))
            .collect()
    }
}
