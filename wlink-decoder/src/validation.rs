// wlink - wlink-decoder
// Module: Module Validation
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Structural validation of a decoded module.
//!
//! Checks everything that can be checked without looking at function
//! bodies: index spaces, limits, exports, the start function, constant
//! expressions and segment targets.

use std::collections::HashSet;

use wlink_error::{Error, ErrorCategory, Result, codes, kinds::IndexOutOfRange};
use wlink_types::{ExternKind, MAX_MEMORY_PAGES, ValueType};

use crate::{
    const_expr::ConstExpr,
    module::{DataMode, ElementMode, ImportDesc, Module},
};

/// Validate `module`
pub fn validate_module(module: &Module) -> Result<()> {
    validate_types_referenced(module)?;
    validate_limits(module)?;
    validate_globals(module)?;
    validate_exports(module)?;
    validate_start(module)?;
    validate_elements(module)?;
    validate_data(module)?;
    Ok(())
}

fn validate_types_referenced(module: &Module) -> Result<()> {
    let imported = module.imports.iter().filter_map(|import| match import.desc {
        ImportDesc::Func(ty) => Some(ty),
        _ => None,
    });
    for ty in imported.chain(module.functions.iter().copied()) {
        module.func_type(ty)?;
    }
    Ok(())
}

fn validate_limits(module: &Module) -> Result<()> {
    if module.memory_count() > 1 {
        return Err(Error::validation_error(
            codes::TOO_MANY_MEMORIES,
            format!("multiple memories: {} declared", module.memory_count()),
        ));
    }
    for import in &module.imports {
        match &import.desc {
            ImportDesc::Memory(ty) => ty.limits.validate(MAX_MEMORY_PAGES)?,
            ImportDesc::Table(ty) => ty.limits.validate(u32::MAX)?,
            _ => {}
        }
    }
    for ty in &module.memories {
        ty.limits.validate(MAX_MEMORY_PAGES)?;
    }
    for ty in &module.tables {
        ty.limits.validate(u32::MAX)?;
    }
    Ok(())
}

fn expect_const_type(expr: &ConstExpr, module: &Module, expected: ValueType, what: &str) -> Result<()> {
    let actual = expr.ty(module)?;
    if actual != expected {
        return Err(Error::validation_error(
            codes::INVALID_CONST_EXPR,
            format!("{} has type {}, expected {}", what, actual, expected),
        ));
    }
    Ok(())
}

fn validate_globals(module: &Module) -> Result<()> {
    let imported = module.imported_global_count();
    for (position, global) in module.globals.iter().enumerate() {
        // An initialiser may only read globals that come before it.
        if let ConstExpr::GlobalGet(index) = global.init {
            let visible = imported + position;
            if index as usize >= visible {
                return Err(IndexOutOfRange { space: "global", index, len: visible }.into());
            }
        }
        expect_const_type(&global.init, module, global.ty.content, "global initializer")?;
    }
    Ok(())
}

fn validate_exports(module: &Module) -> Result<()> {
    let mut seen = HashSet::new();
    for export in &module.exports {
        if !seen.insert(export.name.as_str()) {
            return Err(Error::with_subject(
                ErrorCategory::Validation,
                codes::DUPLICATE_EXPORT,
                "duplicate export name",
                export.name.clone(),
            ));
        }
        let len = match export.kind {
            ExternKind::Func => module.func_count(),
            ExternKind::Table => module.table_count(),
            ExternKind::Memory => module.memory_count(),
            ExternKind::Global => module.global_count(),
        };
        if export.index as usize >= len {
            let space = match export.kind {
                ExternKind::Func => "function",
                ExternKind::Table => "table",
                ExternKind::Memory => "memory",
                ExternKind::Global => "global",
            };
            return Err(IndexOutOfRange { space, index: export.index, len }.into());
        }
    }
    Ok(())
}

fn validate_start(module: &Module) -> Result<()> {
    if let Some(start) = module.start {
        let ty = module.func_signature(start)?;
        if !ty.params.is_empty() || !ty.results.is_empty() {
            return Err(Error::validation_error(
                codes::INVALID_START_FUNCTION,
                format!("start function {} has type {}, expected func ->", start, ty),
            ));
        }
    }
    Ok(())
}

fn validate_elements(module: &Module) -> Result<()> {
    for segment in &module.elements {
        if let ElementMode::Active { table, offset } = &segment.mode {
            let table_ty = module.table_type(*table)?;
            if table_ty.element != segment.ty {
                return Err(Error::type_mismatch(format!(
                    "element segment of {} cannot initialise table of {}",
                    segment.ty, table_ty.element
                )));
            }
            expect_const_type(offset, module, ValueType::I32, "element segment offset")?;
        }
        for item in &segment.items {
            expect_const_type(item, module, segment.ty.into(), "element item")?;
        }
    }
    Ok(())
}

fn validate_data(module: &Module) -> Result<()> {
    if let Some(count) = module.data_count {
        if count as usize != module.data.len() {
            return Err(Error::validation_error(
                codes::VALIDATION_ERROR,
                format!("data count {} does not match {} data segments", count, module.data.len()),
            ));
        }
    }
    for segment in &module.data {
        if let DataMode::Active { memory, offset } = &segment.mode {
            module.memory_type(*memory)?;
            expect_const_type(offset, module, ValueType::I32, "data segment offset")?;
        }
    }
    Ok(())
}
