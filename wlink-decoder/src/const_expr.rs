// wlink - wlink-decoder
// Module: Constant Expressions
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Constant expressions used for global initialisers, segment offsets and
//! element items.

use wlink_error::{Error, Result, codes};
use wlink_types::{FloatBits32, FloatBits64, RefType, ValueType};

use crate::{module::Module, reader::BinaryReader};

const OP_END: u8 = 0x0B;
const OP_GLOBAL_GET: u8 = 0x23;
const OP_I32_CONST: u8 = 0x41;
const OP_I64_CONST: u8 = 0x42;
const OP_F32_CONST: u8 = 0x43;
const OP_F64_CONST: u8 = 0x44;
const OP_REF_NULL: u8 = 0xD0;
const OP_REF_FUNC: u8 = 0xD2;

/// A single-instruction constant expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstExpr {
    /// `i32.const`
    I32(i32),
    /// `i64.const`
    I64(i64),
    /// `f32.const`
    F32(FloatBits32),
    /// `f64.const`
    F64(FloatBits64),
    /// `global.get`
    GlobalGet(u32),
    /// `ref.null`
    RefNull(RefType),
    /// `ref.func`
    RefFunc(u32),
}

impl ConstExpr {
    /// Read an expression up to and including its `end`
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let offset = reader.offset();
        let expr = match reader.read_u8()? {
            OP_I32_CONST => ConstExpr::I32(reader.read_i32()?),
            OP_I64_CONST => ConstExpr::I64(reader.read_i64()?),
            OP_F32_CONST => ConstExpr::F32(FloatBits32(u32::from_le_bytes(reader.read_array()?))),
            OP_F64_CONST => ConstExpr::F64(FloatBits64(u64::from_le_bytes(reader.read_array()?))),
            OP_GLOBAL_GET => ConstExpr::GlobalGet(reader.read_u32()?),
            OP_REF_NULL => ConstExpr::RefNull(RefType::from_binary(reader.read_u8()?)?),
            OP_REF_FUNC => ConstExpr::RefFunc(reader.read_u32()?),
            opcode => {
                return Err(Error::validation_error(
                    codes::INVALID_CONST_EXPR,
                    format!("opcode {:#04x} at offset {} is not a constant instruction", opcode, offset),
                ));
            }
        };
        if reader.read_u8()? != OP_END {
            return Err(Error::validation_error(
                codes::INVALID_CONST_EXPR,
                format!("constant expression at offset {} must be a single instruction", offset),
            ));
        }
        Ok(expr)
    }

    /// Type the expression produces within `module`
    pub fn ty(&self, module: &Module) -> Result<ValueType> {
        Ok(match self {
            ConstExpr::I32(_) => ValueType::I32,
            ConstExpr::I64(_) => ValueType::I64,
            ConstExpr::F32(_) => ValueType::F32,
            ConstExpr::F64(_) => ValueType::F64,
            ConstExpr::GlobalGet(index) => module.global_type(*index)?.content,
            ConstExpr::RefNull(ty) => (*ty).into(),
            ConstExpr::RefFunc(index) => {
                module.func_type_index(*index)?;
                ValueType::FuncRef
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_i32_const() {
        let mut reader = BinaryReader::new(&[OP_I32_CONST, 0x7F, OP_END]);
        assert_eq!(ConstExpr::read(&mut reader).unwrap(), ConstExpr::I32(-1));
        assert!(reader.is_empty());
    }

    #[test]
    fn rejects_non_constant_opcode() {
        // i32.add
        let mut reader = BinaryReader::new(&[0x6A, OP_END]);
        assert_eq!(ConstExpr::read(&mut reader).unwrap_err().code, codes::INVALID_CONST_EXPR);
    }

    #[test]
    fn rejects_missing_end() {
        let mut reader = BinaryReader::new(&[OP_I32_CONST, 0x00, OP_I32_CONST, 0x00, OP_END]);
        assert_eq!(ConstExpr::read(&mut reader).unwrap_err().code, codes::INVALID_CONST_EXPR);
    }
}
