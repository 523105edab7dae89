// wlink - wlink-decoder
// Module: Section Decoder
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Walks the sections of a binary and fills in a [`Module`].

use tracing::{debug, trace};
use wlink_error::{Error, Result, codes};
use wlink_types::{
    ExternKind, FuncType, GlobalType, Limits, MemoryType, Mutability, RefType, TableType,
    ValueType,
};

use crate::{
    const_expr::ConstExpr,
    module::{
        DataMode, DataSegment, ElementMode, ElementSegment, Export, Global, Import, ImportDesc,
        Module,
    },
    reader::BinaryReader,
};

/// Magic bytes at the start of every module
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
/// Supported binary format version
pub const WASM_VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Section ids
pub mod section {
    /// Custom section
    pub const CUSTOM_ID: u8 = 0;
    /// Type section
    pub const TYPE_ID: u8 = 1;
    /// Import section
    pub const IMPORT_ID: u8 = 2;
    /// Function section
    pub const FUNCTION_ID: u8 = 3;
    /// Table section
    pub const TABLE_ID: u8 = 4;
    /// Memory section
    pub const MEMORY_ID: u8 = 5;
    /// Global section
    pub const GLOBAL_ID: u8 = 6;
    /// Export section
    pub const EXPORT_ID: u8 = 7;
    /// Start section
    pub const START_ID: u8 = 8;
    /// Element section
    pub const ELEMENT_ID: u8 = 9;
    /// Code section
    pub const CODE_ID: u8 = 10;
    /// Data section
    pub const DATA_ID: u8 = 11;
    /// Data count section
    pub const DATA_COUNT_ID: u8 = 12;
}

use section::*;

/// Position of a known section in the required order
fn section_rank(id: u8) -> Option<u8> {
    Some(match id {
        TYPE_ID => 1,
        IMPORT_ID => 2,
        FUNCTION_ID => 3,
        TABLE_ID => 4,
        MEMORY_ID => 5,
        GLOBAL_ID => 6,
        EXPORT_ID => 7,
        START_ID => 8,
        ELEMENT_ID => 9,
        DATA_COUNT_ID => 10,
        CODE_ID => 11,
        DATA_ID => 12,
        _ => return None,
    })
}

/// Decode the sections of `bytes` without validating cross references
pub fn decode_sections(bytes: &[u8]) -> Result<Module> {
    let mut reader = BinaryReader::new(bytes);
    let magic: [u8; 4] = reader.read_array()?;
    if magic != WASM_MAGIC {
        return Err(Error::parse_error(
            codes::INVALID_MAGIC,
            format!("invalid magic bytes: expected {:02x?}, found {:02x?}", WASM_MAGIC, magic),
        ));
    }
    let version: [u8; 4] = reader.read_array()?;
    if version != WASM_VERSION {
        return Err(Error::parse_error(
            codes::INVALID_VERSION,
            format!("unsupported version: expected {:02x?}, found {:02x?}", WASM_VERSION, version),
        ));
    }

    let mut module = Module::default();
    let mut last_rank = 0u8;
    let mut code_count: Option<u32> = None;

    while !reader.is_empty() {
        let id = reader.read_u8()?;
        let size = reader.read_u32()? as usize;
        let base = reader.offset();
        let payload = reader.read_bytes(size)?;
        trace!(id, size, offset = base, "section");

        if id == CUSTOM_ID {
            read_custom_section(payload, base, &mut module)?;
            continue;
        }

        let rank = section_rank(id).ok_or_else(|| {
            Error::parse_error(codes::MALFORMED_BYTE, format!("unknown section id {}", id))
        })?;
        if rank <= last_rank {
            return Err(Error::parse_error(
                codes::SECTION_ORDER,
                format!("section {} at offset {} is out of order or duplicated", id, base),
            ));
        }
        last_rank = rank;

        let mut section = BinaryReader::with_base(payload, base);
        match id {
            TYPE_ID => read_type_section(&mut section, &mut module)?,
            IMPORT_ID => read_import_section(&mut section, &mut module)?,
            FUNCTION_ID => {
                module.functions = read_vec(&mut section, BinaryReader::read_u32)?;
            }
            TABLE_ID => module.tables = read_vec(&mut section, read_table_type)?,
            MEMORY_ID => module.memories = read_vec(&mut section, read_memory_type)?,
            GLOBAL_ID => {
                module.globals = read_vec(&mut section, |r| {
                    Ok(Global { ty: read_global_type(r)?, init: ConstExpr::read(r)? })
                })?;
            }
            EXPORT_ID => module.exports = read_vec(&mut section, read_export)?,
            START_ID => module.start = Some(section.read_u32()?),
            ELEMENT_ID => module.elements = read_vec(&mut section, read_element_segment)?,
            DATA_COUNT_ID => module.data_count = Some(section.read_u32()?),
            CODE_ID => code_count = Some(skip_code_section(&mut section)?),
            DATA_ID => module.data = read_vec(&mut section, read_data_segment)?,
            _ => {}
        }

        if !section.is_empty() {
            return Err(Error::parse_error(
                codes::SECTION_SIZE_MISMATCH,
                format!("section {} at offset {} has {} trailing bytes", id, base, section.remaining()),
            ));
        }
    }

    let bodies = code_count.unwrap_or(0) as usize;
    if bodies != module.functions.len() {
        return Err(Error::validation_error(
            codes::FUNCTION_CODE_MISMATCH,
            format!(
                "function and code section have inconsistent lengths: {} declared, {} bodies",
                module.functions.len(),
                bodies
            ),
        ));
    }

    debug!(
        imports = module.imports.len(),
        exports = module.exports.len(),
        functions = module.functions.len(),
        "decoded module"
    );
    Ok(module)
}

fn read_vec<'a, T>(
    reader: &mut BinaryReader<'a>,
    mut item: impl FnMut(&mut BinaryReader<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = reader.read_count()?;
    let mut items = Vec::with_capacity(count as usize);
    for _ in 0..count {
        items.push(item(reader)?);
    }
    Ok(items)
}

fn read_custom_section(payload: &[u8], base: usize, module: &mut Module) -> Result<()> {
    let mut reader = BinaryReader::with_base(payload, base);
    let name = reader.read_name()?;
    if name == "name" {
        // The name section is advisory, a malformed one is ignored.
        module.name = read_module_name(&mut reader).ok().flatten();
    }
    Ok(())
}

fn read_module_name(reader: &mut BinaryReader<'_>) -> Result<Option<String>> {
    while !reader.is_empty() {
        let id = reader.read_u8()?;
        let size = reader.read_u32()? as usize;
        if id == 0 {
            return Ok(Some(reader.read_name()?.to_owned()));
        }
        reader.skip(size)?;
    }
    Ok(None)
}

fn read_value_type(reader: &mut BinaryReader<'_>) -> Result<ValueType> {
    ValueType::from_binary(reader.read_u8()?)
}

fn read_type_section(reader: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    module.types = read_vec(reader, |r| {
        let form = r.read_u8()?;
        if form != 0x60 {
            return Err(Error::parse_error(
                codes::MALFORMED_BYTE,
                format!("expected function type 0x60 at offset {}, found {:#04x}", r.offset() - 1, form),
            ));
        }
        let params = read_vec(r, read_value_type)?;
        let results = read_vec(r, read_value_type)?;
        Ok(FuncType::new(params, results))
    })?;
    Ok(())
}

fn read_limits(reader: &mut BinaryReader<'_>) -> Result<Limits> {
    match reader.read_u8()? {
        0x00 => Ok(Limits::new(reader.read_u32()?, None)),
        0x01 => {
            let min = reader.read_u32()?;
            Ok(Limits::new(min, Some(reader.read_u32()?)))
        }
        flag => Err(Error::parse_error(
            codes::MALFORMED_BYTE,
            format!("unsupported limits flag {:#04x}", flag),
        )),
    }
}

fn read_table_type(reader: &mut BinaryReader<'_>) -> Result<TableType> {
    let element = RefType::from_binary(reader.read_u8()?)?;
    Ok(TableType::new(element, read_limits(reader)?))
}

fn read_memory_type(reader: &mut BinaryReader<'_>) -> Result<MemoryType> {
    Ok(MemoryType::new(read_limits(reader)?))
}

fn read_global_type(reader: &mut BinaryReader<'_>) -> Result<GlobalType> {
    let content = read_value_type(reader)?;
    let mutability = match reader.read_u8()? {
        0x00 => Mutability::Const,
        0x01 => Mutability::Var,
        flag => {
            return Err(Error::parse_error(
                codes::MALFORMED_BYTE,
                format!("malformed mutability {:#04x}", flag),
            ));
        }
    };
    Ok(GlobalType::new(content, mutability))
}

fn read_import_section(reader: &mut BinaryReader<'_>, module: &mut Module) -> Result<()> {
    module.imports = read_vec(reader, |r| {
        let namespace = r.read_name()?.to_owned();
        let name = r.read_name()?.to_owned();
        let desc = match ExternKind::from_binary(r.read_u8()?)? {
            ExternKind::Func => ImportDesc::Func(r.read_u32()?),
            ExternKind::Table => ImportDesc::Table(read_table_type(r)?),
            ExternKind::Memory => ImportDesc::Memory(read_memory_type(r)?),
            ExternKind::Global => ImportDesc::Global(read_global_type(r)?),
        };
        Ok(Import { module: namespace, name, desc })
    })?;
    Ok(())
}

fn read_export(reader: &mut BinaryReader<'_>) -> Result<Export> {
    let name = reader.read_name()?.to_owned();
    let kind = ExternKind::from_binary(reader.read_u8()?)?;
    Ok(Export { name, kind, index: reader.read_u32()? })
}

fn read_func_indices(reader: &mut BinaryReader<'_>) -> Result<Vec<ConstExpr>> {
    read_vec(reader, |r| Ok(ConstExpr::RefFunc(r.read_u32()?)))
}

fn read_elem_kind(reader: &mut BinaryReader<'_>) -> Result<RefType> {
    match reader.read_u8()? {
        0x00 => Ok(RefType::FuncRef),
        kind => Err(Error::parse_error(
            codes::MALFORMED_BYTE,
            format!("unsupported element kind {:#04x}", kind),
        )),
    }
}

fn read_element_segment(reader: &mut BinaryReader<'_>) -> Result<ElementSegment> {
    let flags = reader.read_u32()?;
    let segment = match flags {
        0 => {
            let offset = ConstExpr::read(reader)?;
            ElementSegment {
                ty:    RefType::FuncRef,
                mode:  ElementMode::Active { table: 0, offset },
                items: read_func_indices(reader)?,
            }
        }
        1 | 3 => {
            let ty = read_elem_kind(reader)?;
            let mode = if flags == 1 { ElementMode::Passive } else { ElementMode::Declarative };
            ElementSegment { ty, mode, items: read_func_indices(reader)? }
        }
        2 => {
            let table = reader.read_u32()?;
            let offset = ConstExpr::read(reader)?;
            let ty = read_elem_kind(reader)?;
            ElementSegment {
                ty,
                mode: ElementMode::Active { table, offset },
                items: read_func_indices(reader)?,
            }
        }
        4 => {
            let offset = ConstExpr::read(reader)?;
            ElementSegment {
                ty:    RefType::FuncRef,
                mode:  ElementMode::Active { table: 0, offset },
                items: read_vec(reader, ConstExpr::read)?,
            }
        }
        5 | 7 => {
            let ty = RefType::from_binary(reader.read_u8()?)?;
            let mode = if flags == 5 { ElementMode::Passive } else { ElementMode::Declarative };
            ElementSegment { ty, mode, items: read_vec(reader, ConstExpr::read)? }
        }
        6 => {
            let table = reader.read_u32()?;
            let offset = ConstExpr::read(reader)?;
            let ty = RefType::from_binary(reader.read_u8()?)?;
            ElementSegment {
                ty,
                mode: ElementMode::Active { table, offset },
                items: read_vec(reader, ConstExpr::read)?,
            }
        }
        _ => {
            return Err(Error::parse_error(
                codes::MALFORMED_BYTE,
                format!("malformed element segment flags {}", flags),
            ));
        }
    };
    Ok(segment)
}

fn read_data_segment(reader: &mut BinaryReader<'_>) -> Result<DataSegment> {
    let mode = match reader.read_u32()? {
        0 => DataMode::Active { memory: 0, offset: ConstExpr::read(reader)? },
        1 => DataMode::Passive,
        2 => {
            let memory = reader.read_u32()?;
            DataMode::Active { memory, offset: ConstExpr::read(reader)? }
        }
        flags => {
            return Err(Error::parse_error(
                codes::MALFORMED_BYTE,
                format!("malformed data segment flags {}", flags),
            ));
        }
    };
    let len = reader.read_u32()? as usize;
    let data = reader.read_bytes(len)?.to_vec();
    Ok(DataSegment { mode, data })
}

/// Function bodies are not executed here, so they are only sized and skipped.
fn skip_code_section(reader: &mut BinaryReader<'_>) -> Result<u32> {
    let count = reader.read_count()?;
    for _ in 0..count {
        let size = reader.read_u32()? as usize;
        reader.skip(size)?;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: [u8; 8] = [0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];

    #[test]
    fn empty_module_decodes() {
        let module = decode_sections(&HEADER).unwrap();
        assert!(module.imports.is_empty());
        assert!(module.name.is_none());
    }

    #[test]
    fn rejects_truncated_header() {
        assert_eq!(decode_sections(&HEADER[..6]).unwrap_err().code, codes::UNEXPECTED_EOF);
    }

    #[test]
    fn rejects_unknown_section() {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(&[0x0E, 0x00]);
        assert_eq!(decode_sections(&bytes).unwrap_err().code, codes::MALFORMED_BYTE);
    }

    #[test]
    fn rejects_trailing_bytes_in_section() {
        let mut bytes = HEADER.to_vec();
        // start section: function 0, plus one stray byte
        bytes.extend_from_slice(&[START_ID, 0x02, 0x00, 0x00]);
        assert_eq!(decode_sections(&bytes).unwrap_err().code, codes::SECTION_SIZE_MISMATCH);
    }

    #[test]
    fn reads_module_name_from_name_section() {
        let mut bytes = HEADER.to_vec();
        let mut payload = vec![0x04];
        payload.extend_from_slice(b"name");
        payload.extend_from_slice(&[0x00, 0x05, 0x04]);
        payload.extend_from_slice(b"cube");
        bytes.push(CUSTOM_ID);
        bytes.push(payload.len() as u8);
        bytes.extend_from_slice(&payload);
        assert_eq!(decode_sections(&bytes).unwrap().name.as_deref(), Some("cube"));
    }
}
