// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Instantiation and instances.

use tracing::{debug, info_span};
use wlink_decoder::{ConstExpr, DataMode, ElementMode};
use wlink_error::{
    Error, Result, codes,
    kinds::{ImportTypeMismatch, ResourceLimitExceeded, SegmentOutOfBounds},
};
use wlink_host::HostExport;
use wlink_types::{ExternKind, FuncAddr, PAGE_SIZE, Value};

use crate::{
    Engine, Extern, Func, Global, Memory, Module, Store, Table,
    func::{Caller, invoke},
    module::ModuleKind,
    store::{FuncInstance, GlobalInstance, MemoryInstance, TableInstance},
};

/// An export of an instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceExport {
    /// Export name
    pub name:  String,
    /// Exported value
    pub value: Extern,
}

/// Per-instance data kept by the store
#[derive(Debug, Clone)]
pub(crate) struct InstanceData {
    pub(crate) exports: Vec<InstanceExport>,
}

/// Handle to an instance in a [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instance {
    pub(crate) store: u64,
    pub(crate) index: u32,
}

/// Index spaces of the instance being built
#[derive(Default)]
struct Spaces {
    funcs:    Vec<Func>,
    tables:   Vec<Table>,
    memories: Vec<Memory>,
    globals:  Vec<Global>,
}

impl Spaces {
    fn add_import(&mut self, value: Extern) {
        match value {
            Extern::Func(func) => self.funcs.push(func),
            Extern::Table(table) => self.tables.push(table),
            Extern::Memory(memory) => self.memories.push(memory),
            Extern::Global(global) => self.globals.push(global),
        }
    }

    fn resolve(&self, kind: ExternKind, index: u32) -> Result<Extern> {
        let index = index as usize;
        let found = match kind {
            ExternKind::Func => self.funcs.get(index).copied().map(Extern::Func),
            ExternKind::Table => self.tables.get(index).copied().map(Extern::Table),
            ExternKind::Memory => self.memories.get(index).copied().map(Extern::Memory),
            ExternKind::Global => self.globals.get(index).copied().map(Extern::Global),
        };
        found.ok_or_else(|| Error::invalid_argument(format!("no {} {} in instance", kind, index)))
    }
}

fn instantiation_error(error: Error) -> Error {
    if error.is_instantiation_failure() {
        return error;
    }
    Error::instantiation_failed(
        codes::INSTANTIATION_FAILED,
        format!("instantiation failed: {}", error.message()),
    )
    .caused_by(error)
}

impl Instance {
    /// Instantiate `module` in `store` with `imports`, one value per module
    /// import in declaration order.
    ///
    /// Checks the import count, that every value belongs to `store`, and
    /// that its type matches the declared import. Then allocates the
    /// module's functions, tables, memories and globals, applies active
    /// element and data segments, and runs the start function. Every
    /// failure is reported as an instantiation failure.
    pub fn new(store: &mut Store, module: &Module, imports: &[Extern]) -> Result<Instance> {
        let _span = info_span!(
            "instantiate",
            module = module.name().unwrap_or("<anonymous>"),
            store = store.id()
        )
        .entered();
        let checkpoint = store.checkpoint();
        match Self::instantiate(store, module, imports) {
            Ok(instance) => Ok(instance),
            Err(error) => {
                store.rollback(checkpoint);
                Err(instantiation_error(error))
            }
        }
    }

    fn instantiate(store: &mut Store, module: &Module, imports: &[Extern]) -> Result<Instance> {
        if !Engine::same(store.engine(), module.engine()) {
            return Err(Error::instantiation_failed(
                codes::INSTANTIATION_FAILED,
                "module was compiled by a different engine than the store's",
            ));
        }
        check_imports(store, module, imports)?;

        match module.kind() {
            ModuleKind::Host(host) => {
                let mut exports = Vec::with_capacity(host.len());
                for export in host.exports() {
                    let value = match export {
                        HostExport::Func(func) => {
                            let index = store.push_func(FuncInstance::Host(func.clone()))?;
                            Extern::Func(Func::new(store.id(), index))
                        }
                        HostExport::Global(global) => {
                            let index = store.push_global(GlobalInstance {
                                ty:    global.ty(),
                                value: global.value(),
                            })?;
                            Extern::Global(Global::new(store.id(), index))
                        }
                    };
                    exports.push(InstanceExport { name: export.name().to_owned(), value });
                }
                let instance = Self::register(store, exports)?;
                debug!(exports = host.len(), "host instance created");
                Ok(instance)
            }
            ModuleKind::Wasm(decoded) => Self::instantiate_wasm(store, decoded, imports),
        }
    }

    fn instantiate_wasm(
        store: &mut Store,
        module: &wlink_decoder::Module,
        imports: &[Extern],
    ) -> Result<Instance> {
        let config = store.engine().config().clone();
        let store_id = store.id();
        let instance_index = Store::next_index(store.instances.len())?;
        let mut spaces = Spaces::default();
        for value in imports {
            spaces.add_import(*value);
        }

        for (position, type_index) in module.functions.iter().enumerate() {
            let ty = module.func_type(*type_index)?.clone();
            let index = (module.imported_func_count() + position) as u32;
            let func = store.push_func(FuncInstance::Wasm { ty, instance: instance_index, index })?;
            spaces.funcs.push(Func::new(store_id, func));
        }

        for ty in &module.tables {
            if ty.limits.min > config.max_table_elements {
                return Err(ResourceLimitExceeded {
                    resource:  "table elements",
                    requested: u64::from(ty.limits.min),
                    limit:     u64::from(config.max_table_elements),
                }
                .into());
            }
            let elements = vec![Value::default_for(ty.element.into()); ty.limits.min as usize];
            let table = store.push_table(TableInstance { ty: *ty, elements })?;
            spaces.tables.push(Table::new(store_id, table));
        }

        for ty in &module.memories {
            if ty.limits.min > config.max_memory_pages {
                return Err(ResourceLimitExceeded {
                    resource:  "memory pages",
                    requested: u64::from(ty.limits.min),
                    limit:     u64::from(config.max_memory_pages),
                }
                .into());
            }
            let data = vec![0u8; ty.limits.min as usize * PAGE_SIZE];
            let memory = store.push_memory(MemoryInstance { ty: *ty, data })?;
            spaces.memories.push(Memory::new(store_id, memory));
        }

        for global in &module.globals {
            let value = eval_const(&global.init, store, &spaces)?;
            value.expect_type(global.ty.content)?;
            let index = store.push_global(GlobalInstance { ty: global.ty, value })?;
            spaces.globals.push(Global::new(store_id, index));
        }

        // Every segment is bounds checked before any of them is copied.
        let mut element_writes = Vec::new();
        for (segment_index, segment) in module.elements.iter().enumerate() {
            let ElementMode::Active { table, offset } = &segment.mode else {
                continue;
            };
            let offset = eval_offset(offset, store, &spaces)?;
            let items = segment
                .items
                .iter()
                .map(|item| eval_const(item, store, &spaces))
                .collect::<Result<Vec<_>>>()?;
            let Extern::Table(target) = spaces.resolve(ExternKind::Table, *table)? else {
                return Err(Error::invalid_argument("element segment target is not a table"));
            };
            let bound = store.table(target.index)?.elements.len();
            let end = offset as usize + items.len();
            if end > bound {
                return Err(SegmentOutOfBounds {
                    kind:    "element",
                    segment: segment_index as u32,
                    offset:  u64::from(offset),
                    len:     items.len() as u64,
                    bound:   bound as u64,
                }
                .into());
            }
            element_writes.push((target, offset as usize, items));
        }

        let mut data_writes = Vec::new();
        for (segment_index, segment) in module.data.iter().enumerate() {
            let DataMode::Active { memory, offset } = &segment.mode else {
                continue;
            };
            let offset = eval_offset(offset, store, &spaces)?;
            let Extern::Memory(target) = spaces.resolve(ExternKind::Memory, *memory)? else {
                return Err(Error::invalid_argument("data segment target is not a memory"));
            };
            let bound = store.memory(target.index)?.data.len();
            let end = offset as usize + segment.data.len();
            if end > bound {
                return Err(SegmentOutOfBounds {
                    kind:    "data",
                    segment: segment_index as u32,
                    offset:  u64::from(offset),
                    len:     segment.data.len() as u64,
                    bound:   bound as u64,
                }
                .into());
            }
            data_writes.push((target, offset as usize, &segment.data));
        }

        for (target, offset, items) in element_writes {
            let elements = &mut store.table_mut(target.index)?.elements;
            elements[offset..offset + items.len()].copy_from_slice(&items);
        }
        for (target, offset, bytes) in data_writes {
            let data = &mut store.memory_mut(target.index)?.data;
            data[offset..offset + bytes.len()].copy_from_slice(bytes);
        }

        let exports = module
            .exports
            .iter()
            .map(|export| {
                Ok(InstanceExport {
                    name:  export.name.clone(),
                    value: spaces.resolve(export.kind, export.index)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let instance = Self::register(store, exports)?;

        if let Some(start) = module.start {
            let Extern::Func(func) = spaces.resolve(ExternKind::Func, start)? else {
                return Err(Error::invalid_argument("start function is not a function"));
            };
            instance.run_start(store, func)?;
        }

        debug!(
            functions = spaces.funcs.len(),
            memories = spaces.memories.len(),
            "instance created"
        );
        Ok(instance)
    }

    fn register(store: &mut Store, exports: Vec<InstanceExport>) -> Result<Instance> {
        let index = Store::next_index(store.instances.len())?;
        store.instances.push(InstanceData { exports });
        Ok(Instance { store: store.id(), index })
    }

    fn run_start(&self, store: &mut Store, start: Func) -> Result<()> {
        let func = store.func(start.index)?.clone();
        if let FuncInstance::Wasm { .. } = func {
            return Err(Error::instantiation_failed(
                codes::START_FUNCTION_FAILED,
                "start function failed",
            )
            .caused_by(Error::not_supported(
                "start function is WebAssembly code, which cannot be executed",
            )));
        }
        let memory = self.get_memory(store).map(|memory| memory.index);
        let mut caller = Caller::new(store, memory);
        invoke(&func, &mut caller, &[]).map(|_| ()).map_err(|error| {
            Error::instantiation_failed(codes::START_FUNCTION_FAILED, "start function failed")
                .caused_by(error)
        })
    }

    /// Exports in declaration order
    pub fn exports<'s>(&self, store: &'s Store) -> Result<&'s [InstanceExport]> {
        store.check_owner(self.store)?;
        Ok(&store.instance(self.index)?.exports)
    }

    /// Export called `name`
    pub fn get_export(&self, store: &Store, name: &str) -> Option<Extern> {
        self.exports(store)
            .ok()?
            .iter()
            .find(|export| export.name == name)
            .map(|export| export.value)
    }

    /// Exported function called `name`
    pub fn get_func(&self, store: &Store, name: &str) -> Option<Func> {
        self.get_export(store, name)?.into_func()
    }

    /// Exported memory; by convention the one called `memory`
    pub fn get_memory(&self, store: &Store) -> Option<Memory> {
        self.get_export(store, "memory")?.into_memory()
    }

    /// Exported global called `name`
    pub fn get_global(&self, store: &Store, name: &str) -> Option<Global> {
        self.get_export(store, name)?.into_global()
    }

    /// Exported table called `name`
    pub fn get_table(&self, store: &Store, name: &str) -> Option<Table> {
        self.get_export(store, name)?.into_table()
    }
}

fn check_imports(store: &Store, module: &Module, imports: &[Extern]) -> Result<()> {
    let declared = module.imports();
    if declared.len() != imports.len() {
        return Err(Error::instantiation_failed(
            codes::IMPORT_COUNT_MISMATCH,
            format!("module declares {} imports, {} values supplied", declared.len(), imports.len()),
        ));
    }
    for (index, (import, value)) in declared.iter().zip(imports).enumerate() {
        if value.store_id() != store.id() {
            return Err(Error::instantiation_failed(
                codes::FOREIGN_STORE,
                format!("import {} comes from store {}, not store {}", index, value.store_id(), store.id()),
            )
            .about(import.name.clone()));
        }
        let actual = value.ty(store)?;
        if !actual.matches(&import.ty) {
            return Err(ImportTypeMismatch {
                index,
                name: import.name.clone(),
                expected: import.ty.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn eval_const(expr: &ConstExpr, store: &Store, spaces: &Spaces) -> Result<Value> {
    Ok(match expr {
        ConstExpr::I32(v) => Value::I32(*v),
        ConstExpr::I64(v) => Value::I64(*v),
        ConstExpr::F32(v) => Value::F32(*v),
        ConstExpr::F64(v) => Value::F64(*v),
        ConstExpr::GlobalGet(index) => match spaces.resolve(ExternKind::Global, *index)? {
            Extern::Global(global) => global.get(store)?,
            _ => return Err(Error::invalid_argument("global.get of a non-global")),
        },
        ConstExpr::RefNull(ty) => Value::default_for((*ty).into()),
        ConstExpr::RefFunc(index) => match spaces.resolve(ExternKind::Func, *index)? {
            Extern::Func(func) => Value::FuncRef(Some(FuncAddr::new(func.store, func.index))),
            _ => return Err(Error::invalid_argument("ref.func of a non-function")),
        },
    })
}

fn eval_offset(expr: &ConstExpr, store: &Store, spaces: &Spaces) -> Result<u32> {
    match eval_const(expr, store, spaces)? {
        Value::I32(offset) => Ok(offset as u32),
        other => Err(Error::type_mismatch(format!("segment offset has type {}", other.ty()))),
    }
}
