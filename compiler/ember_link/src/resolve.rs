//! Import resolution across a working set.

use ember_diagnostic::{CompileError, CompileResult, SymbolKind};
use ember_symbols::{ExportDescriptor, ImportEntry, ModuleMetadata};
use rustc_hash::FxHashMap;

use crate::StdlibCatalog;

/// A module whose imports are all resolved.
#[derive(Clone, PartialEq, Debug)]
pub struct LinkedModule {
    meta: ModuleMetadata,
}

impl LinkedModule {
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn metadata(&self) -> &ModuleMetadata {
        &self.meta
    }

    pub fn into_metadata(self) -> ModuleMetadata {
        self.meta
    }
}

/// Every module of one compilation, linked.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct LinkedSet {
    modules: Vec<LinkedModule>,
}

impl LinkedSet {
    pub fn get(&self, name: &str) -> Option<&LinkedModule> {
        self.modules.iter().find(|module| module.name() == name)
    }

    /// Modules in the order they were handed to [`link`].
    pub fn iter(&self) -> impl Iterator<Item = &LinkedModule> + '_ {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn into_modules(self) -> Vec<LinkedModule> {
        self.modules
    }
}

/// Resolve every import of every module in `modules`.
///
/// Standard-library modules are consulted first; any other source must be a
/// module of the set exporting the imported name. Errors name the module
/// and import being resolved. Imports that are already resolved are left
/// alone.
#[tracing::instrument(level = "debug", skip_all, fields(modules = modules.len()))]
pub fn link(
    mut modules: Vec<ModuleMetadata>,
    catalog: &StdlibCatalog,
) -> CompileResult<LinkedSet> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    for (i, module) in modules.iter().enumerate() {
        if index.insert(module.name.clone(), i).is_some() {
            return Err(CompileError::duplicate(SymbolKind::Module, &module.name));
        }
    }

    for i in 0..modules.len() {
        // Look everything up first; the exporting module may be this one.
        let resolutions = modules[i]
            .unresolved_imports()
            .map(|(id, entry)| {
                resolve_import(entry, &modules, &index, catalog)
                    .map(|descriptor| (id.to_string(), descriptor))
                    .map_err(|source| CompileError::Link {
                        module: modules[i].name.clone(),
                        import: id.to_string(),
                        source: Box::new(source),
                    })
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let module = &mut modules[i];
        for (id, descriptor) in resolutions {
            if let Some(entry) = module.imports.get_mut(&id) {
                tracing::debug!(
                    module = module.name.as_str(),
                    import = id.as_str(),
                    from = entry.module.as_str(),
                    kind = descriptor.kind_name(),
                    "resolved import"
                );
                entry.resolve(descriptor);
            }
        }
    }

    Ok(LinkedSet {
        modules: modules
            .into_iter()
            .map(|meta| LinkedModule { meta })
            .collect(),
    })
}

fn resolve_import(
    entry: &ImportEntry,
    modules: &[ModuleMetadata],
    index: &FxHashMap<String, usize>,
    catalog: &StdlibCatalog,
) -> CompileResult<ExportDescriptor> {
    if let Some(stdlib) = catalog.get(&entry.module) {
        return stdlib.exports.get(&entry.name).cloned().ok_or_else(|| {
            CompileError::UnknownStdlibExport {
                module: entry.module.clone(),
                name: entry.name.clone(),
            }
        });
    }
    let source = index
        .get(&entry.module)
        .map(|&i| &modules[i])
        .ok_or_else(|| CompileError::MissingModule {
            module: entry.module.clone(),
        })?;
    source
        .exports
        .get(&entry.name)
        .cloned()
        .ok_or_else(|| CompileError::UnknownExport {
            module: entry.module.clone(),
            name: entry.name.clone(),
        })
}

#[cfg(test)]
mod tests;
