//! Pipeline orchestration.
//!
//! One driver run: load the working set, extract every module, link the
//! whole set once, then emit each module. Each module's constant data starts
//! where the previous module's ended so the segments can share one memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ember_codegen::{emit_module, LabelGenerator};
use ember_diagnostic::CompileError;
use ember_ir::Module;
use ember_link::{link, StdlibCatalog};
use ember_symbols::Extractor;

use crate::config::{CompileConfig, EmitKind};
use crate::error::DriverError;
use crate::loader::{FsLoader, ModuleLoader};
use crate::toolchain::Toolchain;

/// Module text of every module in the working set, keyed by module name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledProgram {
    entry: String,
    modules: BTreeMap<String, String>,
}

impl CompiledProgram {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.modules.get(name).map(String::as_str)
    }

    /// Modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.modules
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Load `entry` and the sibling modules it imports from.
///
/// Standard-library modules come from the catalog and are not loaded.
/// Siblings are loaded one level deep: their own imports must name modules
/// already in the set or in the catalog.
pub fn load_working_set(
    entry: &str,
    loader: &dyn ModuleLoader,
    catalog: &StdlibCatalog,
) -> Result<Vec<Module>, DriverError> {
    let entry_module = loader.load(entry)?;
    let mut siblings = Vec::new();
    for source in entry_module.import_sources() {
        if source == entry || catalog.contains(source) {
            continue;
        }
        tracing::debug!(module = source, "loading sibling");
        siblings.push(loader.load(source)?);
    }
    let mut modules = Vec::with_capacity(siblings.len() + 1);
    modules.push(entry_module);
    modules.extend(siblings);
    Ok(modules)
}

/// Compile `entry` and its working set to module text.
#[tracing::instrument(level = "debug", skip(loader, catalog, config))]
pub fn compile(
    entry: &str,
    loader: &dyn ModuleLoader,
    catalog: &StdlibCatalog,
    config: &CompileConfig,
) -> Result<CompiledProgram, DriverError> {
    let modules = load_working_set(entry, loader, catalog)?;

    let mut data_base = config.data_base;
    let mut metadata = Vec::with_capacity(modules.len());
    for module in &modules {
        let meta = Extractor::with_data_base(data_base).extract(module)?;
        data_base = meta.data_end();
        metadata.push(meta);
    }

    let linked = link(metadata, catalog)?;

    let mut ordered: Vec<&Module> = modules.iter().collect();
    ordered.sort_by(|a, b| a.name.cmp(&b.name));
    let mut labels = LabelGenerator::new();
    let mut texts = BTreeMap::new();
    for module in ordered {
        let linked_module = linked
            .get(&module.name)
            .ok_or_else(|| CompileError::MissingModule {
                module: module.name.clone(),
            })?;
        let text = emit_module(module, linked_module, &mut labels, &config.emit_config)?;
        texts.insert(module.name.clone(), text);
    }

    tracing::debug!(modules = texts.len(), labels = labels.issued(), "compiled");
    Ok(CompiledProgram {
        entry: entry.to_string(),
        modules: texts,
    })
}

/// Files produced by [`build`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildArtifacts {
    pub wat: Vec<PathBuf>,
    pub wasm: Vec<PathBuf>,
    pub linked: Option<PathBuf>,
}

/// Compile the configured entry from disk and run the toolchain as far as
/// `config.emit` asks.
pub fn build(config: &CompileConfig) -> Result<BuildArtifacts, DriverError> {
    let entry = config.entry_module()?;
    let loader = FsLoader::new(config.work_dir());
    let catalog = StdlibCatalog::builtin()?;
    let program = compile(&entry, &loader, &catalog, config)?;

    let out_dir = config.out_dir();
    let mut artifacts = BuildArtifacts::default();
    let mut wat_files = Vec::with_capacity(program.len());
    for (name, text) in program.iter() {
        let path = out_dir.join(format!("{name}.wat"));
        write_file(&path, text)?;
        artifacts.wat.push(path.clone());
        wat_files.push((name.to_string(), path));
    }
    if config.emit == EmitKind::Wat {
        return Ok(artifacts);
    }

    let toolchain = Toolchain::new(config.tools.clone());
    let mut binaries = Vec::with_capacity(wat_files.len());
    for (name, wat) in wat_files {
        let wasm = wat.with_extension("wasm");
        toolchain.assemble(&wat, &wasm)?;
        artifacts.wasm.push(wasm.clone());
        binaries.push((name, wasm));
    }
    if config.emit == EmitKind::Wasm {
        return Ok(artifacts);
    }

    let output = config.output_path()?;
    toolchain.merge(&binaries, &output)?;
    artifacts.linked = Some(output);
    Ok(artifacts)
}

fn write_file(path: &Path, text: &str) -> Result<(), DriverError> {
    let write_error = |source| DriverError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, text).map_err(write_error)
}

#[cfg(test)]
mod tests;
