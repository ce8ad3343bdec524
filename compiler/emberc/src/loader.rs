//! Module loading.
//!
//! Parsing happens outside the back end; a [`ModuleLoader`] hands over the
//! AST of a module by name.

use std::path::{Path, PathBuf};

use ember_ir::Module;
use rustc_hash::FxHashMap;

use crate::config::AST_SUFFIX;
use crate::error::LoadError;

/// Source of module ASTs.
pub trait ModuleLoader {
    fn load(&self, name: &str) -> Result<Module, LoadError>;
}

/// Reads `<dir>/<name>.ast.json`.
#[derive(Clone, Debug)]
pub struct FsLoader {
    dir: PathBuf,
}

impl FsLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FsLoader { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{AST_SUFFIX}"))
    }
}

impl ModuleLoader for FsLoader {
    #[tracing::instrument(level = "debug", skip(self))]
    fn load(&self, name: &str) -> Result<Module, LoadError> {
        let path = self.path_of(name);
        let text = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound {
                    module: name.to_string(),
                    path: path.clone(),
                }
            } else {
                LoadError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let module: Module = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })?;
        module.validate().map_err(|source| LoadError::Malformed {
            path: path.clone(),
            source,
        })?;
        if module.name != name {
            return Err(LoadError::NameMismatch {
                path,
                expected: name.to_string(),
                found: module.name,
            });
        }
        tracing::debug!(
            stmts = module.arena.stmt_count(),
            exprs = module.arena.expr_count(),
            "loaded module"
        );
        Ok(module)
    }
}

/// In-memory modules, for embedders and tests.
#[derive(Clone, Debug, Default)]
pub struct MapLoader {
    modules: FxHashMap<String, Module>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: Module) {
        self.modules.insert(module.name.clone(), module);
    }

    pub fn with(mut self, module: Module) -> Self {
        self.insert(module);
        self
    }
}

impl ModuleLoader for MapLoader {
    fn load(&self, name: &str) -> Result<Module, LoadError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::Unknown {
                module: name.to_string(),
            })
    }
}
