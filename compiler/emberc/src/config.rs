//! Driver configuration.
//!
//! Built from `ember build` arguments; tool paths can be overridden through
//! `EMBER_WAT2WASM` and `EMBER_WASM_MERGE`.

use std::path::{Path, PathBuf};

use ember_codegen::EmitConfig;
use ember_symbols::DEFAULT_DATA_BASE;

use crate::error::ConfigError;

/// File suffix of serialized module ASTs.
pub const AST_SUFFIX: &str = ".ast.json";

pub const WAT2WASM_ENV: &str = "EMBER_WAT2WASM";
pub const WASM_MERGE_ENV: &str = "EMBER_WASM_MERGE";

/// How far a build goes.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum EmitKind {
    /// Module text only.
    Wat,
    /// One binary per module.
    Wasm,
    /// Per-module binaries merged into one.
    #[default]
    Linked,
}

impl EmitKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "wat" => Some(EmitKind::Wat),
            "wasm" => Some(EmitKind::Wasm),
            "linked" => Some(EmitKind::Linked),
            _ => None,
        }
    }
}

/// External tools.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ToolPaths {
    pub wat2wasm: PathBuf,
    pub wasm_merge: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        ToolPaths {
            wat2wasm: PathBuf::from("wat2wasm"),
            wasm_merge: PathBuf::from("wasm-merge"),
        }
    }
}

/// Everything one driver run needs to know.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CompileConfig {
    /// Path of the entry module's AST file.
    pub entry: PathBuf,
    /// Where `.wat`/`.wasm` files are written; defaults to the entry's directory.
    pub out_dir: Option<PathBuf>,
    /// Linked output; defaults to `<out_dir>/<entry>.wasm`.
    pub output: Option<PathBuf>,
    pub emit: EmitKind,
    /// First constant-data address of the entry module.
    pub data_base: u32,
    pub emit_config: EmitConfig,
    pub tools: ToolPaths,
}

impl CompileConfig {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        CompileConfig {
            entry: entry.into(),
            out_dir: None,
            output: None,
            emit: EmitKind::default(),
            data_base: DEFAULT_DATA_BASE,
            emit_config: EmitConfig::default(),
            tools: ToolPaths::default(),
        }
    }

    /// Parse the arguments following `ember build`.
    pub fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut entry = None;
        let mut config = CompileConfig::new(PathBuf::new());
        let mut args = args.iter();
        while let Some(arg) = args.next() {
            let mut value_of = |flag: &str| {
                args.next().cloned().ok_or_else(|| ConfigError::MissingValue {
                    flag: flag.to_string(),
                })
            };
            if arg == "-o" || arg == "--output" {
                config.output = Some(PathBuf::from(value_of(arg.as_str())?));
            } else if let Some(output) = arg.strip_prefix("--output=") {
                config.output = Some(PathBuf::from(output));
            } else if arg == "--out-dir" {
                config.out_dir = Some(PathBuf::from(value_of(arg.as_str())?));
            } else if let Some(dir) = arg.strip_prefix("--out-dir=") {
                config.out_dir = Some(PathBuf::from(dir));
            } else if let Some(emit) = arg.strip_prefix("--emit=") {
                config.emit = EmitKind::from_str(emit).ok_or_else(|| ConfigError::InvalidEmit {
                    value: emit.to_string(),
                })?;
            } else if arg == "--data-base" {
                let value = value_of(arg.as_str())?;
                config.data_base = parse_number(arg, &value)?;
            } else if let Some(value) = arg.strip_prefix("--data-base=") {
                config.data_base = parse_number("--data-base", value)?;
            } else if let Some(pages) = arg.strip_prefix("--memory-pages=") {
                config.emit_config.memory_pages = parse_number("--memory-pages", pages)?;
            } else if arg.starts_with('-') {
                return Err(ConfigError::UnknownFlag { flag: arg.clone() });
            } else if entry.is_none() {
                entry = Some(PathBuf::from(arg));
            } else {
                return Err(ConfigError::UnknownFlag { flag: arg.clone() });
            }
        }
        config.entry = entry.ok_or(ConfigError::MissingEntry)?;
        config.entry_module()?;
        Ok(config)
    }

    /// Apply tool path overrides; `lookup` reads the environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(WAT2WASM_ENV).filter(|path| !path.is_empty()) {
            self.tools.wat2wasm = PathBuf::from(path);
        }
        if let Some(path) = lookup(WASM_MERGE_ENV).filter(|path| !path.is_empty()) {
            self.tools.wasm_merge = PathBuf::from(path);
        }
    }

    /// Directory sibling modules are loaded from.
    pub fn work_dir(&self) -> &Path {
        match self.entry.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Entry module name: the file name without its AST suffix.
    pub fn entry_module(&self) -> Result<String, ConfigError> {
        let invalid = || ConfigError::InvalidEntry {
            path: self.entry.clone(),
        };
        let file_name = self
            .entry
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(invalid)?;
        let name = file_name
            .strip_suffix(AST_SUFFIX)
            .or_else(|| file_name.strip_suffix(".json"))
            .unwrap_or(file_name);
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(name.to_string())
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir
            .clone()
            .unwrap_or_else(|| self.work_dir().to_path_buf())
    }

    /// Path of the merged binary.
    pub fn output_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => Ok(self.out_dir().join(format!("{}.wasm", self.entry_module()?))),
        }
    }
}

fn parse_number(flag: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}
