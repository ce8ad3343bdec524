//! Emitter settings.

/// Where the module's linear memory comes from.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EmitConfig {
    /// Import module of the memory (`"env"`).
    pub memory_module: String,
    /// Import field of the memory (`"memory"`).
    pub memory_field: String,
    /// Minimum size in 64 KiB pages.
    pub memory_pages: u32,
}

impl Default for EmitConfig {
    fn default() -> Self {
        EmitConfig {
            memory_module: "env".to_string(),
            memory_field: "memory".to_string(),
            memory_pages: 1,
        }
    }
}

impl EmitConfig {
    pub fn memory_import(&self) -> String {
        format!(
            "(import \"{}\" \"{}\" (memory {}))",
            self.memory_module, self.memory_field, self.memory_pages
        )
    }
}
