//! Ember compiler driver.
//!
//! Loads an entry module and the sibling modules it imports, runs symbol
//! extraction, linking and emission over the whole set, and hands the
//! resulting module text to the external assembler and linker.

pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod toolchain;

use std::sync::Once;

pub use config::{CompileConfig, EmitKind, ToolPaths};
pub use error::{ConfigError, DriverError, LoadError, ToolchainError};
pub use loader::{FsLoader, MapLoader, ModuleLoader};
pub use pipeline::{build, compile, load_working_set, BuildArtifacts, CompiledProgram};
pub use toolchain::Toolchain;

/// Log filter variable; `RUST_LOG` is read when it is unset.
pub const LOG_ENV: &str = "EMBER_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber.
///
/// Does nothing unless `EMBER_LOG` or `RUST_LOG` is set. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let Some(directives) = std::env::var(LOG_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
        else {
            return;
        };
        let tree = tracing_tree::HierarchicalLayer::new(2)
            .with_targets(true)
            .with_writer(std::io::stderr);
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(tree)
            .try_init();
    });
}
