//! Ember compiler CLI.

use emberc::{build, compile, CompileConfig, DriverError, EmitKind, FsLoader};
use ember_link::StdlibCatalog;

fn main() {
    emberc::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let result = match args[1].as_str() {
        "build" => run_build(&args[2..]),
        "emit" => run_emit(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(err) = result {
        report(&err);
        std::process::exit(1);
    }
}

fn run_build(args: &[String]) -> Result<(), DriverError> {
    let mut config = CompileConfig::from_args(args)?;
    config.apply_env(|var| std::env::var(var).ok());
    let artifacts = build(&config)?;
    match config.emit {
        EmitKind::Wat => {
            for path in &artifacts.wat {
                println!("wrote {}", path.display());
            }
        }
        EmitKind::Wasm => {
            for path in &artifacts.wasm {
                println!("wrote {}", path.display());
            }
        }
        EmitKind::Linked => {
            if let Some(path) = &artifacts.linked {
                println!("wrote {}", path.display());
            }
        }
    }
    Ok(())
}

fn run_emit(args: &[String]) -> Result<(), DriverError> {
    let config = CompileConfig::from_args(args)?;
    let entry = config.entry_module()?;
    let loader = FsLoader::new(config.work_dir());
    let catalog = StdlibCatalog::builtin()?;
    let program = compile(&entry, &loader, &catalog, &config)?;
    for (name, text) in program.iter() {
        println!(";; module {name}");
        print!("{text}");
    }
    Ok(())
}

fn report(err: &DriverError) {
    match err {
        DriverError::Compile(err) => eprintln!("error[{}]: {err}", err.code()),
        DriverError::Config(err) => {
            eprintln!("error: {err}");
            eprintln!("Run 'ember help' for usage.");
        }
        other => eprintln!("error: {other}"),
    }
}

fn print_usage() {
    println!("Ember compiler back end");
    println!();
    println!("Usage: ember <command> [options]");
    println!();
    println!("Commands:");
    println!("  build <entry.ast.json>   Compile a module and the modules it imports");
    println!("  emit <entry.ast.json>    Print the module text of every module");
    println!("  help                     Show this message");
    println!();
    println!("Build options:");
    println!("  -o, --output <path>      Linked output (default: <out-dir>/<entry>.wasm)");
    println!("  --out-dir <dir>          Directory for .wat/.wasm files (default: entry's directory)");
    println!("  --emit=<kind>            wat, wasm or linked (default: linked)");
    println!("  --data-base <n>          First constant-data address (default: 16)");
    println!("  --memory-pages=<n>       Minimum memory size in 64 KiB pages (default: 1)");
    println!();
    println!("Environment:");
    println!("  EMBER_WAT2WASM           Path of the text-to-binary assembler");
    println!("  EMBER_WASM_MERGE         Path of the module linker");
    println!("  EMBER_LOG                Log filter (falls back to RUST_LOG)");
}
