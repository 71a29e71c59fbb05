//! Quire CLI

use quirec::commands::{
    declarations, emit, functions, parse_common_options, parse_emit_options, plugins, CliError,
};

fn main() {
    quirec::init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];
    let rest = &args[2..];

    let result = match command.as_str() {
        "emit" => parse_emit_options(rest).and_then(|options| emit(&options)),
        "plugins" => parse_common_options(rest, 0).map(|(_, common)| plugins(&common)),
        "declarations" => parse_common_options(rest, 1)
            .and_then(|(values, common)| declarations(&values[0], &common)),
        "functions" => parse_common_options(rest, 0).map(|(_, common)| functions(&common)),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("quire {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        if matches!(error, CliError::Usage(_)) {
            eprintln!();
            eprintln!("Run `quire help` for usage.");
        }
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("Quire code generator");
    println!();
    println!("Usage: quire <command> [options]");
    println!();
    println!("Commands:");
    println!("  emit <file>              Generate a document written in tree notation");
    println!("  plugins                  List loaded plug-ins and per-file load status");
    println!("  declarations <library>   Print generated declarations for a customer library");
    println!("  functions                List registered functions by category");
    println!("  help                     Show this help message");
    println!("  version                  Show version information");
    println!();
    println!("Emit options:");
    println!("  --backend=<name>         Cpp (default), HTML, LaTeX, a plug-in backend, or all");
    println!("  --output=<path>          Write to a file instead of stdout");
    println!("  --title=<text>           Document title");
    println!("  --fragment               Emit the bare sections without document framing");
    println!("  --indent=<n>             Spaces per indentation level (default: 4)");
    println!("  --entry=<name>           Native entry point (default: model_main)");
    println!("  --document-class=<name>  LaTeX document class (default: article)");
    println!();
    println!("Plug-in options (all commands):");
    println!("  --plugins=<dir>          Also load plug-ins from <dir> (repeatable)");
    println!("  --no-env-plugins         Ignore QUIRE_PLUGIN_PATH");
    println!();
    println!("Environment:");
    println!("  QUIRE_PLUGIN_PATH        Plug-in directories, separated like PATH");
    println!("  QUIRE_LOG                Log filter (falls back to RUST_LOG; default: warn)");
    println!();
    println!("Examples:");
    println!("  quire emit model.qt");
    println!("  quire emit model.qt --backend=LaTeX --title=Model --output=model.tex");
    println!("  quire emit model.qt --backend=all --fragment");
    println!("  quire plugins --plugins=./plugins");
    println!("  quire declarations acme");
}
