//! Command implementations.
//!
//! Options are parsed by hand, `--key=value` style. Every command loads
//! the plug-ins first so their element types, functions and backends are
//! visible, then freezes the registry.

#[cfg(test)]
mod tests;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use quire_codegen::{
    generate_all, Engine, GeneratedOutput, GenerationError, GeneratorOptions, Registry,
    SharedRegistry,
};
use quire_plugin::{search_path, LoadState, PlugInLoader};
use quire_tree::{parse_notation, NotationError};

/// Backend selector meaning "every registered backend".
pub const ALL_BACKENDS: &str = "all";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("cannot read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{}: {}", path.display(), error.offset, error.message)]
    Notation { path: PathBuf, error: NotationError },

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("no declarations are registered for library '{0}'")]
    UnknownLibrary(String),
}

/// Options shared by every command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommonOptions {
    /// Directories from `--plugins=`, searched after `QUIRE_PLUGIN_PATH`.
    pub plugin_dirs: Vec<PathBuf>,
    /// Skip `QUIRE_PLUGIN_PATH`.
    pub no_env_path: bool,
}

impl CommonOptions {
    /// Consume a shared option; `false` if `arg` is not one.
    fn accept(&mut self, arg: &str) -> bool {
        if let Some(dir) = arg.strip_prefix("--plugins=") {
            self.plugin_dirs.push(PathBuf::from(dir));
            true
        } else if arg == "--no-env-plugins" {
            self.no_env_path = true;
            true
        } else {
            false
        }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = if self.no_env_path {
            Vec::new()
        } else {
            search_path()
        };
        dirs.extend(self.plugin_dirs.iter().cloned());
        dirs
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    pub input: PathBuf,
    pub backend: String,
    pub output: Option<PathBuf>,
    pub generator: GeneratorOptions,
    pub common: CommonOptions,
}

/// Parse `emit` arguments (everything after the command name).
pub fn parse_emit_options(args: &[String]) -> Result<EmitOptions, CliError> {
    let mut input = None;
    let mut backend = quire_codegen::builtins::NATIVE.to_string();
    let mut output = None;
    let mut generator = GeneratorOptions::default();
    let mut common = CommonOptions::default();

    for arg in args {
        if common.accept(arg) {
            continue;
        }
        if let Some(value) = arg.strip_prefix("--backend=") {
            backend = value.to_string();
        } else if let Some(value) = arg.strip_prefix("--output=") {
            output = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--title=") {
            generator.title = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--indent=") {
            generator.indent = value
                .parse()
                .map_err(|_| CliError::Usage(format!("invalid indent '{value}'")))?;
        } else if let Some(value) = arg.strip_prefix("--entry=") {
            generator.entry_point = value.to_string();
        } else if let Some(value) = arg.strip_prefix("--document-class=") {
            generator.document_class = value.to_string();
        } else if arg == "--fragment" {
            generator.standalone = false;
        } else if arg.starts_with('-') {
            return Err(CliError::Usage(format!("unknown option '{arg}'")));
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            return Err(CliError::Usage(format!("unexpected argument '{arg}'")));
        }
    }

    let input = input.ok_or_else(|| CliError::Usage("missing input file".to_string()))?;
    if backend == ALL_BACKENDS && output.is_some() {
        return Err(CliError::Usage(
            "--output needs a single --backend".to_string(),
        ));
    }
    Ok(EmitOptions {
        input,
        backend,
        output,
        generator,
        common,
    })
}

/// Parse arguments of commands that only take shared options plus
/// `positional` leading values.
pub fn parse_common_options(
    args: &[String],
    positional: usize,
) -> Result<(Vec<String>, CommonOptions), CliError> {
    let mut values = Vec::new();
    let mut common = CommonOptions::default();
    for arg in args {
        if common.accept(arg) {
            continue;
        }
        if arg.starts_with('-') || values.len() == positional {
            return Err(CliError::Usage(format!("unexpected argument '{arg}'")));
        }
        values.push(arg.clone());
    }
    if values.len() < positional {
        return Err(CliError::Usage("missing argument".to_string()));
    }
    Ok((values, common))
}

/// The built-in registry extended by every plug-in found on the search
/// path. The loader must outlive any use of the registry.
pub struct Session {
    pub registry: SharedRegistry<Registry>,
    pub loader: PlugInLoader,
}

impl Session {
    pub fn open(common: &CommonOptions) -> Self {
        let mut registry = Registry::with_builtins();
        let mut loader = PlugInLoader::new().on_failure(|path, error| {
            eprintln!("warning: skipped plug-in '{}': {error}", path.display());
        });
        for dir in common.search_dirs() {
            let paths = loader.discover(&dir);
            tracing::debug!(dir = %dir.display(), files = paths.len(), "plug-in directory");
            loader.load_plug_ins(&mut registry, paths);
        }
        Session {
            registry: registry.freeze(),
            loader,
        }
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the input and generate it for the selected backend(s).
pub fn emit(options: &EmitOptions) -> Result<(), CliError> {
    let session = Session::open(&options.common);
    let source = read_source(&options.input)?;
    let tree = parse_notation(&source, &*session.registry).map_err(|error| CliError::Notation {
        path: options.input.clone(),
        error,
    })?;

    if options.backend == ALL_BACKENDS {
        let mut failed = None;
        for (name, result) in generate_all(&session.registry, &tree, &options.generator) {
            println!("==> {name} <==");
            match result {
                Ok(output) => print!("{}", output.text),
                Err(error) => {
                    eprintln!("error: {error}");
                    failed.get_or_insert(error);
                }
            }
        }
        return failed.map_or(Ok(()), |error| Err(error.into()));
    }

    let engine = Engine::new(
        session.registry.clone(),
        &options.backend,
        options.generator.clone(),
    )?;
    let output = engine.generate(&tree)?;
    write_output(&output, options.output.as_deref())
}

fn write_output(output: &GeneratedOutput, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, &output.text).map_err(|source| CliError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{}", output.text);
            Ok(())
        }
    }
}

/// Loaded plug-ins, then one line per attempted file.
pub fn plugins(common: &CommonOptions) {
    let session = Session::open(common);
    let loaded = session.loader.plug_ins_by_name();
    if loaded.is_empty() {
        println!("No plug-ins loaded.");
    }
    for info in loaded.values() {
        println!("{} {} ({})", info.name, info.version, info.company);
        println!("    {}", info.brief_description);
        println!("    author: {}, license: {}", info.author, info.license);
        println!("    {}", info.path.display());
    }
    let statuses = session.loader.statuses();
    if statuses.is_empty() {
        return;
    }
    println!();
    for status in statuses {
        match (&status.failed_at, &status.error) {
            (Some(gate), Some(error)) if status.state == LoadState::Failed => {
                println!("{}: failed while {gate}: {error}", status.path.display());
            }
            _ => println!("{}: {}", status.path.display(), status.state),
        }
    }
}

/// Print the declaration payload registered for `library`.
pub fn declarations(library: &str, common: &CommonOptions) -> Result<(), CliError> {
    let session = Session::open(common);
    let payload = session
        .registry
        .payload(library)
        .ok_or_else(|| CliError::UnknownLibrary(library.to_string()))?;
    print!("{}", String::from_utf8_lossy(&payload));
    Ok(())
}

/// Render the function table as text, grouped by category.
pub fn format_functions(registry: &Registry) -> String {
    let mut records: Vec<_> = registry.functions().iter().collect();
    records.sort_by(|a, b| {
        (a.category.as_str(), a.display_name()).cmp(&(b.category.as_str(), b.display_name()))
    });

    let mut out = String::new();
    let mut category = None;
    for record in records {
        if category != Some(record.category.as_str()) {
            category = Some(record.category.as_str());
            let _ = writeln!(out, "{}:", record.category);
        }
        let _ = writeln!(
            out,
            "  {} [{}] {}",
            record.display_name(),
            record.library,
            record.description
        );
        for variant in &record.variants {
            let parameters: Vec<String> = variant
                .parameters
                .iter()
                .map(|p| p.value_type.to_string())
                .collect();
            let _ = writeln!(
                out,
                "      ({}) -> {}",
                parameters.join(", "),
                variant.return_type
            );
        }
    }
    out
}

pub fn functions(common: &CommonOptions) {
    let session = Session::open(common);
    let text = format_functions(&session.registry);
    if text.is_empty() {
        println!("No functions registered.");
    } else {
        print!("{text}");
    }
}
