//! Varplate CLI
//!
//! Usage:
//!   varplate [OPTIONS] [FILE]
//!
//! Options:
//!   -e, --expr <TEXT>         Template text given inline
//!   -v, --vars <FILE>         Variables file (TOML format)
//!   --no-builtins             Do not register built-in variables
//!   --env-prefix <PREFIX>     Prefix for environment lookups (default env_)
//!   --time-format <FORMAT>    strftime format of $time_local
//!   -l, --list                List registered variables and prefixes
//!   -s, --segments            Print compiled segments instead of rendering
//!   -h, --help                Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use varplate::{Engine, EngineConfig, VarsFile};

#[derive(Parser)]
#[command(name = "varplate")]
#[command(about = "Expand $variable references in text")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Template text given inline
    #[arg(short, long, conflicts_with = "input")]
    expr: Option<String>,

    /// Variables file (TOML format)
    #[arg(short, long)]
    vars: Option<PathBuf>,

    /// Do not register built-in variables
    #[arg(long)]
    no_builtins: bool,

    /// Prefix for environment variable lookups
    #[arg(long)]
    env_prefix: Option<String>,

    /// strftime-style format of $time_local
    #[arg(long)]
    time_format: Option<String>,

    /// List registered variables and prefixes
    #[arg(short, long)]
    list: bool,

    /// Print compiled segments instead of rendering
    #[arg(short, long)]
    segments: bool,
}

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let mut config = EngineConfig::new().with_builtins(!cli.no_builtins);
    if let Some(prefix) = &cli.env_prefix {
        config = config.with_env_prefix(prefix.clone());
    }
    if let Some(format) = &cli.time_format {
        config = config.with_time_format(format.clone());
    }

    let mut engine: Engine =
        Engine::with_config(&config).map_err(|e| format!("Error: {}", e))?;

    let mut vars = None;
    if let Some(path) = &cli.vars {
        let file = VarsFile::from_file(path)
            .map_err(|e| format!("Error loading variables '{}': {}", path.display(), e))?;
        engine
            .load_vars(&file)
            .map_err(|e| format!("Error loading variables '{}': {}", path.display(), e))?;
        vars = Some(file);
    }

    if cli.list {
        if let Some(file) = &vars {
            print_vars_header(file);
        }
        print_registry(&engine);
        return Ok(());
    }

    // If no template and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && cli.expr.is_none() && io::stdin().is_terminal() {
        print_intro();
        return Ok(());
    }

    let (source, filename) = read_source(&cli)?;

    let template = engine
        .parse(&source)
        .map_err(|e| e.format(&source, &filename))?;

    if cli.segments {
        for segment in template.segments() {
            let kind = if segment.is_variable() { "variable" } else { "literal " };
            println!("{} {:?}", kind, segment.as_str());
        }
        return Ok(());
    }

    let output = engine
        .render(&template, &())
        .map_err(|e| format!("Error: {}", e))?;
    print!("{}", output);
    if cli.expr.is_some() {
        println!();
    }
    Ok(())
}

fn read_source(cli: &Cli) -> Result<(String, String), String> {
    if let Some(text) = &cli.expr {
        return Ok((text.clone(), "<expr>".to_string()));
    }

    match &cli.input {
        Some(path) => fs::read_to_string(path)
            .map(|content| (content, path.display().to_string()))
            .map_err(|e| format!("Error reading file '{}': {}", path.display(), e)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Error reading from stdin: {}", e))?;
            Ok((buffer, "<stdin>".to_string()))
        }
    }
}

fn print_vars_header(file: &VarsFile) {
    match (&file.name, &file.description) {
        (Some(name), Some(description)) => println!("# {}: {}", name, description),
        (Some(name), None) => println!("# {}", name),
        (None, Some(description)) => println!("# {}", description),
        (None, None) => {}
    }
}

fn print_registry(engine: &Engine) {
    let registry = engine.registry();
    let entries = registry
        .names()
        .into_iter()
        .map(|name| (name, format!("${}", name)))
        .chain(
            registry
                .prefixes()
                .into_iter()
                .map(|prefix| (prefix, format!("${}*", prefix))),
        );
    for (name, shown) in entries {
        let mut notes = Vec::new();
        if let Some(variable) = registry.get(name) {
            let flags = variable.flags();
            if flags.changeable {
                notes.push("changeable");
            }
            if flags.no_cacheable {
                notes.push("no-cache");
            }
        }
        if notes.is_empty() {
            println!("{}", shown);
        } else {
            println!("{:<16} ({})", shown, notes.join(", "));
        }
    }
}

fn print_intro() {
    println!(
        r#"Varplate - expand $variable references in text

USAGE:
    varplate [OPTIONS] [FILE]
    echo 'host: $hostname' | varplate

SYNTAX:
    $name         variable, name is [0-9A-Za-z_]+
    ${{name}}       same, delimited
    $$            literal dollar sign
    $env_HOME     environment variable HOME

OPTIONS:
    -e, --expr <TEXT>        Template text given inline
    -v, --vars <FILE>        Variables file (TOML)
    --no-builtins            Skip hostname, pid, pwd, time and env variables
    -l, --list               List available variables
    -s, --segments           Show the compiled template
    -h, --help               Print help

Set RUST_LOG=varplate=debug to trace registration and caching."#
    );
}
