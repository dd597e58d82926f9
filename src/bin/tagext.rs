//! Command-line interface for tagext
//! Renders a template file with every bundled tag extension and the default runtime.
//!
//! Usage:
//!   tagext `<template>` [--context `<file.json|file.yaml>`] [--config `<settings.toml>`]
//!          [--set key=value]... [--ast]

use clap::{Arg, ArgAction, Command};
use serde_json::Value;
use std::path::Path;
use tagext::tagext::config::Loader;
use tagext::tagext::runtime::Runtime;
use tagext::Environment;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("tagext")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render templates using the tag extensions")
        .arg_required_else_help(true)
        .arg(
            Arg::new("template")
                .help("Path to the template file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("context")
                .long("context")
                .short('c')
                .help("JSON or YAML file holding the render context (must be an object)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML settings file layered over the defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a single setting, e.g. l10n.use_tz=true")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Print the compiled AST as JSON instead of rendering")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let template = matches
        .get_one::<String>("template")
        .expect("template is a required argument");
    let overrides: Vec<&String> = matches
        .get_many::<String>("set")
        .map(|values| values.collect())
        .unwrap_or_default();

    if let Err(message) = run(
        template,
        matches.get_one::<String>("context").map(String::as_str),
        matches.get_one::<String>("config").map(String::as_str),
        &overrides,
        matches.get_flag("ast"),
    ) {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }
}

fn run(
    template: &str,
    context: Option<&str>,
    config: Option<&str>,
    overrides: &[&String],
    ast: bool,
) -> Result<(), String> {
    let mut loader = Loader::new();
    if let Some(path) = config {
        loader = loader.with_file(path);
    }
    for entry in overrides {
        loader = loader.assign(entry).map_err(|e| e.to_string())?;
    }
    let settings = loader.build().map_err(|e| e.to_string())?;

    let runtime = Runtime::with_defaults(&settings);
    let env = Environment::standard(settings, runtime)?;

    let source = std::fs::read_to_string(template)
        .map_err(|e| format!("cannot read '{}': {}", template, e))?;
    let compiled = env.from_string(&source)?;

    if ast {
        let json = serde_json::to_string_pretty(compiled.nodes()).map_err(|e| e.to_string())?;
        println!("{}", json);
        return Ok(());
    }

    let context = match context {
        Some(path) => load_context(Path::new(path))?,
        None => Value::Object(Default::default()),
    };
    print!("{}", compiled.render(&context)?);
    Ok(())
}

fn load_context(path: &Path) -> Result<Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text).map_err(|e| e.to_string())?,
        Some("json") => serde_json::from_str(&text).map_err(|e| e.to_string())?,
        _ => {
            return Err(format!(
                "unsupported context file '{}', expected .json, .yaml or .yml",
                path.display()
            ))
        }
    };
    if !value.is_object() {
        return Err(format!("context in '{}' must be an object", path.display()));
    }
    Ok(value)
}
