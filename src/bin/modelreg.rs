//! Command-line view of the model registry.
//!
//! The search path starts from `MODELREG_PATH`; each `--path DIR` is added
//! in front of it (the last one given ends up first), matching how
//! `add_model_path` prioritizes roots.

use anyhow::{Context, Result, bail};
use modelreg::model::UNKNOWN_HASH;
use modelreg::{Registry, RegistryConfig};
use std::env;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let mut registry = Registry::from_config(&RegistryConfig::from_env());
    for root in &cli.paths {
        registry.add_model_path(root.clone());
    }

    let result = execute(&cli.command, &mut registry);
    for warning in registry.warnings() {
        eprintln!("modelreg: warning: {warning}");
    }
    result
}

struct Cli {
    paths: Vec<String>,
    command: Command,
}

enum Command {
    List { all: bool },
    Show { name: String },
    Resources,
    Path,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut paths = Vec::new();
        let mut command: Option<String> = None;
        let mut all = false;
        let mut show_name: Option<String> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--path" | "-p" => {
                    let dir = args.next().context("--path requires a directory")?;
                    paths.push(dir);
                }
                "--all" | "-a" => all = true,
                "--help" | "-h" => usage(0),
                name @ ("list" | "show" | "resources" | "path") if command.is_none() => {
                    command = Some(name.to_string());
                }
                other if command.as_deref() == Some("show") && show_name.is_none() => {
                    show_name = Some(other.to_string());
                }
                other => bail!("unexpected argument '{other}' (see --help)"),
            }
        }

        let command = match command.as_deref() {
            Some("list") => Command::List { all },
            Some("show") => Command::Show {
                name: show_name.context("show requires a model name")?,
            },
            Some("resources") => Command::Resources,
            Some("path") => Command::Path,
            _ => usage(1),
        };
        Ok(Self { paths, command })
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: modelreg [--path DIR]... <command>\n\nCommands:\n  list [--all]   List models by full name (--all includes private models).\n  show NAME      Show one model: reference, description, resources.\n  resources      List resources declared by models on the path.\n  path           Print the search path, highest priority first.\n\nEnvironment:\n  MODELREG_PATH      Initial search path (path-list syntax).\n  MODELREG_BASE_DIR  Directory relative roots are resolved against."
    );
    std::process::exit(code);
}

fn execute(command: &Command, registry: &mut Registry) -> Result<()> {
    match command {
        Command::List { all } => {
            let models = if *all {
                registry.entries()
            } else {
                registry.iterate()
            };
            for (fullname, model) in models {
                let description = model.modeldef().description.as_deref().unwrap_or("");
                let marker = if model.is_private() { " (private)" } else { "" };
                println!("{fullname}{marker}  {description}");
            }
        }
        Command::Show { name } => {
            let model = registry
                .for_name(name)
                .with_context(|| format!("resolving model '{name}'"))?;
            println!("name:        {}", model.fullname());
            println!("reference:   {}", model.reference());
            if model.definition_hash() == Some(UNKNOWN_HASH) {
                eprintln!("modelreg: warning: definition file for '{name}' could not be read; hash unknown");
            }
            if let Some(ns) = model.namespace() {
                println!("namespace:   {}", ns.as_str());
            }
            println!("private:     {}", model.is_private());
            if let Some(description) = &model.modeldef().description {
                println!("description: {description}");
            }
            if !model.modeldef().extends.is_empty() {
                println!("extends:     {}", model.modeldef().extends.join(", "));
            }
            for res in &model.modeldef().resources {
                println!("resource:    {} {}", res.name, res.sources.join(" "));
            }
        }
        Command::Resources => {
            for (fullname, resource) in registry.iter_resources() {
                let description = resource.resourcedef().description.as_deref().unwrap_or("");
                println!("{fullname}  {description}");
            }
        }
        Command::Path => {
            for root in registry.path() {
                println!("{root}");
            }
        }
    }
    Ok(())
}
