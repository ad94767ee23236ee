mod convert;
mod view;

use anyhow::{Context, Result, bail};
use blockweave_config::Config;
use blockweave_engine::{ActionMenuIndex, Editor, EditorProps, FileStorage, Registry, Renderer};
use blockweave_plugins::{stock_marks, stock_plugins};
use convert::{InputFormat, OutputFormat};
use std::{env, path::PathBuf, process, sync::Arc};

const USAGE: &str = "\
Usage:
  blockweave-cli convert <input> [--to html|markdown|json]
  blockweave-cli menu [term]
  blockweave-cli view [input]";

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    match args.first().map(String::as_str) {
        Some("convert") => convert_command(&config, &args[1..]),
        Some("menu") => menu_command(&config, args.get(1).map(String::as_str)),
        Some("view") => view_command(&config, args.get(1).map(PathBuf::from)),
        _ => {
            eprintln!("{USAGE}");
            process::exit(1);
        }
    }
}

fn registry(config: &Config) -> Result<Registry> {
    let registry = Registry::build(config.apply(stock_plugins()), stock_marks())?;
    for warning in registry.warnings() {
        log::warn!("{warning}");
    }
    Ok(registry)
}

fn convert_command(config: &Config, args: &[String]) -> Result<()> {
    let (input, to) = match args {
        [input] => (PathBuf::from(input), None),
        [input, flag, to] if flag == "--to" => (PathBuf::from(input), Some(to.parse::<OutputFormat>()?)),
        _ => bail!("{USAGE}"),
    };

    let registry = registry(config)?;
    let doc = convert::read_document(&input, &registry)?;
    let to = match to {
        Some(to) => to,
        None => InputFormat::from_path(&input)?.default_output(),
    };
    let output = convert::write_document(&doc, &registry, to)?;
    println!("{output}");
    Ok(())
}

fn menu_command(config: &Config, term: Option<&str>) -> Result<()> {
    let registry = registry(config)?;
    let menu = ActionMenuIndex::from_registry(&registry);
    for item in menu.query(term.unwrap_or_default()) {
        let shortcuts = if item.shortcuts.is_empty() {
            String::new()
        } else {
            format!(" [{}]", item.shortcuts.join(", "))
        };
        println!("{:<14} {}{shortcuts}", item.label, item.description);
    }
    Ok(())
}

fn view_command(config: &Config, input: Option<PathBuf>) -> Result<()> {
    let (title, snapshot) = match input {
        Some(path) => {
            let registry = registry(config)?;
            let doc = convert::read_document(&path, &registry)?;
            let renderer = Renderer::new(config.apply(stock_plugins()), stock_marks(), doc)?;
            (path.display().to_string(), renderer.snapshot())
        }
        None => {
            // No file: open the persisted document named in the config.
            let (Some(root), Some(key)) = (&config.storage_path, &config.persistence_key) else {
                bail!(
                    "No input given and no storage_path/persistence_key in {}\n{USAGE}",
                    Config::config_path().display()
                );
            };
            let props = EditorProps {
                plugins: config.apply(stock_plugins()),
                marks: stock_marks(),
                placeholder: config.placeholder.clone(),
                persistence_key: Some(key.clone()),
                ..Default::default()
            };
            let editor = Editor::with_storage(props, Arc::new(FileStorage::new(root)))
                .with_context(|| format!("Failed to open document '{key}'"))?;
            (key.clone(), editor.snapshot())
        }
    };

    view::run(view::App::new(title, snapshot))
}
