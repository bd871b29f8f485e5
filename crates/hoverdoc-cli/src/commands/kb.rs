//! Knowledge base command implementation

use anyhow::{Context, Result, bail};
use colored::{ColoredString, Colorize};
use hoverdoc_core::{Config, KnowledgeBase, TypeDefinitionEntry};
use serde_json::{Map, Value};

use crate::cli::KbCommand;
use crate::output::OutputFormat;

/// Run a `kb` subcommand.
pub fn execute(config: &Config, command: &KbCommand) -> Result<()> {
    let kb = config
        .knowledge_base()
        .context("Failed to load the knowledge base")?;

    match command {
        KbCommand::List { format } => list(&kb, *format),
        KbCommand::Show { name, format } => show(&kb, name, *format),
        KbCommand::Search {
            query,
            limit,
            format,
        } => search(&kb, query, *limit, *format),
    }
}

fn list(kb: &KnowledgeBase, format: OutputFormat) -> Result<()> {
    let entries = kb.iter_sorted();
    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("Knowledge base is empty.");
            }
            let width = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
            for (name, entry) in entries {
                println!(
                    "{name:<width$}  {:<10} {}",
                    kind_label(&entry.kind),
                    entry.description.bright_black()
                );
            }
        },
        OutputFormat::Json => {
            let mut map = Map::new();
            for (name, entry) in entries {
                map.insert(name.to_string(), serde_json::to_value(entry)?);
            }
            println!("{}", serde_json::to_string_pretty(&map)?);
        },
    }
    Ok(())
}

fn show(kb: &KnowledgeBase, name: &str, format: OutputFormat) -> Result<()> {
    let Some(entry) = kb.get(name) else {
        let hint = kb
            .search(name)
            .first()
            .map(|hit| format!(" Did you mean '{}'?", hit.name))
            .unwrap_or_default();
        bail!("No knowledge base entry named '{name}'.{hint}");
    };

    match format {
        OutputFormat::Text => print_entry(name, entry),
        OutputFormat::Json => {
            let mut value = serde_json::to_value(entry)?;
            if let Value::Object(object) = &mut value {
                object.insert("name".into(), Value::String(name.to_string()));
                object.insert("resolvedColor".into(), serde_json::to_value(entry.color())?);
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
    }
    Ok(())
}

fn search(kb: &KnowledgeBase, query: &str, limit: usize, format: OutputFormat) -> Result<()> {
    let mut results = kb.search(query);
    results.truncate(limit);

    match format {
        OutputFormat::Text => {
            if results.is_empty() {
                println!("No matches for '{query}'.");
            }
            for hit in &results {
                println!(
                    "{:<20} {:<10} {}",
                    hit.name,
                    kind_label(&hit.entry.kind),
                    hit.entry.description.bright_black()
                );
            }
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
    }
    Ok(())
}

fn print_entry(name: &str, entry: &TypeDefinitionEntry) {
    let color = entry.color();
    println!("{}", name.bold());
    println!("  kind:        {}", kind_label(&entry.kind));
    println!("  description: {}", entry.description);
    println!("  color:       {} on {}", color.text, color.background);
}

fn kind_label(kind: &str) -> ColoredString {
    match kind.to_ascii_lowercase().as_str() {
        "interface" | "trait" => kind.blue(),
        "class" | "struct" => kind.green(),
        "type" | "alias" => kind.magenta(),
        "enum" => kind.yellow(),
        "keyword" => kind.red(),
        _ => kind.normal(),
    }
}
