//! Command-line interface for xmlschema-infer

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use xmlschema_infer::namespaces::XML_NAMESPACE;
#[cfg(feature = "cli")]
use xmlschema_infer::{
    export_schemas, read_schemas, write_document, ExportConfig, Occurrence, SchemaInference,
    SchemaSet, SchemaSummary, TypeInference,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "xmlschema-infer")]
#[command(author, version, about = "Infer XML Schemas from sample documents", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Infer a schema from one or more XML documents
    Infer {
        /// XML sample files, merged in order
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Existing XSD files to refine instead of starting empty
        #[arg(short, long, value_name = "XSD")]
        seed: Vec<PathBuf>,

        /// Occurrence mode: restricted or relaxed
        #[arg(long, value_enum, default_value = "restricted")]
        occurrence: Occurrence,

        /// Type inference mode: restricted or relaxed
        #[arg(long = "type-inference", value_enum, default_value = "restricted")]
        type_inference: TypeInference,

        /// Write every schema document into this directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print a JSON summary instead of XSD
        #[arg(short, long)]
        json: bool,
    },

    /// Inspect XSD files the way inference would load them
    Inspect {
        /// XSD files forming one schema set
        #[arg(value_name = "XSD", required = true)]
        schemas: Vec<PathBuf>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Infer {
            files,
            seed,
            occurrence,
            type_inference,
            output,
            json,
        } => cmd_infer(files, seed, occurrence, type_inference, output, json),
        Commands::Inspect { schemas, json } => cmd_inspect(schemas, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "cli")]
fn load_seeds(paths: &[PathBuf]) -> Result<SchemaSet, Box<dyn std::error::Error>> {
    if paths.is_empty() {
        return Ok(SchemaSet::new());
    }
    let texts = paths
        .iter()
        .map(fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    Ok(read_schemas(&refs)?)
}

#[cfg(feature = "cli")]
fn cmd_infer(
    files: Vec<PathBuf>,
    seeds: Vec<PathBuf>,
    occurrence: Occurrence,
    type_inference: TypeInference,
    output: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let inference = SchemaInference::new()
        .with_occurrence(occurrence)
        .with_type_inference(type_inference);
    let mut schemas = load_seeds(&seeds)?;

    let mut root = None;
    for file in &files {
        let xml = fs::read_to_string(file)?;
        let id = inference
            .infer_str_into(&xml, &mut schemas)
            .map_err(|e| format!("{}: {}", file.display(), e))?;
        tracing::debug!(file = %file.display(), "merged sample");
        root.get_or_insert(id);
    }

    if let Some(dir) = output {
        let result = export_schemas(&schemas, &ExportConfig::new(dir))?;
        for exported in &result.exported {
            let namespace = exported.namespace.as_deref().unwrap_or("(no namespace)");
            println!("{} -> {}", namespace, exported.path.display());
        }
        return Ok(());
    }

    if json_output {
        let summary = SchemaSummary::from_schemas(&schemas);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let namespace = root.and_then(|id| schemas.element(id).name.namespace().map(str::to_string));
    let written = schemas
        .documents()
        .filter(|d| d.target_namespace() != Some(XML_NAMESPACE))
        .count();
    if written > 1 {
        tracing::warn!(
            documents = written,
            "only the root namespace document is printed; use --output to write all of them"
        );
    }
    print!("{}", write_document(&schemas, namespace.as_deref())?);
    println!();
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(paths: Vec<PathBuf>, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let schemas = load_seeds(&paths)?;
    let summary = SchemaSummary::from_schemas(&schemas);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("xmlschema-infer v{}", xmlschema_infer::VERSION);
    println!();
    for document in &summary.documents {
        match &document.target_namespace {
            Some(ns) => println!("Target Namespace: {}", ns),
            None => println!("Target Namespace: (none)"),
        }
        for import in &document.imports {
            println!("  import {}", import.as_deref().unwrap_or("(no namespace)"));
        }
        println!("  Global Elements: {}", document.elements.len());
        for element in &document.elements {
            let content = element.content.as_deref().unwrap_or("-");
            match &element.simple_type {
                Some(t) => println!("    {} : {} ({})", element.name, t, content),
                None => println!("    {} ({})", element.name, content),
            }
        }
        println!("  Global Attributes: {}", document.attributes.len());
        for attribute in &document.attributes {
            println!(
                "    {} : {}",
                attribute.name,
                attribute.attr_type.as_deref().unwrap_or("string")
            );
        }
        println!();
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
