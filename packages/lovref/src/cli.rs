//! Command-line interface for lovref.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;

use crate::citation::{format_citation, parse_citation_in, CitationStyle};
use crate::config::{parse_date, validate_document_id};
use crate::error::{LovrefError, Result};
use crate::extract::extract_document;
use crate::output::{generate_seed, save_seed, OutputFormat};
use crate::tree::load_tree;
use crate::types::{DocumentMeta, InForceWindow, ProvisionRef, StructuredCitation};
use crate::validate::{validate_citation, InMemoryProvisionStore};

/// Lovref - Parse, extract and validate citations to Danish statutes.
#[derive(Parser)]
#[command(name = "lovref")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a citation and render it in a citation style.
    Parse {
        /// Citation text (e.g., "2018:502 § 5, stk. 2")
        citation: String,

        /// Document the citation is read inside, for bare "§ 5" citations
        #[arg(short, long)]
        document: Option<String>,

        /// Citation style: full, short or pinpoint
        #[arg(short, long, default_value = "full")]
        style: String,
    },

    /// Extract provisions and references from a document and write a seed record.
    Extract {
        /// LexDania XML, ingestion JSON or tagged tree JSON
        file: PathBuf,

        /// Document identifier (e.g., 2018:502)
        #[arg(long)]
        document_id: String,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// First day in force (YYYY-MM-DD)
        #[arg(long)]
        in_force_from: Option<String>,

        /// Last day in force (YYYY-MM-DD)
        #[arg(long)]
        in_force_to: Option<String>,

        /// Provision designated as legal basis (e.g., "1" or "1:1"); repeatable
        #[arg(long = "legal-basis")]
        legal_basis: Vec<String>,

        /// Output directory (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed format: json or yaml
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Check a citation against seed records.
    Validate {
        /// Citation text
        citation: String,

        /// Seed record to load (json or yaml); repeatable
        #[arg(long = "store", required = true)]
        stores: Vec<PathBuf>,

        /// Document the citation is read inside
        #[arg(short, long)]
        document: Option<String>,

        /// Date to check the in-force window against (YYYY-MM-DD)
        #[arg(long)]
        as_of: Option<String>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            citation,
            document,
            style,
        } => parse_command(&citation, document.as_deref(), &style),
        Commands::Extract {
            file,
            document_id,
            title,
            in_force_from,
            in_force_to,
            legal_basis,
            output,
            format,
        } => {
            let in_force = InForceWindow::new(
                in_force_from.as_deref().map(parse_date).transpose()?,
                in_force_to.as_deref().map(parse_date).transpose()?,
            );
            let mut meta = DocumentMeta::new(document_id).with_in_force(in_force);
            if let Some(title) = title {
                meta = meta.with_title(title);
            }
            extract_command(&file, meta, &legal_basis, output.as_deref(), &format)
        }
        Commands::Validate {
            citation,
            stores,
            document,
            as_of,
        } => validate_command(&citation, &stores, document.as_deref(), as_of.as_deref()),
    }
}

/// Parse a citation, honouring an optional ambient document.
fn parse_with_ambient(citation: &str, document: Option<&str>) -> Result<StructuredCitation> {
    if let Some(document) = document {
        validate_document_id(document)?;
    }
    Ok(parse_citation_in(citation, document)?)
}

/// Execute the parse command.
fn parse_command(citation: &str, document: Option<&str>, style_name: &str) -> Result<()> {
    let citation_style: CitationStyle = style_name.parse()?;
    let parsed = parse_with_ambient(citation, document)?;
    let rendered = format_citation(&parsed, citation_style)?;

    println!("  Document: {}", style(&parsed.document_id).cyan());
    if let Some(chapter) = &parsed.chapter {
        println!("  Chapter: {chapter}");
    }
    if let Some(section) = &parsed.section {
        println!("  Section: {section}");
    }
    if let Some(pinpoint) = &parsed.pinpoint {
        println!("  Pinpoint: {pinpoint}");
    }
    if let Some(article) = &parsed.eu_article {
        println!("  Article: {article}");
    }
    println!();
    println!("{} {}", style("Citation:").green().bold(), rendered);

    Ok(())
}

/// Execute the extract command.
fn extract_command(
    file: &Path,
    meta: DocumentMeta,
    legal_basis: &[String],
    output: Option<&Path>,
    format_name: &str,
) -> Result<()> {
    validate_document_id(&meta.document_id)?;
    let format: OutputFormat = format_name.parse()?;

    if let Some(output_dir) = output {
        if output_dir.exists() && !output_dir.is_dir() {
            return Err(LovrefError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Output path is not a directory: {}", output_dir.display()),
            )));
        }
    }

    let basis: Vec<ProvisionRef> = legal_basis
        .iter()
        .map(|reference| ProvisionRef::parse(reference))
        .collect();

    let tree = load_tree(file)?;
    let extraction = extract_document(&meta, &tree, &basis);

    eprintln!(
        "{} {} from {}",
        style("Extracted").bold(),
        style(&meta.document_id).cyan(),
        file.display()
    );
    eprintln!("  Provisions: {}", extraction.provisions.len());
    eprintln!("  Cross-references: {}", extraction.cross_references.len());
    eprintln!("  EU references: {}", extraction.eu_references.len());
    eprintln!("  Definitions: {}", extraction.definitions.len());
    if !extraction.warnings.is_empty() {
        eprintln!(
            "  Warnings: {}",
            style(extraction.warnings.len()).yellow().bold()
        );
        for warning in &extraction.warnings {
            eprintln!("    {warning}");
        }
    }

    let seed = extraction.to_seed();
    match output {
        Some(output_dir) => {
            let path = save_seed(&seed, format, output_dir)?;
            println!("{} {}", style("Saved to:").green().bold(), path.display());
        }
        None => print!("{}", generate_seed(&seed, format)?),
    }

    Ok(())
}

/// Execute the validate command.
fn validate_command(
    citation: &str,
    stores: &[PathBuf],
    document: Option<&str>,
    as_of: Option<&str>,
) -> Result<()> {
    let as_of = as_of.map(parse_date).transpose()?;
    let parsed = parse_with_ambient(citation, document)?;

    let mut store = InMemoryProvisionStore::new();
    for path in stores {
        store.load_seed_file(path)?;
    }
    tracing::debug!(documents = store.len(), "Loaded provision store");

    let result = validate_citation(&parsed, &store, as_of);

    if !result.matched {
        println!("{} {}", style("Not matched:").red().bold(), parsed.raw);
        return Err(LovrefError::Unmatched(result.warnings.join("; ")));
    }

    println!("{} {}", style("Matched:").green().bold(), parsed.raw);
    if let Some(resolved) = &result.resolved {
        println!("  Document: {}", style(&resolved.document_id).cyan());
        if let Some(provision) = &resolved.provision {
            println!("  Provision: {provision}");
        }
    }
    for warning in &result.warnings {
        println!("  {} {}", style("Warning:").yellow().bold(), warning);
    }

    Ok(())
}
