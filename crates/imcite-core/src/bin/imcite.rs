//! imcite CLI
//!
//! Check, format, and export BibTeX reference collections.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use imcite_core::{AuthorFormat, Collection, ExportOptions, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AuthorOrder {
    GivenFamily,
    FamilyGiven,
}

/// BibTeX collection checker and formatter.
#[derive(Parser)]
#[command(name = "imcite", version, about = "BibTeX collection checker and formatter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and report validation findings
    ///
    /// Exits 0 when clean, 1 with warnings, 2 with errors.
    Check {
        /// Path to the .bib file
        file: PathBuf,
    },

    /// Parse a file tolerantly and print the canonical document
    Fmt {
        /// Path to the .bib file
        file: PathBuf,
    },

    /// Print the document with author lists reformatted for export
    Export {
        /// Path to the .bib file
        file: PathBuf,
        /// Author name order
        #[arg(long, default_value = "given-family", value_enum)]
        authors: AuthorOrder,
        /// Truncate author lists longer than this
        #[arg(long)]
        max_authors: Option<usize>,
        /// Text appended when an author list is truncated
        #[arg(long, default_value = "and others")]
        suffix: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file } => cmd_check(&file),
        Commands::Fmt { file } => cmd_fmt(&file),
        Commands::Export {
            file,
            authors,
            max_authors,
            suffix,
        } => cmd_export(&file, authors, max_authors, suffix),
    }
}

fn cmd_check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let collection = Collection::from_text(&text);
    let report = collection.validate();

    for issue in &report.issues {
        let label = if issue.kind.severity() == Severity::Error {
            "error"
        } else {
            "warning"
        };
        println!("{}: {}", label, issue.hint());
    }
    println!(
        "{} records, {} issues",
        collection.len(),
        report.issues.len()
    );

    match report.severity {
        Severity::Clean => Ok(()),
        Severity::Warning => process::exit(1),
        Severity::Error => process::exit(2),
    }
}

fn cmd_fmt(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let collection = Collection::from_text(&text);
    print!("{}", collection.to_text());
    Ok(())
}

fn cmd_export(
    path: &Path,
    authors: AuthorOrder,
    max_authors: Option<usize>,
    suffix: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    let collection = Collection::from_text(&text);
    let options = ExportOptions {
        author_format: match authors {
            AuthorOrder::GivenFamily => AuthorFormat::GivenFamily,
            AuthorOrder::FamilyGiven => AuthorFormat::FamilyGiven,
        },
        max_authors,
        suffix,
    };

    let rendered: Vec<String> = collection
        .records()
        .iter()
        .map(|r| r.export_serialized(&options))
        .collect();
    if !rendered.is_empty() {
        println!("{}", rendered.join("\n"));
    }
    Ok(())
}
