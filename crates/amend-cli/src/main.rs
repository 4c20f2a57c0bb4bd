use amend_core::document::{
    build_toc, delete_annotation, delete_element, insert_comment, insert_element,
    merge_annotation_documents, rebuild_from_toc, renumber_document, replace_element,
};
use amend_core::{Author, EditOutcome, Position, TocItem, TocMode};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "amend")]
#[command(about = "Structural editing of Akoma Ntoso legal documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute numbering for every element family
    Renumber {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the table of content as JSON
    Toc {
        #[arg(short, long)]
        file: PathBuf,

        /// Include raw inline content of leaf items
        #[arg(long)]
        full: bool,
    },
    /// Rebuild the document from an edited ToC (JSON)
    Rebuild {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        toc: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Merge the addendum's comments and suggestions into the base
    Merge {
        #[arg(short, long)]
        base: PathBuf,

        #[arg(short, long)]
        addendum: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Insert a fragment as sibling of an anchor element
    Insert {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        anchor: String,

        /// File holding the fragment XML
        #[arg(long)]
        fragment: PathBuf,

        #[arg(long, default_value = "after")]
        position: Position,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Replace an element's subtree
    Replace {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        tag: String,

        #[arg(long)]
        id: String,

        /// File holding the replacement XML
        #[arg(long)]
        fragment: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Delete an element (no-op when the id is absent)
    Delete {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        tag: String,

        #[arg(long)]
        id: String,

        #[arg(short, long)]
        output: PathBuf,
    },
    /// Attach a comment to an element
    Comment {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long)]
        anchor: String,

        #[arg(long)]
        text: String,

        #[arg(long)]
        author: String,

        #[arg(long, default_value = "")]
        author_name: String,

        #[arg(long, default_value = "")]
        dg: String,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Renumber { file, output } => {
            let bytes = fs::read(&file)?;
            write_outcome(&output, renumber_document(&bytes)?)?;
        }
        Commands::Toc { file, full } => {
            let bytes = fs::read(&file)?;
            let mode = if full { TocMode::Full } else { TocMode::Simplified };
            let toc = build_toc(&bytes, mode)?;
            println!("{}", serde_json::to_string_pretty(&toc)?);
        }
        Commands::Rebuild { file, toc, output } => {
            let bytes = fs::read(&file)?;
            let items: Vec<TocItem> = serde_json::from_slice(&fs::read(&toc)?)?;
            write_outcome(&output, rebuild_from_toc(&bytes, &items)?)?;
        }
        Commands::Merge {
            base,
            addendum,
            output,
        } => {
            let base_bytes = fs::read(&base)?;
            let addendum_bytes = fs::read(&addendum)?;
            write_outcome(
                &output,
                merge_annotation_documents(&base_bytes, &addendum_bytes, None)?,
            )?;
        }
        Commands::Insert {
            file,
            anchor,
            fragment,
            position,
            output,
        } => {
            let bytes = fs::read(&file)?;
            let fragment_xml = fs::read_to_string(&fragment)?;
            write_outcome(
                &output,
                insert_element(&bytes, &anchor, &fragment_xml, position, None)?,
            )?;
        }
        Commands::Replace {
            file,
            tag,
            id,
            fragment,
            output,
        } => {
            let bytes = fs::read(&file)?;
            let fragment_xml = fs::read_to_string(&fragment)?;
            write_outcome(
                &output,
                replace_element(&bytes, &tag, &id, Some(&fragment_xml), None)?,
            )?;
        }
        Commands::Delete {
            file,
            tag,
            id,
            output,
        } => {
            let bytes = fs::read(&file)?;
            if tag == "popup" {
                write_outcome(&output, delete_annotation(&bytes, &id)?)?;
            } else {
                write_outcome(&output, delete_element(&bytes, &tag, &id, None)?)?;
            }
        }
        Commands::Comment {
            file,
            anchor,
            text,
            author,
            author_name,
            dg,
            output,
        } => {
            let bytes = fs::read(&file)?;
            let identity = Author::new(&author, &author_name, &dg);
            write_outcome(
                &output,
                insert_comment(&bytes, &anchor, &identity, &text, chrono::Utc::now(), None)?,
            )?;
        }
    }
    Ok(())
}

fn write_outcome(path: &PathBuf, outcome: EditOutcome) -> std::io::Result<()> {
    fs::write(path, &outcome.content)?;
    tracing::info!(summary = %outcome.summary, output = %path.display(), "document updated");
    Ok(())
}
