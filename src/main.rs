//! excel-matcher CLI - compare product sheets and export inventory lists
//!
//! # Main Commands
//!
//! ```bash
//! excel-matcher serve                       # Start HTTP server (port 3000)
//! excel-matcher compare main.xlsx cat.xlsx  # Match and write the export files
//! excel-matcher decode sheet.xlsx           # Inspect a decoded sheet as JSON
//! ```

use clap::{Parser, Subcommand};
use excel_matcher::{archive, compare_bytes, decode_file, SCHEMAS};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "excel-matcher")]
#[command(about = "Match product spreadsheets and export inventory lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a spreadsheet and output its rows as JSON
    Decode {
        /// Input file (.xlsx, .xls, .ods or delimited text)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare sheets and write the export files
    Compare {
        /// Primary sheet (holds EXTRAINF02, quantities and prices)
        primary: PathBuf,

        /// Product catalog sheet (holds Cód. Produto and Cód. Auxiliar)
        catalog: PathBuf,

        /// Optional location sheet; adds per-location files
        #[arg(short, long)]
        locations: Option<PathBuf>,

        /// Directory the export files are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Also bundle every export file into this ZIP archive
        #[arg(short, long)]
        zip: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode { input, output } => cmd_decode(&input, output.as_deref()),

        Commands::Compare {
            primary,
            catalog,
            locations,
            out_dir,
            zip,
        } => cmd_compare(
            &primary,
            &catalog,
            locations.as_deref(),
            &out_dir,
            zip.as_deref(),
        ),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_decode(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Decoding: {}", input.display());

    let sheet = decode_file(input)?;
    eprintln!("   Format: {:?}", sheet.format);
    if sheet.headers.is_empty() {
        eprintln!("   No header row detected; rows are positional");
    } else {
        eprintln!("   Columns: {}", sheet.headers.join(", "));
    }
    eprintln!("✅ Decoded {} rows", sheet.rows.len());

    let json = serde_json::to_string_pretty(&sheet.rows)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_compare(
    primary: &Path,
    catalog: &Path,
    locations: Option<&Path>,
    out_dir: &Path,
    zip: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Primary: {}", primary.display());
    eprintln!("📄 Catalog: {}", catalog.display());
    if let Some(loc) = locations {
        eprintln!("📄 Locations: {}", loc.display());
    }

    let primary_bytes = fs::read(primary)?;
    let catalog_bytes = fs::read(catalog)?;
    let location_bytes = locations.map(fs::read).transpose()?;

    let result = compare_bytes(&primary_bytes, &catalog_bytes, location_bytes.as_deref())?;

    eprintln!("\n⚙️  Matched: {} rows", result.match_count());
    if !result.locations.is_empty() {
        eprintln!("   Locations: {}", result.locations.join(", "));
    }

    let blobs = result.manifests();
    fs::create_dir_all(out_dir)?;
    for blob in &blobs {
        let path = out_dir.join(&blob.filename);
        fs::write(&path, &blob.content)?;
        eprintln!("💾 {}", path.display());
    }

    if let Some(zip_path) = zip {
        let bytes = archive::bundle(&blobs)?;
        fs::write(zip_path, bytes)?;
        eprintln!("📦 {}", zip_path.display());
    }

    // Previews, one block per schema
    for schema in SCHEMAS {
        eprintln!("\n── {} ──", schema.display_name);
        for line in result.preview(schema) {
            eprintln!("{}", line);
        }
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    excel_matcher::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
