//! Price Sheets CLI - pricing catalog extraction tool

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use price_sheets::prelude::*;
use price_sheets::{open_workbook, verify};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "price-sheets")]
#[command(
    author,
    version,
    about = "Extract a pricing catalog from a pricing workbook"
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the catalog and write pricing-tables.json and fittings-catalog.json
    Extract {
        /// Input workbook (xlsx, xlsm)
        input: PathBuf,

        /// Built-in extraction profile
        #[arg(short, long, value_enum, default_value_t = ProfileName::Lookup)]
        profile: ProfileName,

        /// Extraction profile JSON file (replaces --profile)
        #[arg(long, conflicts_with = "profile")]
        profile_file: Option<PathBuf>,

        /// JSON file with pricing values that override the workbook
        #[arg(long)]
        pricing_config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// File name of the pricing tables document
        #[arg(long, default_value = price_sheets::PRICING_TABLES_FILE)]
        pricing_tables_name: String,

        /// File name of the fittings document
        #[arg(long, default_value = price_sheets::FITTINGS_CATALOG_FILE)]
        fittings_name: String,

        /// Emit built-in materials when materials discovery finds nothing
        #[arg(long)]
        allow_material_fallback: bool,

        /// Fail instead of writing when records share a code
        #[arg(long)]
        deny_duplicate_codes: bool,

        /// Do not write anything when the catalog is empty
        #[arg(long)]
        skip_empty: bool,
    },

    /// Check a written catalog for empty codes, empty units, bad prices and duplicate codes
    Verify {
        /// Directory holding the catalog documents
        dir: PathBuf,

        /// File name of the pricing tables document
        #[arg(long, default_value = price_sheets::PRICING_TABLES_FILE)]
        pricing_tables_name: String,

        /// File name of the fittings document
        #[arg(long, default_value = price_sheets::FITTINGS_CATALOG_FILE)]
        fittings_name: String,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileName {
    /// One sheet per category, code/name/unit/price in B..E from row 4
    PerCategory,
    /// Lookup tables in W..Z from row 2, synthetic codes
    Lookup,
    /// Like lookup, with the materials column found by MDF/PVC markers
    Discovery,
}

impl ProfileName {
    fn profile(self) -> ExtractionProfile {
        match self {
            ProfileName::PerCategory => ExtractionProfile::per_category(),
            ProfileName::Lookup => ExtractionProfile::lookup(),
            ProfileName::Discovery => ExtractionProfile::discovery(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            profile,
            profile_file,
            pricing_config,
            out_dir,
            pricing_tables_name,
            fittings_name,
            allow_material_fallback,
            deny_duplicate_codes,
            skip_empty,
        } => {
            let profile = match profile_file {
                Some(path) => ExtractionProfile::load(&path)
                    .with_context(|| format!("Failed to load profile '{}'", path.display()))?,
                None => profile.profile(),
            };
            let options = ExtractOptions {
                fallback: if allow_material_fallback {
                    FallbackPolicy::BuiltinMaterials
                } else {
                    FallbackPolicy::Disabled
                },
                duplicates: if deny_duplicate_codes {
                    DuplicatePolicy::Deny
                } else {
                    DuplicatePolicy::Report
                },
                write_empty: !skip_empty,
                pricing_overrides: match pricing_config {
                    Some(path) => load_overrides(&path)?,
                    None => PricingOverrides::default(),
                },
            };
            let writer = CatalogWriter::new(out_dir)
                .with_pricing_tables_name(pricing_tables_name)
                .with_fittings_name(fittings_name);
            extract(&input, &profile, options, &writer)
        }
        Commands::Verify {
            dir,
            pricing_tables_name,
            fittings_name,
        } => verify_catalog(
            &CatalogWriter::new(dir)
                .with_pricing_tables_name(pricing_tables_name)
                .with_fittings_name(fittings_name),
        ),
        Commands::Sheets { input } => list_sheets(&input),
    }
}

/// Log to stderr; stdout stays free for command output
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_overrides(path: &Path) -> Result<PricingOverrides> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    PricingOverrides::from_json(&json)
        .with_context(|| format!("Invalid pricing config '{}'", path.display()))
}

fn extract(
    input: &Path,
    profile: &ExtractionProfile,
    options: ExtractOptions,
    writer: &CatalogWriter,
) -> Result<()> {
    let mut extractor = Extractor::new(profile, options.clone(), TracingSink);
    let extraction = match extractor.extract_file(input) {
        Ok(extraction) => extraction,
        Err(err) => {
            if let CatalogError::DuplicateCodes { summary } = &err {
                eprintln!("{}", summary);
            }
            return Err(err).with_context(|| format!("Failed to extract '{}'", input.display()));
        }
    };

    eprintln!("{}", extraction.summary);

    if !options.should_write(&extraction.catalog) {
        eprintln!("Catalog is empty, nothing written");
        return Ok(());
    }

    let written = writer.write(&extraction.catalog).context("Failed to write catalog")?;
    println!("{}", written.pricing_tables.display());
    println!("{}", written.fittings.display());
    Ok(())
}

fn verify_catalog(writer: &CatalogWriter) -> Result<()> {
    let catalog = writer.read().with_context(|| {
        format!(
            "Failed to read '{}' and '{}'",
            writer.pricing_tables_path().display(),
            writer.fittings_path().display()
        )
    })?;
    let report = verify(&catalog);

    for violation in &report.violations {
        eprintln!("{}", violation);
    }
    for (code, count) in &report.duplicate_codes {
        eprintln!("duplicate code {} ({} records)", code, count);
    }

    if !report.is_clean() {
        bail!(
            "{} violation(s), {} duplicate code(s)",
            report.violations.len(),
            report.duplicate_codes.len()
        );
    }

    for category in Category::ALL {
        println!("{}\t{}", category, catalog.count(category));
    }
    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook =
        open_workbook(input).with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, name) in workbook.sheet_names().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(())
}
