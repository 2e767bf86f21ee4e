use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use lego_report::ReportConfig;

/// Analyses a LEGO sets catalog and writes charts plus a PDF report.
///
/// Fonts are looked up in `LEGO_REPORT_FONTS_DIR`, next to the binary under
/// `assets/fonts`, and finally among common system font directories.
#[derive(Parser)]
#[command(author, version, about = "LEGO sets analysis report generator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the charts and the PDF report.
    Report {
        #[command(flatten)]
        input: InputArgs,

        /// PDF file to write.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Directory receiving the chart images.
        #[arg(long, value_name = "DIR")]
        image_dir: Option<PathBuf>,

        /// Also export every metric table as CSV into this directory.
        #[arg(long, value_name = "DIR")]
        tables_dir: Option<PathBuf>,
    },

    /// Print every metric table as CSV to stdout.
    Tables {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// TOML configuration file; defaults apply to everything it leaves out.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sets catalog CSV.
    #[arg(long, value_name = "FILE")]
    sets: Option<PathBuf>,

    /// Parent themes CSV.
    #[arg(long, value_name = "FILE")]
    themes: Option<PathBuf>,
}

impl InputArgs {
    fn load(&self) -> Result<ReportConfig, lego_report::Error> {
        let mut config = match &self.config {
            Some(path) => lego_report::load_config(path)?,
            None => ReportConfig::default(),
        };
        if let Some(sets) = &self.sets {
            config.input.sets = sets.clone();
        }
        if let Some(themes) = &self.themes {
            config.input.themes = themes.clone();
        }
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Report {
            input,
            output,
            image_dir,
            tables_dir,
        } => run_report(&input, output, image_dir, tables_dir),
        Commands::Tables { input } => run_tables(&input),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run_report(
    input: &InputArgs,
    output: Option<PathBuf>,
    image_dir: Option<PathBuf>,
    tables_dir: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut config = input.load()?;
    if let Some(output) = output {
        config.output.pdf = output;
    }
    if let Some(image_dir) = image_dir {
        config.output.image_dir = image_dir;
    }
    if tables_dir.is_some() {
        config.output.tables_dir = tables_dir;
    }

    let summary = lego_report::generate_report(&config)?;
    println!(
        "Report saved as: {} ({} bytes, {} sections, {} charts from {} sets)",
        summary.pdf.display(),
        summary.bytes,
        summary.sections,
        summary.images.len(),
        summary.rows
    );
    if !summary.tables.is_empty() {
        println!("Exported {} metric tables", summary.tables.len());
    }
    Ok(())
}

fn run_tables(input: &InputArgs) -> Result<(), Box<dyn Error>> {
    let config = input.load()?;
    config.validate()?;
    let table = lego_report::data::load(&config.input.sets, &config.input.themes)?;
    let tables = lego_report::metric_tables(&config, &table)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, named) in tables.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        writeln!(out, "# {}", named.name)?;
        out.write_all(&named.table.to_csv()?)?;
    }
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
