use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notelytics_core::pipeline::{analyze_bytes, process_batch, FileInput};
use notelytics_core::report::REPORT_FILENAME;

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Engagement analytics for rednote creator exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze exports and write the consolidated report workbook
    Analyze(AnalyzeArgs),
    /// Render one export's processed table and means to the terminal
    Preview(PreviewArgs),
}

#[derive(Args, Debug, Default)]
struct AnalyzeArgs {
    /// Export files (.xls/.xlsx) to analyze
    files: Vec<PathBuf>,

    /// Directory to scan for exports (*.xls and *.xlsx)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Path of the report workbook (defaults to 小红书分析汇总报告.xlsx)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write the batch summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Skip the per-file tables and only print the summary
    #[arg(long)]
    no_tables: bool,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// Export file to render
    file: PathBuf,

    /// Maximum number of table rows to print
    #[arg(long, default_value_t = 20)]
    rows: usize,
}

fn main() -> Result<()> {
    // A missing .env is normal; a malformed one degrades to defaults.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("WARNING: .env could not be loaded: {err}");
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Preview(args) => run_preview(args),
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mut paths = args.files.clone();
    if let Some(dir) = &args.dir {
        paths.extend(collect_exports(dir)?);
    }
    if paths.is_empty() {
        bail!("no inputs; pass export files or --dir");
    }

    let mut loaded: Vec<(String, Vec<u8>)> = Vec::with_capacity(paths.len());
    for path in &paths {
        match fs::read(path) {
            Ok(bytes) => loaded.push((file_label(path), bytes)),
            Err(err) => eprintln!("WARNING: skipping {}: {err}", path.display()),
        }
    }
    if loaded.is_empty() {
        bail!("none of the inputs could be read");
    }

    let inputs: Vec<FileInput<'_>> = loaded
        .iter()
        .map(|(filename, contents)| FileInput {
            filename: filename.as_str(),
            contents: contents.as_slice(),
        })
        .collect();
    let outcome = process_batch(&inputs);

    if !args.no_tables {
        for entry in outcome.report.entries() {
            println!();
            render::print_analysis(&entry.source_file, &entry.analysis, usize::MAX)?;
        }
        println!();
    }

    render::print_batch_summary(&outcome);

    if outcome.report.is_empty() {
        eprintln!("WARNING: nothing was analyzed; report workbook not written");
    } else {
        let out_path = args.out.unwrap_or_else(|| PathBuf::from(REPORT_FILENAME));
        let bytes = outcome.report.to_workbook_bytes()?;
        fs::write(&out_path, &bytes)
            .with_context(|| format!("failed to write report to {}", out_path.display()))?;
        println!(
            "report written to {} ({} sheets)",
            out_path.display(),
            outcome.report.len()
        );
    }

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&outcome.summary())?;
        fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("summary written to {}", path.display());
    }

    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<()> {
    let contents = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let analysis = analyze_bytes(&contents)
        .with_context(|| format!("failed to analyze {}", args.file.display()))?;
    render::print_analysis(&file_label(&args.file), &analysis, args.rows)?;
    Ok(())
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn collect_exports(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for pattern in ["*.xlsx", "*.xls"] {
        let full = dir.join(pattern);
        let full = full
            .to_str()
            .context("directory path is not valid UTF-8")?;
        for entry in glob::glob(full)? {
            match entry {
                Ok(path) if path.is_file() => found.push(path),
                Ok(_) => {}
                Err(err) => eprintln!("WARNING: unreadable glob entry: {err}"),
            }
        }
    }
    found.sort();
    Ok(found)
}
