use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Aligned, human-readable lines
    Text,
    /// One JSON object per image
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Parser)]
#[command(
    name = "datecheck",
    version,
    about = "Find photos whose EXIF capture time disagrees with their YYYY/YYMM folder or file name"
)]
struct Cli {
    /// Root of the photo archive
    dir: PathBuf,

    /// Print only mismatched, undatable or unreadable images
    #[arg(long)]
    only_flagged: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Colorize flagged lines (auto honours NO_COLOR)
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Exit with status 1 when any image is flagged as misfiled
    #[arg(long)]
    fail_on_mismatch: bool,
}

fn use_color(choice: ColorChoice, format: Format) -> bool {
    if format == Format::Json {
        return false;
    }
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let options = datecheck_core::CheckOptions {
        root: cli.dir,
        only_flagged: cli.only_flagged,
    };
    let color = use_color(cli.color, cli.format);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = datecheck_core::check_tree(&options, &mut |report: &datecheck_core::CheckReport| -> anyhow::Result<()> {
        let line = match cli.format {
            Format::Text => report.render(color),
            Format::Json => report.to_json()?,
        };
        writeln!(out, "{}", line)?;
        Ok(())
    })?;
    out.flush()?;

    eprintln!(
        "Done! {} images: {} ok, {} mismatched, {} undatable, {} unreadable, {} directories skipped ({:.2}s)",
        summary.total,
        summary.ok,
        summary.mismatched,
        summary.unknown,
        summary.errors,
        summary.skipped_dirs,
        t_total.elapsed().as_secs_f64()
    );

    if fails_run(cli.fail_on_mismatch, &summary) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn fails_run(fail_on_mismatch: bool, summary: &datecheck_core::CheckSummary) -> bool {
    fail_on_mismatch && summary.mismatched > 0
}
