//! jsx-tagger CLI
//!
//! Instruments every `.jsx`/`.tsx` file under a directory.
//!
//! ```bash
//! # report what would change
//! jsx-tagger src
//!
//! # rewrite files in place, identities relative to the repo root
//! jsx-tagger src --write --base-dir .
//! ```

use clap::Parser;
use jsx_tagger::{instrument_directory, BatchOptions, FileStatus, HostOptions, TransformConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "jsx-tagger")]
#[command(about = "Annotate JSX elements with their source location", long_about = None)]
struct Cli {
    /// Directory to scan
    root: PathBuf,

    /// Write instrumented files back in place
    #[arg(long)]
    write: bool,

    /// Attribute prefix, also used to detect tagged elements
    #[arg(long, default_value = "data-simplify")]
    prefix: String,

    /// Skip the percent-encoded props snapshot
    #[arg(long)]
    no_snapshot: bool,

    /// Add text/placeholder/className previews
    #[arg(long)]
    content_preview: bool,

    /// Root for relative paths (defaults to the working directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Regex over file paths (defaults to `\.(jsx|tsx)$`)
    #[arg(long)]
    include: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut transform = TransformConfig {
        attribute_prefix: cli.prefix,
        include_static_snapshot: !cli.no_snapshot,
        include_content_preview: cli.content_preview,
        ..TransformConfig::default()
    };
    if let Some(base) = cli.base_dir {
        transform.base_directory = base;
    }

    let options = BatchOptions {
        host: HostOptions {
            enabled: true,
            include: cli.include,
            transform,
        },
        write: cli.write,
    };

    let report = match instrument_directory(&cli.root, &options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("jsx-tagger: {}", e);
            return ExitCode::from(2);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("jsx-tagger: {}", e);
                return ExitCode::from(2);
            }
        }
    } else {
        for file in &report.files {
            match &file.status {
                FileStatus::Changed => {
                    println!("tagged  {:>4}  {}", file.elements_tagged, file.path.display())
                }
                FileStatus::Failed(reason) => println!("failed        {}: {}", file.path.display(), reason),
                FileStatus::Unchanged => {}
            }
        }
        println!(
            "{} files scanned, {} changed, {} elements tagged, {} failed{}",
            report.files_scanned,
            report.files_changed,
            report.elements_tagged,
            report.files_failed,
            if options.write { "" } else { " (dry run)" }
        );
    }

    if report.files_failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
