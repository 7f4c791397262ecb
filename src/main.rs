use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use mirrorgen::config::MirrorConfig;
use mirrorgen::logging::{init_logging, LogLevel};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "mirrorgen",
    version,
    author = "mirrorgen developers",
    about = "Mirror the exported data types of a Go package into a dependency-free package"
)]
struct Cli {
    /// Configuration file
    #[arg(short, long, value_name = "FILE", default_value = "mirrorgen.toml")]
    config: PathBuf,

    /// Override the destination directory
    #[arg(short, long, value_name = "DIR")]
    destination: Option<PathBuf>,

    /// Override the destination package name
    #[arg(short, long, value_name = "NAME")]
    package: Option<String>,

    /// Additional dependency packages to mirror into subdirectories
    #[arg(short, long, value_name = "IMPORT_PATH", value_delimiter = ',')]
    include: Vec<String>,

    /// Default log verbosity; `RUST_LOG` refines it
    #[arg(short, long, value_name = "LEVEL", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Write a JSON summary of the generated files
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        destination,
        package,
        include,
        summary,
        ..
    } = cli;

    let start_time = Instant::now();

    let mut settings = MirrorConfig::load(&config)
        .with_context(|| format!("loading configuration from {}", config.display()))?;
    if let Some(destination) = destination {
        settings.destination = destination;
    }
    if let Some(package) = package {
        settings.package_name = package;
    }
    settings.included_packages.extend(
        include
            .into_iter()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty()),
    );

    let driver = settings
        .build_driver()
        .context("preparing the mirroring run")?;
    let report = driver
        .run(&settings.destination, &settings.package_name)
        .with_context(|| format!("mirroring {}", settings.root_package))?;

    let written = report.written();
    tracing::info!(
        root = %settings.root_package,
        destination = %settings.destination.display(),
        files = written.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "mirror complete"
    );

    if let Some(summary_path) = summary {
        let json = serde_json::to_string_pretty(&report).context("serializing run summary")?;
        fs::write(&summary_path, json)
            .with_context(|| format!("writing summary to {}", summary_path.display()))?;
    }

    for path in written {
        println!("{}", path.display());
    }

    Ok(())
}
