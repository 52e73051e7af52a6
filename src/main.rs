use clap::Parser;
use s2ssedit::cli::{run, Cli};
use s2ssedit::{init_logging, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;
    tracing::info!(version = VERSION, built = BUILD_DATE, "s2ssedit");

    run(&cli)?;

    Ok(())
}
