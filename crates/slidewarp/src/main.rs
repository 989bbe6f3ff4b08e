mod cli;
mod paths;
mod run;
mod settings;
mod tweaks;

use anyhow::Result;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();
    run::run(cli)
}
