use clap::Parser;

use todo_cli::{app, config};

fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();
    config::init_tracing(&args.log_level)?;

    // One thread handles input and completions; requests run on the
    // blocking pool.
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(app::run(args));
    // Don't wait on requests still in flight.
    rt.shutdown_background();
    result
}
