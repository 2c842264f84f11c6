use clap::Parser;
use tayra::cli::commands::Cli;
use tayra::cli::handlers;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise warnings only, or debug with -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if cli.verbose { "debug" } else { "warn" },
    ))
    .format_timestamp(None)
    .init();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
