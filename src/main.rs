use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pocket_export::{
    CredentialStore, DEFAULT_CONFIG_FILE, DEFAULT_EXPORT_FILE, DEFAULT_RETRIEVE_COUNT,
    PocketConfig, PocketError, RunOptions, blocking::PocketClient, flow,
};
use tracing_subscriber::EnvFilter;

/// Authorize against Pocket and export all saved items to JSON
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Credentials file holding APP_NAME and CLIENT_KEY
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where to write the exported items
    #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
    export: PathBuf,

    /// Maximum number of items to fetch
    #[arg(long, default_value_t = DEFAULT_RETRIEVE_COUNT)]
    count: u32,

    /// Open the authorization page in the default browser
    #[arg(long)]
    open_browser: bool,

    /// Skip authorization if the credentials file already has an access token
    #[arg(long)]
    reuse_token: bool,

    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), PocketError> {
    let client = PocketClient::new(PocketConfig::default())?;
    let store = CredentialStore::new(args.config.clone());
    let options = RunOptions {
        export_path: args.export.clone(),
        count: args.count,
        open_browser: args.open_browser,
        reuse_access_token: args.reuse_token,
    };

    let stdin = std::io::stdin();
    flow::run(
        &client,
        &store,
        &options,
        &mut stdin.lock(),
        &mut std::io::stdout(),
    )?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "run aborted");
            println!("Run aborted -- did you skip a step?\n{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
