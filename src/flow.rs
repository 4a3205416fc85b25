//! The sequential run: load credentials, authorize, save, retrieve, export.
//!
//! Console I/O is passed in so the whole sequence can be driven from tests
//! with an in-memory reader and writer.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::blocking::PocketClient;
use crate::export::{DEFAULT_EXPORT_FILE, write_export};
use crate::store::CredentialStore;
use crate::types::DEFAULT_RETRIEVE_COUNT;
use crate::{AccessGrant, Credentials, PocketError, Result};

/// Knobs for a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Where the export document is written
    pub export_path: PathBuf,
    /// Upper bound on items fetched by the bulk retrieval
    pub count: u32,
    /// Try to open the authorization page in a browser
    pub open_browser: bool,
    /// Skip authorization when the credentials already hold an access token
    pub reuse_access_token: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            count: DEFAULT_RETRIEVE_COUNT,
            open_browser: false,
            reuse_access_token: false,
        }
    }
}

/// What a completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Username reported by the exchange; `None` when a stored token was reused
    pub username: Option<String>,
    /// Size of the retrieval response body
    pub bytes_retrieved: usize,
    /// Path of the export document
    pub export_path: PathBuf,
}

/// Run the whole sequence once.
///
/// Blocks on one line of `input` after printing the authorization link. The
/// credentials file is only rewritten after a successful exchange, and the
/// export only happens with an access token in hand.
pub fn run<R: BufRead, W: Write>(
    client: &PocketClient,
    store: &CredentialStore,
    options: &RunOptions,
    input: &mut R,
    output: &mut W,
) -> Result<RunSummary> {
    let mut credentials = store.load()?;

    let username = if options.reuse_access_token && credentials.is_authorized() {
        info!("reusing stored access token");
        say(output, "Using stored access token, skipping authorization.")?;
        None
    } else {
        let grant = authorize(client, &mut credentials, options, input, output)?;
        credentials.apply_grant(&grant);
        store.save(&credentials)?;
        say(
            output,
            &format!(
                "Authentication complete, retrieving data for {}...",
                grant.username
            ),
        )?;
        Some(grant.username)
    };

    let body = client.retrieve(&credentials, options.count)?;
    say(
        output,
        &format!(
            "Retrieved {} bytes.\nExporting to {}...",
            body.len(),
            options.export_path.display()
        ),
    )?;
    write_export(&options.export_path, &body)?;
    say(output, "Export complete.")?;

    Ok(RunSummary {
        username,
        bytes_retrieved: body.len(),
        export_path: options.export_path.clone(),
    })
}

/// Token request, human pause, token exchange.
fn authorize<R: BufRead, W: Write>(
    client: &PocketClient,
    credentials: &mut Credentials,
    options: &RunOptions,
    input: &mut R,
    output: &mut W,
) -> Result<AccessGrant> {
    say(output, "Making request to token endpoint...")?;
    let request = client.start_flow(credentials)?;
    credentials.request_token = request.request_token.clone();

    say(
        output,
        &format!(
            "Paste this link in a browser, and authorize this app: {}",
            request.authorization_url
        ),
    )?;
    if options.open_browser {
        launch_browser(&request.authorization_url);
    }
    write!(output, "Press enter to continue").map_err(PocketError::Console)?;
    output.flush().map_err(PocketError::Console)?;

    // Content is irrelevant; EOF counts as continue.
    let mut line = String::new();
    input.read_line(&mut line).map_err(PocketError::Console)?;
    say(output, "")?;

    client.exchange_code(credentials, &request)
}

#[cfg(feature = "browser")]
fn launch_browser(url: &str) {
    if let Err(e) = crate::open_browser(url) {
        warn!(error = %e, "could not open browser, use the printed link instead");
    }
}

#[cfg(not(feature = "browser"))]
fn launch_browser(_url: &str) {
    warn!("built without browser support, use the printed link instead");
}

fn say<W: Write>(output: &mut W, message: &str) -> Result<()> {
    writeln!(output, "{message}").map_err(PocketError::Console)
}
