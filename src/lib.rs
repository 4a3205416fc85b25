//! # pocket-export
//!
//! Authorize an application against the Pocket API with its three-legged
//! OAuth flow, then export every saved item to a JSON file.
//!
//! A run is strictly sequential:
//!
//! 1. Load the credentials file (`APP_NAME` and `CLIENT_KEY` are required)
//! 2. Request a request token
//! 3. Have the user approve it in a browser
//! 4. Exchange it for an access token and save the credentials
//! 5. Fetch all items in one call and write them to the export file
//!
//! ## Quick Start
//!
//! ```no_run
//! use pocket_export::{CredentialStore, PocketConfig, RunOptions, blocking::PocketClient, flow};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PocketClient::new(PocketConfig::default())?;
//!     let store = CredentialStore::new("pocketcache.config.json");
//!
//!     let summary = flow::run(
//!         &client,
//!         &store,
//!         &RunOptions::default(),
//!         &mut std::io::stdin().lock(),
//!         &mut std::io::stdout(),
//!     )?;
//!     println!("Exported {} bytes", summary.bytes_retrieved);
//!     Ok(())
//! }
//! ```

mod decode;
mod error;
mod export;
mod store;
mod types;

pub mod blocking;
pub mod flow;

#[cfg(feature = "browser")]
mod browser;

// Public API exports
pub use decode::{decode_access_grant, decode_request_token};
pub use error::{PocketError, Result};
pub use export::{DEFAULT_EXPORT_FILE, write_export};
pub use flow::{RunOptions, RunSummary};
pub use store::{CredentialStore, DEFAULT_CONFIG_FILE};
pub use types::{
    AccessGrant, AuthorizationRequest, Credentials, DEFAULT_RETRIEVE_COUNT, PocketConfig,
    PocketConfigBuilder,
};

#[cfg(feature = "browser")]
pub use browser::open_browser;
