use crate::{PocketError, Result};

/// Open a URL in the user's default web browser
///
/// Used to open the Pocket authorization page so the user does not have to
/// copy the link by hand.
///
/// # Errors
///
/// Returns an error if the browser cannot be launched
///
/// # Example
///
/// ```no_run
/// use pocket_export::{blocking::PocketClient, open_browser};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PocketClient::default();
/// open_browser(&client.authorization_url("request-token")?)?;
/// println!("Browser opened! Please authorize the application.");
/// # Ok(())
/// # }
/// ```
pub fn open_browser(url: &str) -> Result<()> {
    webbrowser::open(url).map_err(|e| PocketError::BrowserLaunch(e.to_string()))
}
