//! Interactive mode for the server.
//!
//! Prompts the user for bind address and port before starting the server.

use accident_map_config::AppConfig;
use dialoguer::{Confirm, Input};

use crate::ServerError;

/// Runs the server in interactive mode, prompting for the binding.
///
/// The configured address and port are offered as defaults; the answers
/// replace them in `config` before delegating to [`super::start`].
///
/// # Errors
///
/// Returns [`ServerError`] if the session data cannot be loaded or the
/// server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run(mut config: AppConfig) -> Result<(), ServerError> {
    println!("Accident Map Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(config.server.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| config.server.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(config.server.port)
        .interact_text()
        .unwrap_or(config.server.port);

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    config.server.bind_addr = bind_addr;
    config.server.port = port;

    super::start(config).await
}
