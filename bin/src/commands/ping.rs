//! Ping command implementation.

use crate::commands::ConnectionArgs;
use anyhow::{Context, Result};
use promread_lib::prelude::*;

/// Check the health endpoint of the remote source.
pub(crate) async fn ping(conn: &ConnectionArgs, quiet: bool) -> Result<()> {
    let client = RemoteReadClient::new(conn.client_config()).context("Failed to create client")?;

    client
        .ping()
        .await
        .with_context(|| format!("Health check failed for {}", client.addr()))?;

    if !quiet {
        println!("{} is healthy", client.addr());
    }

    Ok(())
}
