//! CLI command implementations.

pub(crate) mod ping;
pub(crate) mod read;

use clap::Args;
use promread_lib::ClientConfig;
use std::time::Duration;

/// Connection options shared by all commands.
#[derive(Args)]
pub(crate) struct ConnectionArgs {
    /// Remote source address (e.g. http://localhost:9090)
    #[arg(long)]
    pub(crate) addr: String,

    /// Basic-auth username
    #[arg(long)]
    pub(crate) username: Option<String>,

    /// Basic-auth password
    #[arg(long, requires = "username")]
    pub(crate) password: Option<String>,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value = "30")]
    pub(crate) timeout: u64,
}

impl ConnectionArgs {
    /// Builds the client configuration for these options.
    pub(crate) fn client_config(&self) -> ClientConfig {
        ClientConfig {
            addr: self.addr.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            read_timeout: Duration::from_secs(self.timeout),
            ..ClientConfig::default()
        }
    }
}
