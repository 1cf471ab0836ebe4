use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::api;
use crate::cli::AppContext;

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Override the configured bind port
    #[arg(long)]
    pub port: Option<u16>,
}

pub struct ServeCommand {
    args: ServeArgs,
}

impl ServeCommand {
    pub fn new(args: ServeArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, ctx: &AppContext) -> Result<()> {
        let mut server = ctx.config.server.clone();
        if let Some(port) = self.args.port {
            server.port = port;
        }
        info!(host = %server.host, port = server.port, "starting trade API");
        api::serve(&server, ctx.desk.clone()).await
    }
}
