use anyhow::Context;

use kube_event_sink::app::{self, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config =
        Config::from_args(std::env::args()).context("failed to load configuration")?;
    app::run(config).await
}
