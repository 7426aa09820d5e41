//! pipelinehub: PipelineHub CRM records from the command line.

use anyhow::Context;
use clap::Parser;
use pipelinehub_cli::{Cli, Command, handle_config_command, run};
use pipelinehub_client::{CrmConfig, create_record_api};
use pipelinehub_store::Crm;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if let Command::Config { action } = cli.command {
        init_tracing("warn");
        let mut stdout = std::io::stdout().lock();
        handle_config_command(config_path, action, &mut stdout)?;
        return Ok(());
    }

    let config = CrmConfig::load(config_path).context("failed to load configuration")?;
    init_tracing(&config.log.level);
    tracing::debug!(base_url = %config.api.base_url, "configuration loaded");

    let api = create_record_api(&config.api)?;
    tracing::info!(backend = api.name(), "record API ready");
    let crm = Crm::builder(api).page_limit(config.api.page_limit).build();

    let mut stdout = std::io::stdout().lock();
    run(cli.command, &crm, chrono::Utc::now(), &mut stdout).await?;
    Ok(())
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
