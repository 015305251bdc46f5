use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use rusty_parcats::app;
use rusty_parcats::chart::ChartStyle;
use rusty_parcats::config::DashboardConfig;
use rusty_parcats::data::loader::{load_table, DataSource};
use rusty_parcats::server::DashServer;
use rusty_parcats::state::{Session, SessionRegistry};

fn main() -> ExitCode {
    let config = DashboardConfig::parse();
    init_logging(config.debug);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn run(config: &DashboardConfig) -> Result<()> {
    let style = ChartStyle::default();
    let source = DataSource::parse(&config.source);
    let table = Arc::new(load_table(&source, &style.columns).context("startup aborted")?);

    if config.native {
        let session = Session::new(table, style.clone());
        return app::run_native(session, style).map_err(|e| anyhow!("native viewer failed: {e}"));
    }

    let registry = SessionRegistry::new(table, style, config.max_sessions);
    let server = DashServer::bind(&config.listen_addr(), registry).context("startup aborted")?;
    server.run().context("dashboard stopped serving")?;
    Ok(())
}
