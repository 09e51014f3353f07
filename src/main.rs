use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use datagrid_facade::cache::facade::KeyValueFacade;
use datagrid_facade::config::Config;
use datagrid_facade::grid::DataGrid;
use datagrid_facade::ringbuffer::facade::AppendLogFacade;
use datagrid_facade::server::{build_router, serve, shutdown_signal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("datagrid-facade")
        .about("HTTP façade over an embedded data grid map and ring buffer")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDR:PORT")
                .help("Overrides [server] bind"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print the default config file and exit"),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = build_cli().get_matches();

    if matches.get_flag("print-config") {
        print!("{}", Config::default_toml());
        return Ok(());
    }

    let mut config = Config::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if let Some(bind) = matches.get_one::<String>("bind") {
        config.server.bind = bind.clone();
    }
    let bind_addr = config.bind_addr()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .context("Invalid log level in [logging] level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // 1. Data grid:
    let grid = DataGrid::new(&config);
    let sweeper = grid.spawn_expiry_sweeper(Duration::from_millis(config.grid.expiry_sweep_ms));

    // 2. Façades:
    let cache = Arc::new(KeyValueFacade::new(
        grid.get_map(&config.map.name),
        config.map.lock_timeout(),
    ));
    let ringbuffer = Arc::new(AppendLogFacade::new(
        grid.get_ringbuffer(&config.ringbuffer.name),
    ));

    // 3. HTTP server:
    let app = build_router(cache, ringbuffer);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Press Ctrl+C to shutdown");
    let result = serve(listener, app, shutdown_signal()).await;

    // 4. Shutdown:
    grid.shutdown();
    sweeper.abort();

    result
}
