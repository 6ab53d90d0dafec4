use clap::Parser;

use ceesar::config::CliArgs;
use ceesar::dispatcher::Dispatcher;
use ceesar::handoff::HandoffClient;
use ceesar::web_server::build_server;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = CliArgs::parse();
    let config = cli.to_config()?;
    log::debug!("Loaded configuration: {config:?}");

    let dispatcher = Dispatcher::from_config(&config);
    let handoff = HandoffClient::from_config(&config);
    log::info!(
        "Serving {} languages, executor mode {}",
        dispatcher.registry().languages().count(),
        handoff.mode()
    );
    if config.execution.timeout().is_none() {
        log::warn!("No execution timeout configured; runaway submissions are not bounded");
    }

    let server = build_server(config.server, dispatcher, handoff)?;
    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl-c received, shutting down...");
        }
        res_server = server_task => {
            log::error!("Server terminated unexpectedly: {:?}", res_server);
        }
    }

    server_handle.stop(true).await;

    log::info!("Shutdown complete");
    Ok(())
}
