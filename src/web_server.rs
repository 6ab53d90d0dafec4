use actix_web::{App, HttpServer, dev::Server, middleware, web};

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::handoff::HandoffClient;
use crate::routes;

pub fn build_server(
    server_config: ServerConfig,
    dispatcher: Dispatcher,
    handoff: HandoffClient,
) -> std::io::Result<Server> {
    let dispatcher = web::Data::new(dispatcher);
    let handoff = web::Data::new(handoff);

    let bind_address = server_config
        .bind_address
        .unwrap_or("127.0.0.1".to_string());
    let bind_port = server_config.bind_port.unwrap_or(8080);
    log::info!("Listening on {bind_address}:{bind_port}");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .app_data(handoff.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((bind_address, bind_port))?
    .run();

    Ok(server)
}
