use super::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(config: Config) -> Result<(), std::io::Error> {
        let casino = Arc::new(Casino::default());
        let router = web::Data::new(Router::new(
            casino,
            config.buffer,
            config.evict_abandoned,
        ));
        log::info!("starting hosting server on {}", config.bind);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(router.clone())
                .route("/health", web::get().to(health))
                .route("/ws", web::get().to(enter))
                .route("/", web::get().to(enter))
        })
        .workers(config.workers)
        .bind(config.bind.as_str())?
        .run()
        .await
    }
}

async fn health(router: web::Data<Router>) -> impl Responder {
    let rooms = router.casino().len().await;
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok", "rooms": rooms }))
}

async fn enter(router: web::Data<Router>, body: web::Payload, req: HttpRequest) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            actix_web::rt::spawn(bridge(router.into_inner(), session, stream));
            response
        }
        Err(e) => HttpResponse::BadRequest().body(e.to_string()),
    }
}

/// Pumps frames between one WebSocket and its session until either side ends.
async fn bridge(
    router: Arc<Router>,
    mut socket: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    use futures::StreamExt;
    let (mut session, mut outbox) = router.session();
    let client = session.client().clone();
    log::debug!("[bridge {}] connected", client.id());
    'sesh: loop {
        tokio::select! {
            biased;
            _ = client.severed() => break 'sesh,
            msg = outbox.recv() => match msg {
                Some(json) => if socket.text(json).await.is_err() { break 'sesh },
                None => break 'sesh,
            },
            msg = stream.next() => match msg {
                Some(Ok(actix_ws::Message::Text(text))) => router.dispatch(&mut session, &text).await,
                Some(Ok(actix_ws::Message::Ping(bytes))) => if socket.pong(&bytes).await.is_err() { break 'sesh },
                Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                Some(Err(_)) => break 'sesh,
                None => break 'sesh,
                _ => continue 'sesh,
            },
        }
    }
    router.disconnect(session).await;
    let _ = socket.close(None).await;
    log::debug!("[bridge {}] disconnected", client.id());
}
