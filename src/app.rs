use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::{get, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::client::{EmailClient, FeedClient};
use crate::controller::contact::{self, ContactInbox};
use crate::controller::{newsletter, posts, MAX_BODY_BYTES};

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Run the application on a specified TCP listener
pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    feed_client: FeedClient,
    contact_inbox: ContactInbox,
) -> anyhow::Result<Server> {
    // Wrap application data
    let email_client = web::Data::new(email_client);
    let feed_client = web::Data::new(feed_client);
    let contact_inbox = web::Data::new(contact_inbox);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .app_data(email_client.clone())
            .app_data(feed_client.clone())
            .app_data(contact_inbox.clone())
            .service(health_check)
            .service(newsletter::scope())
            .service(contact::scope())
            .service(posts::scope())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
