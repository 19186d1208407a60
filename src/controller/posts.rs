use actix_web::dev::HttpServiceFactory;
use actix_web::{get, web, HttpResponse, Responder};

use serde::Serialize;

use crate::client::FeedClient;
use crate::domain::NormalizedPost;

#[derive(Debug, Serialize)]
struct PostsResponse<'a> {
    posts: &'a [NormalizedPost],
}

/// List the latest blog posts. Feed failures yield the cached or an empty list.
#[tracing::instrument(name = "List blog posts", skip(feed_client))]
#[get("")]
async fn list(feed_client: web::Data<FeedClient>) -> impl Responder {
    let posts = feed_client.posts().await;

    HttpResponse::Ok().json(PostsResponse { posts: &posts })
}

/// Blog API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/api/posts").service(list)
}
