use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use anyhow::Context;

use chrono::{DateTime, Utc};

use reqwest::Client;

use tokio::sync::Mutex;

use rss::{Channel, Item};

use url::Url;

use crate::domain::{excerpt_from_html, first_image_src, read_time_minutes, NormalizedPost};

/// Why a refresh of the whole feed failed
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Failed to fetch feed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse feed: {0}")]
    Parse(#[from] rss::Error),
}

/// Why a single feed item was dropped
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PostError {
    #[error("Item has no title")]
    MissingTitle,
    #[error("Item has no link")]
    MissingLink,
    #[error("Item has no publication date")]
    MissingPublishedDate,
    #[error("Item has an invalid publication date: {0}")]
    InvalidPublishedDate(#[from] chrono::ParseError),
    #[error("Item has no description or content")]
    MissingExcerpt,
}

impl TryFrom<&Item> for NormalizedPost {
    type Error = PostError;

    fn try_from(item: &Item) -> Result<Self, Self::Error> {
        let title = non_blank(item.title()).ok_or(PostError::MissingTitle)?;
        let url = non_blank(item.link()).ok_or(PostError::MissingLink)?;
        let published_date = non_blank(item.pub_date()).ok_or(PostError::MissingPublishedDate)?;
        let published_date = DateTime::parse_from_rfc2822(&published_date)?.with_timezone(&Utc);

        let description = item.description();
        let content = item.content();

        let excerpt = description
            .and_then(excerpt_from_html)
            .or_else(|| content.and_then(excerpt_from_html))
            .ok_or(PostError::MissingExcerpt)?;
        let thumbnail = content
            .and_then(first_image_src)
            .or_else(|| description.and_then(first_image_src));
        let read_time = content.and_then(read_time_minutes);

        Ok(Self {
            title,
            excerpt,
            url,
            published_date,
            thumbnail,
            read_time,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

/// Parse an RSS document into at most `limit` posts.
///
/// Items that cannot be normalized are skipped, as are repeated links.
pub fn parse_feed(body: &[u8], limit: usize) -> Result<Vec<NormalizedPost>, rss::Error> {
    let channel = Channel::read_from(body)?;
    let mut seen_urls = HashSet::new();

    let posts = channel
        .items()
        .iter()
        .filter_map(|item| match NormalizedPost::try_from(item) {
            Ok(post) => Some(post),
            Err(error) => {
                tracing::debug!(
                    error.message = %error,
                    "Skipping feed item (title: {:?}, link: {:?})",
                    item.title(),
                    item.link()
                );
                None
            }
        })
        .filter(|post| seen_urls.insert(post.url.clone()))
        .take(limit)
        .collect();

    Ok(posts)
}

#[derive(Debug)]
struct CachedPosts {
    fetched_at: Instant,
    posts: Arc<Vec<NormalizedPost>>,
}

/// Client for the external blog feed, caching the normalized posts for a revalidation window
#[derive(Debug)]
pub struct FeedClient {
    client: Client,
    feed_url: Url,
    limit: usize,
    revalidate_after: Duration,

    cache: RwLock<Option<CachedPosts>>,
    /// Held while the feed is fetched, so one request refreshes and the rest wait for it
    refresh: Mutex<()>,
}

impl FeedClient {
    pub fn new(
        feed_url: Url,
        limit: usize,
        revalidate_after: Duration,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build http client")?;

        Ok(Self {
            client,
            feed_url,
            limit,
            revalidate_after,
            cache: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    pub fn feed_url(&self) -> &Url {
        &self.feed_url
    }

    /// The latest posts.
    ///
    /// Never fails: when the feed cannot be refreshed the last good result is
    /// served, or an empty list if there never was one. A failed refresh
    /// restarts the revalidation window of the last good result, so an
    /// unreachable feed is retried once per window rather than on every call.
    #[tracing::instrument(name = "Load blog posts", skip(self))]
    pub async fn posts(&self) -> Arc<Vec<NormalizedPost>> {
        if let Some(posts) = self.cached(true) {
            return posts;
        }

        let _refresh = self.refresh.lock().await;
        // Another request may have refreshed the cache while this one waited
        if let Some(posts) = self.cached(true) {
            return posts;
        }

        match self.fetch().await {
            Ok(posts) => {
                let posts = Arc::new(posts);
                *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedPosts {
                    fetched_at: Instant::now(),
                    posts: posts.clone(),
                });
                posts
            }
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    error.message = %error,
                    "Failed to refresh blog feed from {}",
                    self.feed_url
                );
                self.keep_stale()
            }
        }
    }

    /// The last good result with a restarted revalidation window, empty if there is none
    fn keep_stale(&self) -> Arc<Vec<NormalizedPost>> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let posts = match cache.as_mut() {
            Some(cached) => {
                cached.fetched_at = Instant::now();
                cached.posts.clone()
            }
            None => Arc::default(),
        };
        posts
    }

    fn cached(&self, fresh_only: bool) -> Option<Arc<Vec<NormalizedPost>>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        let posts = cache
            .as_ref()
            .filter(|cached| !fresh_only || cached.fetched_at.elapsed() < self.revalidate_after)
            .map(|cached| cached.posts.clone());
        posts
    }

    async fn fetch(&self) -> Result<Vec<NormalizedPost>, FeedError> {
        let body = self
            .client
            .get(self.feed_url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let posts = parse_feed(&body, self.limit)?;
        tracing::info!("Fetched {} posts from blog feed", posts.len());

        Ok(posts)
    }
}
