use async_trait::async_trait;
use tracing::error;

use super::{PageContext, PageController, escape};
use crate::{assets::fetch_json, error::ShellError, models::{NewsArticle, NewsFeed}};

/// Served by the shell's own server, which holds the upstream key.
pub const NEWS_RESOURCE: &str = "api/news";
pub const NEWS_LIST: &str = "news-list";
pub const MAX_ARTICLES: usize = 5;

pub const NO_NEWS: &str = "No recent news available.";
pub const NEWS_FAILED: &str = "Unable to load news at this time.";

pub fn render_articles(articles: &[NewsArticle]) -> String {
    if articles.is_empty() {
        return format!("<p>{NO_NEWS}</p>");
    }
    articles
        .iter()
        .take(MAX_ARTICLES)
        .map(|a| {
            format!(
                r#"<div class="news-item"><h5><a href="{}" target="_blank">{}</a></h5><p>{}</p><small>{}</small></div>"#,
                escape(&a.url),
                escape(&a.title),
                escape(a.description.as_deref().unwrap_or_default()),
                a.published_at.format("%Y-%m-%d %H:%M"),
            )
        })
        .collect()
}

/// NewsPage
#[derive(Debug, Default)]
pub struct NewsPage;

#[async_trait]
impl PageController for NewsPage {
    async fn enter(&self, ctx: &PageContext) -> Result<(), ShellError> {
        let html = match fetch_json::<NewsFeed>(ctx.assets.as_ref(), NEWS_RESOURCE).await {
            Ok(feed) => render_articles(&feed.articles),
            Err(e) => {
                error!(error = %e, "error fetching news");
                format!("<p>{NEWS_FAILED}</p>")
            }
        };
        ctx.host.set_region_markup(NEWS_LIST, &html)
    }
}
