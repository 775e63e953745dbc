//! Web search providers
//!
//! The pipeline only needs ranked result URLs. The default provider scrapes
//! the DuckDuckGo HTML endpoint, which requires no API key.

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

/// Trait for web search
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return up to `max_results` result URLs in ranking order
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    /// Provider name used in logs and metrics
    fn name(&self) -> &str;
}

/// DuckDuckGo HTML search
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("answerforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("q", query)])
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await
            .map_err(|e| AppError::Search {
                message: format!("Request failed: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(AppError::Search {
                message: format!("DuckDuckGo returned {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| AppError::Search {
            message: format!("Failed to read response: {}", e),
        })?;

        Ok(parse_result_links(&body, max_results))
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Pull result URLs out of a DuckDuckGo HTML results page
///
/// Sponsored results are skipped. `Html` is `!Send`, so parsing stays in this
/// synchronous function.
pub fn parse_result_links(html: &str, max_results: usize) -> Vec<String> {
    let doc = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("a.result__a") else {
        return Vec::new();
    };

    doc.select(&link_sel)
        .filter(|link| !is_sponsored(link))
        .filter_map(|link| link.value().attr("href"))
        .map(unwrap_redirect)
        .filter(|url| is_organic_url(url))
        .take(max_results)
        .collect()
}

fn is_sponsored(link: &ElementRef<'_>) -> bool {
    link.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().classes().any(|class| class == "result--ad"))
}

/// Absolute http(s) URL that is not a DuckDuckGo ad click-through (`/y.js`)
fn is_organic_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let ad_redirect = parsed.path() == "/y.js"
        && parsed
            .host_str()
            .is_some_and(|host| host.ends_with("duckduckgo.com"));

    matches!(parsed.scheme(), "http" | "https") && !ad_redirect
}

/// Result links may be wrapped as `//duckduckgo.com/l/?uddg=<encoded>&rut=...`
fn unwrap_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::test_server::serve;
    use axum::{http::StatusCode, routing::post, Form, Router};
    use std::collections::HashMap;
    use tokio_test::assert_err;

    const RESULTS_PAGE: &str = r##"
        <html><body>
          <div class="result">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fitmo.ru%2Fru%2F&rut=abc">ITMO</a>
            <a class="result__snippet" href="#">snippet</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://en.wikipedia.org/wiki/ITMO_University">Wiki</a>
          </div>
          <div class="result">
            <a class="result__a" href="/relative/link">Relative</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://en.wikipedia.org/wiki/ITMO_University">Wiki again</a>
          </div>
        </body></html>"##;

    const PAGE_WITH_ADS: &str = r##"
        <html><body>
          <div class="result results_links result--ad">
            <h2 class="result__title">
              <a class="result__a" href="https://shop.example/itmo-merch">Buy now</a>
            </h2>
          </div>
          <div class="result">
            <a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=shop.example&u3=xyz">Sponsored</a>
          </div>
          <div class="result">
            <a class="result__a" href="https://itmo.ru/en/">ITMO</a>
          </div>
        </body></html>"##;

    #[test]
    fn test_parses_links_in_rank_order() {
        let links = parse_result_links(RESULTS_PAGE, 10);
        assert_eq!(
            links,
            vec![
                "https://itmo.ru/ru/",
                "https://en.wikipedia.org/wiki/ITMO_University",
                "https://en.wikipedia.org/wiki/ITMO_University",
            ]
        );
    }

    #[test]
    fn test_respects_limit() {
        assert_eq!(parse_result_links(RESULTS_PAGE, 1), vec!["https://itmo.ru/ru/"]);
    }

    #[test]
    fn test_ads_are_skipped() {
        assert_eq!(parse_result_links(PAGE_WITH_ADS, 1), vec!["https://itmo.ru/en/"]);
        assert_eq!(parse_result_links(PAGE_WITH_ADS, 5), vec!["https://itmo.ru/en/"]);
    }

    #[test]
    fn test_no_results() {
        assert!(parse_result_links("<html><body>No results.</body></html>", 3).is_empty());
    }

    #[test]
    fn test_direct_links_pass_through() {
        assert_eq!(
            unwrap_redirect("https://news.itmo.ru/ru/?page=2"),
            "https://news.itmo.ru/ru/?page=2"
        );
    }

    async fn results(Form(form): Form<HashMap<String, String>>) -> (StatusCode, &'static str) {
        match form.get("q").map(String::as_str) {
            Some("Когда основан ИТМО?") => (StatusCode::OK, RESULTS_PAGE),
            _ => (StatusCode::BAD_REQUEST, "missing query"),
        }
    }

    fn search_at(base: &str, path: &str) -> DuckDuckGoSearch {
        DuckDuckGoSearch::new(format!("{}{}", base, path), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_search_posts_query_form() {
        let base = serve(Router::new().route("/html/", post(results))).await;

        let links = search_at(&base, "/html/")
            .search("Когда основан ИТМО?", 2)
            .await
            .unwrap();

        assert_eq!(
            links,
            vec!["https://itmo.ru/ru/", "https://en.wikipedia.org/wiki/ITMO_University"]
        );
    }

    #[tokio::test]
    async fn test_search_error_status_fails() {
        let app = Router::new().route(
            "/html/",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "rate limited") }),
        );
        let base = serve(app).await;

        let err = assert_err!(search_at(&base, "/html/").search("ITMO", 1).await);

        assert!(matches!(err, AppError::Search { .. }));
        assert!(err.to_string().contains("503"));
    }
}
