//! DuckDuckGo scraped from its HTML front end, with the lite front end as fallback.
//!
//! Markup contracts:
//!
//! - html: result anchors carry `.result__a`; the snippet is a
//!   `.result__snippet` element inside the same result block.
//! - lite: a table where `td.result-link` holds the anchor and the snippet
//!   sits in `td.result-snippet` of the following row.
//!
//! Result links are DuckDuckGo redirects (`//duckduckgo.com/l/?uddg=...`);
//! they are unwrapped to the target URL.

use async_trait::async_trait;
use lexru_core::SearchHit;
use reqwest::Client;
use scraper::{ElementRef, Html};
use tracing::{info, warn};
use url::Url;

use crate::http::{ProviderError, send_for_text};
use crate::markup::{element_text, selector};
use crate::provider::SearchProvider;

pub const HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub const LITE_ENDPOINT: &str = "https://lite.duckduckgo.com/lite/";

/// Class of the block that wraps one html result.
const RESULT_CLASS: &str = "result";

pub struct DuckDuckGo {
    client: Client,
    html_endpoint: String,
    lite_endpoint: String,
}

impl DuckDuckGo {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            html_endpoint: HTML_ENDPOINT.to_string(),
            lite_endpoint: LITE_ENDPOINT.to_string(),
        }
    }

    async fn fetch(&self, endpoint: &str, query: &str) -> Result<String, ProviderError> {
        send_for_text(self.client.get(endpoint).query(&[("q", query)])).await
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGo {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
        match self.fetch(&self.html_endpoint, query).await {
            Ok(body) => {
                let hits = parse_html(&body, limit)?;
                if !hits.is_empty() {
                    info!(count = hits.len(), "duckduckgo html results");
                    return Ok(hits);
                }
            }
            Err(e) => warn!(error = %e, "duckduckgo html failed, trying lite"),
        }

        let body = self.fetch(&self.lite_endpoint, query).await?;
        let hits = parse_lite(&body, limit)?;
        info!(count = hits.len(), "duckduckgo lite results");
        Ok(hits)
    }
}

/// Parse the html front end.
pub fn parse_html(body: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
    let doc = Html::parse_document(body);
    let anchor_sel = selector(".result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let mut out = Vec::new();
    for a in doc.select(&anchor_sel) {
        if out.len() >= limit {
            break;
        }
        let Some(href) = a.value().attr("href").filter(|h| !h.trim().is_empty()) else {
            continue;
        };
        let snippet = a
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().classes().any(|c| c == RESULT_CLASS))
            .and_then(|block| block.select(&snippet_sel).next())
            .map(element_text)
            .unwrap_or_default();
        out.push(SearchHit {
            title: element_text(a),
            url: resolve_link(href),
            snippet,
        });
    }
    Ok(out)
}

/// Parse the lite front end.
pub fn parse_lite(body: &str, limit: usize) -> Result<Vec<SearchHit>, ProviderError> {
    let doc = Html::parse_document(body);
    let cell_sel = selector("td.result-link")?;
    let link_sel = selector("a[href]")?;
    let snippet_sel = selector("td.result-snippet")?;

    let mut out = Vec::new();
    for td in doc.select(&cell_sel) {
        if out.len() >= limit {
            break;
        }
        let Some(a) = td.select(&link_sel).next() else {
            continue;
        };
        let href = a.value().attr("href").unwrap_or_default();
        if href.trim().is_empty() {
            continue;
        }
        let snippet = td
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "tr")
            .and_then(|tr| {
                tr.next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "tr")
            })
            .and_then(|next| next.select(&snippet_sel).next())
            .map(element_text)
            .unwrap_or_default();
        out.push(SearchHit {
            title: element_text(a),
            url: resolve_link(href),
            snippet,
        });
    }
    Ok(out)
}

/// Make a result href absolute and unwrap DuckDuckGo's `/l/?uddg=` redirect.
pub fn resolve_link(href: &str) -> String {
    let href = href.trim();
    let Ok(base) = Url::parse("https://duckduckgo.com/") else {
        return href.to_string();
    };
    let Ok(url) = base.join(href) else {
        return href.to_string();
    };
    let is_redirect = url
        .host_str()
        .is_some_and(|h| h.ends_with("duckduckgo.com"))
        && url.path().starts_with("/l/");
    if is_redirect
        && let Some((_, target)) = url.query_pairs().find(|(k, _)| k == "uddg")
    {
        return target.into_owned();
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML_PAGE: &str = r##"
        <html><body><div id="links">
          <div class="result results_links web-result">
            <div class="links_main result__body">
              <h2 class="result__title">
                <a rel="nofollow" class="result__a"
                   href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.consultant.ru%2Fdocument%2Fcons_doc_LAW_34661%2F&amp;rut=abc">
                  КоАП РФ Статья 20.1. Мелкое хулиганство
                </a>
              </h2>
              <a class="result__snippet" href="#">Мелкое хулиганство, то есть нарушение общественного порядка</a>
            </div>
          </div>
          <div class="result results_links web-result">
            <div class="links_main result__body">
              <h2 class="result__title"><a class="result__a" href="https://sudact.ru/law/koap/">КоАП на sudact</a></h2>
            </div>
          </div>
          <div class="result"><h2><a class="result__a">no href</a></h2></div>
        </div></body></html>
    "##;

    const LITE_PAGE: &str = r#"
        <html><body><table>
          <tr><td>1.</td><td class="result-link"><a href="https://base.garant.ru/12125267/">Статья 20.1 КоАП</a></td></tr>
          <tr><td></td><td class="result-snippet">Мелкое хулиганство влечет наложение штрафа</td></tr>
          <tr><td></td><td class="link-text">base.garant.ru</td></tr>
          <tr><td>2.</td><td class="result-link"><a href="https://pravo.gov.ru/x">Второй</a></td></tr>
        </table></body></html>
    "#;

    #[test]
    fn html_results_with_snippets() {
        let hits = parse_html(HTML_PAGE, 8).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "КоАП РФ Статья 20.1. Мелкое хулиганство");
        assert_eq!(
            hits[0].url,
            "https://www.consultant.ru/document/cons_doc_LAW_34661/"
        );
        assert!(hits[0].snippet.starts_with("Мелкое хулиганство"));
        assert_eq!(hits[1].url, "https://sudact.ru/law/koap/");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn snippet_stays_inside_its_result() {
        let page = r#"
            <div id="links">
              <div class="result"><a class="result__a" href="https://a.ru/">Без описания</a></div>
              <div class="result">
                <a class="result__a" href="https://b.ru/">С описанием</a>
                <div class="result__snippet">Статья 20.1 КоАП</div>
              </div>
            </div>
        "#;
        let hits = parse_html(page, 8).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].snippet, "");
        assert_eq!(hits[1].snippet, "Статья 20.1 КоАП");
    }

    #[test]
    fn html_respects_limit() {
        assert_eq!(parse_html(HTML_PAGE, 1).unwrap().len(), 1);
    }

    #[test]
    fn lite_snippet_from_next_row() {
        let hits = parse_lite(LITE_PAGE, 8).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://base.garant.ru/12125267/");
        assert_eq!(hits[0].snippet, "Мелкое хулиганство влечет наложение штрафа");
        // The row after the second link does not exist.
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn empty_markup_has_no_results() {
        assert!(parse_html("<html></html>", 8).unwrap().is_empty());
        assert!(parse_lite("<html></html>", 8).unwrap().is_empty());
    }

    #[test]
    fn plain_links_are_kept() {
        assert_eq!(
            resolve_link("https://pravo.gov.ru/proxy/ips/?docbody="),
            "https://pravo.gov.ru/proxy/ips/?docbody="
        );
        assert_eq!(
            resolve_link("/l/?uddg=https%3A%2F%2Fsudact.ru%2F"),
            "https://sudact.ru/"
        );
    }
}
