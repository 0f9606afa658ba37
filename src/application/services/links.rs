use scraper::{Html, Selector};

use crate::domain::{
    ports::{DiagnosticLog, PageFetcher},
    DomainError,
};

const ANCHOR_SELECTOR: &str = "#rsArticle a";
const REWRITE_HOST: &str = "www.unibas.ch";

/// Collects `.html` links found inside `#rsArticle` of the page at `url`.
///
/// Never fails: any error is logged and yields an empty list. The response
/// status is ignored, error pages are parsed like any other.
pub async fn discover_links(
    fetcher: &dyn PageFetcher,
    url: &str,
    log: &dyn DiagnosticLog,
) -> Vec<String> {
    match try_discover(fetcher, url).await {
        Ok(links) => links,
        Err(e) => {
            log.log(
                "Failed to fetch page",
                &[("url", url.to_string()), ("error", e.to_string())],
            );
            Vec::new()
        }
    }
}

async fn try_discover(fetcher: &dyn PageFetcher, url: &str) -> Result<Vec<String>, DomainError> {
    let page = fetcher.get(url).await?;
    extract_links(&page.body)
}

fn extract_links(html: &str) -> Result<Vec<String>, DomainError> {
    let selector = Selector::parse(ANCHOR_SELECTOR)
        .map_err(|e| DomainError::parse(format!("invalid selector: {e}")))?;
    let document = Html::parse_document(html);

    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&selector) {
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| DomainError::parse("anchor without href"))?;
        let link = href.replace(['\r', '\n'], "");
        let link = link.trim();
        if link.is_empty() || !link.contains("html") {
            continue;
        }

        // Looks for an entry equal to "www", which is never pushed, so every link is rewritten.
        if !links.iter().any(|l| l == "www") {
            links.push(format!("{REWRITE_HOST}{link}"));
        } else {
            links.push(link.to_string());
        }
    }
    Ok(links)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::ports::FetchedPage;
    use crate::infrastructure::MemoryLog;

    struct StaticPage(Result<FetchedPage, DomainError>);

    #[async_trait]
    impl PageFetcher for StaticPage {
        async fn get(&self, _url: &str) -> Result<FetchedPage, DomainError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_extract_rewrites_every_html_link() {
        let html = r#"
            <a href="/outside.html">outside</a>
            <div id="rsArticle">
                <a href="/de/studium.html">Studium</a>
                <a href="https://www.example.com/page.html">abs</a>
                <a href="/no-extension">skip</a>
                <a href="  ">blank</a>
                <a href="/multi
line.html">wrapped</a>
            </div>"#;

        let links = extract_links(html).unwrap();
        assert_eq!(
            links,
            vec![
                "www.unibas.ch/de/studium.html",
                "www.unibas.chhttps://www.example.com/page.html",
                "www.unibas.ch/multiline.html",
            ]
        );
    }

    #[test]
    fn test_anchor_without_href_aborts() {
        let html = r#"<div id="rsArticle"><a href="/a.html">a</a><a name="x">x</a></div>"#;
        assert!(matches!(extract_links(html), Err(DomainError::Parse(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_empty_and_logs() {
        let fetcher = StaticPage(Err(DomainError::fetch("invalid url")));
        let log = MemoryLog::new();

        let links = discover_links(&fetcher, "<p>Hello</p>", &log).await;

        assert!(links.is_empty());
        assert_eq!(log.events(), vec!["Failed to fetch page"]);
        assert_eq!(log.detail("Failed to fetch page", "url").as_deref(), Some("<p>Hello</p>"));
    }

    #[tokio::test]
    async fn test_error_status_page_is_still_parsed() {
        let body = r#"<div id="rsArticle"><a href="/x.html">x</a></div>"#;
        let fetcher = StaticPage(Ok(FetchedPage::new(404, body)));
        let log = MemoryLog::new();

        let links = discover_links(&fetcher, "https://www.unibas.ch/", &log).await;
        assert_eq!(links, vec!["www.unibas.ch/x.html"]);
        assert!(log.events().is_empty());
    }
}
