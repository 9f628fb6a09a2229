//! Readable-text and byline extraction from article HTML.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use nr_core::{Error, ExtractedArticle, Result};

/// Candidate containers for the article body, most specific first.
const BODY_CONTAINERS: &[&str] = &[
    "article",
    "[itemprop='articleBody']",
    "main",
    "#content",
    "body",
];

/// Paragraphs shorter than this are treated as captions, buttons or ads.
const MIN_PARAGRAPH_CHARS: usize = 30;

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {}: {}", css, e)))
}

fn normalized_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the article body and any bylines from an HTML page.
pub fn extract_article(html: &str) -> Result<ExtractedArticle> {
    let document = Html::parse_document(html);
    let text = extract_body(&document)?;
    if text.is_empty() {
        return Err(Error::Scraping("no readable article text found".to_string()));
    }
    Ok(ExtractedArticle {
        text,
        authors: extract_authors(&document),
    })
}

/// Joins the substantial paragraphs of the first container that has any.
pub fn extract_body(document: &Html) -> Result<String> {
    let paragraph = selector("p")?;
    for css in BODY_CONTAINERS {
        let container = selector(css)?;
        for root in document.select(&container) {
            let paragraphs: Vec<String> = root
                .select(&paragraph)
                .map(normalized_text)
                .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
                .collect();
            if !paragraphs.is_empty() {
                return Ok(paragraphs.join("\n\n"));
            }
        }
    }
    Ok(String::new())
}

/// Collects author names from JSON-LD metadata and `<meta name="author">`.
pub fn extract_authors(document: &Html) -> Vec<String> {
    let mut authors = Vec::new();

    if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&script_selector) {
            if let Ok(json) = serde_json::from_str::<Value>(script.text().collect::<String>().trim()) {
                collect_jsonld_authors(&json, &mut authors);
            }
        }
    }

    if let Ok(meta_selector) = Selector::parse("meta[name='author']") {
        for meta in document.select(&meta_selector) {
            if let Some(name) = meta.value().attr("content") {
                push_author(&mut authors, name);
            }
        }
    }

    authors
}

fn push_author(authors: &mut Vec<String>, name: &str) {
    let name = name.trim();
    if !name.is_empty() && !authors.iter().any(|a| a == name) {
        authors.push(name.to_string());
    }
}

fn collect_jsonld_authors(json: &Value, authors: &mut Vec<String>) {
    match json {
        Value::Array(items) => items.iter().for_each(|item| collect_jsonld_authors(item, authors)),
        Value::Object(obj) => {
            if let Some(graph) = obj.get("@graph") {
                collect_jsonld_authors(graph, authors);
            }
            match obj.get("author") {
                Some(Value::Array(arr)) => {
                    for author in arr {
                        match author {
                            Value::String(s) => push_author(authors, s),
                            other => {
                                if let Some(name) = other.get("name").and_then(|n| n.as_str()) {
                                    push_author(authors, name);
                                }
                            }
                        }
                    }
                }
                Some(Value::Object(author)) => {
                    if let Some(name) = author.get("name").and_then(|n| n.as_str()) {
                        push_author(authors, name);
                    }
                }
                Some(Value::String(s)) => push_author(authors, s),
                _ => {}
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
        <html>
          <head>
            <script type="application/ld+json">
              {"@type": "NewsArticle", "author": [{"@type": "Person", "name": " Jane Doe "}, {"name": "John Roe"}]}
            </script>
            <meta name="author" content="Jane Doe">
          </head>
          <body>
            <nav><p>Home | World | Business | Sign in to read more</p></nav>
            <article>
              <h1>Egg prices soar</h1>
              <p>Share</p>
              <p>Egg prices climbed for the third straight month in January.</p>
              <p>Farmers blamed   avian flu outbreaks that
                 forced the culling of millions of hens.</p>
            </article>
          </body>
        </html>
    "#;

    #[test]
    fn test_extracts_article_paragraphs() {
        let extracted = extract_article(ARTICLE).unwrap();
        assert_eq!(
            extracted.text,
            "Egg prices climbed for the third straight month in January.\n\n\
             Farmers blamed avian flu outbreaks that forced the culling of millions of hens."
        );
        assert!(!extracted.text.contains("Sign in"));
    }

    #[test]
    fn test_extracts_deduplicated_authors() {
        let extracted = extract_article(ARTICLE).unwrap();
        assert_eq!(extracted.authors, vec!["Jane Doe", "John Roe"]);
    }

    #[test]
    fn test_falls_back_to_body_paragraphs() {
        let html = r#"<html><body><div><p>This page has no article element but a long paragraph.</p></div></body></html>"#;
        let extracted = extract_article(html).unwrap();
        assert_eq!(extracted.text, "This page has no article element but a long paragraph.");
        assert!(extracted.authors.is_empty());
    }

    #[test]
    fn test_content_div_wins_over_sidebar() {
        let html = r#"
            <html><body>
              <aside><p>Sign up for our newsletter to get daily headlines.</p></aside>
              <div id="content"><p>Regulators opened an inquiry into egg pricing this week.</p></div>
            </body></html>
        "#;
        let extracted = extract_article(html).unwrap();
        assert_eq!(extracted.text, "Regulators opened an inquiry into egg pricing this week.");
    }

    #[test]
    fn test_page_without_text_is_an_error() {
        let html = r#"<html><body><p>Subscribe</p><img src="x.png"></body></html>"#;
        assert!(matches!(extract_article(html), Err(Error::Scraping(_))));
    }

    #[test]
    fn test_jsonld_graph_and_string_authors() {
        let html = r#"
            <script type="application/ld+json">
              {"@graph": [{"@type": "WebPage"}, {"@type": "NewsArticle", "author": "Staff Reporter"}]}
            </script>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(extract_authors(&document), vec!["Staff Reporter"]);
    }

    #[test]
    fn test_invalid_jsonld_is_ignored() {
        let html = r#"<script type="application/ld+json">{not json</script>"#;
        let document = Html::parse_document(html);
        assert!(extract_authors(&document).is_empty());
    }
}
