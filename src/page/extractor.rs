use crate::error::TransformError;
use crate::model::ContentPayload;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;

/// Elements whose text is page chrome rather than article content
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
];

const RECIPE_KEYWORDS: &[&str] = &[
    "recipe",
    "ingredients",
    "instructions",
    "cooking",
    "baking",
    "preparation",
    "cook time",
    "prep time",
    "serves",
    "yield",
];

struct PageSelectors {
    title: Selector,
    heading: Selector,
    /// Content roots, most specific first
    roots: Vec<Selector>,
    json_ld: Selector,
}

static SELECTORS: OnceLock<PageSelectors> = OnceLock::new();

/// Selectors are parsed on first use and shared afterwards
fn selectors() -> &'static PageSelectors {
    SELECTORS.get_or_init(|| {
        let parse = |css: &str| Selector::parse(css).expect("static selector parses");
        PageSelectors {
            title: parse("title"),
            heading: parse("h1"),
            roots: vec![parse("article"), parse("main"), parse("body")],
            json_ld: parse(r#"script[type="application/ld+json"]"#),
        }
    })
}

/// Pull a title and readable body text out of an HTML document
pub fn extract_content(html: &str) -> Result<ContentPayload, TransformError> {
    let document = Html::parse_document(html);
    let selectors = selectors();

    let title = first_text(&document, &selectors.title)
        .or_else(|| first_text(&document, &selectors.heading))
        .unwrap_or_default();

    let body = selectors
        .roots
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(readable_text)
        .find(|text| !text.is_empty())
        .ok_or_else(|| {
            TransformError::ContentExtraction(
                "Could not extract readable content from this page".to_string(),
            )
        })?;

    Ok(ContentPayload { title, body })
}

/// Heuristic: does this page look like a recipe?
pub fn is_recipe_page(url: &str, html: &str) -> bool {
    let document = Html::parse_document(html);
    let selectors = selectors();

    let url = url.to_lowercase();
    let title = first_text(&document, &selectors.title)
        .unwrap_or_default()
        .to_lowercase();
    let body = document
        .root_element()
        .text()
        .collect::<String>()
        .to_lowercase();

    let has_keywords = RECIPE_KEYWORDS
        .iter()
        .any(|k| url.contains(k) || title.contains(k) || body.contains(k));

    let has_schema = document
        .select(&selectors.json_ld)
        .any(|script| script.text().collect::<String>().contains("Recipe"));

    has_keywords || has_schema
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

fn readable_text(root: ElementRef) -> String {
    let mut lines = Vec::new();

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        let text = text.trim();
        if !hidden && !text.is_empty() {
            lines.push(text.split_whitespace().collect::<Vec<_>>().join(" "));
        }
    }

    lines.join("\n")
}
