//! Content source: turns a web page into a [`ContentPayload`](crate::model::ContentPayload).

mod extractor;
mod fetcher;

pub use extractor::{extract_content, is_recipe_page};
pub use fetcher::fetch_page;
