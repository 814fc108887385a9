//! Turn recipe pages into schema.org JSON-LD with the Gemini API.
//!
//! The core is [`RecipePipeline`]: it builds a prompt from page text, sends
//! one request, recovers JSON from the completion (fences, prose, smart
//! quotes, trailing commas), retries once with a concise prompt when the
//! reply was cut off, and validates the result as a `Recipe`.
//!
//! ```no_run
//! # use recipe_transformer::{ContentPayload, RecipePipeline};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = RecipePipeline::builder().api_key("AIza...").build()?;
//! let recipe = pipeline
//!     .transform(&ContentPayload::new("Grandma's Cookies", "2 cups flour, 1 cup sugar..."))
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&recipe)?);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod model;
pub mod page;
pub mod pipeline;
pub mod providers;
pub mod storage;
pub mod transport;

pub use builder::RecipePipelineBuilder;
pub use config::TransformerConfig;
pub use error::TransformError;
pub use model::{ContentPayload, HowToStep, Instruction, RecipeRecord, TransformReply};
pub use pipeline::RecipePipeline;

use std::time::Duration;

/// Fetch `url`, extract its text and transform it into a recipe
pub async fn transform_url(
    pipeline: &RecipePipeline,
    url: &str,
    timeout: Option<Duration>,
) -> Result<RecipeRecord, TransformError> {
    let html = page::fetch_page(url, timeout).await?;
    transform_html(pipeline, &html).await
}

/// Extract the text of an HTML document and transform it into a recipe
pub async fn transform_html(
    pipeline: &RecipePipeline,
    html: &str,
) -> Result<RecipeRecord, TransformError> {
    let payload = page::extract_content(html)?;
    pipeline.transform(&payload).await
}
