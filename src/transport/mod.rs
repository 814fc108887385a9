//! Message boundary between UI components and the pipeline.
//!
//! Messages are JSON objects naming their kind in `type` (or the older
//! `action` field). The dispatcher is transport-agnostic; [`LineTransport`]
//! carries newline-delimited JSON over any async reader/writer pair.

mod line;

pub use line::{stdio, LineTransport};

use crate::error::TransformError;
use crate::model::ContentPayload;
use crate::page::is_recipe_page;
use crate::pipeline::RecipePipeline;
use crate::storage::{recent_recipes, record_recent};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::{json, Value};

/// Carries messages in and replies out
#[async_trait]
pub trait Transport: Send {
    /// Next message, or `None` once the peer is gone
    async fn recv(&mut self) -> Result<Option<Value>, TransformError>;

    async fn send(&mut self, reply: &Value) -> Result<(), TransformError>;
}

/// Routes messages to the pipeline
pub struct Dispatcher {
    pipeline: RecipePipeline,
}

impl Dispatcher {
    pub fn new(pipeline: RecipePipeline) -> Self {
        Self { pipeline }
    }

    /// Handle one message. Unknown kinds get no reply.
    pub async fn dispatch(&self, message: &Value) -> Option<Value> {
        let kind = message
            .get("type")
            .or_else(|| message.get("action"))
            .and_then(Value::as_str)?;
        debug!("Dispatching '{}'", kind);

        match kind {
            "ping" => Some(json!({ "ok": true })),
            "transformRecipeContent" => Some(self.transform(message).await),
            "checkRecipePage" => {
                let text = |key: &str| message.get(key).and_then(Value::as_str).unwrap_or("");
                Some(json!({
                    "success": true,
                    "isRecipe": is_recipe_page(text("url"), text("html")),
                }))
            }
            "validateApiKey" => {
                let key = message
                    .get("apiKey")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let check = self.pipeline.check_api_key(key).await;
                Some(match check.error {
                    Some(error) => json!({ "isValid": false, "error": error }),
                    None => json!({ "isValid": true }),
                })
            }
            "recentRecipes" => Some(
                match recent_recipes(self.pipeline.store().as_ref()).await {
                    Ok(recipes) => json!({ "success": true, "recipes": recipes }),
                    Err(e) => json!({ "success": false, "error": e.to_string() }),
                },
            ),
            other => {
                debug!("Ignoring message kind '{}'", other);
                None
            }
        }
    }

    async fn transform(&self, message: &Value) -> Value {
        let payload = ContentPayload::from_untrusted(message.get("content").unwrap_or(&Value::Null));
        let reply = self.pipeline.handle(&payload).await;

        if let Some(recipe) = &reply.recipe {
            if let Err(e) = record_recent(self.pipeline.store().as_ref(), &recipe.name).await {
                warn!("Could not update recent recipes: {}", e);
            }
        }

        serde_json::to_value(&reply)
            .unwrap_or_else(|e| json!({ "success": false, "error": e.to_string() }))
    }
}

/// Answer messages one at a time until the transport closes
pub async fn serve<T: Transport>(
    transport: &mut T,
    dispatcher: &Dispatcher,
) -> Result<(), TransformError> {
    while let Some(message) = transport.recv().await? {
        if let Some(reply) = dispatcher.dispatch(&message).await {
            transport.send(&reply).await?;
        }
    }
    Ok(())
}
