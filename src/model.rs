use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw page text handed to the pipeline by a content source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPayload {
    pub title: String,
    #[serde(rename = "content", alias = "body")]
    pub body: String,
}

impl ContentPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Read a payload from an untrusted JSON value.
    ///
    /// `title` and `content` (or `body`) that are missing or not strings
    /// become empty strings.
    pub fn from_untrusted(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            title: text("title").unwrap_or_default(),
            body: text("content").or_else(|| text("body")).unwrap_or_default(),
        }
    }
}

/// One instruction object (or a bare string, as some models emit)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    Step(HowToStep),
    Text(String),
}

impl Instruction {
    /// Step text; empty for objects without one, such as a `HowToSection`
    pub fn text(&self) -> &str {
        match self {
            Instruction::Step(step) => step.text.as_deref().unwrap_or(""),
            Instruction::Text(text) => text,
        }
    }
}

/// A `HowToStep` or `HowToSection`. Fields the model sent are written back
/// as they came, unknown ones included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HowToStep {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A schema.org Recipe in JSON-LD form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@type")]
    pub recipe_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "recipeIngredient")]
    pub recipe_ingredient: Vec<String>,
    #[serde(rename = "recipeInstructions")]
    pub recipe_instructions: Vec<Instruction>,
    #[serde(rename = "cookTime", default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(rename = "prepTime", default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(rename = "totalTime", default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    #[serde(rename = "recipeYield", default, skip_serializing_if = "Option::is_none")]
    pub recipe_yield: Option<Value>,
    #[serde(rename = "recipeCategory", default, skip_serializing_if = "Option::is_none")]
    pub recipe_category: Option<Value>,
    #[serde(rename = "recipeCuisine", default, skip_serializing_if = "Option::is_none")]
    pub recipe_cuisine: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<Value>,
    /// Any other JSON-LD properties the model produced
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecipeRecord {
    /// Download file name derived from the recipe name
    pub fn file_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        if stem.is_empty() {
            "recipe.json".to_string()
        } else {
            format!("{}.json", stem)
        }
    }
}

/// Reply shape delivered to the UI layer
#[derive(Debug, Clone, Serialize)]
pub struct TransformReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe: Option<RecipeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransformReply {
    pub fn success(recipe: RecipeRecord) -> Self {
        Self {
            success: true,
            recipe: Some(recipe),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            recipe: None,
            error: Some(error.into()),
        }
    }
}
