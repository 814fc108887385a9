use serde_json::Value;

/// Result of checking a parsed value against the minimal Recipe shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Human-readable violations, in check order
    pub errors: Vec<String>,
}

/// Check every structural requirement and collect all violations.
pub fn validate(value: &Value) -> ValidationReport {
    let Some(recipe) = value.as_object() else {
        return ValidationReport {
            is_valid: false,
            errors: vec!["Recipe data is not a valid object".to_string()],
        };
    };

    let mut errors = Vec::new();

    let has_name = recipe
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        errors.push("Recipe name is missing or empty".to_string());
    }

    if !is_non_empty_list(recipe.get("recipeIngredient")) {
        errors.push("Recipe ingredients are missing or empty".to_string());
    }

    if !is_non_empty_list(recipe.get("recipeInstructions")) {
        errors.push("Recipe instructions are missing or empty".to_string());
    }

    if !references_schema_org(recipe.get("@context")) {
        errors.push("Missing or invalid schema.org context".to_string());
    }

    if recipe.get("@type").and_then(Value::as_str) != Some("Recipe") {
        errors.push("Missing or invalid recipe type".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

fn is_non_empty_list(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

/// `@context` as a string, or a list with at least one such string
fn references_schema_org(context: Option<&Value>) -> bool {
    match context {
        Some(Value::String(url)) => url.contains("schema.org"),
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .any(|url| url.contains("schema.org")),
        _ => false,
    }
}
