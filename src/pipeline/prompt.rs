use crate::model::ContentPayload;

/// Prompt for the first attempt: the full JSON-LD skeleton.
///
/// Loaded from `prompts/primary.txt` at compile time. Contains `{{UNITS}}`,
/// `{{TITLE}}` and `{{CONTENT}}` placeholders filled by [`build_prompt`].
pub const PRIMARY_PROMPT: &str = include_str!("prompts/primary.txt");

/// Stripped-down prompt used after a `MAX_TOKENS` finish.
pub const RETRY_PROMPT: &str = include_str!("prompts/retry.txt");

/// Appended to a body cut at the budget
pub const TRUNCATION_MARKER: &str = "\n…";

/// Metric conversions the model must apply
pub const UNIT_CONVERSIONS: &[&str] = &[
    "Cups flour → 120g per cup",
    "Cups sugar → 200g per cup",
    "Cups liquid → 240ml per cup",
    "Tablespoons → 15ml each",
    "Teaspoons → 5ml each",
    "Ounces → multiply by 28.35 for grams",
    "Pounds → multiply by 453.6 for grams",
    "Fahrenheit → Celsius using (F-32)×5/9",
    "Fluid ounces → 30ml each",
    "Stick of butter → 113g",
    "Large egg → 50g",
];

/// Which prompt variant to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Primary,
    Retry,
}

/// Keep the first `max_chars` characters of `text`, marking the cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Build the prompt for `payload` with the body capped at `budget` characters.
pub fn build_prompt(kind: PromptKind, payload: &ContentPayload, budget: usize) -> String {
    let template = match kind {
        PromptKind::Primary => PRIMARY_PROMPT,
        PromptKind::Retry => RETRY_PROMPT,
    };
    let units = UNIT_CONVERSIONS
        .iter()
        .map(|rule| format!("   - {}", rule))
        .collect::<Vec<_>>()
        .join("\n");
    let body = truncate(&payload.body, budget);

    render(
        template,
        &[
            ("UNITS", units.as_str()),
            ("TITLE", payload.title.as_str()),
            ("CONTENT", body.as_str()),
        ],
    )
}

/// Fill `{{KEY}}` placeholders in one pass; substituted text is never rescanned.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start + 2..].find("}}") else {
            break;
        };
        let key = &rest[start + 2..start + 2 + len];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => {
                out.push_str(&rest[..start]);
                out.push_str(value);
            }
            None => out.push_str(&rest[..start + 2 + len + 2]),
        }
        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    out
}
