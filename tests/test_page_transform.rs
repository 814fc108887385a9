use mockito::Matcher;
use recipe_transformer::storage::{recent_recipes, MemoryStore};
use recipe_transformer::transport::{serve, Dispatcher, LineTransport};
use recipe_transformer::{transform_url, RecipePipeline, TransformError};
use serde_json::{json, Value};
use std::sync::Arc;

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

const PAGE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Lemon Drizzle Cake | Example Kitchen</title></head>
<body>
    <nav>Recipes | Baking | Contact</nav>
    <article>
        <h1>Lemon Drizzle Cake</h1>
        <ul><li>1 cup sugar</li><li>2 sticks butter, room temperature</li></ul>
        <p>Bake at 350F for 45 minutes.</p>
    </article>
    <footer>Subscribe to our newsletter</footer>
</body>
</html>
"#;

fn recipe_reply() -> String {
    let recipe = json!({
        "@context": "https://schema.org/",
        "@type": "Recipe",
        "name": "Lemon Drizzle Cake",
        "recipeIngredient": ["200g sugar", "226g butter, room temperature"],
        "recipeInstructions": [{ "@type": "HowToStep", "text": "Bake at 177°C for 45 minutes." }]
    });
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": format!("```json\n{}\n```", recipe) }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_transform_url_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let _page = server
        .mock("GET", "/lemon-drizzle")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(PAGE)
        .create_async()
        .await;

    let gemini = server
        .mock("POST", ENDPOINT)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("Lemon Drizzle Cake \\| Example Kitchen".to_string()),
            Matcher::Regex("2 sticks butter, room temperature".to_string()),
        ]))
        .with_status(200)
        .with_body(recipe_reply())
        .expect(1)
        .create_async()
        .await;

    let pipeline = RecipePipeline::builder()
        .api_key("AIzaTestKey")
        .base_url(server.url())
        .build()
        .unwrap();

    let recipe = transform_url(&pipeline, &format!("{}/lemon-drizzle", server.url()), None)
        .await
        .unwrap();

    assert_eq!(recipe.name, "Lemon Drizzle Cake");
    assert_eq!(recipe.file_name(), "lemon_drizzle_cake.json");
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_transform_url_page_without_text() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/empty")
        .with_status(200)
        .with_body("<html><body><script>render()</script></body></html>")
        .create_async()
        .await;
    let gemini = server
        .mock("POST", ENDPOINT)
        .expect(0)
        .create_async()
        .await;

    let pipeline = RecipePipeline::builder()
        .api_key("AIzaTestKey")
        .base_url(server.url())
        .build()
        .unwrap();

    let err = transform_url(&pipeline, &format!("{}/empty", server.url()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, TransformError::ContentExtraction(_)));
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_line_transport_session() {
    let mut server = mockito::Server::new_async().await;
    let _gemini = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body(recipe_reply())
        .create_async()
        .await;

    let store = Arc::new(MemoryStore::with_api_key("AIzaTestKey"));
    let pipeline = RecipePipeline::builder()
        .base_url(server.url())
        .store(store.clone())
        .build()
        .unwrap();
    let dispatcher = Dispatcher::new(pipeline);

    let input = [
        json!({ "type": "ping" }),
        json!({ "type": "pageStateChanged", "isRecipe": true }),
        json!({
            "action": "transformRecipeContent",
            "content": { "title": "Lemon Drizzle Cake", "content": "1 cup sugar", "url": "x" }
        }),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let mut transport = LineTransport::new(input.as_bytes(), Vec::new());
    serve(&mut transport, &dispatcher).await.unwrap();

    let output = String::from_utf8(transport.into_writer()).unwrap();
    let replies: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], json!({ "ok": true }));
    assert_eq!(replies[1]["success"], true);
    assert_eq!(replies[1]["recipe"]["name"], "Lemon Drizzle Cake");

    let recent = recent_recipes(store.as_ref()).await.unwrap();
    assert_eq!(recent[0].name, "Lemon Drizzle Cake");
}
