use crate::error::TransformError;
use log::debug;
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetch the HTML of `url`
pub async fn fetch_page(url: &str, timeout: Option<Duration>) -> Result<String, TransformError> {
    let client = Client::builder()
        .timeout(timeout.unwrap_or(Duration::from_secs(30)))
        .user_agent(USER_AGENT)
        .build()?;

    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    debug!("Fetched {} ({} bytes)", url, html.len());
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_page() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/recipe")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><title>Stew</title></html>")
            .create_async()
            .await;

        let html = fetch_page(&format!("{}/recipe", server.url()), None)
            .await
            .unwrap();
        assert!(html.contains("Stew"));
    }

    #[tokio::test]
    async fn test_fetch_page_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;

        let err = fetch_page(&format!("{}/gone", server.url()), None)
            .await
            .unwrap_err();
        match err {
            TransformError::Fetch(e) => assert_eq!(e.status().map(|s| s.as_u16()), Some(404)),
            other => panic!("expected Fetch, got {:?}", other),
        }
    }
}
