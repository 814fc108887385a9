use log::{info, warn};
use recipe_transformer::storage::record_recent;
use recipe_transformer::transport::{self, Dispatcher};
use recipe_transformer::{transform_html, transform_url, RecipePipeline, TransformError, TransformerConfig};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const USAGE: &str = "Usage: recipe-transformer <url|page.html> [--out DIR]\n       recipe-transformer --serve";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, TransformError> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut config = TransformerConfig::load()?;
    if config.api_key.is_none() {
        config.api_key = env::var("GEMINI_API_KEY").ok();
    }
    let timeout = config.timeout.map(Duration::from_secs);
    let pipeline = RecipePipeline::builder().config(config).build()?;

    if args.iter().any(|arg| arg == "--serve") {
        info!("Serving messages on stdin/stdout");
        let dispatcher = Dispatcher::new(pipeline);
        transport::serve(&mut transport::stdio(), &dispatcher).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut source = None;
    let mut out_dir = None;
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" => out_dir = iter.next().map(PathBuf::from),
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(ExitCode::SUCCESS);
            }
            _ => source = Some(arg),
        }
    }
    let Some(source) = source else {
        eprintln!("{}", USAGE);
        return Ok(ExitCode::from(2));
    };

    let recipe = if source.starts_with("http://") || source.starts_with("https://") {
        transform_url(&pipeline, &source, timeout).await?
    } else {
        let html = tokio::fs::read_to_string(&source).await?;
        transform_html(&pipeline, &html).await?
    };

    if let Err(e) = record_recent(pipeline.store().as_ref(), &recipe.name).await {
        warn!("Could not update recent recipes: {}", e);
    }

    let json = serde_json::to_string_pretty(&recipe).map_err(std::io::Error::from)?;
    match out_dir {
        Some(dir) => {
            let path = dir.join(recipe.file_name());
            tokio::fs::write(&path, json).await?;
            println!("{}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(ExitCode::SUCCESS)
}
