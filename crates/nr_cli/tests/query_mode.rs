use std::sync::Arc;
use clap::Parser;

use nr_cli::{run_query_loop, Cli, Commands, PROMPT};
use nr_core::{Document, DocumentMetadata, DocumentStore};
use nr_inference::{create_embedder, create_model, RetrievalQa};
use nr_storage::Indexer;
use tempfile::tempdir;

fn article(title: &str, summary: &str) -> Document {
    Document {
        content: format!("Title: {}, Source: example.com Summary: {}", title, summary),
        metadata: DocumentMetadata {
            title: title.to_string(),
            source: "example.com".to_string(),
            url: format!("https://example.com/{}", title.to_lowercase().replace(' ', "-")),
        },
    }
}

#[tokio::test]
async fn test_query_against_persisted_index_with_offline_providers() {
    let dir = tempdir().unwrap();
    let index_dir = dir.path().join("news_index");
    let cli = Cli::try_parse_from([
        "nr",
        "--model-provider",
        "dummy",
        "--embedding-provider",
        "hashing",
        "--embedding-dimension",
        "512",
        "--top-k",
        "1",
        "--index-path",
        index_dir.to_str().unwrap(),
        "query",
    ])
    .unwrap();
    assert_eq!(cli.command(), Commands::Query);
    let config = cli.pipeline_config();
    config.validate().unwrap();

    let model = create_model(&config.model, &config.retry).unwrap();
    let embedder = create_embedder(&config.embedding, &config.retry).unwrap();
    let indexer = Indexer::new(embedder.clone());

    let index = indexer
        .build_index(vec![
            article("Egg prices hit record high", "Wholesale egg costs doubled after avian flu."),
            article("City council approves budget", "The new budget funds road repairs."),
        ])
        .await
        .unwrap();
    indexer.persist(&index, &config.index.path).unwrap();

    let reloaded = indexer.load(&config.index.path).unwrap();
    assert_eq!(reloaded.len(), 2);

    let store: Arc<dyn DocumentStore> = Arc::new(reloaded);
    let qa = RetrievalQa::new(model, embedder, store, config.index.top_k);

    let mut output = Vec::new();
    let answered = run_query_loop(&qa, "Why did egg prices rise?\nEXIT\n".as_bytes(), &mut output)
        .await
        .unwrap();
    let output = String::from_utf8(output).unwrap();

    assert_eq!(answered, 1);
    assert_eq!(output.matches(PROMPT).count(), 2);
    assert!(output.contains("Use the following pieces of context"));
}

#[test]
fn test_loading_missing_index_fails() {
    let dir = tempdir().unwrap();
    let cli = Cli::try_parse_from(["nr", "--embedding-provider", "hashing", "query"]).unwrap();
    let config = cli.pipeline_config();
    let embedder = create_embedder(&config.embedding, &config.retry).unwrap();

    assert!(Indexer::new(embedder).load(dir.path().join("absent")).is_err());
}
