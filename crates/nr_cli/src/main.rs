use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nr_cli::{init_logging, run_query_loop, Cli, Commands};
use nr_core::config::PipelineConfig;
use nr_core::{DocumentStore, EmbeddingModel, InferenceModel};
use nr_inference::{create_embedder, create_model, RetrievalQa};
use nr_scrapers::{CorpusManager, CorpusRequest, GoogleSearchProvider, HtmlArticleFetcher};
use nr_storage::{Indexer, VectorIndex};
use tokio::io::BufReader;
use tracing::info;

async fn build_corpus(
    config: &PipelineConfig,
    model: Arc<dyn InferenceModel>,
    embedder: Arc<dyn EmbeddingModel>,
) -> anyhow::Result<VectorIndex> {
    let search = GoogleSearchProvider::new(&config.search, config.retry.clone())?;
    let fetcher = HtmlArticleFetcher::new(config.retry.timeout)?;
    let manager = CorpusManager::new(Arc::new(search), Arc::new(fetcher), model, embedder, config.concurrency);

    let request = CorpusRequest {
        topic: config.topic.clone(),
        query: config.search.query_for(&config.topic),
        desired_count: config.search.desired_count,
    };
    info!("🦗 Collecting news for '{}' ({} results)", request.query, request.desired_count);

    let report = manager
        .run(&request, &config.index.path)
        .await
        .with_context(|| format!("failed to build index at {}", config.index.path.display()))?;
    Ok(report.index)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = cli.pipeline_config();
    config.validate()?;
    info!(?config, "⚙️ Configuration loaded");

    let model = create_model(&config.model, &config.retry)?;
    info!("🧠 Inference model initialized (using {})", model.name());
    let embedder = create_embedder(&config.embedding, &config.retry)?;
    info!("🔢 Embedding model initialized (using {})", embedder.name());

    let index = match cli.command() {
        Commands::Run | Commands::Build => build_corpus(&config, model.clone(), embedder.clone()).await?,
        Commands::Query => Indexer::new(embedder.clone())
            .load(&config.index.path)
            .with_context(|| format!("failed to load index from {}", config.index.path.display()))?,
    };
    info!("💾 Index holds {} documents", index.len());

    if cli.command() == Commands::Build {
        return Ok(());
    }

    let store: Arc<dyn DocumentStore> = Arc::new(index);
    let qa = RetrievalQa::new(model, embedder, store, config.index.top_k);
    let stdin = BufReader::new(tokio::io::stdin());
    run_query_loop(&qa, stdin, tokio::io::stdout()).await?;

    Ok(())
}
