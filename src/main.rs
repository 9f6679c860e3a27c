use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use futures::StreamExt;

use solai_rs::config::Config;
use solai_rs::context::ContextBuilder;
use solai_rs::crawl::{Crawler, FirecrawlClient};
use solai_rs::error::SolaiError;
use solai_rs::provider::cerebras::CerebrasProvider;
use solai_rs::provider::gemini::GeminiProvider;
use solai_rs::provider::{ProviderGateway, StructuredProvider};
use solai_rs::rag::embeddings::OllamaEmbeddings;
use solai_rs::rag::ingest::Ingestor;
use solai_rs::rag::vector_store::PineconeStore;
use solai_rs::rag::{EmbeddingClient, VectorSearch};
use solai_rs::server::{self, AppState};
use solai_rs::services::mock::{MockCrawler, MockEmbeddings, MockIndexer, MockVectorSearch};
use solai_rs::workflow::{WorkflowEngine, WorkflowState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question and print the final answer
    Ask {
        /// The question to process
        #[arg(short, long)]
        query: String,

        /// Wallet address for portfolio context
        #[arg(short, long)]
        wallet: Option<String>,

        /// Use deterministic offline collaborators
        #[arg(long)]
        mock: bool,

        /// Print each workflow step as it completes
        #[arg(long)]
        stream: bool,
    },
    /// Start the HTTP server
    Serve {
        #[arg(short, long, default_value_t = 8090)]
        port: u16,

        /// Use deterministic offline collaborators
        #[arg(long)]
        mock: bool,
    },
    /// Crawl sources and index them for retrieval
    Index {
        /// URLs to index; defaults to the configured source list
        #[arg(long)]
        url: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let config = Config::load()?;

    match args.command {
        Commands::Ask {
            query,
            wallet,
            mock,
            stream,
        } => {
            let engine = build_engine(&config, mock)?;
            let context_builder = ContextBuilder::new(Arc::new(MockIndexer));

            let context = match wallet {
                Some(wallet) => {
                    let wallet_context = context_builder.build_wallet_context(&wallet).await;
                    wallet_context.text_blocks.join("\n---\n")
                }
                None => String::new(),
            };

            let initial = WorkflowState::new(query, context).map_err(SolaiError::from)?;

            if stream {
                let mut steps = std::pin::pin!(engine.execute_streaming(initial));
                while let Some(step) = steps.next().await {
                    let (node, snapshot) = step.map_err(SolaiError::from)?;
                    println!("[{}] completed", node);
                    if !snapshot.final_response.is_empty() {
                        print_answer(&snapshot);
                    }
                }
            } else {
                let terminal = engine.execute(initial).await.map_err(SolaiError::from)?;
                print_answer(&terminal);
            }
        }
        Commands::Serve { port, mock } => {
            let engine = Arc::new(build_engine(&config, mock)?);
            let context_builder = Arc::new(ContextBuilder::new(Arc::new(MockIndexer)));
            let ingestor = if !mock && config.llm_processor.rag.enabled {
                Some(Arc::new(build_ingestor(&config)?))
            } else {
                None
            };

            server::serve(
                AppState {
                    engine,
                    context_builder,
                    ingestor,
                },
                port,
            )
            .await?;
        }
        Commands::Index { url } => {
            let ingestor = build_ingestor(&config)?;
            let urls = if url.is_empty() { None } else { Some(url) };
            let report = ingestor.ingest(urls).await?;
            println!(
                "Indexed {} chunk(s) from {} document(s)",
                report.chunks_indexed, report.documents_crawled
            );
        }
    }

    Ok(())
}

fn build_gateway(config: &Config) -> Result<ProviderGateway, SolaiError> {
    let llm = &config.llm_processor;
    let cerebras: Arc<dyn StructuredProvider> = Arc::new(CerebrasProvider::new(&llm.cerebras)?);
    let gemini: Arc<dyn StructuredProvider> = Arc::new(GeminiProvider::new(&llm.gemini)?);

    let (primary, fallback) = match llm.provider.as_str() {
        "GEMINI" => (gemini, cerebras),
        _ => (cerebras, gemini),
    };

    log::info!(
        "Provider gateway: primary {} with fallback {}",
        primary.name(),
        fallback.name()
    );

    Ok(ProviderGateway::new(primary, fallback)
        .with_timeout(Duration::from_secs(llm.timeouts.provider_secs)))
}

fn build_engine(config: &Config, mock: bool) -> Result<WorkflowEngine, SolaiError> {
    let llm = &config.llm_processor;
    let gateway = build_gateway(config)?;
    let collaborator_timeout = Duration::from_secs(llm.timeouts.collaborator_secs);

    let (embeddings, search, crawler): (
        Arc<dyn EmbeddingClient>,
        Arc<dyn VectorSearch>,
        Arc<dyn Crawler>,
    ) = if mock {
        (
            Arc::new(MockEmbeddings),
            Arc::new(MockVectorSearch::new(llm.rag.vector_db.top_k_results)),
            Arc::new(MockCrawler),
        )
    } else {
        (
            Arc::new(OllamaEmbeddings::new(
                &llm.ollama_embedding,
                collaborator_timeout,
            )?),
            Arc::new(PineconeStore::new(&llm.rag.vector_db, collaborator_timeout)?),
            Arc::new(FirecrawlClient::new(&llm.firecrawl, collaborator_timeout)?),
        )
    };

    Ok(WorkflowEngine::new(gateway, embeddings, search, crawler))
}

fn build_ingestor(config: &Config) -> Result<Ingestor, SolaiError> {
    let llm = &config.llm_processor;
    let collaborator_timeout = Duration::from_secs(llm.timeouts.collaborator_secs);

    Ok(Ingestor::new(
        Arc::new(FirecrawlClient::new(&llm.firecrawl, collaborator_timeout)?),
        Arc::new(OllamaEmbeddings::new(
            &llm.ollama_embedding,
            collaborator_timeout,
        )?),
        PineconeStore::new(&llm.rag.vector_db, collaborator_timeout)?,
        llm.firecrawl.source_urls.clone(),
    ))
}

fn print_answer(state: &WorkflowState) {
    println!("\n{}", state.final_response);
    if !state.sources.is_empty() {
        println!("\nSources:");
        for source in &state.sources {
            println!("  - {}", source);
        }
    }
    println!("\nConfidence: {:.2}", state.confidence);
    if let Some(intent) = state.intent {
        println!("Intent: {}", intent);
    }
}
