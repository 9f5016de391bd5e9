use clap::{Parser, Subcommand};
use ragstore_common::{logger, AppConfig, RagStoreError, Result};
use ragstore_llm::{OllamaClient, OllamaEmbedder, OllamaGenerator};
use ragstore_vector::{
    ClusterConfig, ClusterEngine, Document, RagPipeline, StoreConfig, VectorStore,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "ragstore")]
#[command(about = "ragstore - in-memory vector search and grounded answers over Ollama", long_about = None)]
struct Cli {
    /// JSON file holding an array of documents ({"id", "content", "metadata"?})
    #[arg(long, global = true)]
    docs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank documents by similarity to a query
    Search {
        query: String,

        /// Number of results
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Answer a question from the documents
    Ask {
        question: String,

        /// Number of documents used as context
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Group documents by similarity
    Cluster {
        /// Number of clusters
        #[arg(long)]
        clusters: Option<usize>,

        /// Seed for centroid sampling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check that Ollama is reachable
    Check,
}

fn init_logging(config: &AppConfig) -> Result<()> {
    match &config.log_dir {
        Some(dir) => logger::setup_logging(dir, &config.log_level),
        None => logger::setup_console_logging(&config.log_level),
    }
}

/// Read documents from a JSON array file
fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let data = std::fs::read_to_string(path)?;
    let documents: Vec<Document> = serde_json::from_str(&data)?;
    Ok(documents)
}

async fn build_store(
    config: &AppConfig,
    client: &OllamaClient,
    docs: Option<&Path>,
) -> Result<Arc<VectorStore>> {
    let embedder = Arc::new(OllamaEmbedder::new(
        client.clone(),
        config.embedding_model.clone(),
    ));
    let store = Arc::new(VectorStore::with_config(embedder, StoreConfig::from(config)));

    let path = docs.ok_or_else(|| RagStoreError::invalid_input("--docs <file> is required"))?;
    let documents = load_documents(path)?;
    tracing::info!("Indexing {} documents from {}", documents.len(), path.display());

    for document in documents {
        store.add_document(document).await?;
    }

    Ok(store)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let client = OllamaClient::from_config(&config)?;
    let docs = cli.docs.as_deref();

    match cli.command {
        Commands::Check => {
            let ok = client.test_connection().await?;
            print_json(&json!({
                "ollama_base_url": client.base_url(),
                "reachable": ok,
            }))?;
        }
        Commands::Search { query, top_k } => {
            let store = build_store(&config, &client, docs).await?;
            let results = store.search(&query, top_k.unwrap_or(config.top_k)).await?;

            let items: Vec<_> = results
                .iter()
                .map(|r| {
                    json!({
                        "id": r.entry.id,
                        "similarity": r.similarity,
                        "content": r.entry.content,
                        "metadata": r.entry.metadata,
                    })
                })
                .collect();
            print_json(&json!({ "query": query, "count": items.len(), "results": items }))?;
        }
        Commands::Ask { question, top_k } => {
            let store = build_store(&config, &client, docs).await?;
            let generator = Arc::new(OllamaGenerator::new(client.clone(), config.llm_model.clone()));
            let pipeline =
                RagPipeline::new(store, generator).with_top_k(top_k.unwrap_or(config.top_k));

            let answer = pipeline.query(&question).await?;
            print_json(&serde_json::to_value(&answer)?)?;
        }
        Commands::Cluster { clusters, seed } => {
            let store = build_store(&config, &client, docs).await?;
            let cluster_config = ClusterConfig::from(&config);
            let mut engine = match seed.or(config.cluster_seed) {
                Some(seed) => ClusterEngine::with_seed(cluster_config, seed),
                None => ClusterEngine::new(cluster_config),
            };

            let result = engine
                .cluster(&store, clusters.unwrap_or(config.num_clusters))
                .await?;
            print_json(&serde_json::to_value(&result)?)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ragstore: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("ragstore: {}", e);
        std::process::exit(e.exit_code());
    }

    tracing::info!(
        "ragstore starting - ollama={}, embedding={}, llm={}",
        config.ollama_base_url,
        config.embedding_model,
        config.llm_model
    );

    if let Err(e) = run(cli, config).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("ragstore: {}", e);
        std::process::exit(e.exit_code());
    }
}
