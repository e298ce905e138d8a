use chrono::Utc;
use clap::{Parser, Subcommand};
use product_search_core::{
    AvailabilityLookup, AvailabilityProductLookup, AvailabilityRequest, HttpSearchClient,
    LegacyAdapter, LegacyOptions, QueryDefaults, QueryIntent, SearchConfig, SearchOrchestrator,
    SearchResult, SharedLocality, SortMode,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "product-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL
    #[arg(long, env = "PRODUCT_SEARCH_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// City id to scope searches to when a query does not name one
    #[arg(long, env = "PRODUCT_SEARCH_CITY_ID")]
    city_id: Option<u32>,

    /// Results per page
    #[arg(long, env = "PRODUCT_SEARCH_PAGE_SIZE", default_value = "20")]
    page_size: u32,

    /// Per-request timeout in milliseconds
    #[arg(long, env = "PRODUCT_SEARCH_TIMEOUT_MS", default_value = "10000")]
    timeout_ms: u64,

    /// Quiet period before a typed term is searched, in milliseconds
    #[arg(long, env = "PRODUCT_SEARCH_DEBOUNCE_MS", default_value = "300")]
    debounce_ms: u64,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the result as JSON.
    Search {
        /// Free-text term.
        #[arg(long)]
        query: Option<String>,
        /// Page number, starting at 1.
        #[arg(long)]
        page: Option<u32>,
        /// relevance, name, price_asc or price_desc.
        #[arg(long, value_parser = parse_sort)]
        sort: Option<SortMode>,
        /// Extra filter as key=value; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Print autocomplete suggestions for a partial term.
    Suggest {
        #[arg(long)]
        query: String,
    },
    /// Print per-product availability for the current city.
    Availability {
        /// Comma-separated product ids.
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<u64>,
        #[arg(long)]
        user_id: Option<u64>,
    },
    /// Run the deprecated option-bundle call with a JSON bundle.
    Legacy {
        /// e.g. '{"filters":{"search":"drill"},"itemsPerPage":10}'
        #[arg(long)]
        options: String,
    },
    /// Treat each stdin line as the current search-box text and print debounced results.
    Live,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = SearchConfig {
        base_url: cli.base_url.clone(),
        request_timeout: Duration::from_millis(cli.timeout_ms),
        debounce_delay: Duration::from_millis(cli.debounce_ms),
        defaults: QueryDefaults {
            page_size: cli.page_size,
            ..QueryDefaults::default()
        },
        ..SearchConfig::default()
    };
    let locality = SharedLocality::new(cli.city_id);

    let orchestrator = Arc::new(
        SearchOrchestrator::builder(HttpSearchClient::new(&config)?, config.clone())
            .locality(Arc::new(locality.clone()))
            .build(),
    );
    info!(
        version = app_version,
        base_url = %config.base_url,
        started_at = %Utc::now().to_rfc3339(),
        "product-search boot"
    );

    match cli.command {
        Command::Search {
            query,
            page,
            sort,
            filters,
        } => {
            let mut intent = QueryIntent {
                term: query,
                page,
                sort,
                ..QueryIntent::default()
            };
            for (key, value) in filters {
                intent = intent.with_filter(key, value);
            }

            match orchestrator.search(intent).await {
                Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                None => warn!("search was cancelled"),
            }
        }
        Command::Suggest { query } => {
            let suggestions = orchestrator.autocomplete(&query).await.unwrap_or_default();
            for suggestion in suggestions {
                match suggestion.text() {
                    Some(text) => println!("{text}"),
                    None => println!("{}", suggestion.0),
                }
            }
        }
        Command::Availability { ids, user_id } => {
            let request = AvailabilityRequest {
                product_ids: ids,
                city_id: orchestrator.current_locality(),
                user_id,
            };
            let payload = HttpSearchClient::new(&config)?.dynamic_data(&request).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::Legacy { options } => {
            let options: LegacyOptions = serde_json::from_str(&options)?;
            let lookup = AvailabilityProductLookup::new(
                HttpSearchClient::new(&config)?,
                Arc::new(locality.clone()),
                config.defaults.fallback_locality,
            );
            let adapter = LegacyAdapter::new(orchestrator.clone(), lookup);
            let response = adapter.fetch_from_open_search(&options).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Live => {
            run_live(&orchestrator, &config).await?;
        }
    }

    orchestrator.dispose();
    Ok(())
}

async fn run_live(
    orchestrator: &SearchOrchestrator<HttpSearchClient>,
    config: &SearchConfig,
) -> anyhow::Result<()> {
    let (sender, mut results) = mpsc::unbounded_channel::<(String, SearchResult)>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let term = line.trim().to_string();
                let sender = sender.clone();
                let label = term.clone();
                orchestrator.search_with_debounce(Some(&term), move |result| {
                    let _ = sender.send((label, result));
                });
            }
            Some((term, result)) = results.recv() => print_live(&term, &result),
        }
    }

    // Input closed: give the last pending search time to land.
    let grace = config.debounce_delay + config.request_timeout;
    while let Ok(Some((term, result))) = tokio::time::timeout(grace, results.recv()).await {
        print_live(&term, &result);
    }
    Ok(())
}

fn print_live(term: &str, result: &SearchResult) {
    let names: Vec<&str> = result
        .products
        .iter()
        .map(|product| product.name().unwrap_or("<unnamed>"))
        .collect();
    println!("{term:?}: {} total, showing {:?}", result.total, names);
}

fn parse_sort(value: &str) -> Result<SortMode, String> {
    value
        .parse::<SortMode>()
        .map_err(|error| error.to_string())
}

fn parse_filter(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{value}`"))
}
