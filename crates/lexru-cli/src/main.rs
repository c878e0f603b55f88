mod display;
mod pipeline;

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use lexru_ai::{OpenAiClient, assess, filter_and_rank_pages};
use lexru_core::answer::MAX_USER_CHARS;
use lexru_core::parse_norm_targets;
use lexru_search::config::{DEFAULT_MAX_RESULTS, DEFAULT_SOURCE_SITES, DEFAULT_TIMEOUT_SECS};
use lexru_search::{PageFetcher, PageSource, SearchAggregator, SearchConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::pipeline::{DEFAULT_FETCH_CONCURRENCY, MAX_KEEP, MIN_KEEP, Pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "lexru",
    version,
    about = "Russian-law search, relevance ranking and answer checking"
)]
struct Cli {
    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a legal question end to end.
    Ask(AskArgs),
    /// Run the provider cascade and print deduplicated hits.
    Search(SearchCmd),
    /// Fetch one page and show its extracted snippet.
    Fetch(FetchCmd),
    /// Search, fetch and rank pages against norm targets.
    Rank(RankCmd),
    /// Run the citation and quality checks on an answer text.
    Check(CheckCmd),
}

/// Provider cascade settings, shared by every command that searches.
#[derive(Args, Debug, Clone)]
struct SearchArgs {
    /// Comma-separated domains for site-restricted queries.
    #[arg(long, env = "SOURCE_SITES", value_delimiter = ',', global = true)]
    source_sites: Option<Vec<String>>,

    #[arg(long, env = "SEARCH_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS, global = true)]
    max_results: usize,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true, global = true)]
    google_api_key: Option<String>,

    #[arg(long, env = "GOOGLE_CSE_ID", global = true)]
    google_cse_id: Option<String>,

    #[arg(long, env = "SEARXNG_URL", global = true)]
    searxng_url: Option<String>,

    #[arg(long, env = "SEARXNG_ENABLED", global = true)]
    searxng_enabled: bool,

    #[arg(
        long,
        env = "STARTPAGE_ENABLED",
        default_value_t = true,
        action = ArgAction::Set,
        global = true
    )]
    startpage_enabled: bool,

    #[arg(long, env = "DISABLE_DDG", global = true)]
    disable_ddg: bool,

    #[arg(long, env = "HTTP_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    http_timeout_seconds: u64,
}

impl SearchArgs {
    fn to_config(&self) -> SearchConfig {
        let source_sites = match &self.source_sites {
            Some(sites) => sites
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_SOURCE_SITES.iter().map(|s| s.to_string()).collect(),
        };
        SearchConfig {
            source_sites,
            max_results: self.max_results,
            google_api_key: self.google_api_key.clone(),
            google_cse_id: self.google_cse_id.clone(),
            searxng_url: self.searxng_url.clone(),
            searxng_enabled: self.searxng_enabled,
            startpage_enabled: self.startpage_enabled,
            ddg_disabled: self.disable_ddg,
            timeout: Duration::from_secs(self.http_timeout_seconds),
        }
    }

    fn aggregator(&self) -> Result<SearchAggregator> {
        SearchAggregator::from_config(&self.to_config()).context("building search providers")
    }
}

#[derive(Args, Debug)]
struct AskArgs {
    /// The question; several words are joined with spaces.
    #[arg(required = true, num_args = 1..)]
    question: Vec<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = lexru_ai::DEFAULT_MODEL)]
    openai_model: String,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = lexru_ai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    #[arg(long, env = "MAX_USER_CHARS", default_value_t = MAX_USER_CHARS)]
    max_user_chars: usize,

    /// File with the answer system prompt; `__TODAY__` is replaced with the date.
    #[arg(long, env = "LEXRU_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    fetch_concurrency: usize,

    /// Print the reply with intent, confidence and evidence as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SearchCmd {
    #[arg(required = true, num_args = 1..)]
    queries: Vec<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FetchCmd {
    url: String,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct RankCmd {
    /// Search query; repeat for several.
    #[arg(long = "query", short = 'q', required = true)]
    queries: Vec<String>,

    /// Norm target as "Code;Article;Part;Term"; repeat for several.
    #[arg(long)]
    qual: Vec<String>,

    #[arg(long, default_value_t = MIN_KEEP)]
    min_keep: usize,

    #[arg(long, default_value_t = MAX_KEEP)]
    max_keep: usize,

    /// Skip the strict phase and rank every page by score.
    #[arg(long)]
    no_strict: bool,

    #[arg(long, default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    fetch_concurrency: usize,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CheckCmd {
    /// Answer text; read from stdin when omitted.
    text: Option<String>,

    /// Number of sources the answer was based on, for the confidence label.
    #[arg(long, default_value_t = 0)]
    sources: usize,

    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    info!("lexru v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Ask(args) => cmd_ask(&cli.search, args).await,
        Commands::Search(args) => cmd_search(&cli.search, args).await,
        Commands::Fetch(args) => cmd_fetch(args).await,
        Commands::Rank(args) => cmd_rank(&cli.search, args).await,
        Commands::Check(args) => cmd_check(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_ask(search: &SearchArgs, args: AskArgs) -> Result<()> {
    let generator = OpenAiClient::new(
        &args.openai_base_url,
        args.openai_api_key,
        args.openai_model,
    )
    .context("building model client")?;
    info!(model = generator.model(), "model client ready");

    let fetcher = PageFetcher::new().context("building page fetcher")?;
    let mut pipeline = Pipeline::new(search.aggregator()?, Box::new(fetcher), Box::new(generator))
        .with_max_user_chars(args.max_user_chars)
        .with_fetch_concurrency(args.fetch_concurrency);
    if let Some(path) = &args.system_prompt {
        let prompt = std::fs::read_to_string(path)
            .with_context(|| format!("reading system prompt {}", path.display()))?;
        pipeline = pipeline.with_system_prompt(&prompt);
    }

    let question = args.question.join(" ");
    if args.json {
        return display::print_json(&pipeline.answer_detailed(&question).await);
    }
    println!("{}", pipeline.answer(&question).await);
    Ok(())
}

async fn cmd_search(search: &SearchArgs, args: SearchCmd) -> Result<()> {
    let hits = search.aggregator()?.multi_query_search(&args.queries).await;
    if args.json {
        return display::print_json(&hits);
    }
    display::print_hits(&hits);
    Ok(())
}

async fn cmd_fetch(args: FetchCmd) -> Result<()> {
    let fetcher = PageFetcher::new().context("building page fetcher")?;
    let page = fetcher
        .fetch_page(&args.url)
        .await
        .with_context(|| format!("fetching {}", args.url))?;
    if args.json {
        return display::print_json(&page);
    }
    display::print_page(&page);
    Ok(())
}

async fn cmd_rank(search: &SearchArgs, args: RankCmd) -> Result<()> {
    let targets = parse_norm_targets(&args.qual);
    let hits = search.aggregator()?.multi_query_search(&args.queries).await;
    let fetcher = PageFetcher::new().context("building page fetcher")?;
    let pages = pipeline::fetch_pages(&fetcher, &hits, args.fetch_concurrency).await;
    let ranked = filter_and_rank_pages(
        &pages,
        &targets,
        args.min_keep,
        args.max_keep,
        !args.no_strict,
    );
    if args.json {
        return display::print_json(&ranked);
    }
    display::print_targets(&targets);
    display::print_ranked(&ranked);
    Ok(())
}

fn cmd_check(args: CheckCmd) -> Result<()> {
    let text = match args.text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading answer from stdin")?;
            buf
        }
    };
    let report = assess(&text);
    if args.json {
        return display::print_json(&report);
    }
    display::print_quality(&report, args.sources);
    Ok(())
}
