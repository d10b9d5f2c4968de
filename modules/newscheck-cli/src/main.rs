use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use newscheck_archive::{DuckDuckGoSearcher, HttpFetcher, NewsApiSearcher, WebSearcher};
use newscheck_common::{Config, Mode};
use newscheck_scoring::{ScoreCombiner, UrlAnalyzer};

mod output;

#[derive(Parser)]
#[command(name = "newscheck", about = "Score news text for fake-news signals")]
#[command(version)]
struct Cli {
    /// Scoring mode: rule-based, transformer or hybrid (default: NEWSCHECK_MODE)
    #[arg(short, long, global = true)]
    mode: Option<Mode>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single text
    Check {
        text: String,

        /// Also search for related coverage
        #[arg(long)]
        corroborate: bool,
    },

    /// Score every non-empty line of a file ("-" for stdin)
    Batch { file: PathBuf },

    /// Fetch an article, extract it and score title and body
    Url {
        url: String,

        /// Don't score the article title
        #[arg(long)]
        no_title: bool,

        /// Don't score the article body
        #[arg(long)]
        no_content: bool,
    },

    /// Search for coverage related to a claim
    Search {
        claim: String,

        #[arg(short = 'n', long, default_value_t = 5)]
        max_results: usize,
    },

    /// Read texts from stdin one line at a time (default)
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let config = Config::from_env().context("Invalid configuration")?;
    let mode = cli.mode.unwrap_or(config.mode);
    let combiner = ScoreCombiner::from_config(&config).context("Failed to build scorer")?;

    if mode.needs_model() {
        if let Some(model) = combiner.model() {
            if let Err(e) = model.warm_up().await {
                warn!(error = %e, mode = %mode, "Model not available; scoring calls will fail");
            }
        }
    }

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Check { text, corroborate } => {
            let result = combiner.predict(&text, mode).await?;
            emit(cli.json, &result, output::score)?;
            if corroborate {
                let results = corroborate_claim(&config, &text, 5).await?;
                emit(cli.json, &results, |r| output::search_results(r))?;
            }
        }
        Commands::Batch { file } => {
            let texts = read_lines(&file)?;
            let result = combiner.predict_batch(&texts, mode).await;
            emit(cli.json, &result, output::batch)?;
        }
        Commands::Url {
            url,
            no_title,
            no_content,
        } => {
            let fetcher = HttpFetcher::new(config.fetch_timeout)?;
            let analyzer = UrlAnalyzer::new(Arc::new(fetcher), combiner)
                .with_title_analysis(!no_title)
                .with_content_analysis(!no_content);
            let analysis = analyzer
                .analyze_url(&url, mode)
                .await
                .with_context(|| format!("Failed to analyze {url}"))?;
            emit(cli.json, &analysis, output::url_analysis)?;
        }
        Commands::Search { claim, max_results } => {
            if max_results == 0 {
                bail!("--max-results must be at least 1");
            }
            let results = corroborate_claim(&config, &claim, max_results).await?;
            emit(cli.json, &results, |r| output::search_results(r))?;
        }
        Commands::Interactive => interactive(&combiner, mode, cli.json).await?,
    }

    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("newscheck=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, render: impl Fn(&T) -> String) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, value).context("Failed to write JSON")?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", render(value))?;
    }
    Ok(())
}

fn read_lines(file: &Path) -> Result<Vec<String>> {
    let content = if file.as_os_str() == "-" {
        io::read_to_string(io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    let lines: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    info!(count = lines.len(), "Read batch input");
    Ok(lines)
}

async fn corroborate_claim(
    config: &Config,
    claim: &str,
    max_results: usize,
) -> Result<Vec<newscheck_common::SearchResult>> {
    let searcher: Box<dyn WebSearcher> = match &config.newsapi_api_key {
        Some(key) => Box::new(NewsApiSearcher::new(key)?),
        None => Box::new(DuckDuckGoSearcher::new()?),
    };
    info!(searcher = searcher.name(), "Searching for related coverage");
    searcher.search(claim, max_results).await
}

async fn interactive(combiner: &ScoreCombiner, mode: Mode, json: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("newscheck ({mode})> ");
        io::stderr().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line.context("Failed to read stdin")?;
        let text = line.trim();
        match text {
            "" => continue,
            "quit" | "exit" => break,
            _ => {}
        }

        match combiner.predict(text, mode).await {
            Ok(result) => emit(json, &result, output::score)?,
            Err(e) => eprintln!("Error: {e}"),
        }
    }
    Ok(())
}
