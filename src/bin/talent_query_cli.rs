//! talent-query CLI: run metered natural-language queries and inspect cache keys.
//!
//! Usage:
//!   talent-query-cli ask [--user <id>] [--credits <n>] [--repeat <n>] [--no-cache] [--config <file>] <query...>
//!   talent-query-cli key <prefix> <text...>
//!   talent-query-cli schema

use anyhow::{bail, Context};
use std::sync::Arc;
use std::time::Instant;
use talent_query::attributes::JobAttributes;
use talent_query::cache::derive_key;
use talent_query::structured::json_schema_from_type;
use talent_query::{AppConfig, Caller, InMemoryLedger, NaturalLanguageQueryService};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "ask" => cmd_ask(&args[2..]),
        "key" => cmd_key(&args[2..]),
        "schema" => cmd_schema(),
        "version" | "--version" | "-V" => {
            println!("talent-query-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"talent-query-cli: cached, credit-metered job search extraction

USAGE:
    talent-query-cli <COMMAND> [OPTIONS]

COMMANDS:
    ask [OPTIONS] <query...>    Extract job attributes from a free-text query
        --user <id>             Caller identity (default: cli-user)
        --credits <n>           Starting balance of the in-memory ledger (default: 10)
        --repeat <n>            Send the same query n times (default: 1)
        --no-cache              Force recomputation on every call
        --config <file>         YAML config file instead of the environment
    key <prefix> <text...>      Print the cache key for a text
    schema                      Print the JobAttributes JSON schema
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    UPSTASH_REDIS_REST_URL, UPSTASH_REDIS_REST_TOKEN    KV cache (optional)
    OPENAI_API_KEY, OPENAI_BASE_URL, OPENAI_MODEL       Model provider
    QUERY_CREDIT_COST, QUERY_CACHE_TTL_SECS, QUERY_HIT_DELAY_MS
    RUST_LOG                                            Log filter"#
    );
}

struct AskArgs {
    user: String,
    credits: i64,
    repeat: usize,
    no_cache: bool,
    config: Option<String>,
    query: String,
}

fn parse_ask_args(args: &[String]) -> anyhow::Result<AskArgs> {
    let mut parsed = AskArgs {
        user: "cli-user".to_string(),
        credits: 10,
        repeat: 1,
        no_cache: false,
        config: None,
        query: String::new(),
    };
    let mut words = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--user" => parsed.user = iter.next().context("--user needs a value")?.clone(),
            "--credits" => {
                parsed.credits = iter
                    .next()
                    .context("--credits needs a value")?
                    .parse()
                    .context("--credits must be an integer")?
            }
            "--repeat" => {
                parsed.repeat = iter
                    .next()
                    .context("--repeat needs a value")?
                    .parse()
                    .context("--repeat must be a positive integer")?
            }
            "--config" => {
                parsed.config = Some(iter.next().context("--config needs a value")?.clone())
            }
            "--no-cache" => parsed.no_cache = true,
            word => words.push(word.to_string()),
        }
    }
    parsed.query = words.join(" ");
    if parsed.query.trim().is_empty() {
        bail!("missing query text");
    }
    Ok(parsed)
}

fn cmd_ask(args: &[String]) -> anyhow::Result<()> {
    let ask = parse_ask_args(args)?;
    let config = match &ask.config {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::from_env()?,
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(async move {
        let ledger = Arc::new(InMemoryLedger::new().with_user(ask.user.clone(), ask.credits));
        let service = NaturalLanguageQueryService::from_app_config(&config, ledger.clone())?;
        let mut caller = Caller::new(ask.user.clone());
        if ask.no_cache {
            caller = caller.bypassing_cache();
        }

        for attempt in 1..=ask.repeat.max(1) {
            let started = Instant::now();
            let attrs = service.natural_language_query(&caller, &ask.query).await?;
            println!("{}", serde_json::to_string_pretty(&attrs)?);
            eprintln!(
                "[{attempt}] {:?}, balance: {}",
                started.elapsed(),
                service.credits(&caller).await?
            );
        }

        let stats = service.cache_stats();
        eprintln!(
            "cache: {} hits, {} misses, {} errors",
            stats.hits, stats.misses, stats.errors
        );
        Ok(())
    })
}

fn cmd_key(args: &[String]) -> anyhow::Result<()> {
    let Some((prefix, text)) = args.split_first() else {
        bail!("usage: talent-query-cli key <prefix> <text...>");
    };
    println!("{}", derive_key(prefix, &text.join(" ")));
    Ok(())
}

fn cmd_schema() -> anyhow::Result<()> {
    let schema = json_schema_from_type::<JobAttributes>();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
