use clap::{Arg, Command};
use std::env;
use tracing::{error, info};

use crate::{
    config::{AgentConfig, DEFAULT_MODEL},
    tools::CatalogTool,
    Agent, FunctionFactory,
};

/// Canned product queries driven through the agent when no query argument
/// is given on the command line.
const PRODUCT_QUERIES: &[&str] = &[
    "What are the products available in the store?",
    "Suggest something elegant for home decor.",
    "Can you show me rustic or vintage pieces for my living room?",
    "List all available products with price and discount details",
    "Show me the latest products in the store",
    "Are there any new arrivals?",
    "Can you show me products with specific tags?",
    "Do you have any cozy or comfy furniture recommendations?",
    "Which items are currently offering the biggest discount?",
    "What are the top-rated products?",
    "What products have the highest discount?",
    "What are the best-selling products?",
];

/// CLI entry point for the shop-agent tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let matches = Command::new("shop-agent")
        .version("0.1.0")
        .about("A friendly shopping assistant agent backed by a Gemini completion endpoint")
        .arg(
            Arg::new("query")
                .help("A single query to send to the agent (defaults to the built-in demo queries)")
                .index(1),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("The model to use")
                .default_value(DEFAULT_MODEL),
        )
        .arg(
            Arg::new("api-key")
                .short('k')
                .long("api-key")
                .value_name("KEY")
                .help("Gemini API key (or set GEMINI_API_KEY env var)"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .help("Completion endpoint base URL (or set GEMINI_BASE_URL env var)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Request timeout in seconds")
                .default_value("120"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .help("Maximum agent iterations per query")
                .default_value("10"),
        )
        .get_matches();

    // Get API key from argument or environment
    let api_key = matches
        .get_one::<String>("api-key")
        .cloned()
        .or_else(|| env::var("GEMINI_API_KEY").ok())
        .ok_or("Gemini API key is required. Set GEMINI_API_KEY environment variable or use --api-key")?;

    let timeout_seconds: u64 = matches.get_one::<String>("timeout").unwrap().parse()?;
    let max_iterations: usize = matches
        .get_one::<String>("max-iterations")
        .unwrap()
        .parse()?;

    let mut config = AgentConfig::new(api_key)
        .with_model(matches.get_one::<String>("model").unwrap().as_str())
        .with_timeout(std::time::Duration::from_secs(timeout_seconds))
        .with_max_iterations(max_iterations);

    if let Some(base_url) = matches
        .get_one::<String>("base-url")
        .cloned()
        .or_else(|| env::var("GEMINI_BASE_URL").ok())
    {
        config = config.with_base_url(base_url);
    }

    // Set up function factory with the catalog tool
    let mut function_factory = FunctionFactory::new();
    function_factory.register_tool(CatalogTool::new());

    let agent = Agent::new(config, function_factory);

    info!(
        "Using model: {}",
        matches.get_one::<String>("model").unwrap()
    );

    let queries: Vec<&str> = match matches.get_one::<String>("query") {
        Some(query) => vec![query.as_str()],
        None => PRODUCT_QUERIES.to_vec(),
    };

    for query in queries {
        println!("\n🧑‍💻 User: {}", query.trim());

        match agent.run(query).await {
            Ok(response) => {
                println!("\n🤖 Agent:\n{}", response.trim());
            }
            Err(e) => {
                // A failed query ends the run; later queries are skipped.
                error!("Agent execution failed: {}", e);
                return Err(e.into());
            }
        }
    }

    Ok(())
}
