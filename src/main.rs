use anyhow::Context;
use clap::Parser;
use eatery_discovery::config::cli::{Command, LocationArgs, OutputFormat};
use eatery_discovery::domain::model::parse_wall_clock;
use eatery_discovery::utils::{logger, output};
use eatery_discovery::{
    AtomicSequenceGenerator, CliConfig, Coordinate, Dataset, DiscoveryConfig, DiscoveryError,
    DiscoveryQuery, DiscoveryService, InMemoryCache, InMemoryRestaurantStore, RESTAURANT_SEQUENCE,
};

fn build_query(location: &LocationArgs, config: &DiscoveryConfig) -> anyhow::Result<DiscoveryQuery> {
    let anchor = Coordinate::new(location.lat, location.lon)?;
    let now = match &location.time {
        Some(time) => parse_wall_clock("time", time)?,
        None => chrono::Local::now().time(),
    };
    let radius = match location.radius {
        Some(radius) => radius,
        None => config.serving_policy()?.radius_at(now),
    };
    Ok(DiscoveryQuery::nearby(anchor, now, radius))
}

async fn run(cli: CliConfig) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => DiscoveryConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => DiscoveryConfig::default(),
    };

    logger::init_cli_logger(cli.verbose, config.logging.json);
    tracing::debug!("Config: {:?}", config);

    let dataset = Dataset::from_file(&cli.dataset)
        .with_context(|| format!("Failed to load dataset '{}'", cli.dataset))?;
    tracing::info!(
        "Loaded {} restaurants and {} menus from {}",
        dataset.restaurants.len(),
        dataset.menus.len(),
        cli.dataset
    );

    let sequence =
        AtomicSequenceGenerator::starting_after(RESTAURANT_SEQUENCE, dataset.max_restaurant_id());
    let service = DiscoveryService::new(
        InMemoryRestaurantStore::with_dataset(dataset),
        InMemoryCache::new(),
        sequence,
        config.discovery_settings(),
    );

    let query = match &cli.command {
        Command::Nearby(location) => build_query(location, &config)?,
        Command::Search {
            location,
            query,
            mode,
        } => build_query(location, &config)?.with_search(query.clone(), mode.search_mode()),
    };
    tracing::debug!("Query: {:?}", query);

    let restaurants = service.discover(&query).await?;
    tracing::info!("Found {} restaurants", restaurants.len());

    let rendered = match cli.format {
        OutputFormat::Json => output::restaurants_to_json(&restaurants)?,
        OutputFormat::Csv => output::restaurants_to_csv(&restaurants)?,
    };
    println!("{}", rendered);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("❌ Discovery failed: {:#}", e);
        eprintln!("❌ {:#}", e);

        let client_error = e
            .downcast_ref::<DiscoveryError>()
            .map(DiscoveryError::is_client_error)
            .unwrap_or(false);
        std::process::exit(if client_error { 2 } else { 1 });
    }
}
