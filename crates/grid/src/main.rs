//! Vitrine operator CLI.
//!
//! Runs catalog listings and the admin product grid against the configured
//! database and prints the results as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vitrine_grid::config::Config;
use vitrine_grid::db;
use vitrine_grid::filter::{FilterRegistry, FilterRule, FilterValue};
use vitrine_grid::grid::QueryGridState;
use vitrine_grid::product::{
    ADMIN_PRODUCT_GRID_ID, OrderingMode, ProductListQuery, ProductRepository, admin_product_grid,
};

#[derive(Parser, Debug)]
#[command(name = "vitrine", version, about = "Catalog grid and listing queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the database connection
    Health,
    /// Print one page of a storefront category listing
    Products {
        #[arg(long)]
        domain: i64,
        #[arg(long)]
        category: i64,
        #[arg(long, default_value = "en")]
        locale: String,
        #[arg(long = "pricing-group")]
        pricing_group: i64,
        /// name_asc, name_desc, price_asc or price_desc
        #[arg(long, default_value = "name_asc")]
        order: String,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long)]
        limit: Option<u64>,
        /// Filter rule as field:operator[:value], repeatable
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Run the admin product grid from request-style parameters
    Grid {
        #[arg(long, default_value = "en")]
        locale: String,
        /// URL query string, e.g. "q[product_list][order]=-price"
        #[arg(long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;
    let database = db::create_pool(&config).await?;

    match cli.command {
        Commands::Health => {
            if db::check_health(&database).await {
                tracing::info!("database connection healthy");
            } else {
                anyhow::bail!("database health check failed");
            }
        }
        Commands::Products {
            domain,
            category,
            locale,
            pricing_group,
            order,
            page,
            limit,
            filters,
        } => {
            let registry = Arc::new(FilterRegistry::with_product_filters()?);
            let repository = ProductRepository::new(database.backend(&config), registry);

            let query = ProductListQuery {
                domain_id: domain,
                locale,
                ordering: order.parse::<OrderingMode>()?,
                page,
                limit: limit.unwrap_or(config.grid_default_limit),
                category_id: category,
                pricing_group_id: pricing_group,
                filter_rules: filters
                    .iter()
                    .map(|raw| parse_filter_arg(raw))
                    .collect::<Result<_>>()?,
            };

            tracing::info!(domain, category, ordering = %query.ordering, "running category listing");
            let result = repository.pagination_result_in_category(&query).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Grid { locale, query } => {
            let registry = Arc::new(FilterRegistry::with_product_filters()?);
            let mut grid = admin_product_grid(registry, &locale)?;
            grid.set_default_limit(config.grid_default_limit)?;

            let state = QueryGridState::from_query_string(ADMIN_PRODUCT_GRID_ID, &query)?;
            tracing::info!(grid = ADMIN_PRODUCT_GRID_ID, page = state.page(), "running grid");

            let backend = database.backend(&config);
            let result = grid.execute(backend.as_ref(), &state).await?;
            let view = grid.create_view(&state, result);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

/// Parse `field:operator[:value]`.
fn parse_filter_arg(raw: &str) -> Result<FilterRule> {
    let mut parts = raw.splitn(3, ':');
    let (Some(field), Some(operator)) = (parts.next(), parts.next()) else {
        anyhow::bail!("filter '{raw}' must look like field:operator[:value]");
    };
    let value = parts
        .next()
        .filter(|v| !v.is_empty())
        .map(|v| FilterValue::String(v.to_string()));

    Ok(FilterRule::new(field, operator.parse()?, value))
}

/// Initialize tracing subscriber with environment filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
