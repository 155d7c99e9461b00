//! Command line front end over the store.
//!
//! Every command opens the store (creating and seeding it on first use), runs
//! one operation and prints the result as JSON, or tab-separated with `--table`.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use time::{OffsetDateTime, PrimitiveDateTime};

use blockpos::forms::{
    parse_date, parse_month, parse_year, AdjustmentForm, LoginForm, ProductForm, SaleForm,
};
use blockpos::products::ProductFilter;
use blockpos::reports::{
    self, LogFilter, LogPeriod, StockStatus, StockStatusFilter, Tabular, DEFAULT_RECENT_LOGS,
    DEFAULT_RECENT_SALES,
};
use blockpos::{auth, products, stock, AppConfig, Store};

#[derive(Parser)]
#[command(name = "blockpos")]
#[command(about = "Blocks and cement point-of-sale store")]
#[command(version)]
struct Cli {
    /// Database URL (overrides DATABASE_URL)
    #[arg(long)]
    db_url: Option<String>,

    /// Print rows tab-separated instead of JSON
    #[arg(long, global = true)]
    table: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema and seed data if missing
    Init,

    /// Check a username and password
    Login {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long, env = "BLOCKPOS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List products ordered by name
    Products {
        /// Name substring, case-insensitive
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show one product by id or name
    Product {
        #[arg(long, conflicts_with = "name")]
        id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Add a product with zero stock
    AddProduct {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },

    /// Replace a product's name, category, type and price
    UpdateProduct {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },

    /// Delete a product (its history is kept)
    DeleteProduct { id: i64 },

    /// Sell a quantity of a product at its unit price
    Sell {
        product_id: i64,
        #[arg(short, long)]
        quantity: Option<String>,
    },

    /// Apply a signed stock change
    Adjust {
        product_id: i64,
        #[arg(short, long, allow_hyphen_values = true)]
        quantity: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Stock movements of one product, newest first
    History { product_id: i64 },

    /// Most recent sales
    RecentSales {
        #[arg(short, long, default_value_t = DEFAULT_RECENT_SALES)]
        limit: i64,
    },

    /// Most recent inventory adjustments
    RecentLogs {
        #[arg(short, long, default_value_t = DEFAULT_RECENT_LOGS)]
        limit: i64,
    },

    /// Inventory adjustment history
    Logs {
        #[arg(short, long, value_enum, default_value_t = PeriodArg::All)]
        period: PeriodArg,
        /// Product name or note substring, case-insensitive
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Sales and inventory reports
    Report {
        #[command(subcommand)]
        report: ReportCommands,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Sales for one day (YYYY-MM-DD, default today)
    Daily { date: Option<String> },
    /// Sales for one month (YYYY-MM, default this month)
    Monthly { month: Option<String> },
    /// Sales for one year by category (YYYY, default this year)
    Yearly { year: Option<String> },
    /// Sales for one year by product (YYYY, default this year)
    YearlyProducts { year: Option<String> },
    /// Stock and stock value per product
    Stock,
    /// Current stock levels
    CurrentStock,
    /// Current stock with out-of-stock / low / normal status
    StockStatus {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Total stock per category
    CategoryStock,
    /// Products under their low-stock threshold
    LowStock,
    /// Full sales history
    Export,
    /// Headline figures for today
    Dashboard,
    /// Adjustment counts and most adjusted product
    Adjustments,
}

#[derive(Clone, Copy, ValueEnum)]
enum PeriodArg {
    All,
    Today,
    Week,
    Month,
}

impl From<PeriodArg> for LogPeriod {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::All => LogPeriod::AllTime,
            PeriodArg::Today => LogPeriod::Today,
            PeriodArg::Week => LogPeriod::ThisWeek,
            PeriodArg::Month => LogPeriod::ThisMonth,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Out,
    Low,
    Normal,
}

impl From<StatusArg> for StockStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Out => StockStatus::OutOfStock,
            StatusArg::Low => StockStatus::LowStock,
            StatusArg::Normal => StockStatus::Normal,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "blockpos=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.db_url.clone() {
        config.database_url = url;
    }

    let store = Store::open(config).await.context("open store")?;
    let result = run(&store, cli.command, cli.table).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }
    store.close().await;
    result
}

async fn run(st: &Store, command: Commands, table: bool) -> anyhow::Result<()> {
    match command {
        Commands::Init => print_json(&serde_json::json!({ "status": "ready" })),
        Commands::Login { username, password } => {
            let (username, password) = LoginForm { username, password }.validate()?;
            let ok = auth::authenticate(st, &username, &password).await?;
            print_json(&serde_json::json!({ "username": username, "authenticated": ok }))?;
            if !ok {
                anyhow::bail!("invalid username or password");
            }
            Ok(())
        }
        Commands::Products { search, category } => {
            let filter = ProductFilter { search, category };
            emit(&products::search_products(st, &filter).await?, table)
        }
        Commands::Product { id, name } => {
            let product = match (id, name) {
                (Some(id), _) => products::get_product_by_id(st, id).await?,
                (None, Some(name)) => products::get_product_by_name(st, &name).await?,
                (None, None) => anyhow::bail!("pass --id or --name"),
            };
            let product = product.context("product not found")?;
            emit(std::slice::from_ref(&product), table)
        }
        Commands::AddProduct {
            name,
            category,
            kind,
            price,
        } => {
            let input = ProductForm {
                name,
                category,
                kind,
                unit_price: price,
            }
            .validate()?;
            let id = products::add_product(st, &input).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Commands::UpdateProduct {
            id,
            name,
            category,
            kind,
            price,
        } => {
            products::get_product_by_id(st, id)
                .await?
                .context("product not found")?;
            let input = ProductForm {
                name,
                category,
                kind,
                unit_price: price,
            }
            .validate()?;
            products::update_product(st, id, &input).await?;
            print_json(&serde_json::json!({ "id": id, "updated": true }))
        }
        Commands::DeleteProduct { id } => {
            products::get_product_by_id(st, id)
                .await?
                .context("product not found")?;
            products::delete_product(st, id).await?;
            print_json(&serde_json::json!({ "id": id, "deleted": true }))
        }
        Commands::Sell {
            product_id,
            quantity,
        } => {
            let product = products::get_product_by_id(st, product_id)
                .await?
                .context("product not found")?;
            let req = SaleForm {
                product_id: Some(product_id),
                quantity,
            }
            .validate(&product)?;
            let receipt = stock::record_sale(st, req.product_id, req.quantity, req.total_price).await?;
            print_json(&receipt)
        }
        Commands::Adjust {
            product_id,
            quantity,
            note,
        } => {
            let product = products::get_product_by_id(st, product_id)
                .await?
                .context("product not found")?;
            let req = AdjustmentForm {
                product_id: Some(product_id),
                quantity,
                note,
            }
            .validate(&product)?;
            let receipt =
                stock::adjust_stock(st, req.product_id, req.delta, req.note.as_deref()).await?;
            print_json(&receipt)
        }
        Commands::History { product_id } => {
            emit(&reports::product_history(st, product_id).await?, table)
        }
        Commands::RecentSales { limit } => emit(&reports::recent_sales(st, limit).await?, table),
        Commands::RecentLogs { limit } => {
            emit(&reports::recent_inventory_logs(st, limit).await?, table)
        }
        Commands::Logs { period, search } => {
            let filter = LogFilter {
                period: period.into(),
                search,
            };
            let now = OffsetDateTime::now_utc();
            let now = PrimitiveDateTime::new(now.date(), now.time());
            emit(&reports::inventory_log_history(st, &filter, now).await?, table)
        }
        Commands::Report { report } => run_report(st, report, table).await,
    }
}

async fn run_report(st: &Store, report: ReportCommands, table: bool) -> anyhow::Result<()> {
    let now = OffsetDateTime::now_utc();
    let today = now.date();
    match report {
        ReportCommands::Daily { date } => {
            let day = date.as_deref().map(parse_date).transpose()?.unwrap_or(today);
            emit(&reports::daily_sales(st, day).await?, table)
        }
        ReportCommands::Monthly { month } => {
            let month = month
                .as_deref()
                .map(parse_month)
                .transpose()?
                .unwrap_or_else(|| today.into());
            emit(&reports::monthly_sales(st, month).await?, table)
        }
        ReportCommands::Yearly { year } => {
            let year = year.as_deref().map(parse_year).transpose()?.unwrap_or(today.year());
            emit(&reports::yearly_sales(st, year).await?, table)
        }
        ReportCommands::YearlyProducts { year } => {
            let year = year.as_deref().map(parse_year).transpose()?.unwrap_or(today.year());
            emit(&reports::yearly_product_sales(st, year).await?, table)
        }
        ReportCommands::Stock => emit(&reports::stock_report(st).await?, table),
        ReportCommands::CurrentStock => emit(&reports::current_stocks(st).await?, table),
        ReportCommands::StockStatus { search, status } => {
            let filter = StockStatusFilter {
                search,
                status: status.map(StockStatus::from),
            };
            emit(&reports::stock_statuses(st, &filter).await?, table)
        }
        ReportCommands::CategoryStock => emit(&reports::stock_by_category(st).await?, table),
        ReportCommands::LowStock => emit(&reports::low_stock_items(st).await?, table),
        ReportCommands::Export => emit(&reports::sales_for_export(st).await?, table),
        ReportCommands::Dashboard => print_json(&reports::dashboard_summary(st, today).await?),
        ReportCommands::Adjustments => {
            let now = PrimitiveDateTime::new(now.date(), now.time());
            print_json(&reports::adjustment_stats(st, now).await?)
        }
    }
}

fn emit<T: Serialize + Tabular>(rows: &[T], table: bool) -> anyhow::Result<()> {
    if !table {
        return print_json(&rows);
    }
    let (headers, cells) = reports::to_table(rows);
    println!("{}", headers.join("\t"));
    for row in cells {
        println!("{}", row.join("\t"));
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
