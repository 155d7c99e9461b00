use time::macros::format_description;
use time::{Date, Duration, PrimitiveDateTime};
use tracing::{debug, info, instrument};

use super::repo;
use crate::db::Store;
use crate::error::Result;
use crate::reports::dto::{
    AdjustmentStats, DashboardSummary, LogFilter, StockStatusFilter, StockStatusRow, YearMonth,
};
use crate::reports::repo_types::{
    CategorySales, CategoryStock, CurrentStock, ExportSale, HistoryEntry, ProductSales,
    RecentInventoryLog, RecentSale, StockReportRow,
};

pub const DEFAULT_RECENT_SALES: i64 = 20;
pub const DEFAULT_RECENT_LOGS: i64 = 50;

fn day_key(day: Date) -> String {
    day.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| day.to_string())
}

fn year_key(year: i32) -> String {
    format!("{year:04}")
}

fn timestamp_key(ts: PrimitiveDateTime) -> String {
    ts.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ))
    .unwrap_or_else(|_| ts.to_string())
}

/// Per-product totals for one calendar day (UTC), highest revenue first. Empty when nothing sold.
#[instrument(skip(st))]
pub async fn daily_sales(st: &Store, day: Date) -> Result<Vec<ProductSales>> {
    let rows = repo::sales_by_product_on(&st.db, &day_key(day)).await?;
    info!(rows = rows.len(), "daily sales fetched");
    Ok(rows)
}

#[instrument(skip(st, month), fields(month = %month))]
pub async fn monthly_sales(st: &Store, month: YearMonth) -> Result<Vec<CategorySales>> {
    let rows = repo::sales_by_category_in_month(&st.db, &month.to_string()).await?;
    info!(rows = rows.len(), "monthly sales fetched");
    Ok(rows)
}

#[instrument(skip(st))]
pub async fn yearly_sales(st: &Store, year: i32) -> Result<Vec<CategorySales>> {
    let rows = repo::sales_by_category_in_year(&st.db, &year_key(year)).await?;
    info!(rows = rows.len(), "yearly sales fetched");
    Ok(rows)
}

#[instrument(skip(st))]
pub async fn yearly_product_sales(st: &Store, year: i32) -> Result<Vec<ProductSales>> {
    let rows = repo::sales_by_product_in_year(&st.db, &year_key(year)).await?;
    info!(rows = rows.len(), "yearly product sales fetched");
    Ok(rows)
}

pub async fn stock_report(st: &Store) -> Result<Vec<StockReportRow>> {
    let rows = repo::stock_report(&st.db).await?;
    debug!(rows = rows.len(), "stock report fetched");
    Ok(rows)
}

pub async fn current_stocks(st: &Store) -> Result<Vec<CurrentStock>> {
    let rows = repo::current_stocks(&st.db).await?;
    debug!(rows = rows.len(), "current stocks fetched");
    Ok(rows)
}

/// Stock report rows under the configured per-category threshold.
pub async fn low_stock_items(st: &Store) -> Result<Vec<StockReportRow>> {
    let policy = st.config.low_stock;
    let rows = repo::stock_report(&st.db)
        .await?
        .into_iter()
        .filter(|r| policy.is_low(&r.category, r.stock))
        .collect::<Vec<_>>();
    debug!(rows = rows.len(), "low stock items");
    Ok(rows)
}

/// Current stock with its status, filtered by name substring and status. Ordered by name.
#[instrument(skip(st))]
pub async fn stock_statuses(
    st: &Store,
    filter: &StockStatusFilter,
) -> Result<Vec<StockStatusRow>> {
    let search = non_blank(&filter.search).map(str::to_lowercase);
    let rows = repo::current_stocks(&st.db)
        .await?
        .into_iter()
        .filter(|r| {
            search
                .as_deref()
                .map_or(true, |s| r.name.to_lowercase().contains(s))
        })
        .filter(|r| filter.status.map_or(true, |status| status.matches(r.stock)))
        .map(StockStatusRow::from)
        .collect::<Vec<_>>();
    debug!(rows = rows.len(), "stock statuses fetched");
    Ok(rows)
}

/// Total stock and product count per category, ordered by category.
pub async fn stock_by_category(st: &Store) -> Result<Vec<CategoryStock>> {
    let rows = repo::stock_by_category(&st.db).await?;
    debug!(rows = rows.len(), "stock by category fetched");
    Ok(rows)
}

pub async fn recent_sales(st: &Store, limit: i64) -> Result<Vec<RecentSale>> {
    let rows = repo::recent_sales(&st.db, limit).await?;
    debug!(rows = rows.len(), limit, "recent sales fetched");
    Ok(rows)
}

pub async fn recent_inventory_logs(st: &Store, limit: i64) -> Result<Vec<RecentInventoryLog>> {
    let rows = repo::recent_inventory_logs(&st.db, limit).await?;
    debug!(rows = rows.len(), limit, "recent inventory logs fetched");
    Ok(rows)
}

/// Adjustment history in the filter's window (relative to `now`, UTC), newest first.
#[instrument(skip(st))]
pub async fn inventory_log_history(
    st: &Store,
    filter: &LogFilter,
    now: PrimitiveDateTime,
) -> Result<Vec<RecentInventoryLog>> {
    let since = filter.period.start(now).map(timestamp_key);
    let search = non_blank(&filter.search);
    let rows = repo::inventory_logs_filtered(&st.db, since.as_deref(), search).await?;
    info!(rows = rows.len(), "inventory log history fetched");
    Ok(rows)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Sales (as negative changes) and adjustments of one product, newest first.
#[instrument(skip(st))]
pub async fn product_history(st: &Store, product_id: i64) -> Result<Vec<HistoryEntry>> {
    let rows = repo::product_history(&st.db, product_id).await?;
    info!(rows = rows.len(), "product history fetched");
    Ok(rows)
}

pub async fn sales_for_export(st: &Store) -> Result<Vec<ExportSale>> {
    let rows = repo::sales_for_export(&st.db).await?;
    info!(rows = rows.len(), "sales fetched for export");
    Ok(rows)
}

/// Headline figures for the dashboard, relative to `today` (UTC).
#[instrument(skip(st))]
pub async fn dashboard_summary(st: &Store, today: Date) -> Result<DashboardSummary> {
    let day = daily_sales(st, today).await?;
    let month = monthly_sales(st, YearMonth::from(today)).await?;
    let year = yearly_product_sales(st, today.year()).await?;
    let stock = stock_report(st).await?;
    let by_category = stock_by_category(st).await?;
    let policy = st.config.low_stock;

    Ok(DashboardSummary {
        today_revenue: day.iter().map(|r| r.total_amount).sum(),
        today_quantity: day.iter().map(|r| r.total_qty).sum(),
        month_revenue: month.iter().map(|r| r.total_amount).sum(),
        year_revenue: year.iter().map(|r| r.total_amount).sum(),
        product_count: stock.len(),
        total_stock_value: stock.iter().map(|r| r.stock_value).sum(),
        low_stock_count: stock.iter().filter(|r| policy.is_low(&r.category, r.stock)).count(),
        stock_by_category: by_category,
    })
}

/// Adjustment counts relative to `now` (UTC) and the most frequently adjusted product.
///
/// `last_7_days` counts logs whose age in whole days is at most 7.
#[instrument(skip(st))]
pub async fn adjustment_stats(st: &Store, now: PrimitiveDateTime) -> Result<AdjustmentStats> {
    let cutoff = timestamp_key(now - Duration::days(8));
    Ok(AdjustmentStats {
        total: repo::adjustment_count(&st.db).await?,
        last_7_days: repo::adjustments_after(&st.db, &cutoff).await?,
        today: repo::adjustments_on(&st.db, &day_key(now.date())).await?,
        most_adjusted: repo::most_adjusted_product(&st.db).await?,
    })
}
