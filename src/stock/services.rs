use tracing::{info, instrument, warn};

use super::repo;
use crate::db::Store;
use crate::error::{Result, StoreError};
use crate::events::StoreEvent;
use crate::stock::repo_types::{AdjustmentReceipt, SaleReceipt};

/// Records a sale and decrements stock in one transaction.
///
/// Rejects non-positive quantities, unknown products and quantities above the
/// current stock; nothing is written when it rejects.
#[instrument(skip(st))]
pub async fn record_sale(
    st: &Store,
    product_id: i64,
    quantity: i64,
    total_price: f64,
) -> Result<SaleReceipt> {
    sale_tx(st, product_id, quantity, Some(total_price)).await
}

/// Like [`record_sale`], pricing the sale at the product's current unit price.
#[instrument(skip(st))]
pub async fn sell(st: &Store, product_id: i64, quantity: i64) -> Result<SaleReceipt> {
    sale_tx(st, product_id, quantity, None).await
}

async fn sale_tx(
    st: &Store,
    product_id: i64,
    quantity: i64,
    total_price: Option<f64>,
) -> Result<SaleReceipt> {
    if quantity <= 0 {
        warn!(product_id, quantity, "sale rejected: non-positive quantity");
        return Err(StoreError::InvalidQuantity(quantity));
    }

    let mut tx = st.db.begin().await?;

    let Some((available, unit_price)) = repo::stock_and_price_tx(&mut tx, product_id).await? else {
        warn!(product_id, "sale rejected: product not found");
        return Err(StoreError::ProductNotFound(product_id));
    };
    if quantity > available || repo::apply_stock_delta_tx(&mut tx, product_id, -quantity).await? == 0 {
        warn!(product_id, quantity, available, "sale rejected: insufficient stock");
        return Err(StoreError::InsufficientStock {
            product_id,
            requested: quantity,
            available,
        });
    }

    let total_price = total_price.unwrap_or(quantity as f64 * unit_price);
    let sale = repo::insert_sale_tx(&mut tx, product_id, quantity, total_price).await?;
    tx.commit().await?;

    let stock_after = available - quantity;
    info!(sale_id = sale.id, product_id, quantity, total_price, stock_after, "sale recorded");
    st.publish(StoreEvent::SaleRecorded {
        sale_id: sale.id,
        product_id,
        quantity,
        total_price,
    });
    Ok(SaleReceipt { sale, stock_after })
}

/// Applies a signed stock change and logs it in one transaction.
///
/// Rejects a zero delta, unknown products and decreases larger than the current stock.
#[instrument(skip(st, note))]
pub async fn adjust_stock(
    st: &Store,
    product_id: i64,
    delta: i64,
    note: Option<&str>,
) -> Result<AdjustmentReceipt> {
    if delta == 0 {
        warn!(product_id, "adjustment rejected: zero change");
        return Err(StoreError::InvalidAdjustment);
    }
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    let mut tx = st.db.begin().await?;

    let Some((available, _)) = repo::stock_and_price_tx(&mut tx, product_id).await? else {
        warn!(product_id, "adjustment rejected: product not found");
        return Err(StoreError::ProductNotFound(product_id));
    };
    let Some(stock_after) = available.checked_add(delta) else {
        warn!(product_id, delta, available, "adjustment rejected: stock overflow");
        return Err(StoreError::StockOverflow { product_id, delta });
    };
    if stock_after < 0 || repo::apply_stock_delta_tx(&mut tx, product_id, delta).await? == 0 {
        warn!(product_id, delta, available, "adjustment rejected: insufficient stock");
        return Err(StoreError::InsufficientStock {
            product_id,
            requested: delta.saturating_neg(),
            available,
        });
    }

    let log = repo::insert_inventory_log_tx(&mut tx, product_id, delta, note).await?;
    tx.commit().await?;

    info!(log_id = log.id, product_id, delta, stock_after, "stock adjusted");
    st.publish(StoreEvent::StockAdjusted {
        log_id: log.id,
        product_id,
        change_qty: delta,
    });
    Ok(AdjustmentReceipt { log, stock_after })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;
    use crate::products::{get_product_by_id, get_product_by_name};

    async fn cement(st: &Store) -> i64 {
        get_product_by_name(st, "Dangote Cement").await.unwrap().unwrap().id
    }

    async fn stock_of(st: &Store, id: i64) -> i64 {
        get_product_by_id(st, id).await.unwrap().unwrap().stock
    }

    async fn count(st: &Store, table: &str) -> i64 {
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&st.db)
            .await
            .unwrap();
        n
    }

    #[tokio::test]
    async fn adjust_then_sell_moves_stock() {
        let st = test_store().await;
        let id = cement(&st).await;

        let adj = adjust_stock(&st, id, 50, Some("initial stock")).await.unwrap();
        assert_eq!(adj.stock_after, 50);
        assert_eq!(adj.log.change_qty, 50);
        assert_eq!(adj.log.note.as_deref(), Some("initial stock"));

        let receipt = sell(&st, id, 5).await.unwrap();
        assert_eq!(receipt.sale.quantity, 5);
        assert_eq!(receipt.sale.total_price, 450.0);
        assert_eq!(receipt.stock_after, 45);
        assert_eq!(stock_of(&st, id).await, 45);
    }

    #[tokio::test]
    async fn record_sale_uses_caller_total() {
        let st = test_store().await;
        let id = cement(&st).await;
        adjust_stock(&st, id, 10, None).await.unwrap();

        let receipt = record_sale(&st, id, 2, 170.0).await.unwrap();
        assert_eq!(receipt.sale.total_price, 170.0);
        assert_eq!(stock_of(&st, id).await, 8);
        assert_eq!(count(&st, "sales").await, 1);
    }

    #[tokio::test]
    async fn oversell_is_rejected_without_writing() {
        let st = test_store().await;
        let id = cement(&st).await;
        adjust_stock(&st, id, 3, None).await.unwrap();

        let err = record_sale(&st, id, 4, 360.0).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock { requested: 4, available: 3, .. }
        ));
        assert_eq!(stock_of(&st, id).await, 3);
        assert_eq!(count(&st, "sales").await, 0);
    }

    #[tokio::test]
    async fn non_positive_sale_quantity_is_rejected() {
        let st = test_store().await;
        let id = cement(&st).await;
        assert!(matches!(sell(&st, id, 0).await, Err(StoreError::InvalidQuantity(0))));
        assert!(matches!(sell(&st, id, -2).await, Err(StoreError::InvalidQuantity(-2))));
    }

    #[tokio::test]
    async fn sale_of_unknown_product_is_rejected() {
        let st = test_store().await;
        let err = sell(&st, 4_242, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::ProductNotFound(4_242)));
        assert!(err.is_rejection());
        assert_eq!(count(&st, "sales").await, 0);
    }

    #[tokio::test]
    async fn negative_adjustment_past_zero_is_rejected() {
        let st = test_store().await;
        let id = cement(&st).await;
        adjust_stock(&st, id, 5, None).await.unwrap();

        let err = adjust_stock(&st, id, -6, Some("breakage")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock { requested: 6, available: 5, .. }
        ));
        assert_eq!(stock_of(&st, id).await, 5);
        assert_eq!(count(&st, "inventory_logs").await, 1);

        let ok = adjust_stock(&st, id, -5, Some("breakage")).await.unwrap();
        assert_eq!(ok.stock_after, 0);
    }

    #[tokio::test]
    async fn extreme_adjustments_are_rejected_without_panicking() {
        let st = test_store().await;
        let id = cement(&st).await;
        adjust_stock(&st, id, 1, None).await.unwrap();

        let err = adjust_stock(&st, id, i64::MAX, None).await.unwrap_err();
        assert!(matches!(err, StoreError::StockOverflow { delta: i64::MAX, .. }));
        assert!(err.is_rejection());

        let err = adjust_stock(&st, id, i64::MIN, None).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientStock { requested: i64::MAX, available: 1, .. }
        ));

        assert_eq!(stock_of(&st, id).await, 1);
        assert_eq!(count(&st, "inventory_logs").await, 1);
    }

    #[tokio::test]
    async fn zero_adjustment_is_rejected() {
        let st = test_store().await;
        let id = cement(&st).await;
        assert!(matches!(
            adjust_stock(&st, id, 0, None).await,
            Err(StoreError::InvalidAdjustment)
        ));
    }

    #[tokio::test]
    async fn blank_note_is_stored_as_null() {
        let st = test_store().await;
        let id = cement(&st).await;
        let adj = adjust_stock(&st, id, 1, Some("   ")).await.unwrap();
        assert_eq!(adj.log.note, None);
    }

    #[tokio::test]
    async fn mutations_publish_events() {
        let st = test_store().await;
        let id = cement(&st).await;
        let mut events = st.subscribe();

        let adj = adjust_stock(&st, id, 4, None).await.unwrap();
        let receipt = sell(&st, id, 1).await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::StockAdjusted { log_id: adj.log.id, product_id: id, change_qty: 4 }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::SaleRecorded {
                sale_id: receipt.sale.id,
                product_id: id,
                quantity: 1,
                total_price: 90.0,
            }
        );
    }

    #[tokio::test]
    async fn guarded_sequence_never_goes_negative() {
        let st = test_store().await;
        let id = cement(&st).await;
        let steps: [(bool, i64); 8] = [
            (false, 7),
            (true, 3),
            (true, 5),
            (false, -2),
            (true, 2),
            (false, -3),
            (true, 1),
            (false, 4),
        ];
        for (is_sale, n) in steps {
            let _ = if is_sale {
                sell(&st, id, n).await.map(|r| r.stock_after)
            } else {
                adjust_stock(&st, id, n, None).await.map(|r| r.stock_after)
            };
            assert!(stock_of(&st, id).await >= 0);
        }
    }
}
