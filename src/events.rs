use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Published after a mutation has been committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    ProductAdded { product_id: i64 },
    ProductUpdated { product_id: i64 },
    ProductDeleted { product_id: i64 },
    SaleRecorded {
        sale_id: i64,
        product_id: i64,
        quantity: i64,
        total_price: f64,
    },
    StockAdjusted {
        log_id: i64,
        product_id: i64,
        change_qty: i64,
    },
}

impl StoreEvent {
    pub fn product_id(&self) -> i64 {
        match self {
            StoreEvent::ProductAdded { product_id }
            | StoreEvent::ProductUpdated { product_id }
            | StoreEvent::ProductDeleted { product_id }
            | StoreEvent::SaleRecorded { product_id, .. }
            | StoreEvent::StockAdjusted { product_id, .. } => *product_id,
        }
    }
}

/// Fan-out of store events to any number of views.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: StoreEvent) {
        // Err only means nobody is listening.
        match self.tx.send(event) {
            Ok(n) => trace!(receivers = n, "store event published"),
            Err(broadcast::error::SendError(ev)) => trace!(event = ?ev, "store event dropped, no subscribers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_each_event() {
        let bus = EventBus::new(8);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(StoreEvent::ProductAdded { product_id: 7 });

        assert_eq!(a.recv().await.unwrap(), StoreEvent::ProductAdded { product_id: 7 });
        assert_eq!(b.recv().await.unwrap().product_id(), 7);
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        let bus = EventBus::new(0);
        bus.publish(StoreEvent::ProductDeleted { product_id: 1 });
    }
}
