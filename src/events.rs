use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::inventory::{InventoryStatus, MovementType};

/// Domain events emitted by the services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    InventoryRegistered {
        product_code: String,
    },
    StockAdjusted {
        product_code: String,
        movement_type: MovementType,
        quantity: i64,
        new_stock: i64,
        status: InventoryStatus,
    },
    InventoryRemoved {
        product_code: String,
    },
    ProductionPlanCreated {
        plan_id: String,
    },
    WorkOrderCreated {
        order_id: String,
        plan_id: Option<String>,
    },
    PurchaseCreated {
        order_id: String,
    },
    ReceiptCreated {
        receipt_id: String,
        ordering_id: String,
    },
}

/// Handle for emitting events into the processing channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {}", e))
    }

    /// Best-effort send. Event delivery never fails or back-pressures the
    /// originating operation; a full channel or dropped receiver means the
    /// event is logged and dropped.
    pub fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            warn!("event dropped: {}", e);
        }
    }
}

/// Consumes events off the channel. Spawned once from `main`.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(?event, "domain event");
    }
    info!("event channel closed, processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        // must not panic or error out
        sender.send_or_log(Event::InventoryRegistered {
            product_code: "P-1".to_string(),
        });
    }

    #[tokio::test]
    async fn send_or_log_drops_instead_of_blocking_on_a_full_channel() {
        let (tx, mut rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        sender.send_or_log(Event::InventoryRegistered {
            product_code: "P-1".to_string(),
        });
        // channel is full; this must return immediately and drop the event
        sender.send_or_log(Event::InventoryRegistered {
            product_code: "P-2".to_string(),
        });

        match rx.recv().await {
            Some(Event::InventoryRegistered { product_code }) => assert_eq!(product_code, "P-1"),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn events_round_trip_through_the_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::PurchaseCreated {
                order_id: "PO-00001".to_string(),
            })
            .await
            .unwrap();
        match rx.recv().await {
            Some(Event::PurchaseCreated { order_id }) => assert_eq!(order_id, "PO-00001"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
