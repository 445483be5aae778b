//! Real-time order notifications
//!
//! The reconciliation engine emits through the [`OrderNotifier`] capability
//! held by the application state. It is injected at construction, never a
//! module-level global, so tests substitute a recording fake and multiple
//! instances never share broadcast state.
//!
//! Emission is fire-and-forget: a failed broadcast is logged and swallowed,
//! it never rolls back a confirmed payment.

use async_trait::async_trait;
use shared::{NEW_ONLINE_ORDER, OrderNotification};
use socketioxide::SocketIo;
use socketioxide::extract::SocketRef;

/// Publisher capability used by the reconciliation engine
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn notify_new_order(&self, notification: &OrderNotification);
}

/// Broadcasts `new_online_order` to every connected desktop client
#[derive(Clone)]
pub struct SocketIoNotifier {
    io: SocketIo,
}

impl SocketIoNotifier {
    pub fn new(io: SocketIo) -> Self {
        Self { io }
    }
}

#[async_trait]
impl OrderNotifier for SocketIoNotifier {
    async fn notify_new_order(&self, notification: &OrderNotification) {
        match self.io.emit(NEW_ONLINE_ORDER, notification).await {
            Ok(_) => {
                tracing::info!(
                    order_id = %notification.order_id,
                    total = notification.total_amount,
                    "Order notification sent to desktop clients"
                );
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %notification.order_id,
                    error = %e,
                    "Failed to broadcast order notification"
                );
            }
        }
    }
}

/// Register connection handlers on the root namespace
pub fn attach_handlers(io: &SocketIo) {
    io.ns("/", async |socket: SocketRef| {
        tracing::info!(sid = %socket.id, "Desktop client connected");
        socket.on_disconnect(async |socket: SocketRef| {
            tracing::info!(sid = %socket.id, "Desktop client disconnected");
        });
    });
}
