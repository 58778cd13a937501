//! # Order Notifications
//!
//! Confirmation messages sent after an order commits.
//!
//! ```text
//! handler ──► place_order ──► COMMIT ──► 201 to client
//!                                │
//!                                └──► tokio::spawn(notifier.order_confirmed)
//!                                          │
//!                                          └── Err → warn!, nothing else
//! ```
//!
//! Delivery is best effort: the order is already committed and the client
//! already has its response, so a failing notifier only produces a log line.
//! SMTP delivery lives outside this service; [`LogNotifier`] records what
//! would be sent.

use std::sync::Arc;

use async_trait::async_trait;
use boutique_core::Order;
use tracing::{info, warn};

/// Notification error types.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// A rendered order confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub order_id: String,
}

impl OrderConfirmation {
    pub fn for_order(order: &Order, from: &str, to: &str) -> Self {
        let body = format!(
            "Merci pour votre commande !\n\n\
             Numéro de commande : {}\n\
             Montant total : {}\n\
             Date : {}\n\
             Statut : {}\n",
            order.order_number,
            order.total(),
            order.created_at.format("%d/%m/%Y %H:%M"),
            order.status,
        );

        OrderConfirmation {
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("Confirmation de votre commande {}", order.order_number),
            body,
            order_id: order.id.clone(),
        }
    }
}

/// Collaborator that delivers order confirmations.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_confirmed(&self, confirmation: &OrderConfirmation) -> Result<(), NotifyError>;
}

/// Writes confirmations to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn order_confirmed(&self, confirmation: &OrderConfirmation) -> Result<(), NotifyError> {
        if !confirmation.to.contains('@') {
            return Err(NotifyError::InvalidRecipient(confirmation.to.clone()));
        }

        info!(
            order_id = %confirmation.order_id,
            from = %confirmation.from,
            to = %confirmation.to,
            subject = %confirmation.subject,
            "Order confirmation issued"
        );
        Ok(())
    }
}

/// Sends the confirmation for `order` on a detached task.
///
/// Returns the task handle so tests can wait for it; handlers drop it.
pub fn spawn_confirmation(
    notifier: Arc<dyn OrderNotifier>,
    order: &Order,
    from: &str,
    to: &str,
) -> tokio::task::JoinHandle<()> {
    let confirmation = OrderConfirmation::for_order(order, from, to);

    tokio::spawn(async move {
        if let Err(e) = notifier.order_confirmed(&confirmation).await {
            warn!(
                order_id = %confirmation.order_id,
                to = %confirmation.to,
                error = %e,
                "Order confirmation failed"
            );
        }
    })
}
