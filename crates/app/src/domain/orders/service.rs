//! Orders service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::domain::{
    carts::records::CartOwner,
    orders::{
        errors::OrdersServiceError,
        records::{OrderRecord, OrderUuid},
        repository::MemOrdersRepository,
        status::{FulfillmentStatus, OrderStatus, PaymentStatus},
    },
};

#[derive(Debug, Clone, Default)]
pub struct MemOrdersService {
    repository: MemOrdersRepository,
}

impl MemOrdersService {
    #[must_use]
    pub(crate) fn new(repository: MemOrdersRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl OrdersService for MemOrdersService {
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        self.repository
            .get(order)
            .await
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn list_orders(&self, owner: CartOwner) -> Vec<OrderRecord> {
        self.repository.list_by_owner(owner).await
    }

    async fn transition_order(
        &self,
        order: OrderUuid,
        to: OrderStatus,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let result = self
            .repository
            .update(order, |record| {
                if !record.status.can_transition(to) {
                    return Err(OrdersServiceError::InvalidStateTransition {
                        from: record.status,
                        to,
                    });
                }

                record.status = to;
                record.updated_at = now;

                match to {
                    OrderStatus::Shipped => record.fulfillment_status = FulfillmentStatus::Shipped,
                    OrderStatus::Delivered => {
                        record.fulfillment_status = FulfillmentStatus::Delivered;
                    }
                    _ => {}
                }

                Ok(record.clone())
            })
            .await
            .ok_or(OrdersServiceError::NotFound)?;

        let record = result?;

        info!(order_uuid = %order, status = ?to, "order status changed");

        Ok(record)
    }

    async fn record_payment(
        &self,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let result = self
            .repository
            .update(order, |record| {
                if !record.payment_status.can_transition(PaymentStatus::Paid) {
                    return Err(OrdersServiceError::InvalidPaymentTransition {
                        from: record.payment_status,
                        to: PaymentStatus::Paid,
                    });
                }

                record.payment_status = PaymentStatus::Paid;
                record.updated_at = now;

                Ok(record.clone())
            })
            .await
            .ok_or(OrdersServiceError::NotFound)?;

        Ok(result?)
    }

    async fn record_refund(
        &self,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let result = self
            .repository
            .update(order, |record| {
                if !record
                    .payment_status
                    .can_transition(PaymentStatus::Refunded)
                {
                    return Err(OrdersServiceError::InvalidPaymentTransition {
                        from: record.payment_status,
                        to: PaymentStatus::Refunded,
                    });
                }

                record.payment_status = PaymentStatus::Refunded;

                // The order status follows when the machine allows it;
                // refunding a cancelled order only touches payment state.
                if record.status.can_transition(OrderStatus::Refunded) {
                    record.status = OrderStatus::Refunded;
                }

                record.updated_at = now;

                Ok(record.clone())
            })
            .await
            .ok_or(OrdersServiceError::NotFound)?;

        Ok(result?)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// All orders for an owner, oldest first.
    async fn list_orders(&self, owner: CartOwner) -> Vec<OrderRecord>;

    /// Guarded status transition, rejected when the state machine forbids
    /// it. The fulfillment service drives `Processing`/`Shipped`/
    /// `Delivered` through this.
    async fn transition_order(
        &self,
        order: OrderUuid,
        to: OrderStatus,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Marks the order paid.
    async fn record_payment(
        &self,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Marks the order refunded, moving the order status along when legal.
    async fn record_refund(
        &self,
        order: OrderUuid,
        now: Timestamp,
    ) -> Result<OrderRecord, OrdersServiceError>;
}
