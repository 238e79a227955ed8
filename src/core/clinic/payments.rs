//! Payment operations
//!
//! Every payment write goes through the workflow engine, which moves the
//! linked appointment along with it.

use super::ClinicCoordinator;
use crate::adapters::database::{PaymentFilter, StoreTransaction};
use crate::core::validation::validate_payment;
use crate::core::workflow::{
    self, DeletePayment, RecordPayment, RevisePayment, SettlePayment, WorkflowOutcome,
};
use crate::domain::{
    ClinicError, EntityKind, Payment, PaymentDraft, PaymentId, PaymentInput, Result,
};

impl ClinicCoordinator {
    pub async fn list_payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let mut tx = self.store.begin().await?;
        let result = tx.list_payments(filter).await;
        self.finish("list payments", tx, result).await
    }

    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment> {
        let mut tx = self.store.begin().await?;
        let result = existing_payment(tx.as_mut(), id).await;
        self.finish("get payment", tx, result).await
    }

    /// Record a payment; the status defaults to Unpaid
    pub async fn create_payment(&self, input: &PaymentInput) -> Result<Payment> {
        let mut tx = self.store.begin().await?;
        let result = record(tx.as_mut(), input).await;
        let payment = self.finish("record payment", tx, result).await?;

        tracing::info!(
            payment_id = %payment.id,
            appointment_id = %payment.appointment_id,
            status = %payment.status,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Edit a payment; an omitted status keeps the stored one
    pub async fn update_payment(&self, id: PaymentId, input: &PaymentInput) -> Result<Payment> {
        let mut tx = self.store.begin().await?;
        let result = revise(tx.as_mut(), id, input).await;
        let payment = self.finish("update payment", tx, result).await?;

        tracing::info!(payment_id = %id, status = %payment.status, "Payment updated");
        Ok(payment)
    }

    /// Same as an update that only sets the status to Paid
    pub async fn mark_paid(&self, id: PaymentId) -> Result<Payment> {
        let mut tx = self.store.begin().await?;
        let result = settle(tx.as_mut(), id).await;
        let payment = self.finish("mark payment paid", tx, result).await?;

        tracing::info!(payment_id = %id, "Payment marked paid");
        Ok(payment)
    }

    pub async fn delete_payment(&self, id: PaymentId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        let result = remove(tx.as_mut(), id).await;
        self.finish("delete payment", tx, result).await?;

        tracing::info!(payment_id = %id, "Payment deleted");
        Ok(())
    }
}

async fn existing_payment(tx: &mut dyn StoreTransaction, id: PaymentId) -> Result<Payment> {
    tx.get_payment(id)
        .await?
        .ok_or_else(|| ClinicError::not_found(EntityKind::Payment, id))
}

/// The payment written by a record, revise or settle command
fn written(outcome: WorkflowOutcome) -> Result<Payment> {
    outcome.payment.ok_or_else(|| {
        ClinicError::Other(format!(
            "{} finished without a payment record",
            outcome.plan.operation
        ))
    })
}

async fn record(tx: &mut dyn StoreTransaction, input: &PaymentInput) -> Result<Payment> {
    let validated = validate_payment(tx, input, None).await?;
    let draft = PaymentDraft {
        appointment_id: validated.appointment_id,
        amount: validated.amount,
        method: validated.method,
        status: validated.requested_status.unwrap_or_default(),
    };
    written(workflow::execute(tx, RecordPayment { draft }.into()).await?)
}

async fn revise(
    tx: &mut dyn StoreTransaction,
    id: PaymentId,
    input: &PaymentInput,
) -> Result<Payment> {
    let current = existing_payment(tx, id).await?;
    let validated = validate_payment(tx, input, Some(&current)).await?;
    let draft = PaymentDraft {
        appointment_id: validated.appointment_id,
        amount: validated.amount,
        method: validated.method,
        status: validated.requested_status.unwrap_or(current.status),
    };
    written(workflow::execute(tx, RevisePayment { current, draft }.into()).await?)
}

async fn settle(tx: &mut dyn StoreTransaction, id: PaymentId) -> Result<Payment> {
    let current = existing_payment(tx, id).await?;
    written(workflow::execute(tx, SettlePayment { current }.into()).await?)
}

async fn remove(tx: &mut dyn StoreTransaction, id: PaymentId) -> Result<()> {
    let current = existing_payment(tx, id).await?;
    workflow::execute(tx, DeletePayment { current }.into()).await?;
    Ok(())
}
