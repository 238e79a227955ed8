//! Payment commands
//!
//! Every change prints the linked appointment's resulting status, since
//! payments drive it.

use crate::adapters::database::PaymentFilter;
use crate::cli::commands::common::{self, OutputFormat};
use crate::core::clinic::ClinicCoordinator;
use crate::domain::{AppointmentId, Payment, PaymentId, PaymentInput, PaymentStatus};
use clap::{Args, Subcommand};

/// Arguments for the payment command
#[derive(Args, Debug)]
pub struct PaymentArgs {
    #[command(subcommand)]
    pub command: PaymentCommand,
}

#[derive(Subcommand, Debug)]
pub enum PaymentCommand {
    /// Record the payment for an appointment
    Record(PaymentFields),

    /// List payments, newest first
    List {
        #[arg(long)]
        appointment_id: Option<AppointmentId>,
        #[arg(long)]
        status: Option<PaymentStatus>,
    },

    /// Show one payment
    Show {
        id: PaymentId,
    },

    /// Change a payment; omitted fields keep their current value
    Update {
        id: PaymentId,
        #[command(flatten)]
        fields: PaymentFields,
    },

    /// Mark a payment as paid
    MarkPaid {
        id: PaymentId,
    },

    /// Delete a payment
    Remove {
        id: PaymentId,
    },
}

#[derive(Args, Debug, Default)]
pub struct PaymentFields {
    #[arg(long)]
    pub appointment_id: Option<i64>,

    /// Up to two decimals, e.g. 50 or 50.25
    #[arg(long)]
    pub amount: Option<String>,

    /// Cash, Card or Insurance
    #[arg(long)]
    pub method: Option<String>,

    /// Unpaid (default for new payments) or Paid
    #[arg(long)]
    pub status: Option<String>,
}

impl PaymentFields {
    /// Overlay the given fields on `base`
    pub fn apply(&self, mut base: PaymentInput) -> PaymentInput {
        if self.appointment_id.is_some() {
            base.appointment_id = self.appointment_id;
        }
        if let Some(v) = &self.amount {
            base.amount = Some(v.clone());
        }
        if let Some(v) = &self.method {
            base.method = Some(v.clone());
        }
        if let Some(v) = &self.status {
            base.status = Some(v.clone());
        }
        base
    }
}

impl PaymentArgs {
    /// Execute the payment command
    pub async fn execute(&self, config_path: &str, format: OutputFormat) -> anyhow::Result<i32> {
        let (_, clinic) = match common::open(config_path).await {
            Ok(opened) => opened,
            Err(code) => return Ok(code),
        };

        match &self.command {
            PaymentCommand::Record(fields) => {
                let input = fields.apply(PaymentInput::default());
                let result = clinic.create_payment(&input).await;
                Self::changed(&clinic, result, format, "recorded").await
            }
            PaymentCommand::List {
                appointment_id,
                status,
            } => {
                let filter = PaymentFilter {
                    appointment_id: *appointment_id,
                    status: *status,
                };
                let result = clinic.list_payments(&filter).await;
                common::emit(result, format, |payments| {
                    if payments.is_empty() {
                        println!("No payments found.");
                    }
                    for p in payments {
                        println!("{}", summary_line(p));
                    }
                })
            }
            PaymentCommand::Show { id } => {
                let result = clinic.get_payment(*id).await;
                common::emit(result, format, |p| println!("{}", summary_line(p)))
            }
            PaymentCommand::Update { id, fields } => {
                let current = match clinic.get_payment(*id).await {
                    Ok(p) => p,
                    Err(e) => return Ok(common::report(&e)),
                };
                let mut base = PaymentInput::from(&current);
                // Status only changes when --status is given
                base.status = None;
                let input = fields.apply(base);
                let result = clinic.update_payment(*id, &input).await;
                Self::changed(&clinic, result, format, "updated").await
            }
            PaymentCommand::MarkPaid { id } => {
                let result = clinic.mark_paid(*id).await;
                Self::changed(&clinic, result, format, "marked paid").await
            }
            PaymentCommand::Remove { id } => {
                let current = match clinic.get_payment(*id).await {
                    Ok(p) => p,
                    Err(e) => return Ok(common::report(&e)),
                };
                match clinic.delete_payment(*id).await {
                    Ok(()) => {
                        println!("✅ Payment {id} deleted");
                        Self::print_appointment_status(&clinic, current.appointment_id).await;
                        Ok(common::EXIT_OK)
                    }
                    Err(e) => Ok(common::report(&e)),
                }
            }
        }
    }

    async fn changed(
        clinic: &ClinicCoordinator,
        result: crate::domain::Result<Payment>,
        format: OutputFormat,
        verb: &str,
    ) -> anyhow::Result<i32> {
        let appointment_id = result.as_ref().ok().map(|p| p.appointment_id);
        let code = common::emit(result, format, |p| {
            println!("✅ Payment {} {verb}: {}", p.id, summary_line(p).trim_start());
        })?;
        if let (Some(id), OutputFormat::Text) = (appointment_id, format) {
            Self::print_appointment_status(clinic, id).await;
        }
        Ok(code)
    }

    async fn print_appointment_status(clinic: &ClinicCoordinator, id: AppointmentId) {
        match clinic.get_appointment(id).await {
            Ok(a) => println!("   Appointment {} is now {}", a.id, a.status),
            Err(e) => tracing::warn!(appointment_id = %id, error = %e, "Could not read appointment"),
        }
    }
}

fn summary_line(p: &Payment) -> String {
    format!(
        "{:>5}  appointment {:>5}  {:>10}  {:<9}  {:<6}  {}",
        p.id,
        p.appointment_id,
        p.amount,
        p.method,
        p.status,
        p.created_at.format("%Y-%m-%d %H:%M UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overlays_given_fields() {
        let base = PaymentInput {
            appointment_id: Some(3),
            amount: Some("50.00".to_string()),
            method: Some("Cash".to_string()),
            status: None,
        };
        let fields = PaymentFields {
            amount: Some("75.50".to_string()),
            ..PaymentFields::default()
        };

        let merged = fields.apply(base);
        assert_eq!(merged.appointment_id, Some(3));
        assert_eq!(merged.amount.as_deref(), Some("75.50"));
        assert_eq!(merged.method.as_deref(), Some("Cash"));
        assert!(merged.status.is_none());
    }
}
