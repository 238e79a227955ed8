//! Front-desk dashboard figures

use super::ClinicCoordinator;
use crate::adapters::database::{
    AppointmentFilter, DoctorFilter, PatientFilter, PaymentFilter, StoreTransaction,
};
use crate::domain::{Appointment, AppointmentStatus, Payment, PaymentStatus, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// How many unpaid payments the dashboard lists
pub const RECENT_UNPAID_LIMIT: usize = 5;

/// Snapshot of the clinic for one day
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub date: NaiveDate,
    pub total_patients: usize,
    pub total_doctors: usize,
    /// Pending or Confirmed appointments from `date` on
    pub upcoming_appointments: usize,
    pub unpaid_payments: usize,
    /// Appointments on `date`, earliest first
    pub todays_appointments: Vec<Appointment>,
    /// Most recently created unpaid payments, newest first
    pub recent_unpaid: Vec<Payment>,
}

impl ClinicCoordinator {
    /// Dashboard for the clinic's current date
    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        self.dashboard_for(self.clock.today()).await
    }

    /// Dashboard as seen on `date`
    pub async fn dashboard_for(&self, date: NaiveDate) -> Result<DashboardSummary> {
        let mut tx = self.store.begin().await?;
        let result = summarize(tx.as_mut(), date).await;
        self.finish("dashboard", tx, result).await
    }
}

async fn summarize(tx: &mut dyn StoreTransaction, date: NaiveDate) -> Result<DashboardSummary> {
    let total_patients = tx.list_patients(&PatientFilter::default()).await?.len();
    let total_doctors = tx.list_doctors(&DoctorFilter::default()).await?.len();

    let upcoming = AppointmentFilter::default()
        .from_date(date)
        .with_statuses([AppointmentStatus::Pending, AppointmentStatus::Confirmed]);
    let upcoming_appointments = tx.list_appointments(&upcoming).await?.len();

    let mut todays_appointments = tx
        .list_appointments(&AppointmentFilter::default().on_date(date))
        .await?;
    todays_appointments.sort_by_key(|a| (a.appointment_time, a.id));

    let unpaid = tx
        .list_payments(&PaymentFilter::default().with_status(PaymentStatus::Unpaid))
        .await?;
    let unpaid_payments = unpaid.len();
    let recent_unpaid = unpaid.into_iter().take(RECENT_UNPAID_LIMIT).collect();

    Ok(DashboardSummary {
        date,
        total_patients,
        total_doctors,
        upcoming_appointments,
        unpaid_payments,
        todays_appointments,
        recent_unpaid,
    })
}
