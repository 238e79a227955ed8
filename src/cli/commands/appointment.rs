//! Appointment commands

use crate::adapters::database::AppointmentFilter;
use crate::cli::commands::common::{self, OutputFormat};
use crate::domain::{
    Appointment, AppointmentId, AppointmentInput, AppointmentStatus, DoctorId, PatientId,
};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

/// Arguments for the appointment command
#[derive(Args, Debug)]
pub struct AppointmentArgs {
    #[command(subcommand)]
    pub command: AppointmentCommand,
}

#[derive(Subcommand, Debug)]
pub enum AppointmentCommand {
    /// Book an appointment; it starts Pending
    Book(AppointmentFields),

    /// List appointments, newest first
    List(AppointmentListArgs),

    /// Show one appointment
    Show {
        id: AppointmentId,
    },

    /// Change date, time, doctor or purpose; omitted fields keep their value
    Reschedule {
        id: AppointmentId,
        #[command(flatten)]
        fields: AppointmentFields,
    },

    /// Cancel a Pending or Confirmed appointment
    Cancel {
        id: AppointmentId,
    },

    /// Delete an appointment that has no payment
    Remove {
        id: AppointmentId,
    },
}

#[derive(Args, Debug, Default)]
pub struct AppointmentFields {
    #[arg(long)]
    pub patient_id: Option<i64>,

    #[arg(long)]
    pub doctor_id: Option<i64>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,

    /// HH:MM
    #[arg(long)]
    pub time: Option<String>,

    #[arg(long)]
    pub purpose: Option<String>,

    /// Requested status; only Cancelled is ever applied
    #[arg(long)]
    pub status: Option<String>,
}

impl AppointmentFields {
    /// Overlay the given fields on `base`
    pub fn apply(&self, mut base: AppointmentInput) -> AppointmentInput {
        if self.patient_id.is_some() {
            base.patient_id = self.patient_id;
        }
        if self.doctor_id.is_some() {
            base.doctor_id = self.doctor_id;
        }
        if let Some(v) = &self.date {
            base.appointment_date = Some(v.clone());
        }
        if let Some(v) = &self.time {
            base.appointment_time = Some(v.clone());
        }
        if let Some(v) = &self.purpose {
            base.purpose = Some(v.clone());
        }
        if let Some(v) = &self.status {
            base.status = Some(v.clone());
        }
        base
    }
}

#[derive(Args, Debug, Default)]
pub struct AppointmentListArgs {
    #[arg(long)]
    pub patient_id: Option<PatientId>,

    #[arg(long)]
    pub doctor_id: Option<DoctorId>,

    /// Exact date
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Earliest date, inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest date, inclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Repeat to match several statuses
    #[arg(long)]
    pub status: Vec<AppointmentStatus>,
}

impl AppointmentListArgs {
    fn filter(&self) -> AppointmentFilter {
        let mut filter = AppointmentFilter {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            ..AppointmentFilter::default()
        };
        if let Some(date) = self.date {
            filter = filter.on_date(date);
        }
        if let Some(date) = self.from {
            filter = filter.from_date(date);
        }
        if let Some(date) = self.to {
            filter = filter.to_date(date);
        }
        filter.with_statuses(self.status.iter().copied())
    }
}

impl AppointmentArgs {
    /// Execute the appointment command
    pub async fn execute(&self, config_path: &str, format: OutputFormat) -> anyhow::Result<i32> {
        let (_, clinic) = match common::open(config_path).await {
            Ok(opened) => opened,
            Err(code) => return Ok(code),
        };

        match &self.command {
            AppointmentCommand::Book(fields) => {
                let input = fields.apply(AppointmentInput::default());
                let result = clinic.create_appointment(&input).await;
                common::emit(result, format, |a| {
                    println!("✅ Appointment {} booked ({})", a.id, a.status);
                })
            }
            AppointmentCommand::List(args) => {
                let result = clinic.list_appointments(&args.filter()).await;
                common::emit(result, format, |appointments| {
                    if appointments.is_empty() {
                        println!("No appointments found.");
                    }
                    for a in appointments {
                        println!("{}", summary_line(a));
                    }
                })
            }
            AppointmentCommand::Show { id } => {
                let result = clinic.get_appointment(*id).await;
                common::emit(result, format, print_appointment)
            }
            AppointmentCommand::Reschedule { id, fields } => {
                let current = match clinic.get_appointment(*id).await {
                    Ok(a) => a,
                    Err(e) => return Ok(common::report(&e)),
                };
                let input = fields.apply(AppointmentInput::from(&current));
                let result = clinic.update_appointment(*id, &input).await;
                common::emit(result, format, |a| {
                    println!(
                        "✅ Appointment {} now on {} at {} ({})",
                        a.id,
                        a.appointment_date,
                        a.appointment_time.format("%H:%M"),
                        a.status
                    );
                })
            }
            AppointmentCommand::Cancel { id } => {
                let result = clinic.cancel_appointment(*id).await;
                common::emit(result, format, |a| {
                    println!("✅ Appointment {} cancelled", a.id);
                })
            }
            AppointmentCommand::Remove { id } => match clinic.delete_appointment(*id).await {
                Ok(()) => {
                    println!("✅ Appointment {id} deleted");
                    Ok(common::EXIT_OK)
                }
                Err(e) => Ok(common::report(&e)),
            },
        }
    }
}

pub(crate) fn summary_line(a: &Appointment) -> String {
    format!(
        "{:>5}  {} {}  patient {:>5}  doctor {:>5}  {:<9}  {}",
        a.id,
        a.appointment_date,
        a.appointment_time.format("%H:%M"),
        a.patient_id,
        a.doctor_id,
        a.status,
        a.purpose
    )
}

fn print_appointment(a: &Appointment) {
    println!("Appointment {}", a.id);
    println!("  Patient: {}", a.patient_id);
    println!("  Doctor:  {}", a.doctor_id);
    println!("  Date:    {}", a.appointment_date);
    println!("  Time:    {}", a.appointment_time.format("%H:%M"));
    println!("  Purpose: {}", a.purpose);
    println!("  Status:  {}", a.status);
}
