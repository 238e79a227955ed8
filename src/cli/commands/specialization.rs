//! Specialization commands

use crate::adapters::database::SpecializationFilter;
use crate::cli::commands::common::{self, OutputFormat};
use crate::domain::{DoctorId, SpecializationId, SpecializationInput};
use clap::{Args, Subcommand};

/// Arguments for the specialization command
#[derive(Args, Debug)]
pub struct SpecializationArgs {
    #[command(subcommand)]
    pub command: SpecializationCommand,
}

#[derive(Subcommand, Debug)]
pub enum SpecializationCommand {
    /// Add a specialization to a doctor
    Add {
        #[arg(long)]
        doctor_id: i64,
        #[arg(long)]
        label: String,
    },

    /// List specializations
    List {
        #[arg(long)]
        doctor_id: Option<DoctorId>,
    },

    /// Show one specialization
    Show {
        id: SpecializationId,
    },

    /// Rename a specialization or move it to another doctor
    Update {
        id: SpecializationId,
        #[arg(long)]
        doctor_id: Option<i64>,
        #[arg(long)]
        label: Option<String>,
    },

    /// Remove a specialization; a doctor keeps at least one
    Remove {
        id: SpecializationId,
    },
}

impl SpecializationArgs {
    /// Execute the specialization command
    pub async fn execute(&self, config_path: &str, format: OutputFormat) -> anyhow::Result<i32> {
        let (_, clinic) = match common::open(config_path).await {
            Ok(opened) => opened,
            Err(code) => return Ok(code),
        };

        match &self.command {
            SpecializationCommand::Add { doctor_id, label } => {
                let input = SpecializationInput {
                    doctor_id: Some(*doctor_id),
                    specialization: Some(label.clone()),
                };
                let result = clinic.create_specialization(&input).await;
                common::emit(result, format, |s| {
                    println!(
                        "✅ Specialization {} added to doctor {}: {}",
                        s.id, s.doctor_id, s.specialization
                    );
                })
            }
            SpecializationCommand::List { doctor_id } => {
                let filter = doctor_id.map_or_else(SpecializationFilter::default, |id| {
                    SpecializationFilter::for_doctor(id)
                });
                let result = clinic.list_specializations(&filter).await;
                common::emit(result, format, |records| {
                    if records.is_empty() {
                        println!("No specializations found.");
                    }
                    for s in records {
                        println!("{:>5}  doctor {:>5}  {}", s.id, s.doctor_id, s.specialization);
                    }
                })
            }
            SpecializationCommand::Show { id } => {
                let result = clinic.get_specialization(*id).await;
                common::emit(result, format, |s| {
                    println!("Specialization {}", s.id);
                    println!("  Doctor:  {}", s.doctor_id);
                    println!("  Label:   {}", s.specialization);
                    println!("  Updated: {}", s.updated_at.format("%Y-%m-%d %H:%M UTC"));
                })
            }
            SpecializationCommand::Update {
                id,
                doctor_id,
                label,
            } => {
                let current = match clinic.get_specialization(*id).await {
                    Ok(s) => s,
                    Err(e) => return Ok(common::report(&e)),
                };
                let input = SpecializationInput {
                    doctor_id: Some(doctor_id.unwrap_or(current.doctor_id.value())),
                    specialization: Some(label.clone().unwrap_or(current.specialization)),
                };
                let result = clinic.update_specialization(*id, &input).await;
                common::emit(result, format, |s| {
                    println!("✅ Specialization {} updated: {}", s.id, s.specialization);
                })
            }
            SpecializationCommand::Remove { id } => {
                match clinic.delete_specialization(*id).await {
                    Ok(()) => {
                        println!("✅ Specialization {id} removed");
                        Ok(common::EXIT_OK)
                    }
                    Err(e) => Ok(common::report(&e)),
                }
            }
        }
    }
}
