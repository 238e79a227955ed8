//! Doctor commands

use crate::adapters::database::DoctorFilter;
use crate::cli::commands::common::{self, OutputFormat};
use crate::domain::{DoctorId, DoctorInput, DoctorProfile, PersonName};
use clap::{Args, Subcommand};

/// Arguments for the doctor command
#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(subcommand)]
    pub command: DoctorCommand,
}

#[derive(Subcommand, Debug)]
pub enum DoctorCommand {
    /// Register a doctor with at least one specialization
    Add(DoctorFields),

    /// List doctors with their specializations
    List(DoctorListArgs),

    /// Show one doctor
    Show {
        id: DoctorId,
    },

    /// Change a doctor; passing any --specialization replaces the whole set
    Update {
        id: DoctorId,
        #[command(flatten)]
        fields: DoctorFields,
    },

    /// Delete a doctor with no appointments
    Remove {
        id: DoctorId,
    },
}

#[derive(Args, Debug, Default)]
pub struct DoctorFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Single letter; pass an empty value to clear it
    #[arg(long)]
    pub middle_initial: Option<String>,

    #[arg(long)]
    pub contact: Option<String>,

    /// Repeat for each specialization
    #[arg(long = "specialization", short = 's')]
    pub specializations: Vec<String>,
}

impl DoctorFields {
    /// Overlay the given fields on `base`
    pub fn apply(&self, mut base: DoctorInput) -> DoctorInput {
        if let Some(v) = &self.first_name {
            base.first_name = Some(v.clone());
        }
        if let Some(v) = &self.last_name {
            base.last_name = Some(v.clone());
        }
        if let Some(v) = &self.middle_initial {
            base.middle_initial = Some(v.clone());
        }
        if let Some(v) = &self.contact {
            base.contact = Some(v.clone());
        }
        if !self.specializations.is_empty() {
            base.specializations = self.specializations.clone();
        }
        base
    }
}

#[derive(Args, Debug)]
pub struct DoctorListArgs {
    #[arg(long, requires = "last_name")]
    pub first_name: Option<String>,

    #[arg(long, requires = "first_name")]
    pub last_name: Option<String>,

    #[arg(long)]
    pub middle_initial: Option<char>,

    #[arg(long)]
    pub contact: Option<String>,
}

impl DoctorListArgs {
    fn filter(&self) -> DoctorFilter {
        let mut filter = DoctorFilter::default();
        if let (Some(first), Some(last)) = (&self.first_name, &self.last_name) {
            filter = filter.with_name(PersonName::new(first, last, self.middle_initial));
        }
        if let Some(contact) = &self.contact {
            filter = filter.with_contact(contact.clone());
        }
        filter
    }
}

impl DoctorArgs {
    /// Execute the doctor command
    pub async fn execute(&self, config_path: &str, format: OutputFormat) -> anyhow::Result<i32> {
        let (_, clinic) = match common::open(config_path).await {
            Ok(opened) => opened,
            Err(code) => return Ok(code),
        };

        match &self.command {
            DoctorCommand::Add(fields) => {
                let input = fields.apply(DoctorInput::default());
                let result = clinic.create_doctor(&input).await;
                common::emit(result, format, |d| {
                    println!(
                        "✅ Doctor {} registered: {}",
                        d.doctor.id,
                        d.doctor.display_name()
                    );
                })
            }
            DoctorCommand::List(args) => {
                let result = clinic.list_doctors(&args.filter()).await;
                common::emit(result, format, |profiles| {
                    if profiles.is_empty() {
                        println!("No doctors found.");
                    }
                    for d in profiles {
                        println!(
                            "{:>5}  {:<30} {:<20} {}",
                            d.doctor.id,
                            d.doctor.display_name(),
                            d.doctor.contact,
                            d.labels().join(", ")
                        );
                    }
                })
            }
            DoctorCommand::Show { id } => {
                let result = clinic.get_doctor(*id).await;
                common::emit(result, format, print_profile)
            }
            DoctorCommand::Update { id, fields } => {
                let current = match clinic.get_doctor(*id).await {
                    Ok(p) => p,
                    Err(e) => return Ok(common::report(&e)),
                };
                let input = fields.apply(DoctorInput::from(&current));
                let result = clinic.update_doctor(*id, &input).await;
                common::emit(result, format, |d| {
                    println!("✅ Doctor {} updated", d.doctor.id);
                })
            }
            DoctorCommand::Remove { id } => match clinic.delete_doctor(*id).await {
                Ok(()) => {
                    println!("✅ Doctor {id} deleted");
                    Ok(common::EXIT_OK)
                }
                Err(e) => Ok(common::report(&e)),
            },
        }
    }
}

fn print_profile(profile: &DoctorProfile) {
    let d = &profile.doctor;
    println!("Doctor {}", d.id);
    println!("  Name:    {}", d.display_name());
    println!("  Contact: {}", d.contact);
    println!("  Specializations:");
    for s in &profile.specializations {
        println!("    [{}] {}", s.id, s.specialization);
    }
}
