//! Patient commands

use crate::adapters::database::PatientFilter;
use crate::cli::commands::common::{self, OutputFormat};
use crate::domain::{Patient, PatientId, PatientInput, PersonName};
use clap::{Args, Subcommand};

/// Arguments for the patient command
#[derive(Args, Debug)]
pub struct PatientArgs {
    #[command(subcommand)]
    pub command: PatientCommand,
}

#[derive(Subcommand, Debug)]
pub enum PatientCommand {
    /// Register a new patient
    Add(PatientFields),

    /// List patients, optionally matching an exact name or contact
    List(PatientListArgs),

    /// Show one patient
    Show {
        id: PatientId,
    },

    /// Change a patient; omitted fields keep their current value
    Update {
        id: PatientId,
        #[command(flatten)]
        fields: PatientFields,
    },

    /// Delete a patient with no appointments
    Remove {
        id: PatientId,
    },
}

#[derive(Args, Debug, Default)]
pub struct PatientFields {
    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Single letter; pass an empty value to clear it
    #[arg(long)]
    pub middle_initial: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    /// Male, Female or Other
    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub contact: Option<String>,

    #[arg(long)]
    pub address: Option<String>,
}

impl PatientFields {
    /// Overlay the given fields on `base`
    pub fn apply(&self, mut base: PatientInput) -> PatientInput {
        if let Some(v) = &self.first_name {
            base.first_name = Some(v.clone());
        }
        if let Some(v) = &self.last_name {
            base.last_name = Some(v.clone());
        }
        if let Some(v) = &self.middle_initial {
            base.middle_initial = Some(v.clone());
        }
        if let Some(v) = self.age {
            base.age = Some(v);
        }
        if let Some(v) = &self.gender {
            base.gender = Some(v.clone());
        }
        if let Some(v) = &self.contact {
            base.contact = Some(v.clone());
        }
        if let Some(v) = &self.address {
            base.address = Some(v.clone());
        }
        base
    }
}

#[derive(Args, Debug)]
pub struct PatientListArgs {
    /// Exact first name; requires --last-name
    #[arg(long, requires = "last_name")]
    pub first_name: Option<String>,

    #[arg(long, requires = "first_name")]
    pub last_name: Option<String>,

    #[arg(long)]
    pub middle_initial: Option<char>,

    #[arg(long)]
    pub contact: Option<String>,
}

impl PatientListArgs {
    fn filter(&self) -> PatientFilter {
        let mut filter = PatientFilter::default();
        if let (Some(first), Some(last)) = (&self.first_name, &self.last_name) {
            filter = filter.with_name(PersonName::new(first, last, self.middle_initial));
        }
        if let Some(contact) = &self.contact {
            filter = filter.with_contact(contact.clone());
        }
        filter
    }
}

impl PatientArgs {
    /// Execute the patient command
    pub async fn execute(&self, config_path: &str, format: OutputFormat) -> anyhow::Result<i32> {
        let (_, clinic) = match common::open(config_path).await {
            Ok(opened) => opened,
            Err(code) => return Ok(code),
        };

        match &self.command {
            PatientCommand::Add(fields) => {
                let input = fields.apply(PatientInput::default());
                let result = clinic.create_patient(&input).await;
                common::emit(result, format, |p| {
                    println!("✅ Patient {} registered: {}", p.id, p.full_name());
                })
            }
            PatientCommand::List(args) => {
                let result = clinic.list_patients(&args.filter()).await;
                common::emit(result, format, |patients| {
                    if patients.is_empty() {
                        println!("No patients found.");
                    }
                    for p in patients {
                        println!("{}", summary_line(p));
                    }
                })
            }
            PatientCommand::Show { id } => {
                let result = clinic.get_patient(*id).await;
                common::emit(result, format, print_patient)
            }
            PatientCommand::Update { id, fields } => {
                let current = match clinic.get_patient(*id).await {
                    Ok(p) => p,
                    Err(e) => return Ok(common::report(&e)),
                };
                let input = fields.apply(PatientInput::from(&current));
                let result = clinic.update_patient(*id, &input).await;
                common::emit(result, format, |p| {
                    println!("✅ Patient {} updated", p.id);
                })
            }
            PatientCommand::Remove { id } => match clinic.delete_patient(*id).await {
                Ok(()) => {
                    println!("✅ Patient {id} deleted");
                    Ok(common::EXIT_OK)
                }
                Err(e) => Ok(common::report(&e)),
            },
        }
    }
}

fn summary_line(p: &Patient) -> String {
    format!(
        "{:>5}  {:<30} {:>3}  {:<6}  {}",
        p.id,
        p.full_name(),
        p.age,
        p.gender,
        p.contact
    )
}

fn print_patient(p: &Patient) {
    println!("Patient {}", p.id);
    println!("  Name:    {}", p.full_name());
    println!("  Age:     {}", p.age);
    println!("  Gender:  {}", p.gender);
    println!("  Contact: {}", p.contact);
    println!("  Address: {}", p.address);
    println!("  Created: {}", p.created_at.format("%Y-%m-%d %H:%M UTC"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overlays_only_given_fields() {
        let base = PatientInput {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            middle_initial: Some("K".to_string()),
            age: Some(30),
            ..PatientInput::default()
        };
        let fields = PatientFields {
            age: Some(31),
            middle_initial: Some(String::new()),
            ..PatientFields::default()
        };

        let merged = fields.apply(base);
        assert_eq!(merged.first_name.as_deref(), Some("Ann"));
        assert_eq!(merged.age, Some(31));
        assert_eq!(merged.middle_initial.as_deref(), Some(""));
    }

    #[test]
    fn test_list_filter_by_name() {
        let args = PatientListArgs {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            middle_initial: None,
            contact: None,
        };
        let filter = args.filter();
        assert_eq!(filter.name, Some(PersonName::new("Ann", "Lee", None)));
        assert!(filter.contact.is_none());
    }
}
