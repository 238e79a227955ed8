//! Validation engine
//!
//! Every create and update passes through here before anything is written.
//! Field rules live in [`fields`]; this module adds the rules that need to
//! look at other records (existence of referenced records, uniqueness,
//! double booking, one payment per appointment). All violations found are
//! returned together as [`ClinicError::Validation`].
//!
//! Uniqueness checks run inside the caller's transaction and exclude the
//! record being edited by its id.

pub mod fields;

use crate::adapters::database::{
    AppointmentFilter, DoctorFilter, PatientFilter, PaymentFilter, SpecializationFilter,
    StoreTransaction,
};
use crate::domain::{
    AppointmentId, AppointmentInput, AppointmentStatus, ClinicError, DoctorDraft, DoctorId,
    DoctorInput, DoctorProfileDraft, Gender, PatientDraft, PatientId, PatientInput, Payment,
    PaymentInput, PaymentMethod, PaymentStatus, Result, SpecializationDraft, SpecializationId,
    SpecializationInput, ValidationErrors,
};
use chrono::{NaiveDate, NaiveTime};
use fields::TextRule;
use rust_decimal::Decimal;

/// Values that depend on when and where a request is made
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// The clinic's current date
    pub today: NaiveDate,
    /// Purpose stored when a booking leaves it blank
    pub default_purpose: String,
}

/// Appointment fields that passed validation
///
/// The status is still only a request; the workflow decides what is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub purpose: String,
    pub requested_status: Option<AppointmentStatus>,
}

/// Payment fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayment {
    pub appointment_id: AppointmentId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub requested_status: Option<PaymentStatus>,
}

/// Turn collected errors and parsed parts into a result
fn finish<T>(errors: ValidationErrors, value: Option<T>) -> Result<T> {
    match value {
        Some(value) if errors.is_empty() => Ok(value),
        _ => Err(ClinicError::Validation(errors)),
    }
}

pub async fn validate_patient(
    tx: &mut dyn StoreTransaction,
    input: &PatientInput,
    editing: Option<PatientId>,
) -> Result<PatientDraft> {
    let mut errors = ValidationErrors::new();

    let name = fields::person_name(
        &mut errors,
        input.first_name.as_deref(),
        input.last_name.as_deref(),
        input.middle_initial.as_deref(),
    );
    let age = fields::age(&mut errors, input.age);
    let gender: Option<Gender> = fields::required_choice(
        &mut errors,
        "gender",
        input.gender.as_deref(),
        "Gender is required.",
        "Gender must be Male, Female, or Other.",
    );
    let contact = fields::contact(&mut errors, input.contact.as_deref());
    let address = TextRule {
        field: "address",
        label: "Address",
        min: fields::ADDRESS_MIN,
        max: fields::ADDRESS_MAX,
        required: "Address is required.",
    }
    .check(&mut errors, input.address.as_deref());

    if let Some(ref contact) = contact {
        let holders = tx
            .list_patients(&PatientFilter::default().with_contact(contact.clone()))
            .await?;
        if holders.iter().any(|p| Some(p.id) != editing) {
            errors.add("contact", "This contact number is already registered.");
        }
    }

    if let Some(ref name) = name {
        let namesakes = tx
            .list_patients(&PatientFilter::default().with_name(name.clone()))
            .await?;
        if namesakes.iter().any(|p| Some(p.id) != editing) {
            errors.add(
                "first_name",
                format!(
                    "A patient with the name '{}' already exists in the system.",
                    name.full_name()
                ),
            );
        }
    }

    let draft = match (name, age, gender, contact, address) {
        (Some(name), Some(age), Some(gender), Some(contact), Some(address)) => Some(PatientDraft {
            name,
            age,
            gender,
            contact,
            address,
        }),
        _ => None,
    };
    finish(errors, draft)
}

pub async fn validate_doctor(
    tx: &mut dyn StoreTransaction,
    input: &DoctorInput,
    editing: Option<DoctorId>,
) -> Result<DoctorProfileDraft> {
    let mut errors = ValidationErrors::new();

    let name = fields::person_name(
        &mut errors,
        input.first_name.as_deref(),
        input.last_name.as_deref(),
        input.middle_initial.as_deref(),
    );
    let contact = fields::contact(&mut errors, input.contact.as_deref());
    let specializations = fields::specialization_set(&mut errors, &input.specializations);

    if let Some(ref contact) = contact {
        let holders = tx
            .list_doctors(&DoctorFilter::default().with_contact(contact.clone()))
            .await?;
        if holders.iter().any(|d| Some(d.id) != editing) {
            errors.add("contact", "This contact number is already registered.");
        }
    }

    if let Some(ref name) = name {
        let namesakes = tx
            .list_doctors(&DoctorFilter::default().with_name(name.clone()))
            .await?;
        if let Some(existing) = namesakes.iter().find(|d| Some(d.id) != editing) {
            errors.add(
                "first_name",
                format!(
                    "A doctor with the name '{}' already exists.",
                    existing.name.full_name()
                ),
            );
        }
    }

    let draft = match (name, contact, specializations) {
        (Some(name), Some(contact), Some(specializations)) => Some(DoctorProfileDraft {
            doctor: DoctorDraft { name, contact },
            specializations,
        }),
        _ => None,
    };
    finish(errors, draft)
}

pub async fn validate_specialization(
    tx: &mut dyn StoreTransaction,
    input: &SpecializationInput,
    editing: Option<SpecializationId>,
) -> Result<SpecializationDraft> {
    let mut errors = ValidationErrors::new();

    let doctor_id = fields::reference(
        &mut errors,
        "doctor_id",
        input.doctor_id,
        "Doctor selection is required.",
    )
    .map(DoctorId::new);
    let label = fields::specialization_label(&mut errors, input.specialization.as_deref());

    let mut doctor_exists = false;
    if let Some(doctor_id) = doctor_id {
        doctor_exists = tx.get_doctor(doctor_id).await?.is_some();
        if !doctor_exists {
            errors.add("doctor_id", "Selected doctor does not exist.");
        }
    }

    if let (Some(doctor_id), Some(label), true) = (doctor_id, label.as_ref(), doctor_exists) {
        let filter = SpecializationFilter::for_doctor(doctor_id).with_label(label.clone());
        let same = tx.list_specializations(&filter).await?;
        if same.iter().any(|s| Some(s.id) != editing) {
            errors.add("specialization", "This doctor already has this specialization.");
        }
    }

    let draft = match (doctor_id, label) {
        (Some(doctor_id), Some(specialization)) => Some(SpecializationDraft {
            doctor_id,
            specialization,
        }),
        _ => None,
    };
    finish(errors, draft)
}

pub async fn validate_appointment(
    tx: &mut dyn StoreTransaction,
    ctx: &ValidationContext,
    input: &AppointmentInput,
    editing: Option<AppointmentId>,
) -> Result<ValidatedAppointment> {
    let mut errors = ValidationErrors::new();

    let patient_id = fields::reference(
        &mut errors,
        "patient_id",
        input.patient_id,
        "Patient selection is required.",
    )
    .map(PatientId::new);
    let doctor_id = fields::reference(
        &mut errors,
        "doctor_id",
        input.doctor_id,
        "Doctor selection is required.",
    )
    .map(DoctorId::new);
    let date = fields::appointment_date(&mut errors, input.appointment_date.as_deref(), ctx.today);
    let time = fields::appointment_time(&mut errors, input.appointment_time.as_deref());
    let purpose = fields::purpose(&mut errors, input.purpose.as_deref(), &ctx.default_purpose);
    let requested_status = fields::optional_choice::<AppointmentStatus>(
        &mut errors,
        "status",
        input.status.as_deref(),
        "Status must be one of: Pending, Confirmed, Completed, Cancelled.",
    );

    if let Some(patient_id) = patient_id {
        if tx.get_patient(patient_id).await?.is_none() {
            errors.add("patient_id", "Selected patient does not exist.");
        }
    }
    if let Some(doctor_id) = doctor_id {
        if tx.get_doctor(doctor_id).await?.is_none() {
            errors.add("doctor_id", "Selected doctor does not exist.");
        }
    }

    if let (Some(date), Some(time)) = (date, time) {
        if let Some(doctor_id) = doctor_id {
            let booked = tx
                .list_appointments(&AppointmentFilter::for_doctor(doctor_id).at_slot(date, time))
                .await?;
            if booked.iter().any(|a| Some(a.id) != editing) {
                errors.add(
                    "appointment_time",
                    "This time slot is already booked for the selected doctor on this date.",
                );
            }
        }
        if let Some(patient_id) = patient_id {
            let booked = tx
                .list_appointments(&AppointmentFilter::for_patient(patient_id).at_slot(date, time))
                .await?;
            if booked.iter().any(|a| Some(a.id) != editing) {
                errors.add(
                    "appointment_time",
                    "This patient already has an appointment at this time on this date.",
                );
            }
        }
    }

    let validated = match (patient_id, doctor_id, date, time, purpose, requested_status) {
        (
            Some(patient_id),
            Some(doctor_id),
            Some(appointment_date),
            Some(appointment_time),
            Some(purpose),
            Some(requested_status),
        ) => Some(ValidatedAppointment {
            patient_id,
            doctor_id,
            appointment_date,
            appointment_time,
            purpose,
            requested_status,
        }),
        _ => None,
    };
    finish(errors, validated)
}

/// Validate a payment submission
///
/// `editing` is the stored payment when this is an update; a payment keeps
/// the appointment it was recorded against.
pub async fn validate_payment(
    tx: &mut dyn StoreTransaction,
    input: &PaymentInput,
    editing: Option<&Payment>,
) -> Result<ValidatedPayment> {
    let mut errors = ValidationErrors::new();

    let appointment_id = fields::reference(
        &mut errors,
        "appointment_id",
        input.appointment_id,
        "Appointment selection is required.",
    )
    .map(AppointmentId::new);
    let amount = fields::amount(&mut errors, input.amount.as_deref());
    let method: Option<PaymentMethod> = fields::required_choice(
        &mut errors,
        "method",
        input.method.as_deref(),
        "Payment method is required.",
        "Payment method must be one of: Cash, Card, Insurance.",
    );
    let requested_status = fields::optional_choice::<PaymentStatus>(
        &mut errors,
        "status",
        input.status.as_deref(),
        "Status must be one of: Unpaid, Paid.",
    );

    if let Some(appointment_id) = appointment_id {
        if tx.get_appointment(appointment_id).await?.is_none() {
            errors.add("appointment_id", "Selected appointment does not exist.");
        } else if editing.is_some_and(|p| p.appointment_id != appointment_id) {
            errors.add(
                "appointment_id",
                "A payment cannot be moved to a different appointment.",
            );
        } else {
            let existing = tx
                .list_payments(&PaymentFilter::for_appointment(appointment_id))
                .await?;
            if existing.iter().any(|p| Some(p.id) != editing.map(|e| e.id)) {
                errors.add(
                    "appointment_id",
                    "A payment already exists for this appointment.",
                );
            }
        }
    }

    let validated = match (appointment_id, amount, method, requested_status) {
        (Some(appointment_id), Some(amount), Some(method), Some(requested_status)) => {
            Some(ValidatedPayment {
                appointment_id,
                amount,
                method,
                requested_status,
            })
        }
        _ => None,
    };
    finish(errors, validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::database::ClinicStore;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{DoctorDraft, PersonName};

    fn patient_input(first: &str, last: &str, contact: &str) -> PatientInput {
        PatientInput {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            middle_initial: None,
            age: Some(40),
            gender: Some("Female".to_string()),
            contact: Some(contact.to_string()),
            address: Some("12 Harbour Road, Kowloon".to_string()),
        }
    }

    #[tokio::test]
    async fn test_patient_reports_all_field_errors_together() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let input = PatientInput {
            age: Some(200),
            gender: Some("Unknown".to_string()),
            address: Some("short".to_string()),
            ..PatientInput::default()
        };
        let err = validate_patient(tx.as_mut(), &input, None).await.unwrap_err();
        let errors = err.field_errors().unwrap();

        for field in ["first_name", "last_name", "age", "gender", "contact", "address"] {
            assert!(errors.has_field(field), "missing error for {field}");
        }
    }

    #[tokio::test]
    async fn test_patient_duplicate_name_and_contact() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let draft = validate_patient(tx.as_mut(), &patient_input("Ann", "Lee", "555-0100"), None)
            .await
            .unwrap();
        let existing = tx.insert_patient(&draft).await.unwrap();

        let err = validate_patient(tx.as_mut(), &patient_input("Ann", "Lee", "555-0100"), None)
            .await
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(
            errors.messages_for("first_name"),
            vec!["A patient with the name 'Ann Lee' already exists in the system."]
        );
        assert_eq!(
            errors.messages_for("contact"),
            vec!["This contact number is already registered."]
        );

        // Editing the same record with unchanged values is fine
        validate_patient(
            tx.as_mut(),
            &patient_input("Ann", "Lee", "555-0100"),
            Some(existing.id),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_patient_middle_initial_distinguishes_namesakes() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let draft = validate_patient(tx.as_mut(), &patient_input("Ann", "Lee", "555-0100"), None)
            .await
            .unwrap();
        tx.insert_patient(&draft).await.unwrap();

        let mut input = patient_input("Ann", "Lee", "555-0101");
        input.middle_initial = Some("K".to_string());
        validate_patient(tx.as_mut(), &input, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_doctor_duplicate_name_uses_existing_full_name() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_doctor(&DoctorDraft {
            name: PersonName::new("Bo", "Chen", Some('T')),
            contact: "555-0200".to_string(),
        })
        .await
        .unwrap();

        let input = DoctorInput {
            first_name: Some("Bo".to_string()),
            last_name: Some("Chen".to_string()),
            middle_initial: Some("T".to_string()),
            contact: Some("555-0201".to_string()),
            specializations: vec!["Cardiology".to_string()],
        };
        let err = validate_doctor(tx.as_mut(), &input, None).await.unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().messages_for("first_name"),
            vec!["A doctor with the name 'Bo T. Chen' already exists."]
        );
    }

    #[tokio::test]
    async fn test_specialization_requires_existing_doctor() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let input = SpecializationInput {
            doctor_id: Some(42),
            specialization: Some("Neurology".to_string()),
        };
        let err = validate_specialization(tx.as_mut(), &input, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.field_errors().unwrap().messages_for("doctor_id"),
            vec!["Selected doctor does not exist."]
        );
    }

    #[tokio::test]
    async fn test_appointment_missing_references() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let ctx = ValidationContext {
            today: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            default_purpose: "General consultation".to_string(),
        };

        let input = AppointmentInput {
            patient_id: Some(1),
            doctor_id: None,
            appointment_date: Some("2030-01-02".to_string()),
            appointment_time: Some("09:00".to_string()),
            purpose: None,
            status: Some("Booked".to_string()),
        };
        let err = validate_appointment(tx.as_mut(), &ctx, &input, None)
            .await
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(
            errors.messages_for("patient_id"),
            vec!["Selected patient does not exist."]
        );
        assert_eq!(
            errors.messages_for("doctor_id"),
            vec!["Doctor selection is required."]
        );
        assert!(errors.has_field("status"));
        assert!(!errors.has_field("purpose"));
    }

    #[tokio::test]
    async fn test_payment_requires_existing_appointment() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let input = PaymentInput {
            appointment_id: Some(9),
            amount: Some("0".to_string()),
            method: Some("Bitcoin".to_string()),
            status: None,
        };
        let err = validate_payment(tx.as_mut(), &input, None).await.unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(
            errors.messages_for("appointment_id"),
            vec!["Selected appointment does not exist."]
        );
        assert_eq!(
            errors.messages_for("amount"),
            vec!["Amount must be greater than 0."]
        );
        assert_eq!(
            errors.messages_for("method"),
            vec!["Payment method must be one of: Cash, Card, Insurance."]
        );
    }
}
