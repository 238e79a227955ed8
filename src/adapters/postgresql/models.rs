//! Row mapping for PostgreSQL
//!
//! Converts `tokio_postgres` rows into domain records. Enum columns are stored
//! as their display text and parsed back here.

use crate::domain::{
    Appointment, AppointmentId, Doctor, DoctorId, DoctorSpecialization, Gender, Patient,
    PatientId, Payment, PaymentId, PersonName, Result, SpecializationId, StoreError,
};
use std::str::FromStr;
use tokio_postgres::types::FromSql;
use tokio_postgres::Row;

pub const PATIENT_COLUMNS: &str =
    "id, first_name, last_name, middle_initial, age, gender, contact, address, created_at, updated_at";

pub const DOCTOR_COLUMNS: &str =
    "id, first_name, last_name, middle_initial, contact, created_at, updated_at";

pub const SPECIALIZATION_COLUMNS: &str =
    "id, doctor_id, specialization, created_at, updated_at";

pub const APPOINTMENT_COLUMNS: &str =
    "id, patient_id, doctor_id, appointment_date, appointment_time, purpose, status, created_at, updated_at";

pub const PAYMENT_COLUMNS: &str =
    "id, appointment_id, amount, method, status, created_at, updated_at";

fn column<'a, T: FromSql<'a>>(row: &'a Row, name: &str) -> Result<T> {
    row.try_get(name)
        .map_err(|e| StoreError::InvalidData(format!("column '{name}': {e}")).into())
}

fn parsed<T: FromStr<Err = String>>(row: &Row, name: &str) -> Result<T> {
    let raw: String = column(row, name)?;
    T::from_str(&raw).map_err(|e| StoreError::InvalidData(e).into())
}

/// Middle initials are stored as a one-character text column
pub fn initial_to_sql(initial: Option<char>) -> Option<String> {
    initial.map(String::from)
}

fn person_name(row: &Row) -> Result<PersonName> {
    let initial: Option<String> = column(row, "middle_initial")?;
    Ok(PersonName {
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
        middle_initial: initial.and_then(|s| s.chars().next()),
    })
}

pub fn patient_from_row(row: &Row) -> Result<Patient> {
    let age: i16 = column(row, "age")?;
    Ok(Patient {
        id: PatientId::new(column(row, "id")?),
        name: person_name(row)?,
        age: u8::try_from(age)
            .map_err(|_| StoreError::InvalidData(format!("age out of range: {age}")))?,
        gender: parsed::<Gender>(row, "gender")?,
        contact: column(row, "contact")?,
        address: column(row, "address")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub fn doctor_from_row(row: &Row) -> Result<Doctor> {
    Ok(Doctor {
        id: DoctorId::new(column(row, "id")?),
        name: person_name(row)?,
        contact: column(row, "contact")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub fn specialization_from_row(row: &Row) -> Result<DoctorSpecialization> {
    Ok(DoctorSpecialization {
        id: SpecializationId::new(column(row, "id")?),
        doctor_id: DoctorId::new(column(row, "doctor_id")?),
        specialization: column(row, "specialization")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub fn appointment_from_row(row: &Row) -> Result<Appointment> {
    Ok(Appointment {
        id: AppointmentId::new(column(row, "id")?),
        patient_id: PatientId::new(column(row, "patient_id")?),
        doctor_id: DoctorId::new(column(row, "doctor_id")?),
        appointment_date: column(row, "appointment_date")?,
        appointment_time: column(row, "appointment_time")?,
        purpose: column(row, "purpose")?,
        status: parsed(row, "status")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub fn payment_from_row(row: &Row) -> Result<Payment> {
    Ok(Payment {
        id: PaymentId::new(column(row, "id")?),
        appointment_id: AppointmentId::new(column(row, "appointment_id")?),
        amount: column(row, "amount")?,
        method: parsed(row, "method")?,
        status: parsed(row, "status")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_to_sql() {
        assert_eq!(initial_to_sql(Some('Q')), Some("Q".to_string()));
        assert_eq!(initial_to_sql(None), None);
    }

    #[test]
    fn test_column_lists_start_with_id() {
        for columns in [
            PATIENT_COLUMNS,
            DOCTOR_COLUMNS,
            SPECIALIZATION_COLUMNS,
            APPOINTMENT_COLUMNS,
            PAYMENT_COLUMNS,
        ] {
            assert!(columns.starts_with("id, "));
            assert!(columns.ends_with("created_at, updated_at"));
        }
    }
}
