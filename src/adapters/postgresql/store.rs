//! PostgreSQL store implementing the store traits
//!
//! Each [`PostgreSQLTransaction`] holds one pooled connection on which it has
//! issued `BEGIN ISOLATION LEVEL SERIALIZABLE`. The connection goes back to
//! the pool after `COMMIT` or `ROLLBACK`; a transaction dropped without either
//! detaches its connection so the server aborts the open transaction.

use crate::adapters::database::filters::{
    AppointmentFilter, DoctorFilter, PatientFilter, PaymentFilter, SpecializationFilter,
};
use crate::adapters::database::traits::{ClinicStore, StoreTransaction};
use crate::adapters::postgresql::client::{map_pg_error, PostgreSQLClient};
use crate::adapters::postgresql::models::{
    appointment_from_row, doctor_from_row, initial_to_sql, patient_from_row, payment_from_row,
    specialization_from_row, APPOINTMENT_COLUMNS, DOCTOR_COLUMNS, PATIENT_COLUMNS,
    PAYMENT_COLUMNS, SPECIALIZATION_COLUMNS,
};
use crate::domain::{
    Appointment, AppointmentDraft, AppointmentId, AppointmentStatus, Doctor, DoctorDraft,
    DoctorId, DoctorSpecialization, Patient, PatientDraft, PatientId, Payment, PaymentDraft,
    PaymentId, PersonName, Result, SpecializationDraft, SpecializationId, StoreError,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

type RowMapper<T> = fn(&Row) -> Result<T>;

/// PostgreSQL implementation of [`ClinicStore`]
pub struct PostgreSQLStore {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLStore {
    /// Create a new PostgreSQL store
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl ClinicStore for PostgreSQLStore {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let conn = self.client.get_connection().await?;

        let begin = format!(
            "BEGIN ISOLATION LEVEL SERIALIZABLE; SET LOCAL statement_timeout = {}",
            self.client.statement_timeout_ms()
        );
        conn.batch_execute(&begin)
            .await
            .map_err(|e| map_pg_error("begin transaction", e))?;

        Ok(Box::new(PostgreSQLTransaction { conn: Some(conn) }))
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}

/// Accumulates `WHERE` conditions with positional parameters
#[derive(Default)]
struct WhereClause {
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql + Sync + Send>>,
}

impl WhereClause {
    fn push<T>(&mut self, column: &str, op: &str, value: T)
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Box::new(value));
        self.clauses
            .push(format!("{column} {op} ${}", self.params.len()));
    }

    fn push_any(&mut self, column: &str, values: Vec<String>) {
        self.params.push(Box::new(values));
        self.clauses
            .push(format!("{column} = ANY(${})", self.params.len()));
    }

    fn push_name(&mut self, name: &PersonName) {
        self.push("first_name", "=", name.first_name.clone());
        self.push("last_name", "=", name.last_name.clone());
        self.push(
            "middle_initial",
            "IS NOT DISTINCT FROM",
            initial_to_sql(name.middle_initial),
        );
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

fn patient_where(filter: &PatientFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    if let Some(ref name) = filter.name {
        clause.push_name(name);
    }
    if let Some(ref contact) = filter.contact {
        clause.push("contact", "=", contact.clone());
    }
    clause
}

fn doctor_where(filter: &DoctorFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    if let Some(ref name) = filter.name {
        clause.push_name(name);
    }
    if let Some(ref contact) = filter.contact {
        clause.push("contact", "=", contact.clone());
    }
    clause
}

fn specialization_where(filter: &SpecializationFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    if let Some(doctor_id) = filter.doctor_id {
        clause.push("doctor_id", "=", doctor_id.value());
    }
    if let Some(ref label) = filter.specialization {
        clause.push("specialization", "=", label.clone());
    }
    clause
}

fn appointment_where(filter: &AppointmentFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    if let Some(patient_id) = filter.patient_id {
        clause.push("patient_id", "=", patient_id.value());
    }
    if let Some(doctor_id) = filter.doctor_id {
        clause.push("doctor_id", "=", doctor_id.value());
    }
    if let Some(date) = filter.date {
        clause.push("appointment_date", "=", date);
    }
    if let Some(time) = filter.time {
        clause.push("appointment_time", "=", time);
    }
    if !filter.statuses.is_empty() {
        let statuses = filter.statuses.iter().map(|s| s.to_string()).collect();
        clause.push_any("status", statuses);
    }
    if let Some(from) = filter.date_from {
        clause.push("appointment_date", ">=", from);
    }
    if let Some(to) = filter.date_to {
        clause.push("appointment_date", "<=", to);
    }
    clause
}

fn payment_where(filter: &PaymentFilter) -> WhereClause {
    let mut clause = WhereClause::default();
    if let Some(appointment_id) = filter.appointment_id {
        clause.push("appointment_id", "=", appointment_id.value());
    }
    if let Some(status) = filter.status {
        clause.push("status", "=", status.to_string());
    }
    clause
}

/// Transaction on one pooled PostgreSQL connection
pub struct PostgreSQLTransaction {
    conn: Option<deadpool_postgres::Object>,
}

impl PostgreSQLTransaction {
    fn conn(&self) -> Result<&deadpool_postgres::Object> {
        self.conn.as_ref().ok_or_else(|| {
            StoreError::TransactionFailed("transaction already finished".to_string()).into()
        })
    }

    async fn fetch_one<T>(
        &self,
        context: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        map: RowMapper<T>,
    ) -> Result<T> {
        let row = self
            .conn()?
            .query_one(sql, params)
            .await
            .map_err(|e| map_pg_error(context, e))?;
        map(&row)
    }

    async fn fetch_opt<T>(
        &self,
        context: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        map: RowMapper<T>,
    ) -> Result<Option<T>> {
        let row = self
            .conn()?
            .query_opt(sql, params)
            .await
            .map_err(|e| map_pg_error(context, e))?;
        row.as_ref().map(map).transpose()
    }

    async fn fetch_all<T>(
        &self,
        context: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
        map: RowMapper<T>,
    ) -> Result<Vec<T>> {
        let rows = self
            .conn()?
            .query(sql, params)
            .await
            .map_err(|e| map_pg_error(context, e))?;
        rows.iter().map(map).collect()
    }

    async fn execute(
        &self,
        context: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64> {
        self.conn()?
            .execute(sql, params)
            .await
            .map_err(|e| map_pg_error(context, e))
    }
}

impl Drop for PostgreSQLTransaction {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            tracing::warn!(
                "PostgreSQL transaction dropped without commit or rollback; discarding connection"
            );
            drop(deadpool_postgres::Object::take(conn));
        }
    }
}

#[async_trait]
impl StoreTransaction for PostgreSQLTransaction {
    async fn insert_patient(&mut self, draft: &PatientDraft) -> Result<Patient> {
        let sql = format!(
            "INSERT INTO patients (first_name, last_name, middle_initial, age, gender, contact, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {PATIENT_COLUMNS}"
        );
        let initial = initial_to_sql(draft.name.middle_initial);
        let age = i16::from(draft.age);
        let gender = draft.gender.as_str();
        self.fetch_one(
            "insert patient",
            &sql,
            &[
                &draft.name.first_name,
                &draft.name.last_name,
                &initial,
                &age,
                &gender,
                &draft.contact,
                &draft.address,
            ],
            patient_from_row,
        )
        .await
    }

    async fn get_patient(&mut self, id: PatientId) -> Result<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1");
        self.fetch_opt("get patient", &sql, &[&id.value()], patient_from_row)
            .await
    }

    async fn update_patient(
        &mut self,
        id: PatientId,
        draft: &PatientDraft,
    ) -> Result<Option<Patient>> {
        let sql = format!(
            "UPDATE patients SET first_name = $2, last_name = $3, middle_initial = $4, age = $5, \
             gender = $6, contact = $7, address = $8, updated_at = NOW() \
             WHERE id = $1 RETURNING {PATIENT_COLUMNS}"
        );
        let initial = initial_to_sql(draft.name.middle_initial);
        let age = i16::from(draft.age);
        let gender = draft.gender.as_str();
        self.fetch_opt(
            "update patient",
            &sql,
            &[
                &id.value(),
                &draft.name.first_name,
                &draft.name.last_name,
                &initial,
                &age,
                &gender,
                &draft.contact,
                &draft.address,
            ],
            patient_from_row,
        )
        .await
    }

    async fn delete_patient(&mut self, id: PatientId) -> Result<bool> {
        let deleted = self
            .execute(
                "delete patient",
                "DELETE FROM patients WHERE id = $1",
                &[&id.value()],
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn list_patients(&mut self, filter: &PatientFilter) -> Result<Vec<Patient>> {
        let clause = patient_where(filter);
        let sql = format!(
            "SELECT {PATIENT_COLUMNS} FROM patients{} ORDER BY first_name, id",
            clause.sql()
        );
        self.fetch_all("list patients", &sql, &clause.params(), patient_from_row)
            .await
    }

    async fn insert_doctor(&mut self, draft: &DoctorDraft) -> Result<Doctor> {
        let sql = format!(
            "INSERT INTO doctors (first_name, last_name, middle_initial, contact) \
             VALUES ($1, $2, $3, $4) RETURNING {DOCTOR_COLUMNS}"
        );
        let initial = initial_to_sql(draft.name.middle_initial);
        self.fetch_one(
            "insert doctor",
            &sql,
            &[
                &draft.name.first_name,
                &draft.name.last_name,
                &initial,
                &draft.contact,
            ],
            doctor_from_row,
        )
        .await
    }

    async fn get_doctor(&mut self, id: DoctorId) -> Result<Option<Doctor>> {
        let sql = format!("SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1");
        self.fetch_opt("get doctor", &sql, &[&id.value()], doctor_from_row)
            .await
    }

    async fn update_doctor(
        &mut self,
        id: DoctorId,
        draft: &DoctorDraft,
    ) -> Result<Option<Doctor>> {
        let sql = format!(
            "UPDATE doctors SET first_name = $2, last_name = $3, middle_initial = $4, contact = $5, \
             updated_at = NOW() WHERE id = $1 RETURNING {DOCTOR_COLUMNS}"
        );
        let initial = initial_to_sql(draft.name.middle_initial);
        self.fetch_opt(
            "update doctor",
            &sql,
            &[
                &id.value(),
                &draft.name.first_name,
                &draft.name.last_name,
                &initial,
                &draft.contact,
            ],
            doctor_from_row,
        )
        .await
    }

    async fn delete_doctor(&mut self, id: DoctorId) -> Result<bool> {
        // doctor_specializations rows go with it through ON DELETE CASCADE
        let deleted = self
            .execute(
                "delete doctor",
                "DELETE FROM doctors WHERE id = $1",
                &[&id.value()],
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn list_doctors(&mut self, filter: &DoctorFilter) -> Result<Vec<Doctor>> {
        let clause = doctor_where(filter);
        let sql = format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors{} ORDER BY first_name, id",
            clause.sql()
        );
        self.fetch_all("list doctors", &sql, &clause.params(), doctor_from_row)
            .await
    }

    async fn insert_specialization(
        &mut self,
        draft: &SpecializationDraft,
    ) -> Result<DoctorSpecialization> {
        let sql = format!(
            "INSERT INTO doctor_specializations (doctor_id, specialization) \
             VALUES ($1, $2) RETURNING {SPECIALIZATION_COLUMNS}"
        );
        self.fetch_one(
            "insert specialization",
            &sql,
            &[&draft.doctor_id.value(), &draft.specialization],
            specialization_from_row,
        )
        .await
    }

    async fn get_specialization(
        &mut self,
        id: SpecializationId,
    ) -> Result<Option<DoctorSpecialization>> {
        let sql =
            format!("SELECT {SPECIALIZATION_COLUMNS} FROM doctor_specializations WHERE id = $1");
        self.fetch_opt(
            "get specialization",
            &sql,
            &[&id.value()],
            specialization_from_row,
        )
        .await
    }

    async fn update_specialization(
        &mut self,
        id: SpecializationId,
        draft: &SpecializationDraft,
    ) -> Result<Option<DoctorSpecialization>> {
        let sql = format!(
            "UPDATE doctor_specializations SET doctor_id = $2, specialization = $3, \
             updated_at = NOW() WHERE id = $1 RETURNING {SPECIALIZATION_COLUMNS}"
        );
        self.fetch_opt(
            "update specialization",
            &sql,
            &[&id.value(), &draft.doctor_id.value(), &draft.specialization],
            specialization_from_row,
        )
        .await
    }

    async fn delete_specialization(&mut self, id: SpecializationId) -> Result<bool> {
        let deleted = self
            .execute(
                "delete specialization",
                "DELETE FROM doctor_specializations WHERE id = $1",
                &[&id.value()],
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn delete_specializations_for_doctor(&mut self, doctor_id: DoctorId) -> Result<u64> {
        self.execute(
            "clear specializations",
            "DELETE FROM doctor_specializations WHERE doctor_id = $1",
            &[&doctor_id.value()],
        )
        .await
    }

    async fn list_specializations(
        &mut self,
        filter: &SpecializationFilter,
    ) -> Result<Vec<DoctorSpecialization>> {
        let clause = specialization_where(filter);
        let sql = format!(
            "SELECT {SPECIALIZATION_COLUMNS} FROM doctor_specializations{} ORDER BY id",
            clause.sql()
        );
        self.fetch_all(
            "list specializations",
            &sql,
            &clause.params(),
            specialization_from_row,
        )
        .await
    }

    async fn insert_appointment(&mut self, draft: &AppointmentDraft) -> Result<Appointment> {
        let sql = format!(
            "INSERT INTO appointments (patient_id, doctor_id, appointment_date, appointment_time, purpose, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {APPOINTMENT_COLUMNS}"
        );
        let status = draft.status.as_str();
        self.fetch_one(
            "insert appointment",
            &sql,
            &[
                &draft.patient_id.value(),
                &draft.doctor_id.value(),
                &draft.appointment_date,
                &draft.appointment_time,
                &draft.purpose,
                &status,
            ],
            appointment_from_row,
        )
        .await
    }

    async fn get_appointment(&mut self, id: AppointmentId) -> Result<Option<Appointment>> {
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1");
        self.fetch_opt("get appointment", &sql, &[&id.value()], appointment_from_row)
            .await
    }

    async fn update_appointment(
        &mut self,
        id: AppointmentId,
        draft: &AppointmentDraft,
    ) -> Result<Option<Appointment>> {
        let sql = format!(
            "UPDATE appointments SET patient_id = $2, doctor_id = $3, appointment_date = $4, \
             appointment_time = $5, purpose = $6, status = $7, updated_at = NOW() \
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        );
        let status = draft.status.as_str();
        self.fetch_opt(
            "update appointment",
            &sql,
            &[
                &id.value(),
                &draft.patient_id.value(),
                &draft.doctor_id.value(),
                &draft.appointment_date,
                &draft.appointment_time,
                &draft.purpose,
                &status,
            ],
            appointment_from_row,
        )
        .await
    }

    async fn set_appointment_status(
        &mut self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let sql = format!(
            "UPDATE appointments SET status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        );
        let status = status.as_str();
        self.fetch_opt(
            "set appointment status",
            &sql,
            &[&id.value(), &status],
            appointment_from_row,
        )
        .await
    }

    async fn delete_appointment(&mut self, id: AppointmentId) -> Result<bool> {
        let deleted = self
            .execute(
                "delete appointment",
                "DELETE FROM appointments WHERE id = $1",
                &[&id.value()],
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn list_appointments(&mut self, filter: &AppointmentFilter) -> Result<Vec<Appointment>> {
        let clause = appointment_where(filter);
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments{} \
             ORDER BY appointment_date DESC, appointment_time DESC, id",
            clause.sql()
        );
        self.fetch_all(
            "list appointments",
            &sql,
            &clause.params(),
            appointment_from_row,
        )
        .await
    }

    async fn insert_payment(&mut self, draft: &PaymentDraft) -> Result<Payment> {
        let sql = format!(
            "INSERT INTO payments (appointment_id, amount, method, status) \
             VALUES ($1, $2, $3, $4) RETURNING {PAYMENT_COLUMNS}"
        );
        let method = draft.method.as_str();
        let status = draft.status.as_str();
        self.fetch_one(
            "insert payment",
            &sql,
            &[
                &draft.appointment_id.value(),
                &draft.amount,
                &method,
                &status,
            ],
            payment_from_row,
        )
        .await
    }

    async fn get_payment(&mut self, id: PaymentId) -> Result<Option<Payment>> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        self.fetch_opt("get payment", &sql, &[&id.value()], payment_from_row)
            .await
    }

    async fn update_payment(
        &mut self,
        id: PaymentId,
        draft: &PaymentDraft,
    ) -> Result<Option<Payment>> {
        let sql = format!(
            "UPDATE payments SET appointment_id = $2, amount = $3, method = $4, status = $5, \
             updated_at = NOW() WHERE id = $1 RETURNING {PAYMENT_COLUMNS}"
        );
        let method = draft.method.as_str();
        let status = draft.status.as_str();
        self.fetch_opt(
            "update payment",
            &sql,
            &[
                &id.value(),
                &draft.appointment_id.value(),
                &draft.amount,
                &method,
                &status,
            ],
            payment_from_row,
        )
        .await
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<bool> {
        let deleted = self
            .execute(
                "delete payment",
                "DELETE FROM payments WHERE id = $1",
                &[&id.value()],
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn list_payments(&mut self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let clause = payment_where(filter);
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments{} ORDER BY created_at DESC, id DESC",
            clause.sql()
        );
        self.fetch_all("list payments", &sql, &clause.params(), payment_from_row)
            .await
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let conn = this.conn.take().ok_or_else(|| {
            StoreError::TransactionFailed("transaction already finished".to_string())
        })?;
        conn.batch_execute("COMMIT")
            .await
            .map_err(|e| map_pg_error("commit", e))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let mut this = self;
        let conn = this.conn.take().ok_or_else(|| {
            StoreError::TransactionFailed("transaction already finished".to_string())
        })?;
        if let Err(e) = conn.batch_execute("ROLLBACK").await {
            tracing::error!(error = %e, "Rollback failed; discarding connection");
            drop(deadpool_postgres::Object::take(conn));
            return Err(map_pg_error("rollback", e));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_where_clause() {
        let clause = patient_where(&PatientFilter::default());
        assert_eq!(clause.sql(), "");
        assert!(clause.params().is_empty());
    }

    #[test]
    fn test_name_filter_uses_null_safe_initial() {
        let filter = PatientFilter::default().with_name(PersonName::new("Ann", "Lee", None));
        let clause = patient_where(&filter);
        assert_eq!(
            clause.sql(),
            " WHERE first_name = $1 AND last_name = $2 AND middle_initial IS NOT DISTINCT FROM $3"
        );
        assert_eq!(clause.params().len(), 3);
    }

    #[test]
    fn test_appointment_where_numbers_parameters_in_order() {
        let filter = AppointmentFilter::for_doctor(DoctorId::new(4))
            .from_date(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
            .with_statuses([AppointmentStatus::Pending, AppointmentStatus::Confirmed]);
        let clause = appointment_where(&filter);
        assert_eq!(
            clause.sql(),
            " WHERE doctor_id = $1 AND status = ANY($2) AND appointment_date >= $3"
        );
    }

    #[test]
    fn test_payment_where_status() {
        let filter = PaymentFilter::default().with_status(crate::domain::PaymentStatus::Unpaid);
        assert_eq!(payment_where(&filter).sql(), " WHERE status = $1");
    }
}
