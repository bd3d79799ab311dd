//! Named navigational relations between the clinic tables.
//!
//! Each function resolves one association so callers can walk from a row to
//! its related rows without writing joins. Many-to-one lookups fail with
//! `diesel::NotFound` only if referential integrity has been bypassed.

use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::models::{
    Appointment, Doctor, Invoice, MedicalRecord, Notification, Patient, Payment, Prescription, User,
};
use crate::schema::{appointments, doctors, invoices, medical_records, notifications, patients, payments, prescriptions, users};

// One-to-one

pub fn doctor_profile(conn: &mut PgConnection, user: &User) -> QueryResult<Option<Doctor>> {
    Doctor::belonging_to(user)
        .select(Doctor::as_select())
        .first(conn)
        .optional()
}

pub fn doctor_user(conn: &mut PgConnection, doctor: &Doctor) -> QueryResult<User> {
    users::table
        .find(doctor.user_id)
        .select(User::as_select())
        .first(conn)
}

// One-to-many

pub fn patient_appointments(conn: &mut PgConnection, patient: &Patient) -> QueryResult<Vec<Appointment>> {
    Appointment::belonging_to(patient)
        .select(Appointment::as_select())
        .order(appointments::scheduled_at.asc())
        .load(conn)
}

pub fn doctor_appointments(conn: &mut PgConnection, doctor: &Doctor) -> QueryResult<Vec<Appointment>> {
    Appointment::belonging_to(doctor)
        .select(Appointment::as_select())
        .order(appointments::scheduled_at.asc())
        .load(conn)
}

pub fn patient_medical_records(
    conn: &mut PgConnection,
    patient: &Patient,
) -> QueryResult<Vec<MedicalRecord>> {
    MedicalRecord::belonging_to(patient)
        .select(MedicalRecord::as_select())
        .order((medical_records::created_at.asc(), medical_records::id.asc()))
        .load(conn)
}

pub fn doctor_medical_records(
    conn: &mut PgConnection,
    doctor: &Doctor,
) -> QueryResult<Vec<MedicalRecord>> {
    MedicalRecord::belonging_to(doctor)
        .select(MedicalRecord::as_select())
        .order((medical_records::created_at.asc(), medical_records::id.asc()))
        .load(conn)
}

pub fn patient_prescriptions(
    conn: &mut PgConnection,
    patient: &Patient,
) -> QueryResult<Vec<Prescription>> {
    Prescription::belonging_to(patient)
        .select(Prescription::as_select())
        .order(prescriptions::id.asc())
        .load(conn)
}

pub fn doctor_prescriptions(conn: &mut PgConnection, doctor: &Doctor) -> QueryResult<Vec<Prescription>> {
    Prescription::belonging_to(doctor)
        .select(Prescription::as_select())
        .order(prescriptions::id.asc())
        .load(conn)
}

pub fn patient_invoices(conn: &mut PgConnection, patient: &Patient) -> QueryResult<Vec<Invoice>> {
    Invoice::belonging_to(patient)
        .select(Invoice::as_select())
        .order(invoices::id.asc())
        .load(conn)
}

pub fn invoice_payments(conn: &mut PgConnection, invoice: &Invoice) -> QueryResult<Vec<Payment>> {
    Payment::belonging_to(invoice)
        .select(Payment::as_select())
        .order(payments::id.asc())
        .load(conn)
}

pub fn user_notifications(conn: &mut PgConnection, user: &User) -> QueryResult<Vec<Notification>> {
    notifications::table
        .filter(notifications::user_id.eq(user.id))
        .select(Notification::as_select())
        .order(notifications::id.desc())
        .load(conn)
}

pub fn patient_notifications(
    conn: &mut PgConnection,
    patient: &Patient,
) -> QueryResult<Vec<Notification>> {
    notifications::table
        .filter(notifications::patient_id.eq(patient.id))
        .select(Notification::as_select())
        .order(notifications::id.desc())
        .load(conn)
}

// Many-to-one

pub fn appointment_patient(conn: &mut PgConnection, appointment: &Appointment) -> QueryResult<Patient> {
    patients::table
        .find(appointment.patient_id)
        .select(Patient::as_select())
        .first(conn)
}

pub fn appointment_doctor(conn: &mut PgConnection, appointment: &Appointment) -> QueryResult<Doctor> {
    doctors::table
        .find(appointment.doctor_id)
        .select(Doctor::as_select())
        .first(conn)
}

pub fn invoice_patient(conn: &mut PgConnection, invoice: &Invoice) -> QueryResult<Patient> {
    patients::table
        .find(invoice.patient_id)
        .select(Patient::as_select())
        .first(conn)
}

pub fn payment_invoice(conn: &mut PgConnection, payment: &Payment) -> QueryResult<Invoice> {
    invoices::table
        .find(payment.invoice_id)
        .select(Invoice::as_select())
        .first(conn)
}

// Batched

/// Loads the appointments of every given patient in one query.
pub fn patients_with_appointments(
    conn: &mut PgConnection,
    patients: Vec<Patient>,
) -> QueryResult<Vec<(Patient, Vec<Appointment>)>> {
    let appointments = Appointment::belonging_to(&patients)
        .select(Appointment::as_select())
        .order(appointments::scheduled_at.asc())
        .load(conn)?;

    Ok(appointments
        .grouped_by(&patients)
        .into_iter()
        .zip(patients)
        .map(|(appointments, patient)| (patient, appointments))
        .collect())
}

/// An appointment together with both of its parties.
pub fn appointment_with_parties(
    conn: &mut PgConnection,
    appointment_id: i32,
) -> QueryResult<(Appointment, Patient, Doctor)> {
    appointments::table
        .inner_join(patients::table)
        .inner_join(doctors::table)
        .filter(appointments::id.eq(appointment_id))
        .select((Appointment::as_select(), Patient::as_select(), Doctor::as_select()))
        .first(conn)
}
