use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::info;

use crate::error::ClinicError;
use crate::models::{MedicalRecord, NewMedicalRecord, NewPrescription, Prescription};
use crate::schema::{medical_records, prescriptions};
use crate::service::{optional_text, required_text};

/// Appends a diagnosis to a patient's history. Records are never updated;
/// a correction is a new record.
pub fn record_diagnosis(
    conn: &mut PgConnection,
    record: NewMedicalRecord,
) -> Result<MedicalRecord, ClinicError> {
    let record = NewMedicalRecord {
        diagnosis: required_text("diagnosis", &record.diagnosis)?,
        notes: optional_text(record.notes),
        ..record
    };
    let record = diesel::insert_into(medical_records::table)
        .values(&record)
        .returning(MedicalRecord::as_returning())
        .get_result(conn)?;
    info!(
        "medical record {} added for patient {} by doctor {}",
        record.id, record.patient_id, record.doctor_id
    );
    Ok(record)
}

pub fn prescribe(conn: &mut PgConnection, prescription: NewPrescription) -> Result<Prescription, ClinicError> {
    let prescription = NewPrescription {
        medication: required_text("medication", &prescription.medication)?,
        dosage: optional_text(prescription.dosage),
        instructions: optional_text(prescription.instructions),
        ..prescription
    };
    let prescription = diesel::insert_into(prescriptions::table)
        .values(&prescription)
        .returning(Prescription::as_returning())
        .get_result(conn)?;
    info!(
        "prescription {} ({}) for patient {}",
        prescription.id, prescription.medication, prescription.patient_id
    );
    Ok(prescription)
}
