use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::{info, warn};

use crate::error::ClinicError;
use crate::models::{NewPatient, Patient, PatientUpdate};
use crate::schema::patients;
use crate::service::users::normalize_email;
use crate::service::{optional_text, required_text};

fn clean_email(email: Option<String>) -> Result<Option<String>, ClinicError> {
    optional_text(email).map(|e| normalize_email(&e)).transpose()
}

/// Registers a patient at intake.
pub fn admit_patient(conn: &mut PgConnection, patient: NewPatient) -> Result<Patient, ClinicError> {
    let patient = NewPatient {
        name: required_text("name", &patient.name)?,
        email: clean_email(patient.email)?,
        phone: optional_text(patient.phone),
        address: optional_text(patient.address),
        dob: patient.dob,
        gender: optional_text(patient.gender),
        insurance: optional_text(patient.insurance),
        emergency_contact: optional_text(patient.emergency_contact),
    };
    if let Some(dob) = patient.dob {
        if dob > Utc::now().date_naive() {
            return Err(ClinicError::validation("date of birth is in the future"));
        }
    }

    let patient = diesel::insert_into(patients::table)
        .values(&patient)
        .returning(Patient::as_returning())
        .get_result(conn)?;
    info!("admitted patient {}", patient.id);
    Ok(patient)
}

pub fn find_patient(conn: &mut PgConnection, patient_id: i32) -> Result<Patient, ClinicError> {
    patients::table
        .find(patient_id)
        .select(Patient::as_select())
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "patient",
            id: patient_id,
        })
}

/// Finds a patient that has not been deactivated.
pub fn find_active_patient(conn: &mut PgConnection, patient_id: i32) -> Result<Patient, ClinicError> {
    let patient = find_patient(conn, patient_id)?;
    if !patient.is_active() {
        return Err(ClinicError::validation(format!(
            "patient {patient_id} is deactivated"
        )));
    }
    Ok(patient)
}

pub fn update_patient(
    conn: &mut PgConnection,
    patient_id: i32,
    update: PatientUpdate,
) -> Result<Patient, ClinicError> {
    let update = PatientUpdate {
        name: update.name.map(|n| required_text("name", &n)).transpose()?,
        email: clean_email(update.email)?,
        phone: optional_text(update.phone),
        address: optional_text(update.address),
        dob: update.dob,
        gender: optional_text(update.gender),
        insurance: optional_text(update.insurance),
        emergency_contact: optional_text(update.emergency_contact),
    };
    let unchanged = update.name.is_none()
        && update.email.is_none()
        && update.phone.is_none()
        && update.address.is_none()
        && update.dob.is_none()
        && update.gender.is_none()
        && update.insurance.is_none()
        && update.emergency_contact.is_none();
    if unchanged {
        return find_patient(conn, patient_id);
    }

    diesel::update(patients::table.find(patient_id))
        .set(&update)
        .returning(Patient::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "patient",
            id: patient_id,
        })
}

/// Soft-deactivates a patient. Clinical and billing history keeps pointing
/// at the row, so patients are never deleted. Deactivating twice keeps the
/// first timestamp.
pub fn deactivate_patient(conn: &mut PgConnection, patient_id: i32) -> Result<Patient, ClinicError> {
    let updated = diesel::update(
        patients::table
            .find(patient_id)
            .filter(patients::deactivated_at.is_null()),
    )
    .set(patients::deactivated_at.eq(diesel::dsl::now.nullable()))
    .returning(Patient::as_returning())
    .get_result(conn)
    .optional()?;

    match updated {
        Some(patient) => {
            info!("deactivated patient {patient_id}");
            Ok(patient)
        }
        None => {
            let patient = find_patient(conn, patient_id)?;
            warn!("patient {patient_id} was already deactivated");
            Ok(patient)
        }
    }
}

pub fn active_patients(conn: &mut PgConnection) -> Result<Vec<Patient>, ClinicError> {
    Ok(patients::table
        .filter(patients::deactivated_at.is_null())
        .select(Patient::as_select())
        .order(patients::name.asc())
        .load(conn)?)
}
