use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::info;

use crate::error::ClinicError;
use crate::models::{Doctor, NewDoctor, Role};
use crate::schema::doctors;
use crate::service::optional_text;
use crate::service::users::find_user;

/// Attaches a doctor profile to a user account holding the `doctor` role.
pub fn create_doctor_profile(conn: &mut PgConnection, doctor: NewDoctor) -> Result<Doctor, ClinicError> {
    let user = find_user(conn, doctor.user_id)?;
    if user.role != Role::Doctor {
        return Err(ClinicError::validation(format!(
            "user {} has role {}, expected doctor",
            user.id, user.role
        )));
    }

    let doctor = NewDoctor {
        user_id: user.id,
        specialization: optional_text(doctor.specialization),
        license_number: optional_text(doctor.license_number).map(|l| l.to_uppercase()),
    };
    let doctor = diesel::insert_into(doctors::table)
        .values(&doctor)
        .returning(Doctor::as_returning())
        .get_result(conn)?;
    info!("created doctor profile {} for user {}", doctor.id, doctor.user_id);
    Ok(doctor)
}

pub fn find_doctor(conn: &mut PgConnection, doctor_id: i32) -> Result<Doctor, ClinicError> {
    doctors::table
        .find(doctor_id)
        .select(Doctor::as_select())
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "doctor",
            id: doctor_id,
        })
}

pub fn find_doctor_by_license(
    conn: &mut PgConnection,
    license_number: &str,
) -> Result<Option<Doctor>, ClinicError> {
    Ok(doctors::table
        .filter(doctors::license_number.eq(license_number.trim().to_uppercase()))
        .select(Doctor::as_select())
        .first(conn)
        .optional()?)
}
