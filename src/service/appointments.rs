use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::info;

use crate::error::ClinicError;
use crate::models::{Appointment, AppointmentStatus, NewAppointment};
use crate::schema::appointments;
use crate::service::optional_text;
use crate::service::patients::find_active_patient;

impl AppointmentStatus {
    /// `scheduled` may move to `completed` or `cancelled`; both are final.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Scheduled, AppointmentStatus::Completed)
                | (AppointmentStatus::Scheduled, AppointmentStatus::Cancelled)
        )
    }

    pub fn is_final(self) -> bool {
        self != AppointmentStatus::Scheduled
    }
}

pub fn schedule_appointment(
    conn: &mut PgConnection,
    appointment: NewAppointment,
) -> Result<Appointment, ClinicError> {
    find_active_patient(conn, appointment.patient_id)?;
    let appointment = NewAppointment {
        reason: optional_text(appointment.reason),
        ..appointment
    };

    let appointment = diesel::insert_into(appointments::table)
        .values(&appointment)
        .returning(Appointment::as_returning())
        .get_result(conn)?;
    info!(
        "scheduled appointment {} for patient {} with doctor {} at {}",
        appointment.id, appointment.patient_id, appointment.doctor_id, appointment.scheduled_at
    );
    Ok(appointment)
}

pub fn find_appointment(conn: &mut PgConnection, appointment_id: i32) -> Result<Appointment, ClinicError> {
    appointments::table
        .find(appointment_id)
        .select(Appointment::as_select())
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "appointment",
            id: appointment_id,
        })
}

/// Moves an appointment to `next`, locking the row so concurrent
/// transitions observe each other.
pub fn transition_appointment(
    conn: &mut PgConnection,
    appointment_id: i32,
    next: AppointmentStatus,
) -> Result<Appointment, ClinicError> {
    conn.transaction::<_, ClinicError, _>(|conn| {
        let current = appointments::table
            .find(appointment_id)
            .select(Appointment::as_select())
            .for_update()
            .first(conn)
            .optional()?
            .ok_or(ClinicError::NotFound {
                entity: "appointment",
                id: appointment_id,
            })?;

        if !current.status.can_transition_to(next) {
            return Err(ClinicError::InvalidTransition {
                entity: "appointment",
                from: current.status.to_string(),
                to: next.to_string(),
            });
        }

        let updated = diesel::update(appointments::table.find(appointment_id))
            .set(appointments::status.eq(next))
            .returning(Appointment::as_returning())
            .get_result(conn)?;
        info!("appointment {appointment_id}: {} -> {next}", current.status);
        Ok(updated)
    })
}

pub fn complete_appointment(conn: &mut PgConnection, appointment_id: i32) -> Result<Appointment, ClinicError> {
    transition_appointment(conn, appointment_id, AppointmentStatus::Completed)
}

pub fn cancel_appointment(conn: &mut PgConnection, appointment_id: i32) -> Result<Appointment, ClinicError> {
    transition_appointment(conn, appointment_id, AppointmentStatus::Cancelled)
}

/// Scheduled appointments of one doctor within `[from, to)`.
pub fn doctor_agenda(
    conn: &mut PgConnection,
    doctor_id: i32,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<Vec<Appointment>, ClinicError> {
    Ok(appointments::table
        .filter(appointments::doctor_id.eq(doctor_id))
        .filter(appointments::status.eq(AppointmentStatus::Scheduled))
        .filter(appointments::scheduled_at.ge(from))
        .filter(appointments::scheduled_at.lt(to))
        .select(Appointment::as_select())
        .order(appointments::scheduled_at.asc())
        .load(conn)?)
}
