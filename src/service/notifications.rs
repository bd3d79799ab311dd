use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::debug;

use crate::error::ClinicError;
use crate::models::{NewNotification, Notification};
use crate::schema::notifications;
use crate::service::required_text;

/// Queues a message for a user, a patient, or both.
pub fn notify(conn: &mut PgConnection, notification: NewNotification) -> Result<Notification, ClinicError> {
    if notification.user_id.is_none() && notification.patient_id.is_none() {
        return Err(ClinicError::validation(
            "notification needs a user or a patient to address",
        ));
    }
    let notification = NewNotification {
        message: required_text("message", &notification.message)?,
        ..notification
    };
    let notification = diesel::insert_into(notifications::table)
        .values(&notification)
        .returning(Notification::as_returning())
        .get_result(conn)?;
    debug!("notification {} queued", notification.id);
    Ok(notification)
}

pub fn mark_read(conn: &mut PgConnection, notification_id: i32) -> Result<Notification, ClinicError> {
    diesel::update(notifications::table.find(notification_id))
        .set(notifications::is_read.eq(true))
        .returning(Notification::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "notification",
            id: notification_id,
        })
}

pub fn unread_for_user(conn: &mut PgConnection, user_id: i32) -> Result<Vec<Notification>, ClinicError> {
    Ok(notifications::table
        .filter(notifications::user_id.eq(user_id))
        .filter(notifications::is_read.eq(false))
        .select(Notification::as_select())
        .order(notifications::id.asc())
        .load(conn)?)
}

pub fn unread_for_patient(conn: &mut PgConnection, patient_id: i32) -> Result<Vec<Notification>, ClinicError> {
    Ok(notifications::table
        .filter(notifications::patient_id.eq(patient_id))
        .filter(notifications::is_read.eq(false))
        .select(Notification::as_select())
        .order(notifications::id.asc())
        .load(conn)?)
}
