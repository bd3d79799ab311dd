use std::fmt;
use std::io::Write;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ClinicError;
use crate::schema::{
    appointments, doctors, inventory, invoices, medical_records, notifications, patients, payments,
    prescriptions, sql_types, users,
};

// Each closed set is a Postgres enum type; the labels below must match the
// `CREATE TYPE` statements in the migrations.
macro_rules! closed_set {
    ($name:ident, $sql_type:ty, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ClinicError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(ClinicError::validation(format!(
                        "unknown {}: {other:?}", $label
                    ))),
                }
            }
        }

        impl ToSql<$sql_type, Pg> for $name {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
                out.write_all(self.as_str().as_bytes())?;
                Ok(IsNull::No)
            }
        }

        impl FromSql<$sql_type, Pg> for $name {
            fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
                Ok(std::str::from_utf8(bytes.as_bytes())?.parse()?)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::UserRole)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Staff,
}

closed_set!(Role, sql_types::UserRole, "role" {
    Admin => "admin",
    Doctor => "doctor",
    Staff => "staff",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::AppointmentStatus)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

closed_set!(AppointmentStatus, sql_types::AppointmentStatus, "appointment status" {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::InvoiceStatus)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Unpaid,
    Pending,
    Paid,
}

closed_set!(InvoiceStatus, sql_types::InvoiceStatus, "invoice status" {
    Unpaid => "unpaid",
    Pending => "pending",
    Paid => "paid",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = sql_types::PaymentMethod)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    Insurance,
}

closed_set!(PaymentMethod, sql_types::PaymentMethod, "payment method" {
    Cash => "cash",
    MobileMoney => "mobile_money",
    Card => "card",
    Insurance => "insurance",
});

// Users

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Pg))]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Contact fields a user may change; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, AsChangeset, Deserialize)]
#[diesel(table_name = users)]
pub struct UserContactUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// Patients

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = patients)]
#[diesel(check_for_backend(Pg))]
pub struct Patient {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub insurance: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deactivated_at: Option<NaiveDateTime>,
}

impl Patient {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

#[derive(Debug, Clone, Default, Insertable, Deserialize)]
#[diesel(table_name = patients)]
pub struct NewPatient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub insurance: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset, Deserialize)]
#[diesel(table_name = patients)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub insurance: Option<String>,
    pub emergency_contact: Option<String>,
}

// Doctors

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(belongs_to(User))]
#[diesel(table_name = doctors)]
#[diesel(check_for_backend(Pg))]
pub struct Doctor {
    pub id: i32,
    pub user_id: i32,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = doctors)]
pub struct NewDoctor {
    pub user_id: i32,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
}

// Appointments

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(belongs_to(Patient))]
#[diesel(belongs_to(Doctor))]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(Pg))]
pub struct Appointment {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
}

/// New appointments always start as `scheduled`, the column default.
#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = appointments)]
pub struct NewAppointment {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub scheduled_at: NaiveDateTime,
    pub reason: Option<String>,
}

// Clinical records

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(belongs_to(Patient))]
#[diesel(belongs_to(Doctor))]
#[diesel(table_name = medical_records)]
#[diesel(check_for_backend(Pg))]
pub struct MedicalRecord {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = medical_records)]
pub struct NewMedicalRecord {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub diagnosis: String,
    pub notes: Option<String>,
}

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(belongs_to(Patient))]
#[diesel(belongs_to(Doctor))]
#[diesel(table_name = prescriptions)]
#[diesel(check_for_backend(Pg))]
pub struct Prescription {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub medication: String,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = prescriptions)]
pub struct NewPrescription {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub medication: String,
    pub dosage: Option<String>,
    pub instructions: Option<String>,
}

// Billing

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(belongs_to(Patient))]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(Pg))]
pub struct Invoice {
    pub id: i32,
    pub patient_id: i32,
    pub amount: Decimal,
    pub status: InvoiceStatus,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = invoices)]
pub struct NewInvoice {
    pub patient_id: i32,
    pub amount: Decimal,
}

#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations, Serialize, Deserialize,
)]
#[diesel(belongs_to(Invoice))]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(Pg))]
pub struct Payment {
    pub id: i32,
    pub invoice_id: i32,
    pub amount_paid: Decimal,
    pub method: PaymentMethod,
    pub transaction_ref: Option<String>,
    pub paid_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = payments)]
pub struct NewPayment {
    pub invoice_id: i32,
    pub amount_paid: Decimal,
    pub method: PaymentMethod,
    pub transaction_ref: Option<String>,
}

// Inventory

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = inventory)]
#[diesel(check_for_backend(Pg))]
pub struct InventoryItem {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = inventory)]
pub struct NewInventoryItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

// Notifications

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(Pg))]
pub struct Notification {
    pub id: i32,
    pub user_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, Deserialize)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub user_id: Option<i32>,
    pub patient_id: Option<i32>,
    pub message: String,
}
