#![allow(dead_code)]

use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime};
use clinicdb::models::{Doctor, NewDoctor, NewPatient, Patient, Role, User};
use clinicdb::service::users::UserRegistration;
use clinicdb::service::{doctors, patients, users};
use clinicdb::{ClinicError, DatabaseConfig, db};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use rust_decimal::Decimal;

pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

static MIGRATE: Once = Once::new();

/// Connects to the database named by `TEST_DATABASE_URL`, migrating it once
/// per test binary.
///
/// Database tests are `#[ignore]`d so a plain `cargo test` runs only the
/// unit tests; `cargo test -- --ignored` runs these and fails outright when
/// the variable is missing.
pub fn connection() -> PgConnection {
    let _ = env_logger::builder().is_test(true).try_init();
    dotenvy::dotenv().ok();

    let url = std::env::var(TEST_DATABASE_URL)
        .unwrap_or_else(|_| panic!("{TEST_DATABASE_URL} must name a Postgres database for this test"));
    let config = DatabaseConfig::from_lookup(|key| {
        (key == clinicdb::config::DATABASE_URL_VAR).then(|| url.clone())
    })
    .expect("valid TEST_DATABASE_URL");
    let mut conn = db::establish(&config).expect("connect to test database");

    MIGRATE.call_once(|| {
        db::run_migrations(&mut conn).expect("migrations apply");
    });
    conn
}

/// Runs `f` inside a transaction that is always rolled back.
pub fn with_rollback<F>(f: F)
where
    F: FnOnce(&mut PgConnection) -> Result<(), ClinicError>,
{
    connection().test_transaction::<_, ClinicError, _>(f);
}

/// Runs `f` in a savepoint so an expected failure leaves the surrounding
/// test transaction usable.
pub fn savepoint<T, F>(conn: &mut PgConnection, f: F) -> Result<T, ClinicError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, ClinicError>,
{
    conn.transaction(f)
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid timestamp")
}

pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

pub fn staff(conn: &mut PgConnection, email: &str) -> Result<User, ClinicError> {
    users::register_user(
        conn,
        UserRegistration {
            name: "Front Desk".into(),
            email: email.into(),
            password: "front-desk-pass".into(),
            role: Role::Staff,
            phone: None,
            address: None,
        },
    )
}

pub fn doctor(conn: &mut PgConnection, email: &str, license: &str) -> Result<(User, Doctor), ClinicError> {
    let user = users::register_user(
        conn,
        UserRegistration {
            name: "Dr. Jane".into(),
            email: email.into(),
            password: "stethoscope".into(),
            role: Role::Doctor,
            phone: Some("+254700000000".into()),
            address: None,
        },
    )?;
    let doctor = doctors::create_doctor_profile(
        conn,
        NewDoctor {
            user_id: user.id,
            specialization: Some("General Practice".into()),
            license_number: Some(license.into()),
        },
    )?;
    Ok((user, doctor))
}

pub fn patient(conn: &mut PgConnection, name: &str) -> Result<Patient, ClinicError> {
    patients::admit_patient(
        conn,
        NewPatient {
            name: name.into(),
            dob: NaiveDate::from_ymd_opt(1990, 1, 1),
            gender: Some("male".into()),
            ..Default::default()
        },
    )
}
