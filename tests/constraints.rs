mod common;

use clinicdb::ClinicError;
use clinicdb::models::{
    Invoice, NewAppointment, NewDoctor, NewInvoice, NewMedicalRecord, NewNotification, NewPatient,
    NewPayment, NewUser, Patient, PaymentMethod, Role,
};
use clinicdb::schema::{appointments, doctors, invoices, medical_records, notifications, patients, payments, users};
use common::{at, dec, doctor, patient, savepoint, staff, with_rollback};
use diesel::pg::PgConnection;
use diesel::prelude::*;

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn duplicate_email_is_a_uniqueness_violation() {
    with_rollback(|conn| {
        staff(conn, "desk@clinic.test")?;
        let err = savepoint(conn, |c| staff(c, "Desk@Clinic.Test")).unwrap_err();
        match err {
            ClinicError::UniqueViolation { constraint } => {
                assert_eq!(constraint.as_deref(), Some("users_email_key"))
            }
            other => panic!("expected uniqueness violation, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn unnormalized_email_is_rejected_by_the_table() {
    with_rollback(|conn| {
        let err = savepoint(conn, |c| {
            diesel::insert_into(users::table)
                .values(&NewUser {
                    name: "Raw".into(),
                    email: "Raw@Clinic.Test".into(),
                    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
                    role: Role::Admin,
                    phone: None,
                    address: None,
                })
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        assert!(matches!(err, ClinicError::CheckViolation { .. }), "{err:?}");
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn duplicate_license_number_is_a_uniqueness_violation() {
    with_rollback(|conn| {
        doctor(conn, "first@clinic.test", "KMPDC-001")?;
        let err = savepoint(conn, |c| doctor(c, "second@clinic.test", "kmpdc-001")).unwrap_err();
        match err {
            ClinicError::UniqueViolation { constraint } => {
                assert_eq!(constraint.as_deref(), Some("doctors_license_number_key"))
            }
            other => panic!("expected uniqueness violation, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn doctor_profiles_are_one_per_user() {
    with_rollback(|conn| {
        let (user, _) = doctor(conn, "once@clinic.test", "LIC-ONCE")?;
        let err = savepoint(conn, |c| {
            diesel::insert_into(doctors::table)
                .values(&NewDoctor {
                    user_id: user.id,
                    specialization: None,
                    license_number: None,
                })
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        assert!(matches!(err, ClinicError::UniqueViolation { .. }), "{err:?}");
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn references_to_missing_rows_are_foreign_key_violations() {
    with_rollback(|conn| {
        let (_, doc) = doctor(conn, "fk@clinic.test", "LIC-FK")?;
        let (doctor_id, patient_id) = (doc.id, patient(conn, "FK Patient")?.id);
        let missing = i32::MAX;

        let cases: Vec<Box<dyn Fn(&mut PgConnection) -> QueryResult<usize>>> = vec![
            Box::new(move |c: &mut PgConnection| {
                diesel::insert_into(appointments::table)
                    .values(&NewAppointment {
                        patient_id: missing,
                        doctor_id,
                        scheduled_at: at(2025, 3, 1, 10, 0),
                        reason: None,
                    })
                    .execute(c)
            }),
            Box::new(move |c: &mut PgConnection| {
                diesel::insert_into(appointments::table)
                    .values(&NewAppointment {
                        patient_id,
                        doctor_id: missing,
                        scheduled_at: at(2025, 3, 1, 10, 0),
                        reason: None,
                    })
                    .execute(c)
            }),
            Box::new(move |c: &mut PgConnection| {
                diesel::insert_into(medical_records::table)
                    .values(&NewMedicalRecord {
                        patient_id: missing,
                        doctor_id,
                        diagnosis: "Influenza".into(),
                        notes: None,
                    })
                    .execute(c)
            }),
            Box::new(move |c: &mut PgConnection| {
                diesel::insert_into(invoices::table)
                    .values(&NewInvoice {
                        patient_id: missing,
                        amount: "10.00".parse().expect("decimal"),
                    })
                    .execute(c)
            }),
            Box::new(move |c: &mut PgConnection| {
                diesel::insert_into(payments::table)
                    .values(&NewPayment {
                        invoice_id: missing,
                        amount_paid: "10.00".parse().expect("decimal"),
                        method: PaymentMethod::Cash,
                        transaction_ref: None,
                    })
                    .execute(c)
            }),
            Box::new(move |c: &mut PgConnection| {
                diesel::insert_into(doctors::table)
                    .values(&NewDoctor {
                        user_id: missing,
                        specialization: None,
                        license_number: None,
                    })
                    .execute(c)
            }),
        ];

        for (i, case) in cases.iter().enumerate() {
            let err = savepoint(conn, |c| case(c).map_err(ClinicError::from)).unwrap_err();
            assert!(
                matches!(err, ClinicError::ForeignKeyViolation { .. }),
                "case {i}: {err:?}"
            );
        }
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn missing_required_column_is_a_not_null_violation() {
    with_rollback(|conn| {
        let err = savepoint(conn, |c| {
            diesel::sql_query("INSERT INTO patients (name) VALUES (NULL)")
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        assert!(matches!(err, ClinicError::NotNullViolation { .. }), "{err:?}");
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn deleting_a_patient_with_history_is_restricted() {
    with_rollback(|conn| {
        let (_, doc) = doctor(conn, "restrict@clinic.test", "LIC-RESTRICT")?;
        let pat = patient(conn, "Restricted Patient")?;
        diesel::insert_into(appointments::table)
            .values(&NewAppointment {
                patient_id: pat.id,
                doctor_id: doc.id,
                scheduled_at: at(2025, 3, 1, 10, 0),
                reason: None,
            })
            .execute(conn)?;

        let err = savepoint(conn, |c| {
            diesel::delete(patients::table.find(pat.id))
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        assert!(matches!(err, ClinicError::ForeignKeyViolation { .. }), "{err:?}");

        let still_there: i64 = patients::table.filter(patients::id.eq(pat.id)).count().get_result(conn)?;
        assert_eq!(still_there, 1);
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn deleting_a_user_cascades_to_notifications() {
    with_rollback(|conn| {
        let user = staff(conn, "cascade@clinic.test")?;
        diesel::insert_into(notifications::table)
            .values(&NewNotification {
                user_id: Some(user.id),
                patient_id: None,
                message: "Shift starts at 8".into(),
            })
            .execute(conn)?;

        diesel::delete(users::table.find(user.id)).execute(conn)?;
        let left: i64 = notifications::table
            .filter(notifications::user_id.eq(user.id))
            .count()
            .get_result(conn)?;
        assert_eq!(left, 0);
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn table_checks_guard_stock_money_and_targets() {
    with_rollback(|conn| {
        let pat = patient(conn, "Check Patient")?;

        let err = savepoint(conn, |c| {
            diesel::sql_query("INSERT INTO inventory (name, quantity, unit_price) VALUES ('Gauze', -1, 2.50)")
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        assert!(matches!(err, ClinicError::CheckViolation { .. }), "{err:?}");

        let err = savepoint(conn, |c| {
            diesel::insert_into(invoices::table)
                .values(&NewInvoice {
                    patient_id: pat.id,
                    amount: "-1.00".parse().expect("decimal"),
                })
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        assert!(matches!(err, ClinicError::CheckViolation { .. }), "{err:?}");

        let err = savepoint(conn, |c| {
            diesel::insert_into(notifications::table)
                .values(&NewNotification {
                    user_id: None,
                    patient_id: None,
                    message: "nobody".into(),
                })
                .execute(c)
                .map_err(ClinicError::from)
        })
        .unwrap_err();
        match err {
            ClinicError::CheckViolation { constraint } => {
                assert_eq!(constraint.as_deref(), Some("notifications_target_present"))
            }
            other => panic!("expected check violation, got {other:?}"),
        }
        Ok(())
    });
}

#[test]
#[ignore = "requires TEST_DATABASE_URL"]
fn fully_populated_rows_read_back_unchanged() {
    with_rollback(|conn| {
        let new_patient = NewPatient {
            name: "Amina Otieno".into(),
            email: Some("amina@example.test".into()),
            phone: Some("+254711111111".into()),
            address: Some("12 Mombasa Road".into()),
            dob: chrono::NaiveDate::from_ymd_opt(1985, 7, 14),
            gender: Some("female".into()),
            insurance: Some("NHIF-7788".into()),
            emergency_contact: Some("Otieno +254722222222".into()),
        };
        let inserted: Patient = diesel::insert_into(patients::table)
            .values(&new_patient)
            .returning(Patient::as_returning())
            .get_result(conn)?;
        let read: Patient = patients::table
            .find(inserted.id)
            .select(Patient::as_select())
            .first(conn)?;
        assert_eq!(read, inserted);
        assert_eq!(read.insurance.as_deref(), Some("NHIF-7788"));
        assert_eq!(read.dob, new_patient.dob);
        assert!(read.is_active());

        let amount = dec("1234567.89");
        let invoice: Invoice = diesel::insert_into(invoices::table)
            .values(&NewInvoice {
                patient_id: read.id,
                amount,
            })
            .returning(Invoice::as_returning())
            .get_result(conn)?;
        let read_invoice: Invoice = invoices::table
            .find(invoice.id)
            .select(Invoice::as_select())
            .first(conn)?;
        assert_eq!(read_invoice.amount, amount);
        assert_eq!(read_invoice.amount.to_string(), "1234567.89");
        assert_eq!(read_invoice.status, clinicdb::models::InvoiceStatus::Unpaid);

        // cents that have no exact binary representation survive intact
        let cents = dec("0.10") + dec("0.20");
        let tiny: Invoice = diesel::insert_into(invoices::table)
            .values(&NewInvoice {
                patient_id: read.id,
                amount: cents,
            })
            .returning(Invoice::as_returning())
            .get_result(conn)?;
        assert_eq!(tiny.amount, dec("0.30"));
        Ok(())
    });
}
