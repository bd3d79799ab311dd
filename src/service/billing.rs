//! Invoices and the payments that settle them.
//!
//! Payments lock their invoice row (`SELECT ... FOR UPDATE`) before summing
//! prior payments, so two concurrent payments against one invoice are
//! applied one after the other and the running total can never exceed the
//! invoice amount.

use diesel::dsl::sum;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::error::ClinicError;
use crate::models::{Invoice, InvoiceStatus, NewInvoice, NewPayment, Payment, PaymentMethod};
use crate::schema::{invoices, payments};
use crate::service::{money, optional_text};

impl InvoiceStatus {
    /// Status only moves forward: `unpaid -> pending -> paid`, or straight
    /// from `unpaid` to `paid`.
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Unpaid, InvoiceStatus::Pending)
                | (InvoiceStatus::Unpaid, InvoiceStatus::Paid)
                | (InvoiceStatus::Pending, InvoiceStatus::Paid)
        )
    }

    /// The status an invoice of `amount` should carry once `paid` has been
    /// settled against it.
    pub fn for_balance(amount: Decimal, paid: Decimal) -> InvoiceStatus {
        if paid >= amount {
            InvoiceStatus::Paid
        } else if paid.is_zero() {
            InvoiceStatus::Unpaid
        } else {
            InvoiceStatus::Pending
        }
    }
}

/// The first payment taken together with a new invoice.
#[derive(Debug, Clone)]
pub struct InitialPayment {
    pub amount_paid: Decimal,
    pub method: PaymentMethod,
    pub transaction_ref: Option<String>,
}

pub fn create_invoice(conn: &mut PgConnection, invoice: NewInvoice) -> Result<Invoice, ClinicError> {
    let invoice = NewInvoice {
        amount: money("amount", invoice.amount, false)?,
        ..invoice
    };
    let invoice = diesel::insert_into(invoices::table)
        .values(&invoice)
        .returning(Invoice::as_returning())
        .get_result(conn)?;
    info!(
        "invoice {} of {} issued to patient {}",
        invoice.id, invoice.amount, invoice.patient_id
    );
    Ok(invoice)
}

/// Issues an invoice and applies its first payment atomically: either both
/// rows exist afterwards or neither does.
pub fn create_invoice_with_payment(
    conn: &mut PgConnection,
    invoice: NewInvoice,
    payment: InitialPayment,
) -> Result<(Invoice, Payment), ClinicError> {
    conn.transaction::<_, ClinicError, _>(|conn| {
        let invoice = create_invoice(conn, invoice)?;
        let (payment, invoice) = record_payment(
            conn,
            NewPayment {
                invoice_id: invoice.id,
                amount_paid: payment.amount_paid,
                method: payment.method,
                transaction_ref: payment.transaction_ref,
            },
        )?;
        Ok((invoice, payment))
    })
}

pub fn find_invoice(conn: &mut PgConnection, invoice_id: i32) -> Result<Invoice, ClinicError> {
    invoices::table
        .find(invoice_id)
        .select(Invoice::as_select())
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })
}

fn lock_invoice(conn: &mut PgConnection, invoice_id: i32) -> Result<Invoice, ClinicError> {
    invoices::table
        .find(invoice_id)
        .select(Invoice::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "invoice",
            id: invoice_id,
        })
}

/// Sum of all payments recorded against an invoice.
pub fn amount_paid(conn: &mut PgConnection, invoice_id: i32) -> Result<Decimal, ClinicError> {
    let total: Option<Decimal> = payments::table
        .filter(payments::invoice_id.eq(invoice_id))
        .select(sum(payments::amount_paid))
        .get_result(conn)?;
    Ok(total.unwrap_or(Decimal::ZERO))
}

pub fn outstanding_balance(conn: &mut PgConnection, invoice_id: i32) -> Result<Decimal, ClinicError> {
    let invoice = find_invoice(conn, invoice_id)?;
    let paid = amount_paid(conn, invoice_id)?;
    Ok((invoice.amount - paid).max(Decimal::ZERO))
}

/// Records a payment and moves the invoice to `pending` or `paid`.
///
/// Rejects the payment with [`ClinicError::Overpayment`] when it would push
/// the total paid past the invoice amount.
pub fn record_payment(
    conn: &mut PgConnection,
    payment: NewPayment,
) -> Result<(Payment, Invoice), ClinicError> {
    let payment = NewPayment {
        amount_paid: money("amount_paid", payment.amount_paid, false)?,
        transaction_ref: optional_text(payment.transaction_ref),
        ..payment
    };

    conn.transaction::<_, ClinicError, _>(|conn| {
        let invoice = lock_invoice(conn, payment.invoice_id)?;
        let paid = amount_paid(conn, invoice.id)?;
        let total = paid + payment.amount_paid;
        if total > invoice.amount {
            warn!(
                "rejected payment of {} against invoice {}: {} of {} already paid",
                payment.amount_paid, invoice.id, paid, invoice.amount
            );
            return Err(ClinicError::Overpayment {
                invoice_id: invoice.id,
                amount: invoice.amount,
                paid,
                attempted: payment.amount_paid,
            });
        }

        let recorded = diesel::insert_into(payments::table)
            .values(&payment)
            .returning(Payment::as_returning())
            .get_result(conn)?;
        debug!("payment {} recorded against invoice {}", recorded.id, invoice.id);

        let next = InvoiceStatus::for_balance(invoice.amount, total);
        let invoice = if next != invoice.status {
            apply_status(conn, invoice, next)?
        } else {
            invoice
        };
        Ok((recorded, invoice))
    })
}

/// Moves an invoice to `next` if the transition is allowed and `next` is
/// the status its recorded payments call for.
///
/// Payments already drive the status through [`record_payment`]; this
/// reconciles invoices whose payments were written some other way.
pub fn set_invoice_status(
    conn: &mut PgConnection,
    invoice_id: i32,
    next: InvoiceStatus,
) -> Result<Invoice, ClinicError> {
    conn.transaction::<_, ClinicError, _>(|conn| {
        let invoice = lock_invoice(conn, invoice_id)?;
        let paid = amount_paid(conn, invoice.id)?;
        let settled = InvoiceStatus::for_balance(invoice.amount, paid);
        if invoice.status.can_transition_to(next) && next != settled {
            return Err(ClinicError::validation(format!(
                "invoice {} has {} of {} paid and cannot be marked {}",
                invoice.id, paid, invoice.amount, next
            )));
        }
        apply_status(conn, invoice, next)
    })
}

fn apply_status(
    conn: &mut PgConnection,
    invoice: Invoice,
    next: InvoiceStatus,
) -> Result<Invoice, ClinicError> {
    if !invoice.status.can_transition_to(next) {
        return Err(ClinicError::InvalidTransition {
            entity: "invoice",
            from: invoice.status.to_string(),
            to: next.to_string(),
        });
    }
    let updated = diesel::update(invoices::table.find(invoice.id))
        .set(invoices::status.eq(next))
        .returning(Invoice::as_returning())
        .get_result(conn)?;
    info!("invoice {}: {} -> {}", invoice.id, invoice.status, next);
    Ok(updated)
}
