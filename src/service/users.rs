use diesel::pg::PgConnection;
use diesel::prelude::*;
use log::{debug, info};
use serde::Deserialize;

use crate::error::ClinicError;
use crate::models::{NewUser, Role, User, UserContactUpdate};
use crate::password;
use crate::schema::users;
use crate::service::{optional_text, required_text};

const MAX_EMAIL_LEN: usize = 120;

/// Registration input; holds the plaintext password only until it is hashed.
#[derive(Clone, Deserialize)]
pub struct UserRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UserRegistration {
    fn into_new_user(self, email: String, password_hash: String) -> Result<NewUser, ClinicError> {
        Ok(NewUser {
            name: required_text("name", &self.name)?,
            email,
            password_hash,
            role: self.role,
            phone: optional_text(self.phone),
            address: optional_text(self.address),
        })
    }
}

/// Lowercases and trims an address, rejecting anything that is not
/// `local@domain.tld` shaped.
pub fn normalize_email(raw: &str) -> Result<String, ClinicError> {
    let email = raw.trim().to_lowercase();
    let invalid = || ClinicError::validation(format!("invalid email address: {raw:?}"));

    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(email)
}

pub fn register_user(conn: &mut PgConnection, registration: UserRegistration) -> Result<User, ClinicError> {
    let email = normalize_email(&registration.email)?;
    let password_hash = password::hash_password(&registration.password)?;
    let new_user = registration.into_new_user(email, password_hash)?;

    let user = diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)?;

    info!("registered user {} with role {}", user.id, user.role);
    Ok(user)
}

pub fn find_user(conn: &mut PgConnection, user_id: i32) -> Result<User, ClinicError> {
    users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "user",
            id: user_id,
        })
}

pub fn find_user_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>, ClinicError> {
    let email = normalize_email(email)?;
    debug!("looking up user by email");
    Ok(users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

pub fn update_user_contact(
    conn: &mut PgConnection,
    user_id: i32,
    update: UserContactUpdate,
) -> Result<User, ClinicError> {
    let update = UserContactUpdate {
        name: update.name.map(|n| required_text("name", &n)).transpose()?,
        phone: optional_text(update.phone),
        address: optional_text(update.address),
    };
    if update.name.is_none() && update.phone.is_none() && update.address.is_none() {
        return find_user(conn, user_id);
    }

    diesel::update(users::table.find(user_id))
        .set(&update)
        .returning(User::as_returning())
        .get_result(conn)
        .optional()?
        .ok_or(ClinicError::NotFound {
            entity: "user",
            id: user_id,
        })
}
