//! Credential store: persisted user records

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::models::{UpdateProfileRequest, User};
use super::password::{PasswordError, PasswordHasher, PasswordInput};
use crate::common::{generate_user_id, safe_email_log};

/// Fresh ids tried before giving up on a primary-key collision
const MAX_ID_ATTEMPTS: usize = 3;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Everything needed to insert a user row
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: PasswordInput,
    pub phone: String,
    pub city: String,
    pub country: String,
    pub image: String,
    pub provider: String,
}

/// Which unique constraint an insert ran into
enum Conflict {
    Email,
    Id,
}

fn unique_conflict(e: &sqlx::Error) -> Option<Conflict> {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            if db_err.message().contains("users.email") {
                Some(Conflict::Email)
            } else {
                Some(Conflict::Id)
            }
        }
        _ => None,
    }
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    hasher: PasswordHasher,
}

impl UserRepository {
    pub fn new(pool: SqlitePool, hasher: PasswordHasher) -> Self {
        Self { pool, hasher }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// There is no existence check beforehand: the `UNIQUE(email)` constraint
    /// decides, and its violation comes back as `DuplicateEmail`.
    pub async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        let password = self.hasher.materialize(new_user.password.clone()).await?;

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = generate_user_id();
            let result = sqlx::query(
                r#"
                INSERT INTO users (id, fname, lname, email, password, phone, city, country, image, provider)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&new_user.fname)
            .bind(&new_user.lname)
            .bind(&new_user.email)
            .bind(&password)
            .bind(&new_user.phone)
            .bind(&new_user.city)
            .bind(&new_user.country)
            .bind(&new_user.image)
            .bind(&new_user.provider)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => {
                    info!(
                        user_id = %id,
                        email = %safe_email_log(&new_user.email),
                        provider = %new_user.provider,
                        "User created"
                    );
                    return self.find_by_id(&id).await?.ok_or(RepositoryError::NotFound);
                }
                Err(e) => match unique_conflict(&e) {
                    Some(Conflict::Email) => {
                        debug!(email = %safe_email_log(&new_user.email), "Insert hit unique email constraint");
                        return Err(RepositoryError::DuplicateEmail);
                    }
                    Some(Conflict::Id) => {
                        warn!(user_id = %id, attempt, "User id collision, retrying with a fresh id");
                    }
                    None => {
                        error!(error = %e, email = %safe_email_log(&new_user.email), "Database error inserting user");
                        return Err(e.into());
                    }
                },
            }
        }

        error!("Exhausted user id attempts");
        Err(RepositoryError::Database(sqlx::Error::Protocol(
            "could not allocate a unique user id".to_string(),
        )))
    }

    /// Returns the user with `new_user.email`, inserting it first if absent.
    ///
    /// Atomic under concurrency: the insert is `ON CONFLICT(email) DO NOTHING`,
    /// so racing callers all end up reading the single winning row. The flag is
    /// true when this call created the row.
    pub async fn find_or_create(&self, new_user: NewUser) -> Result<(User, bool), RepositoryError> {
        if let Some(existing) = self.find_by_email(&new_user.email).await? {
            return Ok((existing, false));
        }

        let password = self.hasher.materialize(new_user.password.clone()).await?;

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = generate_user_id();
            let result = sqlx::query(
                r#"
                INSERT INTO users (id, fname, lname, email, password, phone, city, country, image, provider)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(email) DO NOTHING
                "#,
            )
            .bind(&id)
            .bind(&new_user.fname)
            .bind(&new_user.lname)
            .bind(&new_user.email)
            .bind(&password)
            .bind(&new_user.phone)
            .bind(&new_user.city)
            .bind(&new_user.country)
            .bind(&new_user.image)
            .bind(&new_user.provider)
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) => {
                    let created = done.rows_affected() == 1;
                    if created {
                        info!(
                            user_id = %id,
                            email = %safe_email_log(&new_user.email),
                            provider = %new_user.provider,
                            "User created via find-or-create"
                        );
                    }
                    let user = self
                        .find_by_email(&new_user.email)
                        .await?
                        .ok_or(RepositoryError::NotFound)?;
                    return Ok((user, created));
                }
                Err(e) => match unique_conflict(&e) {
                    Some(_) => {
                        warn!(user_id = %id, attempt, "User id collision, retrying with a fresh id");
                    }
                    None => {
                        error!(error = %e, email = %safe_email_log(&new_user.email), "Database error in find-or-create");
                        return Err(e.into());
                    }
                },
            }
        }

        Err(RepositoryError::Database(sqlx::Error::Protocol(
            "could not allocate a unique user id".to_string(),
        )))
    }

    /// Applies the provided profile fields. The password column is never touched.
    pub async fn update_profile(
        &self,
        id: &str,
        update: &UpdateProfileRequest,
    ) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                fname = COALESCE(?, fname),
                lname = COALESCE(?, lname),
                phone = COALESCE(?, phone),
                city = COALESCE(?, city),
                country = COALESCE(?, country),
                image = COALESCE(?, image),
                updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(update.fname.as_deref())
        .bind(update.lname.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.city.as_deref())
        .bind(update.country.as_deref())
        .bind(update.image.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Hashes `new_password` and stores it
    pub async fn change_password(&self, id: &str, new_password: String) -> Result<(), RepositoryError> {
        let hash = self.hasher.hash_async(new_password).await?;

        let result = sqlx::query(
            "UPDATE users SET password = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(&hash)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(user_id = %id, "Password changed");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
