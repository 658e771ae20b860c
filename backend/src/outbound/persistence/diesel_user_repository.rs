//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{UserCredentials, UserPersistenceError, UserRepository};
use crate::domain::{
    Email, FullName, PasswordHash, ProfileUpdate, Role, User, UserDraft, UserId,
};

use super::diesel_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{NewUserRow, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, notifications, reports, suggestions, upvotes, users};

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, |message| UserPersistenceError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let corrupt = |field: &str| UserPersistenceError::query(format!("invalid stored {field}"));
    let role: Role = row.role.parse().map_err(|_| corrupt("role"))?;
    User::new(UserDraft {
        id: UserId::from_uuid(row.id),
        full_name: FullName::new(&row.full_name).map_err(|_| corrupt("full name"))?,
        email: Email::new(&row.email).map_err(|_| corrupt("email"))?,
        role,
        verified: row.verified,
        municipality: row.municipality,
        ward: row.ward,
        phone: row.phone,
        profile_picture: row.profile_picture,
        citizenship_document: row.citizenship_document,
        created_at: row.created_at,
    })
    .map_err(|err| UserPersistenceError::query(format!("invalid stored user: {err}")))
}

fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserPersistenceError> {
    let password_hash = PasswordHash::new(row.password_hash.clone());
    Ok(UserCredentials {
        user: row_to_user(row)?,
        password_hash,
    })
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            full_name: user.full_name().as_ref(),
            email: user.email().as_ref(),
            password_hash: password_hash.as_ref(),
            role: user.role().as_str(),
            verified: user.is_verified(),
            municipality: user.municipality(),
            ward: user.ward(),
            phone: user.phone(),
            profile_picture: user.profile_picture(),
            citizenship_document: user.citizenship_document(),
            created_at: user.created_at(),
            updated_at: user.created_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|error| {
                if is_unique_violation(&error) {
                    UserPersistenceError::duplicate_email(user.email().as_ref())
                } else {
                    map_diesel_error(error)
                }
            })?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_credentials)
            .transpose()
    }

    async fn list(&self, role: Option<Role>) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = users::table
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .into_boxed();
        if let Some(role) = role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(row_to_user)
            .collect()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = UserProfileChangeset {
            full_name: update.full_name.as_ref().map(AsRef::as_ref),
            phone: update.phone.as_deref(),
            profile_picture: update.profile_picture.as_deref(),
            citizenship_document: update.citizenship_document.as_deref(),
            updated_at: at,
        };
        diesel::update(users::table.find(id.as_uuid()))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn mark_verified(
        &self,
        id: &UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<bool>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let current: Option<bool> = users::table
            .find(id.as_uuid())
            .select(users::verified)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(already_verified) = current else {
            return Ok(None);
        };
        if already_verified {
            return Ok(Some(false));
        }
        let updated = diesel::update(
            users::table
                .find(id.as_uuid())
                .filter(users::verified.eq(false)),
        )
        .set((users::verified.eq(true), users::updated_at.eq(at)))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(Some(updated > 0))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uid = *id.as_uuid();
        conn.transaction(|conn| {
            async move {
                let voted: Vec<(String, Uuid)> = upvotes::table
                    .filter(upvotes::user_id.eq(uid))
                    .select((upvotes::target_kind, upvotes::target_id))
                    .load(conn)
                    .await?;
                for (kind, target) in &voted {
                    if kind == "report" {
                        diesel::update(reports::table.find(target))
                            .set(reports::upvote_count.eq(reports::upvote_count - 1))
                            .execute(conn)
                            .await?;
                    } else {
                        diesel::update(suggestions::table.find(target))
                            .set(suggestions::upvote_count.eq(suggestions::upvote_count - 1))
                            .execute(conn)
                            .await?;
                    }
                }

                let commented: Vec<Uuid> = comments::table
                    .filter(comments::author_id.eq(uid))
                    .filter(comments::target_kind.eq("suggestion"))
                    .select(comments::target_id)
                    .load(conn)
                    .await?;
                for target in &commented {
                    diesel::update(suggestions::table.find(target))
                        .set(suggestions::comment_count.eq(suggestions::comment_count - 1))
                        .execute(conn)
                        .await?;
                }

                let owned_reports: Vec<Uuid> = reports::table
                    .filter(reports::author_id.eq(uid))
                    .select(reports::id)
                    .load(conn)
                    .await?;
                let owned_suggestions: Vec<Uuid> = suggestions::table
                    .filter(suggestions::author_id.eq(uid))
                    .select(suggestions::id)
                    .load(conn)
                    .await?;
                for (kind, owned) in [("report", &owned_reports), ("suggestion", &owned_suggestions)] {
                    diesel::delete(
                        comments::table
                            .filter(comments::target_kind.eq(kind))
                            .filter(comments::target_id.eq_any(owned)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(
                        upvotes::table
                            .filter(upvotes::target_kind.eq(kind))
                            .filter(upvotes::target_id.eq_any(owned)),
                    )
                    .execute(conn)
                    .await?;
                }
                diesel::delete(notifications::table.filter(notifications::recipient_id.eq(uid)))
                    .execute(conn)
                    .await?;

                // Remaining rows owned by the account cascade from the
                // foreign keys on `users`.
                let removed = diesel::delete(users::table.find(uid)).execute(conn).await?;
                Ok(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn row(role: &str) -> UserRow {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().expect("timestamp");
        UserRow {
            id: Uuid::new_v4(),
            full_name: "Maya Gurung".to_owned(),
            email: "maya@example.com".to_owned(),
            password_hash: "$argon2id$stored".to_owned(),
            role: role.to_owned(),
            verified: true,
            municipality: Some("Pokhara".to_owned()),
            ward: Some("9".to_owned()),
            phone: None,
            profile_picture: None,
            citizenship_document: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn rows_convert_into_users_with_credentials() {
        let credentials = row_to_credentials(row("MUNICIPALITY")).expect("valid row");
        assert_eq!(credentials.user.role(), Role::Municipality);
        assert_eq!(credentials.user.municipality(), Some("Pokhara"));
        assert_eq!(credentials.password_hash.as_ref(), "$argon2id$stored");
    }

    #[rstest]
    fn unknown_roles_are_query_errors() {
        let error = row_to_user(row("SUPERUSER")).expect_err("bad role");
        assert_eq!(error, UserPersistenceError::query("invalid stored role"));
    }
}
