use sqlx::SqlitePool;

use crate::accounts::repo_types::{NewUser, User};

impl User {
    /// First user whose email or phone equals `identifier`.
    pub async fn find_by_identifier(
        db: &SqlitePool,
        identifier: &str,
    ) -> anyhow::Result<Option<User>> {
        Self::find_by_email_or_phone(db, identifier, identifier).await
    }

    pub async fn find_by_email_or_phone(
        db: &SqlitePool,
        email: &str,
        phone: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, country_code, phone, password_hash
            FROM users
            WHERE email = ?1 OR phone = ?2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(phone)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Inserts a user. Returns `None` when the email is already taken.
    pub async fn create(db: &SqlitePool, new: &NewUser<'_>) -> anyhow::Result<Option<User>> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, country_code, phone, password_hash)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id, name, email, country_code, phone, password_hash
            "#,
        )
        .bind(new.name)
        .bind(new.email)
        .bind(new.country_code)
        .bind(new.phone)
        .bind(new.password_hash)
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(Some(user)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the password hash for `email`. Returns the number of rows
    /// touched.
    pub async fn update_password_hash(
        db: &SqlitePool,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query("UPDATE users SET password_hash = ?1 WHERE email = ?2")
            .bind(password_hash)
            .bind(email)
            .execute(db)
            .await?;
        Ok(res.rows_affected())
    }
}
