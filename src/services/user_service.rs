use crate::dto::admin_dto::UserListQuery;
use crate::error::{Error, Result};
use crate::models::user::{User, ROLE_SCHOOL, ROLE_STUDENT};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, onboarding_complete, created_at, updated_at";

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Creates the user row plus an empty role profile in one transaction.
    pub async fn create_with_profile(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User> {
        if self.get_by_email(email).await?.is_some() {
            return Err(Error::Conflict(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        match role {
            ROLE_STUDENT => {
                sqlx::query("INSERT INTO students (user_id) VALUES ($1)")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await?;
            }
            ROLE_SCHOOL => {
                sqlx::query("INSERT INTO schools (user_id, name) VALUES ($1, $2)")
                    .bind(user.id)
                    .bind(name)
                    .execute(&mut *tx)
                    .await?;
            }
            _ => {}
        }

        tx.commit().await?;
        Ok(user)
    }

    pub async fn list(&self, query: UserListQuery) -> Result<Vec<User>> {
        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(role) = query.role {
            filters.push(format!("role = ${}", args.len() + 1));
            args.push(role);
        }
        if let Some(search) = query.search {
            let first = args.len() + 1;
            let second = first + 1;
            filters.push(format!("(name ILIKE ${} OR email ILIKE ${})", first, second));
            args.push(format!("%{}%", search.clone()));
            args.push(format!("%{}%", search));
        }

        let where_clause = if filters.is_empty() {
            "".to_string()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM users {} ORDER BY created_at DESC",
            USER_COLUMNS, where_clause
        );

        let mut statement = sqlx::query_as::<_, User>(&sql);
        for value in &args {
            statement = statement.bind(value);
        }
        let users = statement.fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("User not found".into()));
        }
        Ok(())
    }

    pub async fn mark_onboarding_complete(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE users SET onboarding_complete = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn counts_by_role(&self) -> Result<std::collections::HashMap<String, i64>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT role, COUNT(*) FROM users GROUP BY role",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }
}
