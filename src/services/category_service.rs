use crate::dto::admin_dto::{CategoryResponse, CreateCategoryPayload, UpdateCategoryPayload};
use crate::error::{Error, Result};
use crate::models::category::Category;
use sqlx::PgPool;
use uuid::Uuid;

const CATEGORY_COLUMNS: &str = "id, name, created_at";

#[derive(Clone)]
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateCategoryPayload) -> Result<CategoryResponse> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name) VALUES ($1) RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(payload.name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("A category with this name already exists".into()),
            other => other,
        })?;

        for skill_id in &payload.core_skill_ids {
            sqlx::query(
                "INSERT INTO category_core_skills (category_id, core_skill_id)
                 VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(category.id)
            .bind(skill_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(CategoryResponse::from_parts(category, payload.core_skill_ids))
    }

    pub async fn update(&self, id: Uuid, payload: UpdateCategoryPayload) -> Result<CategoryResponse> {
        let mut tx = self.pool.begin().await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET name = COALESCE($2, name) WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(payload.name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound("Category not found".into()))?;

        if let Some(skill_ids) = payload.core_skill_ids.clone() {
            sqlx::query("DELETE FROM category_core_skills WHERE category_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for skill_id in &skill_ids {
                sqlx::query(
                    "INSERT INTO category_core_skills (category_id, core_skill_id)
                     VALUES ($1, $2) ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(skill_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        let skill_ids = self.core_skill_ids(id).await?;
        Ok(CategoryResponse::from_parts(category, skill_ids))
    }

    pub async fn list(&self) -> Result<Vec<CategoryResponse>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY name",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut responses = Vec::with_capacity(categories.len());
        for category in categories {
            let skill_ids = self.core_skill_ids(category.id).await?;
            responses.push(CategoryResponse::from_parts(category, skill_ids));
        }
        Ok(responses)
    }

    /// Deleting a category detaches its jobs (`category_id` becomes NULL
    /// via the FK rule) rather than deleting them.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Category not found".into()));
        }
        Ok(())
    }

    async fn core_skill_ids(&self, category_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT core_skill_id FROM category_core_skills WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
