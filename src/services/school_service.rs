use crate::dto::school_dto::UpdateSchoolProfilePayload;
use crate::error::{Error, Result};
use crate::models::school::School;
use sqlx::PgPool;
use uuid::Uuid;

const SCHOOL_COLUMNS: &str = "id, user_id, name, bio, website, address_line, city, state, \
     pincode, logo_url, created_at, updated_at";

#[derive(Clone)]
pub struct SchoolService {
    pool: PgPool,
}

impl SchoolService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<School>> {
        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {} FROM schools WHERE user_id = $1",
            SCHOOL_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(school)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<School>> {
        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {} FROM schools WHERE id = $1",
            SCHOOL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(school)
    }

    pub async fn fill_onboarding_profile(
        &self,
        user_id: Uuid,
        name: &str,
        bio: Option<&str>,
        website: Option<&str>,
        address_line: Option<&str>,
        city: Option<&str>,
        state: Option<&str>,
        pincode: Option<&str>,
        logo_url: Option<&str>,
    ) -> Result<School> {
        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools
             SET name = $2, bio = $3, website = $4, address_line = $5, city = $6,
                 state = $7, pincode = $8, logo_url = COALESCE($9, logo_url), updated_at = NOW()
             WHERE user_id = $1
             RETURNING {}",
            SCHOOL_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(bio)
        .bind(website)
        .bind(address_line)
        .bind(city)
        .bind(state)
        .bind(pincode)
        .bind(logo_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("School profile not found".into()))?;
        Ok(school)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        payload: UpdateSchoolProfilePayload,
    ) -> Result<School> {
        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools
             SET name = COALESCE($2, name),
                 bio = COALESCE($3, bio),
                 website = COALESCE($4, website),
                 address_line = COALESCE($5, address_line),
                 city = COALESCE($6, city),
                 state = COALESCE($7, state),
                 pincode = COALESCE($8, pincode),
                 logo_url = COALESCE($9, logo_url),
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING {}",
            SCHOOL_COLUMNS
        ))
        .bind(user_id)
        .bind(payload.name)
        .bind(payload.bio)
        .bind(payload.website)
        .bind(payload.address_line)
        .bind(payload.city)
        .bind(payload.state)
        .bind(payload.pincode)
        .bind(payload.logo_url)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("School profile not found".into()))?;
        Ok(school)
    }
}
