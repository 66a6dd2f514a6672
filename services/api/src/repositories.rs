//! Store adapter for accounts, profiles and internships
//!
//! [`Store`] is the narrow persistence surface the handlers, the auth
//! middleware and the recommendation service depend on. [`PgStore`] is the
//! PostgreSQL implementation; tables are described in `schema.sql`.
//!
//! Lookups report absence as `None` (or an empty `Vec`), never as an error.
//! Nothing here spans more than one statement, so callers get single-row
//! atomicity and nothing more.

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::debug;

use crate::models::{Account, Internship, InternshipInput, NewAccount, Profile, ProfileInput};

/// Persistence operations used by the service
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_account_by_id(&self, id: i64) -> DatabaseResult<Option<Account>>;

    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>>;

    /// Fails with [`DatabaseError::UniqueViolation`] when the email is taken
    async fn create_account(&self, new_account: &NewAccount) -> DatabaseResult<Account>;

    async fn find_profile_by_account_id(&self, account_id: i64) -> DatabaseResult<Option<Profile>>;

    /// Create the account's profile or overwrite the existing one
    async fn upsert_profile(&self, account_id: i64, input: &ProfileInput)
    -> DatabaseResult<Profile>;

    async fn set_profile_complete(&self, account_id: i64, complete: bool) -> DatabaseResult<()>;

    /// Batch lookup; ids with no row are skipped and order is unspecified
    async fn find_internships_by_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<Internship>>;

    async fn create_internship(&self, input: &InternshipInput) -> DatabaseResult<Internship>;

    async fn update_internship(
        &self,
        id: i64,
        input: &InternshipInput,
    ) -> DatabaseResult<Option<Internship>>;

    async fn find_internship_by_id(&self, id: i64) -> DatabaseResult<Option<Internship>>;

    /// All internships, newest first
    async fn list_internships(&self) -> DatabaseResult<Vec<Internship>>;

    /// Internships flagged active, newest first
    async fn list_active_internships(&self) -> DatabaseResult<Vec<Internship>>;
}

/// PostgreSQL store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        profile_complete: row.try_get("profile_complete")?,
        created_at: row.try_get("created_at")?,
    })
}

fn profile_from_row(row: &PgRow) -> Result<Profile, sqlx::Error> {
    Ok(Profile {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        education: row.try_get("education")?,
        cgpa: row.try_get("cgpa")?,
        skills: row.try_get::<Json<Vec<String>>, _>("skills")?.0,
        experience: row.try_get("experience")?,
        social_links: row.try_get::<Json<Vec<String>>, _>("social_links")?.0,
        location: row.try_get("location")?,
        interest: row.try_get("interest")?,
        resume_link: row.try_get("resume_link")?,
        preferred_job_type: row.try_get("preferred_job_type")?,
        availability: row.try_get("availability")?,
        languages: row.try_get::<Json<Vec<String>>, _>("languages")?.0,
    })
}

fn internship_from_row(row: &PgRow) -> Result<Internship, sqlx::Error> {
    Ok(Internship {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        organization: row.try_get("organization")?,
        location: row.try_get("location")?,
        stipend_inr: row.try_get("stipend_inr")?,
        duration: row.try_get("duration")?,
        skills_req: row.try_get::<Json<Vec<String>>, _>("skills_req")?.0,
        langs_req: row.try_get::<Json<Vec<String>>, _>("langs_req")?.0,
        active: row.try_get("active")?,
        posted_at: row.try_get("posted_at")?,
        deadline: row.try_get("deadline")?,
        apply_url: row.try_get("apply_url")?,
        description: row.try_get("description")?,
        min_cgpa: row.try_get("min_cgpa")?,
        experience: row.try_get("experience")?,
    })
}

fn internships_from_rows(rows: &[PgRow]) -> DatabaseResult<Vec<Internship>> {
    rows.iter()
        .map(|row| internship_from_row(row).map_err(DatabaseError::Query))
        .collect()
}

#[async_trait]
impl Store for PgStore {
    async fn find_account_by_id(&self, id: i64) -> DatabaseResult<Option<Account>> {
        debug!("Finding account by ID: {}", id);

        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, profile_complete, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn find_account_by_email(&self, email: &str) -> DatabaseResult<Option<Account>> {
        debug!("Finding account by email: {}", email);

        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, profile_complete, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref()
            .map(account_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn create_account(&self, new_account: &NewAccount) -> DatabaseResult<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, profile_complete, created_at
            "#,
        )
        .bind(&new_account.email)
        .bind(&new_account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        account_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn find_profile_by_account_id(&self, account_id: i64) -> DatabaseResult<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, name, phone, education, cgpa, skills, experience,
                   social_links, location, interest, resume_link, preferred_job_type,
                   availability, languages
            FROM profiles
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref()
            .map(profile_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn upsert_profile(
        &self,
        account_id: i64,
        input: &ProfileInput,
    ) -> DatabaseResult<Profile> {
        let row = sqlx::query(
            r#"
            INSERT INTO profiles (account_id, name, phone, education, cgpa, skills, experience,
                                  social_links, location, interest, resume_link,
                                  preferred_job_type, availability, languages)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (account_id) DO UPDATE SET
                name = EXCLUDED.name,
                phone = EXCLUDED.phone,
                education = EXCLUDED.education,
                cgpa = EXCLUDED.cgpa,
                skills = EXCLUDED.skills,
                experience = EXCLUDED.experience,
                social_links = EXCLUDED.social_links,
                location = EXCLUDED.location,
                interest = EXCLUDED.interest,
                resume_link = EXCLUDED.resume_link,
                preferred_job_type = EXCLUDED.preferred_job_type,
                availability = EXCLUDED.availability,
                languages = EXCLUDED.languages
            RETURNING id, account_id, name, phone, education, cgpa, skills, experience,
                      social_links, location, interest, resume_link, preferred_job_type,
                      availability, languages
            "#,
        )
        .bind(account_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.education)
        .bind(input.cgpa)
        .bind(Json(&input.skills))
        .bind(input.experience)
        .bind(Json(&input.social_links))
        .bind(&input.location)
        .bind(&input.interest)
        .bind(&input.resume_link)
        .bind(&input.preferred_job_type)
        .bind(&input.availability)
        .bind(Json(&input.languages))
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        profile_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn set_profile_complete(&self, account_id: i64, complete: bool) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET profile_complete = $2
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(complete)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    async fn find_internships_by_ids(&self, ids: &[i64]) -> DatabaseResult<Vec<Internship>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, organization, location, stipend_inr, duration, skills_req,
                   langs_req, active, posted_at, deadline, apply_url, description,
                   min_cgpa, experience
            FROM internships
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        internships_from_rows(&rows)
    }

    async fn create_internship(&self, input: &InternshipInput) -> DatabaseResult<Internship> {
        let row = sqlx::query(
            r#"
            INSERT INTO internships (title, organization, location, stipend_inr, duration,
                                     skills_req, langs_req, active, posted_at, deadline,
                                     apply_url, description, min_cgpa, experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, TRUE), $9, $10, $11, $12, $13, $14)
            RETURNING id, title, organization, location, stipend_inr, duration, skills_req,
                      langs_req, active, posted_at, deadline, apply_url, description,
                      min_cgpa, experience
            "#,
        )
        .bind(&input.title)
        .bind(&input.organization)
        .bind(&input.location)
        .bind(input.stipend_inr)
        .bind(input.duration)
        .bind(Json(&input.skills_req))
        .bind(Json(&input.langs_req))
        .bind(input.active)
        .bind(Utc::now())
        .bind(input.deadline)
        .bind(&input.apply_url)
        .bind(&input.description)
        .bind(input.min_cgpa)
        .bind(input.experience)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        internship_from_row(&row).map_err(DatabaseError::Query)
    }

    async fn update_internship(
        &self,
        id: i64,
        input: &InternshipInput,
    ) -> DatabaseResult<Option<Internship>> {
        let row = sqlx::query(
            r#"
            UPDATE internships
            SET title = $2, organization = $3, location = $4, stipend_inr = $5,
                duration = $6, skills_req = $7, langs_req = $8, active = $9,
                deadline = $10, apply_url = $11, description = $12, min_cgpa = $13,
                experience = $14
            WHERE id = $1
            RETURNING id, title, organization, location, stipend_inr, duration, skills_req,
                      langs_req, active, posted_at, deadline, apply_url, description,
                      min_cgpa, experience
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.organization)
        .bind(&input.location)
        .bind(input.stipend_inr)
        .bind(input.duration)
        .bind(Json(&input.skills_req))
        .bind(Json(&input.langs_req))
        .bind(input.active)
        .bind(input.deadline)
        .bind(&input.apply_url)
        .bind(&input.description)
        .bind(input.min_cgpa)
        .bind(input.experience)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        row.as_ref()
            .map(internship_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn find_internship_by_id(&self, id: i64) -> DatabaseResult<Option<Internship>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, organization, location, stipend_inr, duration, skills_req,
                   langs_req, active, posted_at, deadline, apply_url, description,
                   min_cgpa, experience
            FROM internships
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref()
            .map(internship_from_row)
            .transpose()
            .map_err(DatabaseError::Query)
    }

    async fn list_internships(&self) -> DatabaseResult<Vec<Internship>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, organization, location, stipend_inr, duration, skills_req,
                   langs_req, active, posted_at, deadline, apply_url, description,
                   min_cgpa, experience
            FROM internships
            ORDER BY posted_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        internships_from_rows(&rows)
    }

    async fn list_active_internships(&self) -> DatabaseResult<Vec<Internship>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, organization, location, stipend_inr, duration, skills_req,
                   langs_req, active, posted_at, deadline, apply_url, description,
                   min_cgpa, experience
            FROM internships
            WHERE active = TRUE
            ORDER BY posted_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        internships_from_rows(&rows)
    }
}
