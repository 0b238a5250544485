use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ApplicationFilter, ApplicationRepository};
use crate::error::{Error, Result};
use crate::models::application::Application;

const COLUMNS: &str = "id, position_id, name, email, phone, cover_letter, resume_url, status, \
     ip_address, user_agent, source, processed_at, processed_by, notes, created_at, updated_at";

#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ApplicationFilter) {
        builder.push(" WHERE TRUE");
        if let Some(position_id) = &filter.position_id {
            builder.push(" AND position_id = ").push_bind(position_id.clone());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(email) = &filter.email {
            builder
                .push(" AND email ILIKE ")
                .push_bind(format!("%{}%", escape_like(email)));
        }
        if let Some(from) = filter.date_from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            builder.push(" AND created_at <= ").push_bind(to);
        }
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn create(&self, application: &Application) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (
                id, position_id, name, email, phone, cover_letter, resume_url, status,
                ip_address, user_agent, source, processed_at, processed_by, notes,
                created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13, $14,
                $15, $16
            )
            "#,
        )
        .bind(application.id)
        .bind(&application.position_id)
        .bind(&application.name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(&application.cover_letter)
        .bind(&application.resume_url)
        .bind(application.status)
        .bind(&application.ip_address)
        .bind(&application.user_agent)
        .bind(&application.source)
        .bind(application.processed_at)
        .bind(&application.processed_by)
        .bind(&application.notes)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let query = format!("SELECT {} FROM applications WHERE id = $1", COLUMNS);
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }

    async fn get_by_email_and_position(
        &self,
        email: &str,
        position_id: &str,
    ) -> Result<Option<Application>> {
        let query = format!(
            "SELECT {} FROM applications
             WHERE email = $1 AND position_id = $2
             ORDER BY (status = 'withdrawn'), created_at DESC
             LIMIT 1",
            COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&query)
            .bind(email)
            .bind(position_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(application)
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<(Vec<Application>, i64)> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM applications");
        Self::push_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut items = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM applications", COLUMNS));
        Self::push_filters(&mut items, filter);
        items
            .push(" ORDER BY ")
            .push(filter.sort_by.column())
            .push(" ")
            .push(filter.sort_order.keyword())
            .push(", id ")
            .push(filter.sort_order.keyword())
            .push(" LIMIT ")
            .push_bind(filter.page_size)
            .push(" OFFSET ")
            .push_bind(filter.offset());
        let applications = items
            .build_query_as::<Application>()
            .fetch_all(&self.pool)
            .await?;

        Ok((applications, total))
    }

    async fn update(&self, application: &Application) -> Result<()> {
        let res = sqlx::query(
            r#"
            UPDATE applications
            SET
                position_id = $2,
                name = $3,
                email = $4,
                phone = $5,
                cover_letter = $6,
                resume_url = $7,
                status = $8,
                ip_address = $9,
                user_agent = $10,
                source = $11,
                processed_at = $12,
                processed_by = $13,
                notes = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(application.id)
        .bind(&application.position_id)
        .bind(&application.name)
        .bind(&application.email)
        .bind(&application.phone)
        .bind(&application.cover_letter)
        .bind(&application.resume_url)
        .bind(application.status)
        .bind(&application.ip_address)
        .bind(&application.user_agent)
        .bind(&application.source)
        .bind(application.processed_at)
        .bind(&application.processed_by)
        .bind(&application.notes)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Application not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Application not found".into()));
        }
        Ok(())
    }
}
