use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, QueryBuilder, Row};
use uuid::Uuid;

use crate::models::{Intern, InternPatch, InternshipStatus, InternshipType, Person};
use crate::store::{Store, StoreError};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Insert the demo data set for the given user: three persons, with the
/// first one holding three intern records. Idempotent via fixed ids.
pub async fn seed(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let persons = vec![
        (
            Uuid::parse_str("8f4a2b6e-1d35-4c89-9a07-52e31d9b4f10")?,
            "HR Department",
        ),
        (
            Uuid::parse_str("2c91e7d4-6b0a-4f52-8e3d-b74a10c5e926")?,
            "Engineering Team",
        ),
        (
            Uuid::parse_str("5ba8c3f1-9e27-4d60-b152-7f0e48a2d383")?,
            "Marketing Division",
        ),
    ];

    let now = Utc::now();
    for (id, name) in &persons {
        sqlx::query(
            r#"
            INSERT INTO intern_tracker.persons (id, name, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, user_id = EXCLUDED.user_id, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;
    }

    let hr = persons[0].0;
    let interns = vec![
        (
            Uuid::parse_str("c1a5e8f2-3b74-4d06-9e21-80f5b3c7a914")?,
            1,
            "John Smith",
            "john.smith@email.com",
            "+1 555-0101",
            "Ongoing",
            "2024-01-15",
            "Sarah Johnson",
            "Remote",
            "2024-02-01",
            "6 months",
            true,
            "Excellent communication skills",
            4,
            false,
        ),
        (
            Uuid::parse_str("d2b6f9a3-4c85-4e17-a032-91e6c4d8ba25")?,
            2,
            "Emily Davis",
            "emily.davis@email.com",
            "+1 555-0102",
            "Completed",
            "2023-11-20",
            "Michael Brown",
            "Onsite",
            "2023-12-01",
            "3 months",
            true,
            "Outstanding performance, recommended for full-time",
            5,
            true,
        ),
        (
            Uuid::parse_str("e3c7a0b4-5d96-4f28-b143-a2f7d5e9cb36")?,
            3,
            "Alex Chen",
            "alex.chen@email.com",
            "+1 555-0103",
            "Applied",
            "2024-03-01",
            "",
            "Hybrid",
            "",
            "",
            false,
            "Strong technical background",
            0,
            false,
        ),
    ];

    for (
        id,
        sr_no,
        name,
        email,
        phone,
        status,
        date_applied,
        interviewer,
        kind,
        joining_date,
        duration,
        offer,
        notes,
        rating,
        full_time,
    ) in interns
    {
        sqlx::query(
            r#"
            INSERT INTO intern_tracker.interns
            (id, sr_no, intern_name, email, phone_number, internship_status,
             date_applied, interviewer, internship_type, joining_date, duration,
             accepted_offer_letter, notes, performance_rating, full_time_conversion,
             person_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $17)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(sr_no)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(status)
        .bind(date_applied)
        .bind(interviewer)
        .bind(kind)
        .bind(joining_date)
        .bind(duration)
        .bind(offer)
        .bind(notes)
        .bind(rating)
        .bind(full_time)
        .bind(hr)
        .bind(now)
        .execute(pool)
        .await?;
    }

    tracing::info!(%user_id, "seed data inserted");
    Ok(())
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_persons(&self, user_id: Uuid) -> Result<Vec<Person>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, user_id, created_at, updated_at \
             FROM intern_tracker.persons \
             WHERE user_id = $1 \
             ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut persons = Vec::new();
        for row in rows {
            persons.push(Person {
                id: row.get("id"),
                name: row.get("name"),
                user_id: row.get("user_id"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            });
        }

        Ok(persons)
    }

    async fn insert_person(&self, person: &Person) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO intern_tracker.persons (id, name, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(person.id)
        .bind(&person.name)
        .bind(person.user_id)
        .bind(person.created_at)
        .bind(person.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn rename_person(&self, id: Uuid, name: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE intern_tracker.persons SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_persons(&self, ids: &[Uuid]) -> Result<(), StoreError> {
        // Intern rows go with their owner via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM intern_tracker.persons WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        tracing::debug!(deleted = result.rows_affected(), "persons removed");
        Ok(())
    }

    async fn list_interns(&self, person_id: Uuid) -> Result<Vec<Intern>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, sr_no, intern_name, email, phone_number, internship_status, \
             date_applied, interviewer, internship_type, joining_date, duration, \
             accepted_offer_letter, notes, performance_rating, full_time_conversion, \
             person_id, created_at, updated_at \
             FROM intern_tracker.interns \
             WHERE person_id = $1 \
             ORDER BY sr_no",
        )
        .bind(person_id)
        .fetch_all(&self.pool)
        .await?;

        let mut interns = Vec::new();
        for row in rows {
            let status: String = row.get("internship_status");
            let kind: String = row.get("internship_type");
            interns.push(Intern {
                id: row.get("id"),
                sr_no: row.get("sr_no"),
                intern_name: row.get("intern_name"),
                email: row.get("email"),
                phone_number: row.get("phone_number"),
                internship_status: status.parse::<InternshipStatus>().unwrap_or_default(),
                date_applied: row.get("date_applied"),
                interviewer: row.get("interviewer"),
                internship_type: kind.parse::<InternshipType>().unwrap_or_default(),
                joining_date: row.get("joining_date"),
                duration: row.get("duration"),
                accepted_offer_letter: row.get("accepted_offer_letter"),
                notes: row.get("notes"),
                performance_rating: row.get("performance_rating"),
                full_time_conversion: row.get("full_time_conversion"),
                person_id: row.get("person_id"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            });
        }

        Ok(interns)
    }

    async fn insert_intern(&self, intern: &Intern) -> Result<(), StoreError> {
        self.insert_interns(std::slice::from_ref(intern)).await
    }

    async fn insert_interns(&self, interns: &[Intern]) -> Result<(), StoreError> {
        if interns.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO intern_tracker.interns \
             (id, sr_no, intern_name, email, phone_number, internship_status, \
             date_applied, interviewer, internship_type, joining_date, duration, \
             accepted_offer_letter, notes, performance_rating, full_time_conversion, \
             person_id, created_at, updated_at) ",
        );
        builder.push_values(interns, |mut row, intern| {
            row.push_bind(intern.id)
                .push_bind(intern.sr_no)
                .push_bind(&intern.intern_name)
                .push_bind(&intern.email)
                .push_bind(&intern.phone_number)
                .push_bind(intern.internship_status.as_str())
                .push_bind(&intern.date_applied)
                .push_bind(&intern.interviewer)
                .push_bind(intern.internship_type.as_str())
                .push_bind(&intern.joining_date)
                .push_bind(&intern.duration)
                .push_bind(intern.accepted_offer_letter)
                .push_bind(&intern.notes)
                .push_bind(intern.performance_rating)
                .push_bind(intern.full_time_conversion)
                .push_bind(intern.person_id)
                .push_bind(intern.created_at)
                .push_bind(intern.updated_at);
        });

        builder.build().execute(&self.pool).await?;
        tracing::debug!(count = interns.len(), "interns inserted");
        Ok(())
    }

    async fn update_intern(&self, id: Uuid, patch: &InternPatch) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE intern_tracker.interns SET \
             sr_no = COALESCE($2, sr_no), \
             intern_name = COALESCE($3, intern_name), \
             email = COALESCE($4, email), \
             phone_number = COALESCE($5, phone_number), \
             internship_status = COALESCE($6, internship_status), \
             date_applied = COALESCE($7, date_applied), \
             interviewer = COALESCE($8, interviewer), \
             internship_type = COALESCE($9, internship_type), \
             joining_date = COALESCE($10, joining_date), \
             duration = COALESCE($11, duration), \
             accepted_offer_letter = COALESCE($12, accepted_offer_letter), \
             notes = COALESCE($13, notes), \
             performance_rating = COALESCE($14, performance_rating), \
             full_time_conversion = COALESCE($15, full_time_conversion), \
             updated_at = $16 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.sr_no)
        .bind(patch.intern_name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.phone_number.as_deref())
        .bind(patch.internship_status.map(|s| s.as_str()))
        .bind(patch.date_applied.as_deref())
        .bind(patch.interviewer.as_deref())
        .bind(patch.internship_type.map(|t| t.as_str()))
        .bind(patch.joining_date.as_deref())
        .bind(patch.duration.as_deref())
        .bind(patch.accepted_offer_letter)
        .bind(patch.notes.as_deref())
        .bind(patch.performance_rating)
        .bind(patch.full_time_conversion)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_intern(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM intern_tracker.interns WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
