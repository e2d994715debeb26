//! Repository for the `crackers` table.

use crackers_core::catalog::CrackerSortField;
use crackers_core::pagination::Sort;
use crackers_core::types::DbId;
use sqlx::PgPool;

use crate::models::cracker::{CreateCracker, Cracker, CrackerListQuery, UpdateCracker};

/// Column list for the `crackers` table.
const COLUMNS: &str = "id, english_name, tamil_name, original_rate, discount_rate, \
    category, is_active, image_url, image_public_id, created_at, updated_at";

/// Provides CRUD operations for catalog entries.
pub struct CrackerRepo;

impl CrackerRepo {
    /// Insert a new catalog entry, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCracker) -> Result<Cracker, sqlx::Error> {
        let query = format!(
            "INSERT INTO crackers \
                (english_name, tamil_name, original_rate, discount_rate, category, \
                 is_active, image_url, image_public_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cracker>(&query)
            .bind(&input.english_name)
            .bind(&input.tamil_name)
            .bind(input.original_rate)
            .bind(input.discount_rate)
            .bind(&input.category)
            .bind(input.is_active)
            .bind(input.image.as_ref().map(|a| a.url.as_str()))
            .bind(input.image.as_ref().map(|a| a.asset_id.as_str()))
            .fetch_one(pool)
            .await
    }

    /// Find a catalog entry by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Cracker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM crackers WHERE id = $1");
        sqlx::query_as::<_, Cracker>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of catalog entries. Ties are broken by id so that
    /// consecutive pages never overlap.
    pub async fn list(
        pool: &PgPool,
        params: &CrackerListQuery,
    ) -> Result<Vec<Cracker>, sqlx::Error> {
        let order_by = order_clause(params.sort);
        let query = format!(
            "SELECT {COLUMNS} FROM crackers \
             WHERE ($1 = false OR is_active = true) \
             ORDER BY {order_by} \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Cracker>(&query)
            .bind(params.only_active)
            .bind(params.page.limit)
            .bind(params.page.offset())
            .fetch_all(pool)
            .await
    }

    /// Count catalog entries, optionally only active ones.
    pub async fn count(pool: &PgPool, only_active: bool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM crackers WHERE ($1 = false OR is_active = true)",
        )
        .bind(only_active)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Update a catalog entry. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCracker,
    ) -> Result<Option<Cracker>, sqlx::Error> {
        let query = format!(
            "UPDATE crackers SET \
                english_name = COALESCE($2, english_name), \
                tamil_name = COALESCE($3, tamil_name), \
                original_rate = COALESCE($4, original_rate), \
                discount_rate = COALESCE($5, discount_rate), \
                category = COALESCE($6, category), \
                is_active = COALESCE($7, is_active), \
                image_url = COALESCE($8, image_url), \
                image_public_id = COALESCE($9, image_public_id) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cracker>(&query)
            .bind(id)
            .bind(&input.english_name)
            .bind(&input.tamil_name)
            .bind(input.original_rate)
            .bind(input.discount_rate)
            .bind(&input.category)
            .bind(input.is_active)
            .bind(input.image.as_ref().map(|a| a.url.as_str()))
            .bind(input.image.as_ref().map(|a| a.asset_id.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the active flag.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Cracker>, sqlx::Error> {
        let query = format!(
            "UPDATE crackers SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cracker>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a catalog entry. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM crackers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Build the whitelisted `ORDER BY` clause for a catalog sort.
fn order_clause(sort: Sort<CrackerSortField>) -> String {
    let column = match sort.field {
        CrackerSortField::CreatedAt => "created_at",
        CrackerSortField::UpdatedAt => "updated_at",
        CrackerSortField::EnglishName => "english_name",
        CrackerSortField::TamilName => "tamil_name",
        CrackerSortField::OriginalRate => "original_rate",
        CrackerSortField::DiscountRate => "discount_rate",
        CrackerSortField::Category => "category",
    };
    let dir = sort.direction.as_sql();
    format!("{column} {dir}, id {dir}")
}
