//! Repository for the `categories` table.

use piata_core::slug::slugify;
use piata_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryTree, CreateCategory};

/// Column list for categories queries.
const COLUMNS: &str = "id, name, slug, icon, color, parent_id, created_at";

/// Provides reads and idempotent creation for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List all categories, ordered by name ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, Category>(&query)
            .fetch_all(pool)
            .await
    }

    /// Root categories with their direct children, both ordered by name.
    pub async fn list_tree(pool: &PgPool) -> Result<Vec<CategoryTree>, sqlx::Error> {
        let all = Self::list(pool).await?;
        let (roots, children): (Vec<_>, Vec<_>) =
            all.into_iter().partition(|c| c.parent_id.is_none());

        Ok(roots
            .into_iter()
            .map(|root| {
                let subcategories = children
                    .iter()
                    .filter(|c| c.parent_id == Some(root.id))
                    .cloned()
                    .collect();
                CategoryTree {
                    category: root,
                    subcategories,
                }
            })
            .collect())
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a category by its unique slug.
    pub async fn find_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Insert a category, deriving the slug from the name when absent.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let slug = resolve_slug(input);
        let query = format!(
            "INSERT INTO categories (name, slug, icon, color, parent_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&slug)
            .bind(&input.icon)
            .bind(&input.color)
            .bind(input.parent_id)
            .fetch_one(pool)
            .await
    }

    /// Insert the category unless its slug already exists.
    ///
    /// Existing rows are left untouched. Returns the row and whether it was
    /// created by this call.
    pub async fn upsert_by_slug(
        pool: &PgPool,
        input: &CreateCategory,
    ) -> Result<(Category, bool), sqlx::Error> {
        let slug = resolve_slug(input);
        let query = format!(
            "INSERT INTO categories (name, slug, icon, color, parent_id)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_categories_slug DO NOTHING
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&slug)
            .bind(&input.icon)
            .bind(&input.color)
            .bind(input.parent_id)
            .fetch_optional(pool)
            .await?;

        match inserted {
            Some(category) => Ok((category, true)),
            None => {
                let existing = Self::find_by_slug(pool, &slug)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((existing, false))
            }
        }
    }
}

fn resolve_slug(input: &CreateCategory) -> String {
    match input.slug.as_deref() {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slugify(&input.name),
    }
}
