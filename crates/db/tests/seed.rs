//! Integration tests for the idempotent sample-data seed.

use piata_db::repositories::{ListingImageRepo, ListingRepo};
use piata_db::seed::{seed_sample_data, SAMPLE_IMAGE, SAMPLE_LISTING_TITLE};
use sqlx::PgPool;

async fn count(pool: &PgPool, sql: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(sql)
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("{sql} failed: {e}"));
    row.0
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_first_run_creates_everything(pool: PgPool) {
    let report = seed_sample_data(&pool, "hash").await.unwrap();

    assert_eq!(report.categories_created, 4);
    assert!(report.user_created);
    assert!(report.listing_created);
    assert!(report.image_created);
    assert!(!report.is_noop());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_run_creates_no_duplicates(pool: PgPool) {
    seed_sample_data(&pool, "hash").await.unwrap();
    let second = seed_sample_data(&pool, "other-hash").await.unwrap();

    assert!(second.is_noop(), "second run should create nothing: {second:?}");

    for slug in ["electronics", "phones", "clothing", "shirts"] {
        let n: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(n.0, 1, "slug {slug}");
    }
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM users WHERE username = 'testuser'").await,
        1
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM listings WHERE title = 'Sample Phone'").await,
        1
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM listing_images").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rerun_after_soft_delete_creates_no_duplicate(pool: PgPool) {
    seed_sample_data(&pool, "hash").await.unwrap();
    let listing = ListingRepo::find_first_by_title(&pool, SAMPLE_LISTING_TITLE)
        .await
        .unwrap()
        .unwrap();
    assert!(ListingRepo::soft_delete(&pool, listing.id).await.unwrap());

    let report = seed_sample_data(&pool, "hash").await.unwrap();
    assert!(report.is_noop(), "{report:?}");
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM listings WHERE title = 'Sample Phone'").await,
        1
    );
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM listing_images").await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_existing_user_keeps_original_hash(pool: PgPool) {
    seed_sample_data(&pool, "first-hash").await.unwrap();
    seed_sample_data(&pool, "second-hash").await.unwrap();

    let stored: (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE username = 'testuser'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(stored.0, "first-hash");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seeded_tree_and_listing_shape(pool: PgPool) {
    seed_sample_data(&pool, "hash").await.unwrap();

    let parent: (String,) = sqlx::query_as(
        "SELECT p.slug FROM categories c JOIN categories p ON p.id = c.parent_id \
         WHERE c.slug = 'shirts'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(parent.0, "clothing");

    let listing = ListingRepo::find_first_by_title(&pool, SAMPLE_LISTING_TITLE)
        .await
        .unwrap()
        .expect("seeded listing");
    assert_eq!(listing.price, Some(500.0));
    assert_eq!(listing.currency, "RON");
    assert_eq!(listing.status, "active");

    let images = ListingImageRepo::list_for_listing(&pool, listing.id)
        .await
        .unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].image, SAMPLE_IMAGE);
    assert!(images[0].is_main);
    assert_eq!(images[0].display_order, 1);
}
