//! Integration tests for the listing, image and category repositories.

use piata_core::geo::LatLng;
use piata_core::listing::main_image;
use piata_core::query::{ListingFilter, Ordering};
use piata_core::types::DbId;
use piata_db::models::category::CreateCategory;
use piata_db::models::listing::CreateListing;
use piata_db::models::listing_image::CreateListingImage;
use piata_db::models::user::CreateUser;
use piata_db::repositories::{CategoryRepo, ListingImageRepo, ListingRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Fixture {
    user_id: DbId,
    parent_id: DbId,
    child_id: DbId,
}

async fn fixture(pool: &PgPool) -> Fixture {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: "seller".to_string(),
            email: "seller@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
        },
    )
    .await
    .unwrap();
    let parent = CategoryRepo::create(pool, &category("Electronics", None))
        .await
        .unwrap();
    let child = CategoryRepo::create(pool, &category("Phones", Some(parent.id)))
        .await
        .unwrap();
    Fixture {
        user_id: user.id,
        parent_id: parent.id,
        child_id: child.id,
    }
}

fn category(name: &str, parent_id: Option<DbId>) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        slug: None,
        icon: None,
        color: None,
        parent_id,
    }
}

async fn listing(
    pool: &PgPool,
    fx: &Fixture,
    title: &str,
    price: Option<f64>,
    status: &str,
    coords: Option<(f64, f64)>,
) -> DbId {
    ListingRepo::create(
        pool,
        &CreateListing {
            title: title.to_string(),
            description: format!("{title} description"),
            price,
            currency: None,
            location: "Bucharest".to_string(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            status: Some(status.to_string()),
            user_id: fx.user_id,
            category_id: fx.child_id,
        },
    )
    .await
    .unwrap()
    .id
}

async fn image(pool: &PgPool, listing_id: DbId, name: &str, is_main: bool, order: i32) {
    ListingImageRepo::create(
        pool,
        &CreateListingImage {
            listing_id,
            image: name.to_string(),
            is_main: Some(is_main),
            display_order: Some(order),
        },
    )
    .await
    .unwrap();
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feed_only_returns_active_listings(pool: PgPool) {
    let fx = fixture(&pool).await;
    listing(&pool, &fx, "Active", Some(10.0), "active", None).await;
    listing(&pool, &fx, "Pending", Some(10.0), "pending", None).await;
    listing(&pool, &fx, "Sold", Some(10.0), "sold", None).await;

    let feed = ListingRepo::list_feed(&pool, &ListingFilter::default(), Ordering::default())
        .await
        .unwrap();

    let titles: Vec<_> = feed.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Active"]);
    assert_eq!(feed[0].user.username, "seller");
    assert_eq!(feed[0].category.name, "Phones");
    assert_eq!(feed[0].currency, "RON");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feed_hides_soft_deleted(pool: PgPool) {
    let fx = fixture(&pool).await;
    let id = listing(&pool, &fx, "Gone", None, "active", None).await;

    assert!(ListingRepo::soft_delete(&pool, id).await.unwrap());
    assert!(!ListingRepo::soft_delete(&pool, id).await.unwrap());

    let feed = ListingRepo::list_feed(&pool, &ListingFilter::default(), Ordering::default())
        .await
        .unwrap();
    assert!(feed.is_empty());
    assert!(ListingRepo::find_feed_by_id(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feed_embeds_images_in_display_order(pool: PgPool) {
    let fx = fixture(&pool).await;
    let id = listing(&pool, &fx, "Phone", Some(500.0), "active", None).await;
    image(&pool, id, "b.jpg", false, 2).await;
    image(&pool, id, "a.jpg", true, 1).await;
    image(&pool, id, "c.jpg", false, 3).await;

    let item = ListingRepo::find_feed_by_id(&pool, id).await.unwrap().unwrap();
    let names: Vec<_> = item.images.iter().map(|i| i.image.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.jpg", "c.jpg"]);
    assert_eq!(main_image(&item.images), Some("a.jpg"));
    assert_eq!(item.price_label(), "500 RON");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feed_filters_by_parent_category_and_price(pool: PgPool) {
    let fx = fixture(&pool).await;
    listing(&pool, &fx, "Cheap", Some(5.0), "active", None).await;
    listing(&pool, &fx, "Mid", Some(50.0), "active", None).await;
    listing(&pool, &fx, "Dear", Some(500.0), "active", None).await;

    let filter = ListingFilter {
        category: Some(fx.parent_id),
        min_price: Some(10.0),
        max_price: Some(100.0),
        ..Default::default()
    };
    let feed = ListingRepo::list_feed(&pool, &filter, Ordering::default())
        .await
        .unwrap();
    let titles: Vec<_> = feed.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Mid"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feed_search_and_ordering(pool: PgPool) {
    let fx = fixture(&pool).await;
    listing(&pool, &fx, "Red bike", Some(300.0), "active", None).await;
    listing(&pool, &fx, "Blue bike", Some(100.0), "active", None).await;
    listing(&pool, &fx, "Sofa", Some(200.0), "active", None).await;

    let filter = ListingFilter {
        search: Some("BIKE".to_string()),
        ..Default::default()
    };
    let feed = ListingRepo::list_feed(&pool, &filter, Ordering::parse("price").unwrap())
        .await
        .unwrap();
    let titles: Vec<_> = feed.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Blue bike", "Red bike"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    let fx = fixture(&pool).await;
    listing(&pool, &fx, "100% cotton", None, "active", None).await;
    listing(&pool, &fx, "Wool", None, "active", None).await;

    let filter = ListingFilter {
        search: Some("%".to_string()),
        ..Default::default()
    };
    let feed = ListingRepo::list_feed(&pool, &filter, Ordering::default())
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].title, "100% cotton");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_increment_views(pool: PgPool) {
    let fx = fixture(&pool).await;
    let id = listing(&pool, &fx, "Viewed", None, "active", None).await;

    assert!(ListingRepo::increment_views(&pool, id).await.unwrap());
    assert!(ListingRepo::increment_views(&pool, id).await.unwrap());
    assert!(!ListingRepo::increment_views(&pool, 999_999).await.unwrap());

    let row = ListingRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.views, 2);
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_main_image_clears_previous_main(pool: PgPool) {
    let fx = fixture(&pool).await;
    let id = listing(&pool, &fx, "Phone", None, "active", None).await;
    image(&pool, id, "first.jpg", true, 1).await;
    image(&pool, id, "second.jpg", true, 2).await;

    let images = ListingImageRepo::list_for_listing(&pool, id).await.unwrap();
    let mains: Vec<_> = images
        .iter()
        .filter(|i| i.is_main)
        .map(|i| i.image.as_str())
        .collect();
    assert_eq!(mains, vec!["second.jpg"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hard_delete_cascades_to_images(pool: PgPool) {
    let fx = fixture(&pool).await;
    let id = listing(&pool, &fx, "Phone", None, "active", None).await;
    image(&pool, id, "a.jpg", true, 1).await;

    assert!(ListingRepo::hard_delete(&pool, id).await.unwrap());
    assert!(ListingImageRepo::list_for_listing(&pool, id)
        .await
        .unwrap()
        .is_empty());
}

// ---------------------------------------------------------------------------
// Nearby
// ---------------------------------------------------------------------------

const BUCHAREST: (f64, f64) = (44.4268, 26.1025);

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_nearby_excludes_self_and_far_listings(pool: PgPool) {
    let fx = fixture(&pool).await;
    let origin = listing(&pool, &fx, "Origin", None, "active", Some(BUCHAREST)).await;
    let near = listing(&pool, &fx, "Near", Some(20.0), "active", Some((44.43, 26.11))).await;
    listing(&pool, &fx, "Cluj", None, "active", Some((46.7712, 23.6236))).await;
    listing(&pool, &fx, "Nowhere", None, "active", None).await;
    listing(&pool, &fx, "Inactive", None, "pending", Some((44.427, 26.103))).await;
    image(&pool, near, "near.jpg", true, 1).await;

    let center = LatLng::new(BUCHAREST.0, BUCHAREST.1).unwrap();
    let found = ListingRepo::find_nearby(&pool, origin, center, 10.0, 6)
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, near);
    assert_eq!(found[0].image_url.as_deref(), Some("near.jpg"));
    assert_eq!(found[0].price, Some(20.0));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_nearby_orders_by_distance_and_limits(pool: PgPool) {
    let fx = fixture(&pool).await;
    let origin = listing(&pool, &fx, "Origin", None, "active", Some(BUCHAREST)).await;
    let far = listing(&pool, &fx, "Far", None, "active", Some((44.47, 26.10))).await;
    let close = listing(&pool, &fx, "Close", None, "active", Some((44.428, 26.102))).await;
    let mid = listing(&pool, &fx, "Mid", None, "active", Some((44.44, 26.10))).await;

    let center = LatLng::new(BUCHAREST.0, BUCHAREST.1).unwrap();
    let found = ListingRepo::find_nearby(&pool, origin, center, 10.0, 6)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![close, mid, far]);

    let limited = ListingRepo::find_nearby(&pool, origin, center, 10.0, 2)
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_wider_radius_reaches_other_city(pool: PgPool) {
    let fx = fixture(&pool).await;
    let origin = listing(&pool, &fx, "Origin", None, "active", Some(BUCHAREST)).await;
    listing(&pool, &fx, "Cluj", None, "active", Some((46.7712, 23.6236))).await;

    let center = LatLng::new(BUCHAREST.0, BUCHAREST.1).unwrap();
    assert!(ListingRepo::find_nearby(&pool, origin, center, 300.0, 6)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        ListingRepo::find_nearby(&pool, origin, center, 350.0, 6)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_nearby_crosses_the_antimeridian(pool: PgPool) {
    let fx = fixture(&pool).await;
    let origin = listing(&pool, &fx, "Taveuni", None, "active", Some((-16.8, 179.95))).await;
    let across = listing(&pool, &fx, "Across", None, "active", Some((-16.8, -179.95))).await;
    listing(&pool, &fx, "Far west", None, "active", Some((-16.8, -170.0))).await;

    let center = LatLng::new(-16.8, 179.95).unwrap();
    let found = ListingRepo::find_nearby(&pool, origin, center, 20.0, 6)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![across]);

    let back = LatLng::new(-16.8, -179.95).unwrap();
    let found = ListingRepo::find_nearby(&pool, across, back, 20.0, 6)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![origin]);
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_tree_groups_children(pool: PgPool) {
    let fx = fixture(&pool).await;
    CategoryRepo::create(&pool, &category("Clothing", None))
        .await
        .unwrap();

    let tree = CategoryRepo::list_tree(&pool).await.unwrap();
    let roots: Vec<_> = tree.iter().map(|t| t.category.name.as_str()).collect();
    assert_eq!(roots, vec!["Clothing", "Electronics"]);

    let electronics = tree.iter().find(|t| t.category.id == fx.parent_id).unwrap();
    assert_eq!(electronics.subcategories.len(), 1);
    assert_eq!(electronics.subcategories[0].slug, "phones");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_upsert_keeps_existing_row(pool: PgPool) {
    let (first, created) = CategoryRepo::upsert_by_slug(&pool, &category("Home & Garden", None))
        .await
        .unwrap();
    assert!(created);
    assert_eq!(first.slug, "home-si-garden");

    let mut renamed = category("Renamed", None);
    renamed.slug = Some("home-si-garden".to_string());
    let (second, created) = CategoryRepo::upsert_by_slug(&pool, &renamed).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Home & Garden");
}
