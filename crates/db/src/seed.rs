//! Idempotent sample data.
//!
//! Every step is keyed by a natural unique field (category slug, username,
//! listing title, listing id + image), so running the seed any number of
//! times leaves exactly one copy of each record.

use piata_core::listing::{Currency, ListingStatus};
use piata_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::CreateCategory;
use crate::models::listing::CreateListing;
use crate::models::listing_image::CreateListingImage;
use crate::models::user::CreateUser;
use crate::repositories::{CategoryRepo, ListingImageRepo, ListingRepo, UserRepo};

/// Username of the seeded account.
pub const SAMPLE_USERNAME: &str = "testuser";

/// Title of the seeded listing.
pub const SAMPLE_LISTING_TITLE: &str = "Sample Phone";

/// Image reference of the seeded listing.
pub const SAMPLE_IMAGE: &str = "phone.jpg";

/// Root categories and their single child: `(root, child)`, each as
/// `(name, slug, icon, color)`.
const CATEGORY_PAIRS: &[((&str, &str, &str, &str), (&str, &str, &str, &str))] = &[
    (
        ("Electronics", "electronics", "📱", "#4F46E5"),
        ("Phones", "phones", "📱", "#10B981"),
    ),
    (
        ("Clothing", "clothing", "👕", "#EF4444"),
        ("Shirts", "shirts", "👕", "#F59E0B"),
    ),
];

/// What a seed run created. All `false`/zero on a repeated run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub user_created: bool,
    pub listing_created: bool,
    pub image_created: bool,
}

impl SeedReport {
    /// `true` when the run found everything already in place.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Seed two root categories with one child each, one user, one listing and
/// its main image.
///
/// `password_hash` is stored as-is for a newly created user and ignored
/// when the user already exists.
pub async fn seed_sample_data(
    pool: &PgPool,
    password_hash: &str,
) -> Result<SeedReport, sqlx::Error> {
    let mut report = SeedReport::default();

    let mut phones_id = None;
    for (root, child) in CATEGORY_PAIRS {
        let (parent, created) = CategoryRepo::upsert_by_slug(pool, &category(*root, None)).await?;
        report.categories_created += usize::from(created);

        let (sub, created) =
            CategoryRepo::upsert_by_slug(pool, &category(*child, Some(parent.id))).await?;
        report.categories_created += usize::from(created);

        if sub.slug == "phones" {
            phones_id = Some(sub.id);
        }
    }
    let phones_id = phones_id.ok_or(sqlx::Error::RowNotFound)?;

    let (user, created) = UserRepo::upsert_by_username(
        pool,
        &CreateUser {
            username: SAMPLE_USERNAME.to_string(),
            email: "test@example.com".to_string(),
            password_hash: password_hash.to_string(),
            first_name: Some("Test".to_string()),
            last_name: Some("User".to_string()),
        },
    )
    .await?;
    report.user_created = created;

    let listing = match ListingRepo::find_first_by_title(pool, SAMPLE_LISTING_TITLE).await? {
        Some(existing) => existing,
        None => {
            report.listing_created = true;
            ListingRepo::create(
                pool,
                &CreateListing {
                    title: SAMPLE_LISTING_TITLE.to_string(),
                    description: "A great phone for sale.".to_string(),
                    price: Some(500.0),
                    currency: Some(Currency::Ron.code().to_string()),
                    location: "Bucharest".to_string(),
                    latitude: Some(44.4268),
                    longitude: Some(26.1025),
                    status: Some(ListingStatus::Active.as_str().to_string()),
                    user_id: user.id,
                    category_id: phones_id,
                },
            )
            .await?
        }
    };

    if ListingImageRepo::find_by_listing_and_image(pool, listing.id, SAMPLE_IMAGE)
        .await?
        .is_none()
    {
        ListingImageRepo::create(
            pool,
            &CreateListingImage {
                listing_id: listing.id,
                image: SAMPLE_IMAGE.to_string(),
                is_main: Some(true),
                display_order: Some(1),
            },
        )
        .await?;
        report.image_created = true;
    }

    tracing::info!(
        categories_created = report.categories_created,
        user_created = report.user_created,
        listing_created = report.listing_created,
        image_created = report.image_created,
        listing_id = listing.id,
        "Sample data seeded",
    );

    Ok(report)
}

fn category(
    (name, slug, icon, color): (&str, &str, &str, &str),
    parent_id: Option<DbId>,
) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        slug: Some(slug.to_string()),
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        parent_id,
    }
}
