//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod category_repo;
pub mod listing_image_repo;
pub mod listing_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use listing_image_repo::ListingImageRepo;
pub use listing_repo::ListingRepo;
pub use user_repo::UserRepo;
