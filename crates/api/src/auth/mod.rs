//! Credential helpers. The read API has no login; hashing is used to
//! provision accounts such as the seeded sample user.

pub mod password;
