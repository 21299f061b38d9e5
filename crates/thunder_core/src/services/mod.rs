//! Services behind the front end.
//!
//! - `registry` - Open sessions and routing to the active driver
//! - `profiles` - Saved connection profiles on disk
//! - `database` - Response-envelope facade over both

pub mod database;
pub mod profiles;
pub mod registry;

pub use database::DatabaseService;
pub use profiles::{default_data_dir, default_profiles_path, ProfileStore};
pub use registry::ConnectionRegistry;
