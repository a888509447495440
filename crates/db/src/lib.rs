pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect, connect_with_settings, is_in_memory, DbPool};
pub use fixtures::{DemoWardrobe, SeedResult, VerificationResult, DEFAULT_DEMO_OWNER};
pub use repositories::{
    load_inventory, GarmentRepository, OutfitRepository, ProfileRepository, RepositoryError,
};
