pub mod garment;
pub mod outfit;
pub mod preferences;
