// Visual tuning for entity glyphs, kept apart from runtime configuration.

pub mod bullet;
pub mod ship;

pub use bullet::BulletTuning;
pub use ship::ShipTuning;
