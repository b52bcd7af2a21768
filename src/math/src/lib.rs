pub mod vector;
pub mod angle;

pub use angle::Angle;
pub use vector::{Vector3, Vector3f};
