mod vec3;

pub use vec3::{Vector3, Vector3f};
