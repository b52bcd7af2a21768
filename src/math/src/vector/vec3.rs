use std::ops::{Add, Deref, DerefMut, Mul, Sub};

/// Integer block-space vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector3(pub nalgebra::Vector3<i32>);

impl Vector3 {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(nalgebra::Vector3::new(x, y, z))
    }
}

impl Deref for Vector3 {
    type Target = nalgebra::Vector3<i32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Authoritative double-precision position/velocity vector, as used by
/// [`Player`](../../strata_world/player/struct.Player.html) and entities.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3f(pub nalgebra::Vector3<f64>);

impl Vector3f {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self(nalgebra::Vector3::new(x, y, z))
    }

    #[inline]
    pub fn origin() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// True when every component is finite (i.e. a legal player-supplied
    /// position, per the invalid-movement check in the tick engine).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.0 - other.0).norm()
    }
}

impl Deref for Vector3f {
    type Target = nalgebra::Vector3<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Vector3f {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Add for Vector3f {
    type Output = Vector3f;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Vector3f {
    type Output = Vector3f;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<f64> for Vector3f {
    type Output = Vector3f;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl From<Vector3> for Vector3f {
    fn from(value: Vector3) -> Self {
        Self::new(value.x as f64, value.y as f64, value.z as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        let a = Vector3f::new(0.0, 0.0, 0.0);
        let b = Vector3f::new(3.0, 4.0, 0.0);

        assert!(strata_util::f64_eq(a.distance(&b), 5.0, 9));
    }

    #[test]
    fn is_finite_rejects_nan_and_infinite() {
        assert!(Vector3f::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Vector3f::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Vector3f::new(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
