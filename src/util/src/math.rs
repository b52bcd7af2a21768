/// Approximate float equality to a given number of decimal places, used
/// throughout the tests instead of exact equality on float math.
pub fn f32_eq(a: f32, b: f32, decimal_places: u8) -> bool {
    let p = 10f32.powi(-(decimal_places as i32));
    (a - b).abs() < p
}

pub fn f64_eq(a: f64, b: f64, decimal_places: u8) -> bool {
    let p = 10f64.powi(-(decimal_places as i32));
    (a - b).abs() < p
}

#[macro_export]
macro_rules! assert_f64_eq {
    ($left:expr, $right:expr, $decimal_places:expr) => {
        if !$crate::f64_eq($left, $right, $decimal_places) {
            panic!(
                "assertion `left == right` failed\n  left: {}\n right: {}",
                $left, $right
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_eq() {
        assert!(f32_eq(0.43025392, 0.43025383, 7));
        assert!(!f32_eq(0.43025392, 0.43025383, 8));
    }

    #[test]
    fn test_f64_eq() {
        assert!(f64_eq(0.340209528758382, 0.340209528758365, 13));
        assert!(!f64_eq(0.340209528758382, 0.340209528758365, 14));
    }
}
