//! Elementwise activation functions.

/// Rectified linear unit: `max(0, x)`.
#[must_use]
pub fn relu(x: f32) -> f32 {
    x.max(0.0)
}

/// Derivative of [`relu`]: `1` for positive inputs, `0` otherwise.
///
/// Evolution does not use gradients. This is kept for supervised fine-tuning experiments.
#[must_use]
pub fn relu_derivative(x: f32) -> f32 {
    if x > 0.0 { 1.0 } else { 0.0 }
}

/// Applies `f` to every element of `values` in-place.
pub fn apply<F>(values: &mut [f32], f: F)
where
    F: Fn(f32) -> f32,
{
    for v in values {
        *v = f(*v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_clips_negative_values() {
        assert_eq!(relu(-3.5), 0.0);
        assert_eq!(relu(0.0), 0.0);
        assert_eq!(relu(2.25), 2.25);
    }

    #[test]
    fn relu_derivative_is_step_function() {
        assert_eq!(relu_derivative(-1.0), 0.0);
        assert_eq!(relu_derivative(0.0), 0.0);
        assert_eq!(relu_derivative(0.1), 1.0);
    }

    #[test]
    fn apply_maps_every_element() {
        let mut values = [-1.0, 0.5, 2.0];
        apply(&mut values, relu);
        assert_eq!(values, [0.0, 0.5, 2.0]);
    }
}
