use serde::{Deserialize, Serialize};

/// Error returned by [`TrackConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrackConfigError {
    #[display("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f32 },
    #[display("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[display("min_speed {min_speed} is greater than max_speed {max_speed}")]
    EmptySpeedRange { min_speed: f32, max_speed: f32 },
}

/// Constants of the racing environment.
///
/// The defaults describe a 100 wide, 1000 long straight track on which a car starts
/// at speed 5 and has 500 steps to reach the end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Distance between the left wall (`x = 0`) and the right wall.
    pub track_width: f32,
    /// Longitudinal distance the car has to cover to finish.
    pub track_length: f32,
    /// Speed of the car at the start line.
    pub initial_speed: f32,
    /// Number of steps after which a run that is still going is cut off.
    pub max_steps: usize,
    /// Lateral displacement per unit of steering.
    pub steering_sensitivity: f32,
    /// Speed change per unit of acceleration.
    pub acceleration_factor: f32,
    /// Lower bound of the car speed.
    pub min_speed: f32,
    /// Upper bound of the car speed.
    pub max_speed: f32,
    /// Awarded once, on the step the car reaches the end of the track.
    pub completion_bonus: f32,
    /// Awarded on every step, including the terminal one.
    pub survival_reward: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            track_width: 100.0,
            track_length: 1000.0,
            initial_speed: 5.0,
            max_steps: 500,
            steering_sensitivity: 2.0,
            acceleration_factor: 0.5,
            min_speed: 1.0,
            max_speed: 10.0,
            completion_bonus: 1000.0,
            survival_reward: 1.0,
        }
    }
}

impl TrackConfig {
    /// Lateral position of the track center, where every run starts.
    #[must_use]
    pub fn center(&self) -> f32 {
        self.track_width / 2.0
    }

    /// Checks that a car can be simulated on this track.
    ///
    /// [`RaceEnvironment::step`](crate::RaceEnvironment::step) panics on a track that
    /// fails this check.
    pub fn validate(&self) -> Result<(), TrackConfigError> {
        let values = [
            ("track_width", self.track_width),
            ("track_length", self.track_length),
            ("initial_speed", self.initial_speed),
            ("steering_sensitivity", self.steering_sensitivity),
            ("acceleration_factor", self.acceleration_factor),
            ("min_speed", self.min_speed),
            ("max_speed", self.max_speed),
            ("completion_bonus", self.completion_bonus),
            ("survival_reward", self.survival_reward),
        ];
        if let Some(&(name, value)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(TrackConfigError::NonFinite { name, value });
        }
        for (name, value) in [
            ("track_width", self.track_width),
            ("track_length", self.track_length),
        ] {
            if value <= 0.0 {
                return Err(TrackConfigError::NotPositive { name, value });
            }
        }
        if self.min_speed > self.max_speed {
            return Err(TrackConfigError::EmptySpeedRange {
                min_speed: self.min_speed,
                max_speed: self.max_speed,
            });
        }
        Ok(())
    }

    /// Returns `true` if `x` lies outside the track walls.
    #[must_use]
    pub fn is_off_track(&self, x: f32) -> bool {
        x < 0.0 || x > self.track_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_track_is_valid() {
        assert_eq!(TrackConfig::default().validate(), Ok(()));
        assert_eq!(TrackConfig::default().center(), 50.0);
    }

    #[test]
    fn inverted_speed_range_is_rejected() {
        let track = TrackConfig {
            min_speed: 10.0,
            max_speed: 1.0,
            ..TrackConfig::default()
        };
        assert_eq!(
            track.validate(),
            Err(TrackConfigError::EmptySpeedRange {
                min_speed: 10.0,
                max_speed: 1.0
            })
        );
    }

    #[test]
    fn nan_bounds_are_rejected() {
        let track = TrackConfig {
            max_speed: f32::NAN,
            ..TrackConfig::default()
        };
        let err = track.validate().unwrap_err();
        assert!(matches!(
            err,
            TrackConfigError::NonFinite {
                name: "max_speed",
                ..
            }
        ));
        assert_eq!(err.to_string(), "max_speed must be finite, got NaN");
    }

    #[test]
    fn empty_track_is_rejected() {
        let track = TrackConfig {
            track_length: 0.0,
            ..TrackConfig::default()
        };
        assert_eq!(
            track.validate(),
            Err(TrackConfigError::NotPositive {
                name: "track_length",
                value: 0.0
            })
        );
    }

    #[test]
    fn walls_bound_the_track() {
        let track = TrackConfig::default();
        assert!(track.is_off_track(-0.5));
        assert!(track.is_off_track(100.5));
        assert!(!track.is_off_track(0.0));
        assert!(!track.is_off_track(100.0));
    }
}
