//! Bounded box descriptors for actions and observations.
//!
//! A caller can validate or clip tensors against these specs before use.
//! The action space is `(speed, steering_angle)`; the observation is a
//! normalized 84x84 RGB frame.

/// Number of action dimensions: speed and steering angle.
pub const ACTION_DIM: usize = 2;

/// Observation shape: height, width, channels.
pub const OBS_SHAPE: [usize; 3] = [84, 84, 3];

/// Flattened observation length.
pub const OBS_LEN: usize = OBS_SHAPE[0] * OBS_SHAPE[1] * OBS_SHAPE[2];

/// Bounded box descriptor: per-dimension minimum and maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedSpec {
    /// Shape of the described tensor.
    pub shape: Vec<usize>,
    /// Per-dimension lower bounds (broadcast if length 1).
    pub minimum: Vec<f32>,
    /// Per-dimension upper bounds (broadcast if length 1).
    pub maximum: Vec<f32>,
}

impl BoundedSpec {
    /// Total number of scalar elements described.
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Check whether the spec describes zero elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lower bound for dimension `i` (broadcasting a scalar bound).
    pub fn min(&self, i: usize) -> f32 {
        if self.minimum.len() == 1 {
            self.minimum[0]
        } else {
            self.minimum[i]
        }
    }

    /// Upper bound for dimension `i` (broadcasting a scalar bound).
    pub fn max(&self, i: usize) -> f32 {
        if self.maximum.len() == 1 {
            self.maximum[0]
        } else {
            self.maximum[i]
        }
    }

    /// Clip `values` element-wise into the spec bounds.
    ///
    /// Out-of-range inputs are a caller bug but are clamped
    /// deterministically rather than rejected.
    pub fn clip(&self, values: &mut [f32]) {
        for (i, v) in values.iter_mut().enumerate() {
            *v = v.clamp(self.min(i), self.max(i));
        }
    }

    /// Check that `values` lies within bounds (inclusive).
    pub fn contains(&self, values: &[f32]) -> bool {
        values.len() == self.len()
            && values
                .iter()
                .enumerate()
                .all(|(i, &v)| v >= self.min(i) && v <= self.max(i))
    }
}

/// Action spec: speed in `[0, max_speed]`, steering in
/// `[-max_steering, max_steering]`.
#[derive(Debug, Clone)]
pub struct ActionSpec {
    spec: BoundedSpec,
}

impl ActionSpec {
    /// Build the action spec from simulator-reported vehicle limits.
    pub fn new(max_speed: f32, max_steering: f32) -> Self {
        Self {
            spec: BoundedSpec {
                shape: vec![ACTION_DIM],
                minimum: vec![0.0, -max_steering],
                maximum: vec![max_speed, max_steering],
            },
        }
    }

    /// Maximum forward speed.
    pub fn max_speed(&self) -> f32 {
        self.spec.maximum[0]
    }

    /// Maximum steering angle magnitude.
    pub fn max_steering(&self) -> f32 {
        self.spec.maximum[1]
    }

    /// The underlying bounded box.
    pub fn bounds(&self) -> &BoundedSpec {
        &self.spec
    }

    /// Clip an action in place to the actuator bounds.
    pub fn clip(&self, action: &mut [f32; ACTION_DIM]) {
        self.spec.clip(action);
    }
}

/// Observation spec: fixed 84x84x3 image, values in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ObservationSpec {
    spec: BoundedSpec,
}

impl ObservationSpec {
    /// Build the fixed observation spec.
    pub fn new() -> Self {
        Self {
            spec: BoundedSpec {
                shape: OBS_SHAPE.to_vec(),
                minimum: vec![0.0],
                maximum: vec![1.0],
            },
        }
    }

    /// The underlying bounded box.
    pub fn bounds(&self) -> &BoundedSpec {
        &self.spec
    }
}

impl Default for ObservationSpec {
    fn default() -> Self {
        Self::new()
    }
}
