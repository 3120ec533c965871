//! Target network parameter sets and soft updates.
//!
//! Target networks are slowly-updated copies of the live networks,
//! providing stable bootstrap targets during training.
//!
//! # Soft Updates (Polyak Averaging)
//!
//! ```text
//! θ_target = τ * θ_online + (1 - τ) * θ_target
//! ```
//!
//! Where τ is small (default 0.005), so the target lags the live network as
//! a low-variance moving average. Abrupt target updates are known to
//! destabilize bootstrapped value learning in continuous control.
//!
//! The core never inspects parameter semantics: a [`ParameterSet`] is an
//! ordered bag of named tensors, paired with its counterpart by iteration
//! order for blending. A shape mismatch is a structural configuration error
//! established at construction and is not recoverable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named tensor: shape plus flat row-major data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterTensor {
    /// Parameter name (e.g. layer identifier).
    pub name: String,
    /// Tensor shape.
    pub shape: Vec<usize>,
    /// Flat tensor values.
    pub data: Vec<f32>,
}

impl ParameterTensor {
    /// Create a tensor, checking that data length matches the shape.
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Self {
        debug_assert_eq!(shape.iter().product::<usize>(), data.len());
        Self {
            name: name.into(),
            shape,
            data,
        }
    }
}

/// Ordered collection of named tensors for one network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParameterSet {
    /// Tensors in a fixed traversal order.
    pub tensors: Vec<ParameterTensor>,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tensor.
    pub fn push(&mut self, tensor: ParameterTensor) {
        self.tensors.push(tensor);
    }

    /// Number of tensors.
    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    /// Check whether the set holds no tensors.
    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Total number of scalar parameters.
    pub fn scalar_count(&self) -> usize {
        self.tensors.iter().map(|t| t.data.len()).sum()
    }
}

/// Error type for target synchronization.
#[derive(Debug, PartialEq, Eq)]
pub enum SyncError {
    /// The two sets hold different numbers of tensors.
    TensorCountMismatch {
        /// Tensor count in the target set.
        target: usize,
        /// Tensor count in the source set.
        source: usize,
    },
    /// A tensor pair disagrees on shape.
    ShapeMismatch {
        /// Position in iteration order.
        index: usize,
        /// Shape in the target set.
        target: Vec<usize>,
        /// Shape in the source set.
        source: Vec<usize>,
    },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::TensorCountMismatch { target, source } => write!(
                f,
                "parameter sets hold {} vs {} tensors",
                target, source
            ),
            SyncError::ShapeMismatch {
                index,
                target,
                source,
            } => write!(
                f,
                "tensor {} shape mismatch: target {:?} vs source {:?}",
                index, target, source
            ),
        }
    }
}

impl std::error::Error for SyncError {}

fn check_paired(target: &ParameterSet, source: &ParameterSet) -> Result<(), SyncError> {
    if target.len() != source.len() {
        return Err(SyncError::TensorCountMismatch {
            target: target.len(),
            source: source.len(),
        });
    }
    for (index, (t, s)) in target.tensors.iter().zip(&source.tensors).enumerate() {
        if t.shape != s.shape || t.data.len() != s.data.len() {
            return Err(SyncError::ShapeMismatch {
                index,
                target: t.shape.clone(),
                source: s.shape.clone(),
            });
        }
    }
    Ok(())
}

/// Blend `source` into `target` with rate `tau` (Polyak averaging).
///
/// For every parameter pair in iteration order:
/// `t = s * tau + t * (1 - tau)`.
///
/// # Errors
///
/// [`SyncError`] if the sets are not shape-compatible pairwise. Callers
/// should treat this as fatal: parameter-set shape is a structural invariant
/// and must never drift.
pub fn soft_update(
    target: &mut ParameterSet,
    source: &ParameterSet,
    tau: f32,
) -> Result<(), SyncError> {
    check_paired(target, source)?;

    // tau = 0 leaves the target untouched; tau = 1 is an exact copy.
    if tau == 0.0 {
        return Ok(());
    }
    if tau == 1.0 {
        for (t, s) in target.tensors.iter_mut().zip(&source.tensors) {
            t.data.copy_from_slice(&s.data);
        }
        return Ok(());
    }

    for (t, s) in target.tensors.iter_mut().zip(&source.tensors) {
        for (tv, sv) in t.data.iter_mut().zip(&s.data) {
            *tv = sv * tau + *tv * (1.0 - tau);
        }
    }
    Ok(())
}

/// Copy `source` into `target` exactly (`tau = 1`).
pub fn hard_copy(target: &mut ParameterSet, source: &ParameterSet) -> Result<(), SyncError> {
    soft_update(target, source, 1.0)
}
