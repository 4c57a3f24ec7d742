//! Exact rational tensors.
//!
//! Quick reference
//! - Types: [`FracVector`], [`MutableFracVector`], [`FracInput`], [`CreateOptions`]
//! - Scalar helpers: [`best_rational_in_interval`], [`string_to_val_and_delta`], [`limit_denominator`]
//! - Transcendentals: [`frac_pi`], [`frac_cos`], [`frac_sin`], [`frac_exp`], [`frac_sqrt`], [`frac_cbrt`], [`frac_asin`], [`frac_acos`]

// ======================== MODULE DECLARATIONS ========================
pub mod frac_math;
pub mod frac_vector;
pub mod mutable_frac_vector;


// ======================== RE-EXPORTED PUBLIC API (curated) ========================
#[doc(inline)]
pub use frac_vector::{CreateOptions, FracInput, FracVector};

#[doc(inline)]
pub use mutable_frac_vector::MutableFracVector;

pub use frac_math::{
    best_rational_in_interval, frac_acos, frac_asin, frac_cbrt, frac_cos, frac_exp, frac_pi, frac_sin,
    frac_sqrt, limit_denominator, ratio, string_to_fraction, string_to_val_and_delta,
};
