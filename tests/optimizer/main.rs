#![allow(
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]

mod common;
mod fallback;
#[cfg(feature = "serde")]
mod persistence;
mod validation;
mod workflow;
