//! Command layer: turns a [`Combination`](crate::sweep::model::Combination)
//! into a training invocation, wraps it in a scheduler call, and hands it
//! to a backend.

pub mod scheduler;
pub mod submit;
pub mod training;
