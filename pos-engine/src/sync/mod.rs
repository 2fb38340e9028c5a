//! 远端 → 本地对账

pub mod reconciler;

pub use reconciler::{Reconciler, reconcile_once};
