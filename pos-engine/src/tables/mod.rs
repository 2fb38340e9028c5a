//! 桌台与区域
//!
//! - [`occupancy`]: 订单生命周期驱动的占用状态
//! - `service`: 桌台 / 区域的增删改

pub mod occupancy;
mod service;

pub use occupancy::{OccupancyMismatch, occupancy_mismatches};
