//! Travel-time evaluation of committed paths.

mod travel;

pub use travel::{advance, ShipmentPlan, TravelEstimate, TravelTimeEstimator};
