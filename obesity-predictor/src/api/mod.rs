//! HTTP API handlers for obesity-predictor

pub mod buildinfo;
pub mod health;
pub mod model;
pub mod predict;
pub mod ui;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use model::get_model_status;
pub use predict::{encode_record, predict};
pub use ui::{serve_app_js, serve_index};
