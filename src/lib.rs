//! chart-lifecycle: pane, series and primitive lifecycle coordination for
//! declaratively composed charts.
//!
//! A [`ChartHost`] owns one chart instance behind the [`backend::ChartBackend`]
//! boundary. Pane, Series and Tooltip declarations mount against the host's
//! [`api::Scope`] and keep the chart in sync with their inputs.

pub mod api;
pub mod backend;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartHost, Pane, SeriesBinder, Tooltip};
pub use error::{ChartError, ChartResult};
