use thiserror::Error;

use crate::core::{ChartFamily, PaneIndex, SeriesId};

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("`{component}` must be mounted inside a `{family}` (no parent chart found)")]
    MissingParentChart {
        component: &'static str,
        family: ChartFamily,
    },

    #[error("pane index {index} is already claimed by another pane declaration")]
    PaneIndexInUse { index: PaneIndex },

    #[error("chart instance was removed")]
    ChartRemoved,

    #[error("unknown series: {series}")]
    UnknownSeries { series: SeriesId },

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid chart options: {0}")]
    Config(#[from] serde_json::Error),
}
