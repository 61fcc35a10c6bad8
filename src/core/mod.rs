pub mod components;
pub mod elements;
pub mod etl;
pub mod navigator;
pub mod normalize;
pub mod reconcile;
pub mod selectors;
pub mod session;
pub mod table;

pub use crate::domain::model::{Extraction, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Driver, Pipeline, Storage};
pub use crate::utils::error::Result;
