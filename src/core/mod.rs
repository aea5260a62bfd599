pub mod clean;
pub mod etl;
pub mod load;
pub mod pipeline;
pub mod quality;
pub mod retrieve;
pub mod table_io;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{Stage, StageOutput, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
