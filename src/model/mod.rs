pub mod timeframe;
pub mod entity;
pub mod goal;
pub mod project;
pub mod options;
pub mod config;
pub mod snapshot;

pub use timeframe::*;
pub use entity::*;
pub use goal::*;
pub use project::*;
pub use options::*;
pub use config::*;
pub use snapshot::*;
