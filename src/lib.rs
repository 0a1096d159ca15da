pub mod cli;
pub mod context;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod util;
