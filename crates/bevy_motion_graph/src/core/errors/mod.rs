mod asset_loader_error;
mod graph_error;
mod validation_error;

pub use asset_loader_error::*;
pub use graph_error::*;
pub use validation_error::*;
