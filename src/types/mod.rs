pub mod analysis;
pub mod market;

pub use analysis::*;
pub use market::*;
