mod chart;
mod export;

pub use chart::*;
pub use export::*;
