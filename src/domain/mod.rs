mod category;
mod expense;
mod money;
mod query;
mod validation;

pub use category::*;
pub use expense::*;
pub use money::*;
pub use query::*;
pub use validation::*;
