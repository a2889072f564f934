mod algorithm;
mod density;
mod errors;
mod hyperparams;

pub use algorithm::*;
pub use density::*;
pub use errors::*;
pub use hyperparams::*;
