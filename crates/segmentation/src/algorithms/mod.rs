pub mod preprocessing;
pub mod postprocessing;

pub use preprocessing::*;
pub use postprocessing::*;
