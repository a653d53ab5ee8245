pub mod kernel;
pub mod runs;
pub mod stats;
