pub mod cli;
pub mod ctx;
pub mod io;
pub mod math;
pub mod meta;
pub mod phases;
pub mod phenotypes;
pub mod pipeline;
pub mod plate;
pub mod schema;
