pub mod bids;
pub mod cli;
pub mod ctx;
pub mod io;
pub mod mask;
pub mod metrics;
pub mod pipeline;
pub mod standards;
pub mod template;
