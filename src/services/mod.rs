pub mod aggregator;
pub mod classifier;
pub mod pipeline;
pub mod providers;
pub mod report;
