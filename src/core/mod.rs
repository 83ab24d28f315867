pub mod config;

// Recognition pipeline, leaves first
pub mod geometry;
pub mod region_sampler;
pub mod tensor;
pub mod throttle;
pub mod classifier_client;
pub mod orchestrator;
