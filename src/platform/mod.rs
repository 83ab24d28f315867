// Integrations with external capabilities

pub mod tracker;
