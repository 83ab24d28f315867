// Data models for camera frames, hand landmarks and classification

pub mod classification;
pub mod frame;
pub mod landmarks;
