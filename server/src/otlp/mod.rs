//! OTLP JSON wire model and codecs

pub mod attribute;
pub mod time;
pub mod wire;
