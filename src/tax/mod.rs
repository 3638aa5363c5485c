//! Tax rules

pub mod gst;
