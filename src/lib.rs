pub mod app;
pub mod journey;
pub mod net;
pub mod sketch;
pub mod sky;
