pub mod config_resolver;
pub mod event_extractor;
pub mod relay_service;
