pub mod generation_service;
pub mod history_service;
pub mod preferences_service;
pub mod quiz_service;
