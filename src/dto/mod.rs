pub mod gemini_dto;
pub mod settings_dto;
