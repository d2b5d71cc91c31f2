pub mod ini;
pub mod templates;
