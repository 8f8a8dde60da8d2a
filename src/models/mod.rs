pub mod followup;
pub mod message;
pub mod profile;
pub mod recruit;
pub mod sequence;
pub mod stage;
pub mod template;
