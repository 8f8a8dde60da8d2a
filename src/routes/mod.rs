pub mod cron;
pub mod health;
pub mod messages;
pub mod recruits;
pub mod stages;
pub mod templates;
pub mod webhook;
