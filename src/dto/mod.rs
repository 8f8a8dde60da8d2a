pub mod cron_dto;
pub mod message_dto;
pub mod recruit_dto;
pub mod stage_dto;
