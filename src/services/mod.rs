pub mod delivery_service;
pub mod dispatch_service;
pub mod inbound_service;
pub mod message_service;
pub mod profile_service;
pub mod recruit_service;
pub mod schedule_service;
pub mod sms_channel;
pub mod stage_service;
pub mod template_service;
