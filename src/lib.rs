pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    delivery_service::DeliveryService, dispatch_service::DispatchService,
    inbound_service::InboundService, message_service::MessageService,
    profile_service::ProfileService, recruit_service::RecruitService,
    schedule_service::ScheduleService, sms_channel::TwilioChannel,
    stage_service::StageService, template_service::TemplateService,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub recruit_service: RecruitService,
    pub stage_service: StageService,
    pub template_service: TemplateService,
    pub message_service: MessageService,
    pub profile_service: ProfileService,
    pub dispatch_service: DispatchService,
    pub schedule_service: ScheduleService,
    pub delivery_service: DeliveryService,
    pub inbound_service: InboundService,
}

impl AppState {
    pub fn new(pool: PgPool) -> crate::error::Result<Self> {
        let config = crate::config::get_config();

        let channel = Arc::new(TwilioChannel::new(
            config.twilio_account_sid.clone(),
            config.twilio_auth_token.clone(),
        ));
        let sender = DispatchService::resolve_sender(
            config.twilio_messaging_service_sid.as_deref(),
            config.twilio_from_number.as_deref(),
        )?;
        let dispatch_service = DispatchService::new(channel, sender);

        let recruit_service = RecruitService::new(pool.clone());
        let stage_service = StageService::new(pool.clone());
        let template_service = TemplateService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let profile_service = ProfileService::new(pool.clone());
        let schedule_service = ScheduleService::new(pool.clone());
        let delivery_service = DeliveryService::new(
            pool.clone(),
            dispatch_service.clone(),
            message_service.clone(),
            profile_service.clone(),
            template_service.clone(),
            recruit_service.clone(),
            config.default_sender_name.clone(),
        );
        let inbound_service = InboundService::new(pool.clone(), message_service.clone());

        Ok(Self {
            pool,
            recruit_service,
            stage_service,
            template_service,
            message_service,
            profile_service,
            dispatch_service,
            schedule_service,
            delivery_service,
            inbound_service,
        })
    }
}
