use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CronQuery {
    pub secret: Option<String>,
    pub debug: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryPreview {
    pub followup_id: uuid::Uuid,
    pub recruit_id: uuid::Uuid,
    pub to: String,
    pub body: String,
}

#[derive(Debug, Default, Serialize)]
pub struct DeliverySummary {
    pub checked: u32,
    pub sent: u32,
    pub failed: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previews: Option<Vec<DeliveryPreview>>,
}
