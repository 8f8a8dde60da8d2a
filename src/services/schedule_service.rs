use crate::error::{Error, Result};
use crate::models::followup::{STATUS_CANCELLED, STATUS_SCHEDULED};
use crate::models::sequence::{StageSequence, KIND_ABSOLUTE, KIND_RELATIVE};
use crate::models::stage::Stage;
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedFollowup {
    pub sequence_id: Uuid,
    pub template_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StageChangeOutcome {
    pub cancelled_old: bool,
    pub created: i64,
    pub terminal: bool,
}

/// Applies a stage transition: persists the new stage, cancels the
/// follow-ups the old stage scheduled, and books the new stage's
/// sequence rules.
#[derive(Clone)]
pub struct ScheduleService {
    pool: PgPool,
}

impl ScheduleService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn change_stage(
        &self,
        recruit_id: Uuid,
        new_stage_id: Uuid,
        owner_id: Uuid,
    ) -> Result<StageChangeOutcome> {
        let recruit = sqlx::query_as::<_, crate::models::recruit::Recruit>(
            "SELECT * FROM recruits WHERE id = $1 AND owner_id = $2",
        )
        .bind(recruit_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Recruit not found".to_string()))?;
        let old_stage_id = recruit.stage_id;

        let new_stage = sqlx::query_as::<_, Stage>(
            "SELECT * FROM stages WHERE id = $1 AND owner_id = $2",
        )
        .bind(new_stage_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Stage not found".to_string()))?;

        sqlx::query("UPDATE recruits SET stage_id = $1 WHERE id = $2")
            .bind(new_stage_id)
            .bind(recruit_id)
            .execute(&self.pool)
            .await?;

        // A first-ever assignment has no old stage to scope to, so it
        // clears every scheduled follow-up the recruit carries.
        let cancelled = if let Some(old_id) = old_stage_id {
            sqlx::query(
                "UPDATE followups SET status = $1 WHERE recruit_id = $2 AND stage_id = $3 AND status = $4",
            )
            .bind(STATUS_CANCELLED)
            .bind(recruit_id)
            .bind(old_id)
            .bind(STATUS_SCHEDULED)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE followups SET status = $1 WHERE recruit_id = $2 AND status = $3",
            )
            .bind(STATUS_CANCELLED)
            .bind(recruit_id)
            .bind(STATUS_SCHEDULED)
            .execute(&self.pool)
            .await?
        };
        let cancelled_old = cancelled.rows_affected() > 0;

        if new_stage.is_terminal() {
            tracing::info!(%recruit_id, stage = %new_stage.name, "terminal stage, no sequences scheduled");
            return Ok(StageChangeOutcome {
                cancelled_old,
                created: 0,
                terminal: true,
            });
        }

        let rules = sqlx::query_as::<_, StageSequence>(
            "SELECT * FROM stage_sequences WHERE stage_id = $1 AND owner_id = $2 ORDER BY created_at",
        )
        .bind(new_stage_id)
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let planned = compute_followups(&rules, Utc::now());
        let created = planned.len() as i64;

        for plan in &planned {
            // The (recruit_id, sequence_id) conflict target is what
            // makes re-entering a stage reschedule instead of
            // duplicate.
            sqlx::query(
                r#"
                INSERT INTO followups
                    (owner_id, recruit_id, stage_id, template_id, sequence_id, scheduled_for)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (recruit_id, sequence_id) DO UPDATE SET
                    scheduled_for = EXCLUDED.scheduled_for,
                    stage_id = EXCLUDED.stage_id,
                    template_id = EXCLUDED.template_id,
                    status = $7,
                    attempt_count = 0,
                    last_attempt_at = NULL,
                    sent_at = NULL,
                    error_message = NULL
                "#,
            )
            .bind(owner_id)
            .bind(recruit_id)
            .bind(new_stage_id)
            .bind(plan.template_id)
            .bind(plan.sequence_id)
            .bind(plan.scheduled_for)
            .bind(STATUS_SCHEDULED)
            .execute(&self.pool)
            .await?;
        }

        if created == 0 {
            tracing::info!(%recruit_id, stage = %new_stage.name, reason = "no sequences", "stage change scheduled nothing");
        } else {
            tracing::info!(%recruit_id, stage = %new_stage.name, created, "scheduled follow-ups for stage entry");
        }

        Ok(StageChangeOutcome {
            cancelled_old,
            created,
            terminal: false,
        })
    }
}

/// Turns a stage's sequence rules into concrete send instants. Rules
/// that cannot produce an instant (absolute rows missing a field, an
/// unparseable zone, or a local time skipped by a DST jump) are dropped
/// with a warning rather than failing the transition.
pub fn compute_followups(rules: &[StageSequence], now: DateTime<Utc>) -> Vec<PlannedFollowup> {
    let mut planned = Vec::with_capacity(rules.len());
    for rule in rules {
        let scheduled_for = match rule.kind.as_str() {
            KIND_RELATIVE => match rule.offset_minutes {
                Some(minutes) => now + Duration::minutes(i64::from(minutes)),
                None => {
                    tracing::warn!(sequence_id = %rule.id, "relative rule without offset, skipping");
                    continue;
                }
            },
            KIND_ABSOLUTE => {
                let (Some(date), Some(time), Some(zone)) =
                    (rule.send_date, rule.send_time, rule.timezone.as_deref())
                else {
                    tracing::warn!(sequence_id = %rule.id, "absolute rule missing date, time or zone, skipping");
                    continue;
                };
                let Ok(tz) = zone.parse::<Tz>() else {
                    tracing::warn!(sequence_id = %rule.id, zone, "unknown timezone, skipping rule");
                    continue;
                };
                let local = NaiveDateTime::new(date, time);
                match tz.from_local_datetime(&local) {
                    LocalResult::Single(dt) => dt.with_timezone(&Utc),
                    // Fall-back hour: take the earlier reading.
                    LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
                    LocalResult::None => {
                        tracing::warn!(sequence_id = %rule.id, %local, zone, "local time skipped by DST, skipping rule");
                        continue;
                    }
                }
            }
            other => {
                tracing::warn!(sequence_id = %rule.id, kind = other, "unknown rule kind, skipping");
                continue;
            }
        };
        planned.push(PlannedFollowup {
            sequence_id: rule.id,
            template_id: rule.template_id,
            scheduled_for,
        });
    }
    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn rule(kind: &str) -> StageSequence {
        StageSequence {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            stage_id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            kind: kind.to_string(),
            offset_minutes: None,
            send_date: None,
            send_time: None,
            timezone: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn relative_rule_offsets_from_now() {
        let now = Utc::now();
        let mut r = rule(KIND_RELATIVE);
        r.offset_minutes = Some(1440);

        let planned = compute_followups(&[r.clone()], now);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].sequence_id, r.id);
        assert_eq!(planned[0].scheduled_for, now + Duration::minutes(1440));
    }

    #[test]
    fn absolute_rule_converts_zone_to_utc() {
        let mut r = rule(KIND_ABSOLUTE);
        r.send_date = NaiveDate::from_ymd_opt(2024, 7, 1);
        r.send_time = NaiveTime::from_hms_opt(9, 0, 0);
        r.timezone = Some("America/Edmonton".to_string());

        let planned = compute_followups(&[r], Utc::now());
        assert_eq!(planned.len(), 1);
        // 09:00 MDT (UTC-6) is 15:00 UTC.
        assert_eq!(
            planned[0].scheduled_for,
            Utc.with_ymd_and_hms(2024, 7, 1, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn incomplete_absolute_rule_is_silently_skipped() {
        let mut missing_time = rule(KIND_ABSOLUTE);
        missing_time.send_date = NaiveDate::from_ymd_opt(2024, 7, 1);
        missing_time.timezone = Some("America/Edmonton".to_string());

        let mut bad_zone = rule(KIND_ABSOLUTE);
        bad_zone.send_date = NaiveDate::from_ymd_opt(2024, 7, 1);
        bad_zone.send_time = NaiveTime::from_hms_opt(9, 0, 0);
        bad_zone.timezone = Some("Mars/Olympus".to_string());

        assert!(compute_followups(&[missing_time, bad_zone], Utc::now()).is_empty());
    }

    #[test]
    fn rule_order_is_preserved() {
        let now = Utc::now();
        let mut a = rule(KIND_RELATIVE);
        a.offset_minutes = Some(10);
        let mut b = rule(KIND_RELATIVE);
        b.offset_minutes = Some(10);

        let planned = compute_followups(&[a.clone(), b.clone()], now);
        assert_eq!(planned[0].sequence_id, a.id);
        assert_eq!(planned[1].sequence_id, b.id);
    }
}
