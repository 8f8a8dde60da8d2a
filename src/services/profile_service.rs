use crate::error::Result;
use crate::models::profile::Profile;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the sender profile, bootstrapping it from the auth
    /// email's local part the first time the user needs one. Once
    /// persisted the derived name never changes on its own, so renders
    /// stay stable.
    pub async fn ensure(&self, user_id: Uuid, email: &str) -> Result<Profile> {
        if let Some(existing) = self.get(user_id).await? {
            return Ok(existing);
        }

        let (first, last) = derive_name_from_email(email);
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, first_name, last_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// One query for all owners in a delivery batch.
    pub async fn get_many(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, Profile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE user_id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles.into_iter().map(|p| (p.user_id, p)).collect())
    }
}

/// "jane.doe@example.com" becomes ("Jane", "Doe"); a local part without
/// separators becomes a capitalized first name only.
fn derive_name_from_email(email: &str) -> (String, String) {
    let local = email.split('@').next().unwrap_or_default();
    let mut parts = local
        .split(|c: char| c == '.' || c == '_' || c == '-')
        .filter(|p| !p.is_empty());
    let first = capitalize(parts.next().unwrap_or("there"));
    let last = parts.next().map(capitalize).unwrap_or_default();
    (first, last)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_first_and_last_from_local_part() {
        assert_eq!(
            derive_name_from_email("jane.doe@example.com"),
            ("Jane".to_string(), "Doe".to_string())
        );
        assert_eq!(
            derive_name_from_email("sam_reed@example.com"),
            ("Sam".to_string(), "Reed".to_string())
        );
        assert_eq!(
            derive_name_from_email("kim@example.com"),
            ("Kim".to_string(), "".to_string())
        );
    }

    #[test]
    fn empty_email_still_yields_a_greeting_name() {
        assert_eq!(
            derive_name_from_email(""),
            ("There".to_string(), "".to_string())
        );
    }
}
