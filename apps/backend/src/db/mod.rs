//! PostgreSQL database operations

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;
use vocab_core::{
    apply_review, classify_event, study_day, CardState, DailyStats, ItemId, ModuleLayout,
    Quality, ReviewOutcome, StatKind, UserSettings, WordEntry, INITIAL_EASE_FACTOR,
};

use crate::error::{ApiError, Result};
use crate::models::*;

const CARD_STATE_COLUMNS: &str =
    "device_id, item_id, ease_factor, interval_days, repetitions, next_review, last_review";

const SETTINGS_COLUMNS: &str = "device_id, accent, daily_goal, auto_play_audio, list_size, \
                                group_size, daily_reset_hour, review_session_limit, updated_at";

const MODULE_COLUMNS: &str = "id, device_id, name, icon, color, list_size, group_size, \
                              word_count, content_hash, created_at";

/// Convert a count to an INTEGER column value, rejecting values that do not fit.
pub fn to_int_column<T>(value: T, field: &str) -> Result<i32>
where
    T: TryInto<i32>,
{
    value
        .try_into()
        .map_err(|_| ApiError::BadRequest(format!("{field} is too large")))
}

/// Fields of a module about to be stored
#[derive(Debug, Clone, Copy)]
pub struct NewCustomModule<'a> {
    pub name: &'a str,
    pub icon: &'a str,
    pub color: &'a str,
    pub layout: ModuleLayout,
    pub entries: &'a [WordEntry],
    pub content_hash: &'a str,
}

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // === Device Repository ===

    /// Create a new device with generated token and default settings
    pub async fn create_device(&self, name: Option<&str>) -> Result<Device> {
        let token = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let device = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (token, name)
            VALUES ($1, $2)
            RETURNING id, token, name, created_at, last_seen_at
            "#,
        )
        .bind(&token)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_settings (device_id) VALUES ($1)")
            .bind(device.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(device)
    }

    /// Get device by token
    pub async fn get_device_by_token(&self, token: &str) -> Result<Option<Device>> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, token, name, created_at, last_seen_at
            FROM devices
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }

    /// Update device last_seen_at timestamp
    pub async fn update_last_seen(&self, device_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE devices SET last_seen_at = NOW() WHERE id = $1")
            .bind(device_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // === Card State Repository ===

    pub async fn get_card_state(&self, device_id: Uuid, item_id: ItemId) -> Result<Option<CardState>> {
        let row = sqlx::query_as::<_, DbCardState>(&format!(
            "SELECT {CARD_STATE_COLUMNS} FROM card_states WHERE device_id = $1 AND item_id = $2"
        ))
        .bind(device_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.to_core_state()))
    }

    /// Card states for the given items, keyed by item id
    pub async fn get_card_states(
        &self,
        device_id: Uuid,
        item_ids: &[ItemId],
    ) -> Result<HashMap<ItemId, CardState>> {
        if item_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, DbCardState>(&format!(
            "SELECT {CARD_STATE_COLUMNS} FROM card_states WHERE device_id = $1 AND item_id = ANY($2)"
        ))
        .bind(device_id)
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| (r.item_id, r.to_core_state()))
            .collect())
    }

    pub async fn get_all_card_states(&self, device_id: Uuid) -> Result<Vec<CardState>> {
        let rows = sqlx::query_as::<_, DbCardState>(&format!(
            "SELECT {CARD_STATE_COLUMNS} FROM card_states WHERE device_id = $1 ORDER BY item_id"
        ))
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbCardState::to_core_state).collect())
    }

    /// Apply one review atomically.
    ///
    /// The row is created with default values if missing and then locked, so concurrent
    /// reviews of the same item serialize and exactly one of them counts as the first.
    pub async fn record_review(
        &self,
        device_id: Uuid,
        item_id: ItemId,
        quality: Quality,
        now: DateTime<Utc>,
        reset_hour: u32,
    ) -> Result<RecordedReview> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query(
            r#"
            INSERT INTO card_states (device_id, item_id, ease_factor, interval_days, repetitions,
                                     next_review, last_review)
            VALUES ($1, $2, $3, 0, 0, $4, $4)
            ON CONFLICT (device_id, item_id) DO NOTHING
            "#,
        )
        .bind(device_id)
        .bind(item_id)
        .bind(INITIAL_EASE_FACTOR)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let current = sqlx::query_as::<_, DbCardState>(&format!(
            "SELECT {CARD_STATE_COLUMNS} FROM card_states \
             WHERE device_id = $1 AND item_id = $2 FOR UPDATE"
        ))
        .bind(device_id)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

        let prior = if created {
            None
        } else {
            Some(current.to_core_state())
        };
        let result = apply_review(prior.as_ref(), item_id, quality, now);
        let state = result.new_state;

        sqlx::query(
            r#"
            UPDATE card_states
            SET ease_factor = $3, interval_days = $4, repetitions = $5,
                next_review = $6, last_review = $7, updated_at = NOW()
            WHERE device_id = $1 AND item_id = $2
            "#,
        )
        .bind(device_id)
        .bind(item_id)
        .bind(state.ease_factor)
        .bind(state.interval_days)
        .bind(i32::try_from(state.repetitions).unwrap_or(i32::MAX))
        .bind(state.next_review)
        .bind(state.last_review)
        .execute(&mut *tx)
        .await?;

        let kind = classify_event(result.was_first_review);
        let date = study_day(now, reset_hour);
        let (learned, reviewed) = match kind {
            StatKind::Learned => (1, 0),
            StatKind::Reviewed => (0, 1),
        };

        let today = sqlx::query_as::<_, DbDailyStats>(
            r#"
            INSERT INTO daily_stats (device_id, study_date, learned, reviewed)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (device_id, study_date) DO UPDATE SET
                learned = daily_stats.learned + EXCLUDED.learned,
                reviewed = daily_stats.reviewed + EXCLUDED.reviewed
            RETURNING study_date, learned, reviewed
            "#,
        )
        .bind(device_id)
        .bind(date)
        .bind(learned)
        .bind(reviewed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Device {} reviewed item {} ({:?}), next in {:.4} days",
            device_id,
            item_id,
            quality,
            state.interval_days
        );

        Ok(RecordedReview {
            outcome: ReviewOutcome {
                state,
                kind,
                study_day: date,
            },
            today: today.to_core_stats(),
        })
    }

    // === Daily Stats Repository ===

    /// Every recorded day, oldest first
    pub async fn get_all_daily_stats(&self, device_id: Uuid) -> Result<Vec<DailyStats>> {
        let rows = sqlx::query_as::<_, DbDailyStats>(
            "SELECT study_date, learned, reviewed FROM daily_stats WHERE device_id = $1 ORDER BY study_date",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(DbDailyStats::to_core_stats).collect())
    }

    // === Settings Repository ===

    /// Get settings, creating the default row if the device has none yet
    pub async fn get_settings(&self, device_id: Uuid) -> Result<UserSettings> {
        sqlx::query("INSERT INTO user_settings (device_id) VALUES ($1) ON CONFLICT (device_id) DO NOTHING")
            .bind(device_id)
            .execute(&self.pool)
            .await?;

        let row = sqlx::query_as::<_, DbUserSettings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM user_settings WHERE device_id = $1"
        ))
        .bind(device_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_api_settings())
    }

    pub async fn update_settings(&self, device_id: Uuid, settings: &UserSettings) -> Result<UserSettings> {
        let daily_goal = to_int_column(settings.daily_goal, "daily_goal")?;
        let list_size = to_int_column(settings.list_size, "list_size")?;
        let group_size = to_int_column(settings.group_size, "group_size")?;
        let reset_hour = to_int_column(settings.daily_reset_hour, "daily_reset_hour")?;
        let session_limit = to_int_column(settings.review_session_limit, "review_session_limit")?;

        let row = sqlx::query_as::<_, DbUserSettings>(&format!(
            r#"
            INSERT INTO user_settings (device_id, accent, daily_goal, auto_play_audio, list_size,
                                       group_size, daily_reset_hour, review_session_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (device_id) DO UPDATE SET
                accent = EXCLUDED.accent,
                daily_goal = EXCLUDED.daily_goal,
                auto_play_audio = EXCLUDED.auto_play_audio,
                list_size = EXCLUDED.list_size,
                group_size = EXCLUDED.group_size,
                daily_reset_hour = EXCLUDED.daily_reset_hour,
                review_session_limit = EXCLUDED.review_session_limit,
                updated_at = NOW()
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(device_id)
        .bind(settings.accent.as_str())
        .bind(daily_goal)
        .bind(settings.auto_play_audio)
        .bind(list_size)
        .bind(group_size)
        .bind(reset_hour)
        .bind(session_limit)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.to_api_settings())
    }

    // === Custom Module Repository ===

    /// Store a module and its words in one transaction
    pub async fn create_custom_module(
        &self,
        device_id: Uuid,
        module: NewCustomModule<'_>,
    ) -> Result<DbCustomModule> {
        let NewCustomModule {
            name,
            icon,
            color,
            layout,
            entries,
            content_hash,
        } = module;
        let list_size = to_int_column(layout.list_size, "list_size")?;
        let group_size = to_int_column(layout.group_size, "group_size")?;
        let word_count = to_int_column(entries.len(), "word list")?;
        let mut tx = self.pool.begin().await?;

        let module = sqlx::query_as::<_, DbCustomModule>(&format!(
            r#"
            INSERT INTO custom_modules (device_id, name, icon, color, list_size, group_size,
                                        word_count, content_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {MODULE_COLUMNS}
            "#
        ))
        .bind(device_id)
        .bind(name)
        .bind(icon)
        .bind(color)
        .bind(list_size)
        .bind(group_size)
        .bind(word_count)
        .bind(content_hash)
        .fetch_one(&mut *tx)
        .await?;

        let indexes: Vec<i32> = (0..word_count).collect();
        let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        let translations: Vec<&str> = entries.iter().map(|e| e.translation.as_str()).collect();

        sqlx::query(
            r#"
            INSERT INTO custom_words (module_id, word_index, word, translation)
            SELECT $1, t.word_index, t.word, t.translation
            FROM UNNEST($2::INTEGER[], $3::TEXT[], $4::TEXT[]) AS t(word_index, word, translation)
            ORDER BY t.word_index
            "#,
        )
        .bind(module.id)
        .bind(&indexes)
        .bind(&words)
        .bind(&translations)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(module)
    }

    pub async fn list_custom_modules(&self, device_id: Uuid) -> Result<Vec<DbCustomModule>> {
        let modules = sqlx::query_as::<_, DbCustomModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM custom_modules WHERE device_id = $1 ORDER BY created_at DESC"
        ))
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn get_custom_module(&self, device_id: Uuid, module_id: Uuid) -> Result<Option<DbCustomModule>> {
        let module = sqlx::query_as::<_, DbCustomModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM custom_modules WHERE device_id = $1 AND id = $2"
        ))
        .bind(device_id)
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }

    /// A module of this device with the same uploaded text, if any
    pub async fn find_custom_module_by_hash(
        &self,
        device_id: Uuid,
        content_hash: &str,
    ) -> Result<Option<DbCustomModule>> {
        let module = sqlx::query_as::<_, DbCustomModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM custom_modules WHERE device_id = $1 AND content_hash = $2 LIMIT 1"
        ))
        .bind(device_id)
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }

    /// Delete a module, its words and the scheduling state of those words
    pub async fn delete_custom_module(&self, device_id: Uuid, module_id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            DELETE FROM card_states
            WHERE device_id = $1
              AND item_id IN (
                  SELECT w.item_id FROM custom_words w
                  JOIN custom_modules m ON m.id = w.module_id
                  WHERE m.id = $2 AND m.device_id = $1
              )
            "#,
        )
        .bind(device_id)
        .bind(module_id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM custom_modules WHERE device_id = $1 AND id = $2")
            .bind(device_id)
            .bind(module_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    /// `(word_index, item_id)` pairs of a module
    pub async fn get_custom_word_positions(&self, module_id: Uuid) -> Result<Vec<(i64, ItemId)>> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            "SELECT word_index, item_id FROM custom_words WHERE module_id = $1 ORDER BY word_index",
        )
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(index, id)| (i64::from(index), id))
            .collect())
    }

    /// Custom words by item id, in the order requested. Only words owned by the device are returned.
    pub async fn get_custom_words(&self, device_id: Uuid, item_ids: &[ItemId]) -> Result<Vec<Word>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, DbCustomWord>(
            r#"
            SELECT w.item_id, w.module_id, w.word_index, w.word, w.phonetic, w.translation
            FROM custom_words w
            JOIN custom_modules m ON m.id = w.module_id
            WHERE m.device_id = $1 AND w.item_id = ANY($2)
            "#,
        )
        .bind(device_id)
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;

        let by_id: HashMap<ItemId, Word> = rows.iter().map(|r| (r.item_id, r.to_word())).collect();
        Ok(item_ids
            .iter()
            .filter_map(|id| by_id.get(id).cloned())
            .collect())
    }
}
