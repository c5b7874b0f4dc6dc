use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    entities::{
        comment::{self, CommentColumn, Entity as CommentEntity},
        production_record::Entity as RecordEntity,
    },
    errors::ServiceError,
};

/// Comment text for one record cell; empty when none has been left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommentBody {
    #[serde(default)]
    pub comment: String,
}

/// Parses a column key, rejecting columns that do not take comments.
pub fn parse_column(raw: &str) -> Result<CommentColumn, ServiceError> {
    CommentColumn::from_str(raw.trim()).map_err(|_| {
        ServiceError::ValidationError(format!(
            "column '{}' does not accept comments; expected '{}' or '{}'",
            raw,
            CommentColumn::DowntimeDuration,
            CommentColumn::AdjustmentTime
        ))
    })
}

/// Record cell comment service
#[derive(Clone)]
pub struct CommentService {
    db: Arc<DatabaseConnection>,
}

impl CommentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_comment(
        &self,
        record_id: i32,
        column: CommentColumn,
    ) -> Result<CommentBody, ServiceError> {
        self.ensure_record(record_id).await?;
        let comment = self
            .find(record_id, column)
            .await?
            .map(|c| c.comment_text)
            .unwrap_or_default();
        Ok(CommentBody { comment })
    }

    /// Stores trimmed text; empty text removes the comment
    #[instrument(skip(self, text))]
    pub async fn save_comment(
        &self,
        record_id: i32,
        column: CommentColumn,
        text: &str,
    ) -> Result<CommentBody, ServiceError> {
        self.ensure_record(record_id).await?;
        let text = text.trim();
        let existing = self.find(record_id, column).await?;
        let db = &*self.db;

        if text.is_empty() {
            if let Some(existing) = existing {
                CommentEntity::delete_by_id(existing.id)
                    .exec(db)
                    .await
                    .map_err(ServiceError::db_error)?;
                info!(record_id, column = %column, "Comment removed");
            }
            return Ok(CommentBody {
                comment: String::new(),
            });
        }

        let now = Utc::now();
        let saved = match existing {
            Some(existing) => {
                let mut active: comment::ActiveModel = existing.into();
                active.comment_text = Set(text.to_string());
                active.updated_at = Set(now);
                active.update(db).await
            }
            None => {
                comment::ActiveModel {
                    record_id: Set(record_id),
                    column_key: Set(column.to_string()),
                    comment_text: Set(text.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(db)
                .await
            }
        }
        .map_err(|e| {
            ServiceError::from_write(e, || {
                format!("comment on record {} was saved concurrently", record_id)
            })
        })?;

        info!(record_id, column = %column, "Comment saved");
        Ok(CommentBody {
            comment: saved.comment_text,
        })
    }

    async fn find(
        &self,
        record_id: i32,
        column: CommentColumn,
    ) -> Result<Option<comment::Model>, ServiceError> {
        CommentEntity::find()
            .filter(comment::Column::RecordId.eq(record_id))
            .filter(comment::Column::ColumnKey.eq(column.as_ref()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    async fn ensure_record(&self, record_id: i32) -> Result<(), ServiceError> {
        RecordEntity::find_by_id(record_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .map(|_| ())
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Production record {} not found", record_id))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_columns_parse() {
        assert_eq!(
            parse_column("downtime_duration").unwrap(),
            CommentColumn::DowntimeDuration
        );
        assert_eq!(
            parse_column(" adjustment_time ").unwrap(),
            CommentColumn::AdjustmentTime
        );
    }

    #[test]
    fn other_columns_are_rejected() {
        assert!(matches!(
            parse_column("actual_qty"),
            Err(ServiceError::ValidationError(_))
        ));
    }
}
