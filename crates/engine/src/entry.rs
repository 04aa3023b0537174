//! Ledger entries.
//!
//! An `Entry` is one monetary record. Positive amounts are income, negative
//! amounts are expenses. `date` is the caller-supplied transaction date while
//! `create_time` is stamped by the engine on insertion and never changes.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: DateTime<Utc>,
    pub create_time: DateTime<Utc>,
}

impl Entry {
    pub fn new(description: String, amount: f64, date: DateTime<Utc>) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            description,
            amount: util::ensure_finite_amount(amount)?,
            date,
            create_time: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub description: String,
    /// Case-folded copy of `description`, only read by substring filters.
    pub description_fold: String,
    pub amount: f64,
    pub date: DateTimeUtc,
    pub create_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Entry> for ActiveModel {
    fn from(entry: &Entry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            description: ActiveValue::Set(entry.description.clone()),
            description_fold: ActiveValue::Set(util::fold_text(&entry.description)),
            amount: ActiveValue::Set(entry.amount),
            date: ActiveValue::Set(entry.date),
            create_time: ActiveValue::Set(entry.create_time),
        }
    }
}

impl TryFrom<Model> for Entry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId(format!("stored entry id {}", model.id)))?,
            description: model.description,
            amount: model.amount,
            date: model.date,
            create_time: model.create_time,
        })
    }
}
