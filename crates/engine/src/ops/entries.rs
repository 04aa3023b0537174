use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    entry::{self, Entry},
    util,
};

use super::Engine;

impl Engine {
    /// Stores a new entry and returns its id.
    ///
    /// `date` must be an RFC 3339 timestamp; it is normalised to UTC.
    pub async fn create_entry(
        &self,
        description: &str,
        amount: f64,
        date: &str,
    ) -> ResultEngine<Uuid> {
        let entry = Entry::new(
            description.to_string(),
            amount,
            util::parse_timestamp(date)?,
        )?;
        self.insert_entry(&entry).await?;
        Ok(entry.id)
    }

    /// Stores an already built entry, keeping its id and `create_time`.
    pub async fn insert_entry(&self, entry: &Entry) -> ResultEngine<()> {
        util::ensure_finite_amount(entry.amount)?;
        let model: entry::ActiveModel = entry.into();
        self.store(model.insert(&self.database)).await?;
        tracing::debug!("entry {} created", entry.id);
        Ok(())
    }

    /// Replaces description, amount and date of an entry. `create_time` is
    /// left untouched.
    pub async fn update_entry(
        &self,
        id: &str,
        description: &str,
        amount: f64,
        date: &str,
    ) -> ResultEngine<()> {
        let id = util::parse_entry_id(id)?;
        let amount = util::ensure_finite_amount(amount)?;
        let date = util::parse_timestamp(date)?;

        let result = self
            .store(
                entry::Entity::update_many()
                    .col_expr(entry::Column::Description, Expr::value(description))
                    .col_expr(
                        entry::Column::DescriptionFold,
                        Expr::value(util::fold_text(description)),
                    )
                    .col_expr(entry::Column::Amount, Expr::value(amount))
                    .col_expr(entry::Column::Date, Expr::value(date))
                    .filter(entry::Column::Id.eq(id.to_string()))
                    .exec(&self.database),
            )
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("entry {id}")));
        }
        tracing::debug!("entry {id} updated");
        Ok(())
    }

    pub async fn delete_entry(&self, id: &str) -> ResultEngine<()> {
        let id = util::parse_entry_id(id)?;
        let result = self
            .store(entry::Entity::delete_by_id(id.to_string()).exec(&self.database))
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(format!("entry {id}")));
        }
        tracing::debug!("entry {id} deleted");
        Ok(())
    }

    pub async fn entry(&self, id: &str) -> ResultEngine<Entry> {
        let id = util::parse_entry_id(id)?;
        self.store(entry::Entity::find_by_id(id.to_string()).one(&self.database))
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("entry {id}")))?
            .try_into()
    }
}
