use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, EntityTrait};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, tokens};

use super::Engine;

/// 244 random bits from two v4 UUIDs, which draw on the OS random source.
fn new_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

impl Engine {
    /// Mints and stores a fresh session token.
    pub async fn issue_token(&self) -> ResultEngine<String> {
        let token = new_token();
        let model = tokens::ActiveModel {
            token: ActiveValue::Set(token.clone()),
            created_at: ActiveValue::Set(Utc::now()),
        };
        self.store(model.insert(&self.database)).await?;
        tracing::info!("session token issued");
        Ok(token)
    }

    /// `Ok(())` when `token` is currently valid, [`EngineError::Unauthorized`]
    /// otherwise.
    pub async fn verify_token(&self, token: &str) -> ResultEngine<()> {
        if token.is_empty() {
            return Err(EngineError::Unauthorized);
        }
        self.store(tokens::Entity::find_by_id(token.to_string()).one(&self.database))
            .await?
            .map(|_| ())
            .ok_or(EngineError::Unauthorized)
    }

    /// Invalidates one token. Revoking an unknown token is not an error.
    pub async fn revoke_token(&self, token: &str) -> ResultEngine<()> {
        self.store(tokens::Entity::delete_by_id(token.to_string()).exec(&self.database))
            .await?;
        tracing::info!("session token revoked");
        Ok(())
    }

    /// Invalidates every token and returns how many were removed.
    pub async fn revoke_all_tokens(&self) -> ResultEngine<u64> {
        let result = self
            .store(tokens::Entity::delete_many().exec(&self.database))
            .await?;
        tracing::info!("{} session tokens revoked", result.rows_affected);
        Ok(result.rows_affected)
    }
}
