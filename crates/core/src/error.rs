use thiserror::Error;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Tenant not identified")]
    TenantNotIdentified,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Webhook error: {0}")]
    Webhook(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl DashboardError {
    /// Message safe to show to the user. Downstream detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::TenantNotIdentified => "Tenant not identified.".to_string(),
            DashboardError::Validation(msg) => msg.clone(),
            DashboardError::NotFound => "Not found or no permission.".to_string(),
            DashboardError::Unauthorized => "Unauthorized".to_string(),
            DashboardError::Database(_) => "A database error occurred. Try again.".to_string(),
            DashboardError::Storage(_) => "A storage error occurred. Try again.".to_string(),
            DashboardError::Webhook(_) => {
                "Failed to reach the integration server.".to_string()
            }
            DashboardError::Serialization(_) | DashboardError::Internal(_) => {
                "An unexpected error occurred.".to_string()
            }
        }
    }
}
