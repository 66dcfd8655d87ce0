use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::InstitutionId;

/// A college using the service.
///
/// `code` selects which built-in hierarchy is offered before the institution
/// has saved its own configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub code: Option<String>,
}
