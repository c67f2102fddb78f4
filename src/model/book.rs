use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Book {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Laskar Pelangi")]
    pub title: String,

    #[schema(example = "Andrea Hirata")]
    pub author: String,
}
