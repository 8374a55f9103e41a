#[derive(Clone, Debug, Default, PartialEq, sqlx::FromRow)]
pub struct TodoModel {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
}
