#[derive(Clone, Debug, Default, PartialEq, sqlx::FromRow)]
pub struct UserModel {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub pwd_hash: String,
    pub refresh_token: Option<String>,
}
