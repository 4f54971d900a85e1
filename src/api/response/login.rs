use serde::Deserialize;

#[derive(Deserialize)]
pub struct User {
    pub auth: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub user: User,
}
