use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    // None until the store assigns one on first save
    #[serde(default)]
    pub id: Option<i64>,

    pub username: String,
    pub name: String,
    pub email: String,

    #[serde(default)]
    pub balance: i64,
}

impl User {
    pub fn new(
        id: Option<i64>,
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        balance: i64,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            name: name.into(),
            email: email.into(),
            balance,
        }
    }
}
