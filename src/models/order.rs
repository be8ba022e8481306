use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Catalog entry an order refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Item {
    Box1,
    Box2,
    Box3,
}

impl Item {
    pub const ALL: [Item; 3] = [Item::Box1, Item::Box2, Item::Box3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Item::Box1 => "BOX1",
            Item::Box2 => "BOX2",
            Item::Box3 => "BOX3",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Item {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Item::ALL
            .into_iter()
            .find(|item| item.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown item: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: Option<i64>,

    pub item: Item,
    pub price: i64,

    // owning user; orders without one cannot be charged or refunded
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Order {
    pub fn new(id: Option<i64>, item: Item, price: i64, user_id: Option<i64>) -> Self {
        Self {
            id,
            item,
            price,
            user_id,
        }
    }
}
