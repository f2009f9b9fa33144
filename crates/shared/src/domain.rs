use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(RecordId);

/// The two record collections served under `/api/{collection}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Inventory,
    Suppliers,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Inventory, Collection::Suppliers];

    /// Path segment used in `/api/{collection}`; also the SQL table name.
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Inventory => "inventory",
            Collection::Suppliers => "suppliers",
        }
    }

    /// JSON key and column name of the second display field.
    pub fn detail_field(self) -> &'static str {
        match self {
            Collection::Inventory => "quantity",
            Collection::Suppliers => "note",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|collection| collection.as_str() == raw)
            .ok_or_else(|| UnknownCollection(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_segments() {
        assert_eq!("inventory".parse::<Collection>(), Ok(Collection::Inventory));
        assert_eq!("suppliers".parse::<Collection>(), Ok(Collection::Suppliers));
        assert!("orders".parse::<Collection>().is_err());
    }

    #[test]
    fn detail_field_follows_collection() {
        assert_eq!(Collection::Inventory.detail_field(), "quantity");
        assert_eq!(Collection::Suppliers.detail_field(), "note");
    }
}
