use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Collection, RecordId},
    protocol::{InventoryItem, Supplier},
};

/// Everything that differs between the inventory and supplier lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    pub collection: Collection,
    /// Name of the local persisted slot holding the JSON array.
    pub storage_slot: &'static str,
    pub name_label: &'static str,
    pub detail_label: &'static str,
    /// Seeded into an empty local slot, in this order.
    pub defaults: &'static [(&'static str, &'static str)],
}

impl EntitySchema {
    pub fn default_fields(&self) -> Vec<RecordFields> {
        self.defaults
            .iter()
            .map(|(name, detail)| RecordFields::new(*name, *detail))
            .collect()
    }
}

/// The two displayed fields of a record: `name` and `quantity`/`note`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordFields {
    pub name: String,
    pub detail: String,
}

impl RecordFields {
    pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.detail.is_empty()
    }
}

pub trait Entity:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const SCHEMA: EntitySchema;

    fn from_fields(id: Option<RecordId>, fields: RecordFields) -> Self;

    fn id(&self) -> Option<RecordId>;

    fn fields(&self) -> RecordFields;
}

impl Entity for InventoryItem {
    const SCHEMA: EntitySchema = EntitySchema {
        collection: Collection::Inventory,
        storage_slot: "inventoryItems",
        name_label: "품목",
        detail_label: "수량",
        defaults: &[("철근", "100개"), ("시멘트", "50포"), ("각재", "30개")],
    };

    fn from_fields(id: Option<RecordId>, fields: RecordFields) -> Self {
        Self {
            id,
            name: fields.name,
            quantity: fields.detail,
        }
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn fields(&self) -> RecordFields {
        RecordFields::new(self.name.clone(), self.quantity.clone())
    }
}

impl Entity for Supplier {
    const SCHEMA: EntitySchema = EntitySchema {
        collection: Collection::Suppliers,
        storage_slot: "suppliers",
        name_label: "공급업체",
        detail_label: "비고",
        defaults: &[
            ("대한철강", "철근 납품"),
            ("한국시멘트", "시멘트 납품"),
            ("우리목재", "각재 납품"),
        ],
    };

    fn from_fields(id: Option<RecordId>, fields: RecordFields) -> Self {
        Self {
            id,
            name: fields.name,
            note: fields.detail,
        }
    }

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn fields(&self) -> RecordFields {
        RecordFields::new(self.name.clone(), self.note.clone())
    }
}
