use crate::model::registry::{FieldKind, FieldSpec, VariantSchema};

const fn field(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, kind }
}

/// Declared fields for the seven built-in variants.
///
/// A declared field is a fallback, not a live attribute: a freshly created
/// entity carries only its identity fields until an update assigns
/// something.
pub const VARIANTS: &[VariantSchema] = &[
    VariantSchema {
        name: "BaseModel",
        fields: &[],
    },
    VariantSchema {
        name: "User",
        fields: &[
            field("email", FieldKind::Text),
            field("password", FieldKind::Text),
            field("first_name", FieldKind::Text),
            field("last_name", FieldKind::Text),
        ],
    },
    VariantSchema {
        name: "State",
        fields: &[field("name", FieldKind::Text)],
    },
    VariantSchema {
        name: "City",
        fields: &[
            field("state_id", FieldKind::Text),
            field("name", FieldKind::Text),
        ],
    },
    VariantSchema {
        name: "Amenity",
        fields: &[field("name", FieldKind::Text)],
    },
    VariantSchema {
        name: "Place",
        fields: &[
            field("city_id", FieldKind::Text),
            field("user_id", FieldKind::Text),
            field("name", FieldKind::Text),
            field("description", FieldKind::Text),
            field("number_rooms", FieldKind::Int),
            field("number_bathrooms", FieldKind::Int),
            field("max_guest", FieldKind::Int),
            field("price_by_night", FieldKind::Int),
            field("latitude", FieldKind::Float),
            field("longitude", FieldKind::Float),
            field("amenity_ids", FieldKind::TextList),
        ],
    },
    VariantSchema {
        name: "Review",
        fields: &[
            field("place_id", FieldKind::Text),
            field("user_id", FieldKind::Text),
            field("text", FieldKind::Text),
        ],
    },
];
