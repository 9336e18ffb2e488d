use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce;

/// The persisted unit: all three collections, loaded and saved wholesale.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Document {
    #[serde(default)]
    pub pets: Vec<Pet>,
    #[serde(default)]
    pub volunteers: Vec<Volunteer>,
    #[serde(default)]
    pub donations: Vec<Donation>,
}

// Records keep fields they do not know about in `extra`, so a save never
// drops what was stored. Known fields that are missing or do not coerce
// read as defaults.

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Pet {
    #[serde(default, deserialize_with = "coerce::lenient_int")]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "coerce::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub breed: String,
    #[serde(default, deserialize_with = "coerce::lenient_int")]
    pub age: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub status: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub location: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Volunteer {
    #[serde(default, deserialize_with = "coerce::lenient_int")]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub role: String,
    /// Years of experience.
    #[serde(default, deserialize_with = "coerce::lenient_int")]
    pub experience: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub location: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub contact: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(default, deserialize_with = "coerce::lenient_int")]
    pub id: i64,
    #[serde(default, deserialize_with = "coerce::text")]
    pub donor_name: String,
    #[serde(default, deserialize_with = "coerce::lenient_float")]
    pub amount: f64,
    #[serde(rename = "type", default, deserialize_with = "coerce::text")]
    pub kind: String,
    #[serde(default, deserialize_with = "coerce::text")]
    pub purpose: String,
    /// ISO date, `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "coerce::text")]
    pub date: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Partial updates. Unknown fields (including `id`) are dropped by serde.

#[derive(Deserialize, Debug, Default)]
pub struct PetUpdate {
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub name: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "coerce::opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub breed: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_int")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub description: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct VolunteerUpdate {
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_int")]
    pub experience: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub contact: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DonationUpdate {
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub donor_name: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_float")]
    pub amount: Option<f64>,
    #[serde(rename = "type", default, deserialize_with = "coerce::opt_text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub purpose: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_text")]
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_tolerates_missing_collections() {
        let doc: Document = serde_json::from_value(json!({ "pets": [] })).unwrap();
        assert_eq!(doc, Document::default());
    }

    #[test]
    fn donation_uses_camel_case_and_type_keys() {
        let donation: Donation = serde_json::from_value(json!({
            "id": 1,
            "donorName": "Anonymous",
            "amount": "5000",
            "type": "Food",
            "purpose": "Monthly food supplies"
        }))
        .unwrap();
        assert_eq!(donation.amount, 5000.0);
        assert_eq!(donation.date, "");
        let value = serde_json::to_value(&donation).unwrap();
        assert_eq!(value["donorName"], "Anonymous");
        assert_eq!(value["type"], "Food");
    }

    #[test]
    fn update_ignores_id_and_unknown_fields() {
        let update: PetUpdate =
            serde_json::from_value(json!({ "id": 42, "color": "brown", "age": "4" })).unwrap();
        assert_eq!(update.age, Some(4));
        assert!(update.name.is_none());
    }

    #[test]
    fn odd_records_read_with_defaults() {
        let doc: Document = serde_json::from_value(json!({
            "pets": [
                { "id": 1, "name": "Buddy", "type": "Dog", "age": null },
                { "id": "2", "name": "Whiskers", "age": "old", "status": "Adopted" }
            ],
            "volunteers": [{ "id": 1, "experience": "3" }],
            "donations": [{ "id": 1, "amount": null, "donorName": 7 }]
        }))
        .unwrap();
        assert_eq!(doc.pets.len(), 2);
        assert_eq!(doc.pets[0].age, 0);
        assert_eq!(doc.pets[0].breed, "");
        assert_eq!(doc.pets[1].id, 2);
        assert_eq!(doc.volunteers[0].experience, 3);
        assert_eq!(doc.donations[0].amount, 0.0);
        assert_eq!(doc.donations[0].donor_name, "7");
    }

    #[test]
    fn unknown_stored_fields_survive_a_round_trip() {
        let pet: Pet = serde_json::from_value(json!({
            "id": 1, "name": "Buddy", "type": "Dog", "breed": "Golden Retriever",
            "age": 3, "status": "Available", "location": "Mumbai",
            "photo": "b.jpg", "tags": ["friendly"]
        }))
        .unwrap();
        assert_eq!(pet.extra.get("photo"), Some(&json!("b.jpg")));
        assert!(!pet.extra.contains_key("name"));

        let value = serde_json::to_value(&pet).unwrap();
        assert_eq!(value["photo"], "b.jpg");
        assert_eq!(value["tags"], json!(["friendly"]));
        assert_eq!(value["type"], "Dog");
    }

    #[test]
    fn update_text_fields_accept_any_scalar() {
        let update: VolunteerUpdate =
            serde_json::from_value(json!({ "name": 5, "contact": null })).unwrap();
        assert_eq!(update.name.as_deref(), Some("5"));
        assert!(update.contact.is_none());
    }
}
