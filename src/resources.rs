//! The three record collections and the per-collection rules the api
//! applies to them: required fields, numeric coercion and partial updates.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::coerce;
use crate::error::ApiError;
use crate::types::{
    Document, Donation, DonationUpdate, Pet, PetUpdate, Volunteer,
    VolunteerUpdate,
};

pub type Fields = Map<String, Value>;

pub trait Resource:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    type Update: DeserializeOwned + Send;

    /// Capitalized name, used in response messages ("Pet not found").
    const TITLE: &'static str;
    const SINGULAR: &'static str;
    /// Collection key in the document and segment of the api path.
    const PLURAL: &'static str;
    const REQUIRED: &'static [&'static str];
    const NUMERIC: &'static [&'static str];

    fn id(&self) -> i64;
    fn collection(doc: &Document) -> &Vec<Self>;
    fn collection_mut(doc: &mut Document) -> &mut Vec<Self>;

    /// Builds a new record from validated caller fields.
    fn create(id: i64, fields: &Fields) -> Result<Self, ApiError>;

    fn apply(&mut self, update: Self::Update);
}

/// Next id is one past the largest one in use, ids are never renumbered.
pub fn next_id<R: Resource>(records: &[R]) -> Result<i64, ApiError> {
    match records.iter().map(R::id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            ApiError::internal("Failed to assign id", "id space exhausted")
        }),
    }
}

pub fn check_required<R: Resource>(fields: &Fields) -> Result<(), ApiError> {
    let present = R::REQUIRED
        .iter()
        .all(|key| fields.get(*key).is_some_and(coerce::is_truthy));
    if present {
        Ok(())
    } else {
        Err(ApiError::bad_request(&format!(
            "Missing required fields: {}",
            R::REQUIRED.join(", ")
        )))
    }
}

fn invalid_number(key: &str) -> ApiError {
    ApiError::bad_request(&format!("Invalid numeric value for field: {}", key))
}

/// Numeric fields that are present (and not null) must coerce to a number.
pub fn check_numeric<R: Resource>(fields: &Fields) -> Result<(), ApiError> {
    for key in R::NUMERIC {
        match fields.get(*key) {
            None | Some(Value::Null) => {}
            Some(value) => {
                coerce::as_float(value).ok_or_else(|| invalid_number(key))?;
            }
        }
    }
    Ok(())
}

/// Parses an update payload. `id` and unknown fields are dropped.
pub fn parse_update<R: Resource>(fields: Fields) -> Result<R::Update, ApiError> {
    check_numeric::<R>(&fields)?;
    serde_json::from_value(Value::Object(fields)).map_err(|err| {
        ApiError::bad_request(&format!("Invalid request body: {}", err))
    })
}

fn text(fields: &Fields, key: &str) -> String {
    match fields.get(key) {
        Some(value) if coerce::is_truthy(value) => coerce::text_form(value),
        _ => String::new(),
    }
}

fn int(fields: &Fields, key: &str) -> Result<i64, ApiError> {
    fields
        .get(key)
        .and_then(coerce::as_int)
        .ok_or_else(|| invalid_number(key))
}

fn float(fields: &Fields, key: &str) -> Result<f64, ApiError> {
    fields
        .get(key)
        .and_then(coerce::as_float)
        .ok_or_else(|| invalid_number(key))
}

fn replace<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

impl Resource for Pet {
    type Update = PetUpdate;

    const TITLE: &'static str = "Pet";
    const SINGULAR: &'static str = "pet";
    const PLURAL: &'static str = "pets";
    const REQUIRED: &'static [&'static str] =
        &["name", "type", "breed", "age", "status", "location"];
    const NUMERIC: &'static [&'static str] = &["age"];

    fn id(&self) -> i64 {
        self.id
    }

    fn collection(doc: &Document) -> &Vec<Self> {
        &doc.pets
    }

    fn collection_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.pets
    }

    fn create(id: i64, fields: &Fields) -> Result<Self, ApiError> {
        Ok(Pet {
            id,
            name: text(fields, "name"),
            kind: text(fields, "type"),
            breed: text(fields, "breed"),
            age: int(fields, "age")?,
            status: text(fields, "status"),
            location: text(fields, "location"),
            description: text(fields, "description"),
            extra: Map::new(),
        })
    }

    fn apply(&mut self, update: PetUpdate) {
        replace(&mut self.name, update.name);
        replace(&mut self.kind, update.kind);
        replace(&mut self.breed, update.breed);
        replace(&mut self.age, update.age);
        replace(&mut self.status, update.status);
        replace(&mut self.location, update.location);
        replace(&mut self.description, update.description);
    }
}

impl Resource for Volunteer {
    type Update = VolunteerUpdate;

    const TITLE: &'static str = "Volunteer";
    const SINGULAR: &'static str = "volunteer";
    const PLURAL: &'static str = "volunteers";
    const REQUIRED: &'static [&'static str] =
        &["name", "role", "experience", "location", "contact"];
    const NUMERIC: &'static [&'static str] = &["experience"];

    fn id(&self) -> i64 {
        self.id
    }

    fn collection(doc: &Document) -> &Vec<Self> {
        &doc.volunteers
    }

    fn collection_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.volunteers
    }

    fn create(id: i64, fields: &Fields) -> Result<Self, ApiError> {
        Ok(Volunteer {
            id,
            name: text(fields, "name"),
            role: text(fields, "role"),
            experience: int(fields, "experience")?,
            location: text(fields, "location"),
            contact: text(fields, "contact"),
            extra: Map::new(),
        })
    }

    fn apply(&mut self, update: VolunteerUpdate) {
        replace(&mut self.name, update.name);
        replace(&mut self.role, update.role);
        replace(&mut self.experience, update.experience);
        replace(&mut self.location, update.location);
        replace(&mut self.contact, update.contact);
    }
}

impl Resource for Donation {
    type Update = DonationUpdate;

    const TITLE: &'static str = "Donation";
    const SINGULAR: &'static str = "donation";
    const PLURAL: &'static str = "donations";
    const REQUIRED: &'static [&'static str] =
        &["donorName", "amount", "type", "purpose"];
    const NUMERIC: &'static [&'static str] = &["amount"];

    fn id(&self) -> i64 {
        self.id
    }

    fn collection(doc: &Document) -> &Vec<Self> {
        &doc.donations
    }

    fn collection_mut(doc: &mut Document) -> &mut Vec<Self> {
        &mut doc.donations
    }

    fn create(id: i64, fields: &Fields) -> Result<Self, ApiError> {
        let mut date = text(fields, "date");
        if date.is_empty() {
            date = chrono::Utc::now().format("%Y-%m-%d").to_string();
        }
        Ok(Donation {
            id,
            donor_name: text(fields, "donorName"),
            amount: float(fields, "amount")?,
            kind: text(fields, "type"),
            purpose: text(fields, "purpose"),
            date,
            extra: Map::new(),
        })
    }

    fn apply(&mut self, update: DonationUpdate) {
        replace(&mut self.donor_name, update.donor_name);
        replace(&mut self.amount, update.amount);
        replace(&mut self.kind, update.kind);
        replace(&mut self.purpose, update.purpose);
        replace(&mut self.date, update.date);
    }
}
