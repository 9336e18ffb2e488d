use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::Document;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_pets: usize,
    pub available_pets: usize,
    pub adopted_pets: usize,
    pub foster_pets: usize,
    pub total_volunteers: usize,
    /// Sum of all donation amounts.
    pub total_donations: f64,
    pub donation_count: usize,
    pub donations_by_type: BTreeMap<String, usize>,
    pub pets_by_type: BTreeMap<String, usize>,
    pub volunteers_by_role: BTreeMap<String, usize>,
}

fn tally<'a>(values: impl Iterator<Item = &'a String>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn compute_stats(doc: &Document) -> Stats {
    let with_status =
        |status: &str| doc.pets.iter().filter(|p| p.status == status).count();
    Stats {
        total_pets: doc.pets.len(),
        available_pets: with_status("Available"),
        adopted_pets: with_status("Adopted"),
        foster_pets: with_status("Foster Care"),
        total_volunteers: doc.volunteers.len(),
        total_donations: doc.donations.iter().map(|d| d.amount).sum(),
        donation_count: doc.donations.len(),
        donations_by_type: tally(doc.donations.iter().map(|d| &d.kind)),
        pets_by_type: tally(doc.pets.iter().map(|p| &p.kind)),
        volunteers_by_role: tally(doc.volunteers.iter().map(|v| &v.role)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn empty_document() {
        let stats = compute_stats(&Document::default());
        assert_eq!(stats.total_pets, 0);
        assert_eq!(stats.total_donations, 0.0);
        assert_eq!(stats.donation_count, 0);
        assert!(stats.donations_by_type.is_empty());
        assert!(stats.pets_by_type.is_empty());
        assert!(stats.volunteers_by_role.is_empty());
    }

    #[test]
    fn seed_document() {
        let stats = compute_stats(&seed::document());
        assert_eq!(stats.total_pets, 10);
        assert_eq!(stats.available_pets, 8);
        assert_eq!(stats.adopted_pets, 1);
        assert_eq!(stats.foster_pets, 1);
        assert_eq!(stats.total_volunteers, 5);
        assert_eq!(stats.total_donations, 51000.0);
        assert_eq!(stats.donation_count, 5);
        assert_eq!(stats.donations_by_type.get("Medical"), Some(&2));
        assert_eq!(stats.pets_by_type.get("Dog"), Some(&5));
        assert_eq!(stats.pets_by_type.get("Cat"), Some(&5));
        assert_eq!(stats.volunteers_by_role.len(), 5);
    }

    #[test]
    fn serializes_camel_case() {
        let value = serde_json::to_value(compute_stats(&Document::default())).unwrap();
        assert_eq!(value["totalPets"], 0);
        assert_eq!(value["volunteersByRole"], serde_json::json!({}));
    }
}
