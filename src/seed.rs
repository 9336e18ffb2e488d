//! Sample data set the in-memory store starts with.

use serde_json::Map;

use crate::types::{Document, Donation, Pet, Volunteer};

#[allow(clippy::too_many_arguments)]
fn pet(
    id: i64,
    name: &str,
    kind: &str,
    breed: &str,
    age: i64,
    status: &str,
    location: &str,
    description: &str,
) -> Pet {
    Pet {
        id,
        name: name.to_string(),
        kind: kind.to_string(),
        breed: breed.to_string(),
        age,
        status: status.to_string(),
        location: location.to_string(),
        description: description.to_string(),
        extra: Map::new(),
    }
}

fn volunteer(
    id: i64,
    name: &str,
    role: &str,
    experience: i64,
    location: &str,
    contact: &str,
) -> Volunteer {
    Volunteer {
        id,
        name: name.to_string(),
        role: role.to_string(),
        experience,
        location: location.to_string(),
        contact: contact.to_string(),
        extra: Map::new(),
    }
}

fn donation(
    id: i64,
    donor_name: &str,
    amount: f64,
    kind: &str,
    date: &str,
    purpose: &str,
) -> Donation {
    Donation {
        id,
        donor_name: donor_name.to_string(),
        amount,
        kind: kind.to_string(),
        purpose: purpose.to_string(),
        date: date.to_string(),
        extra: Map::new(),
    }
}

pub fn document() -> Document {
    let pets = vec![
        pet(1, "Buddy", "Dog", "Golden Retriever", 3, "Available", "Mumbai",
            "Friendly and energetic dog looking for a loving home"),
        pet(2, "Whiskers", "Cat", "Persian", 2, "Adopted", "Delhi",
            "Calm and affectionate cat, great with children"),
        pet(3, "Charlie", "Dog", "Labrador", 1, "Available", "Bangalore",
            "Young and playful puppy, needs training"),
        pet(4, "Mittens", "Cat", "Siamese", 4, "Available", "Chennai",
            "Independent cat, perfect for busy professionals"),
        pet(5, "Rocky", "Dog", "German Shepherd", 5, "Available", "Pune",
            "Well-trained guard dog, loyal and protective"),
        pet(6, "Luna", "Cat", "Maine Coon", 3, "Available", "Hyderabad",
            "Large and gentle cat, loves to cuddle"),
        pet(7, "Max", "Dog", "Beagle", 2, "Foster Care", "Kolkata",
            "Recovering from injury, needs temporary home"),
        pet(8, "Shadow", "Cat", "Black Cat", 1, "Available", "Ahmedabad",
            "Playful kitten, loves toys and attention"),
        pet(9, "Bella", "Dog", "Poodle", 4, "Available", "Jaipur",
            "Hypoallergenic breed, great for families with allergies"),
        pet(10, "Smokey", "Cat", "British Shorthair", 6, "Available", "Lucknow",
            "Calm senior cat, prefers quiet environment"),
    ];

    let volunteers = vec![
        volunteer(1, "Priya Sharma", "Caretaker", 3, "Mumbai", "priya@petcare.org"),
        volunteer(2, "Rahul Kumar", "Veterinarian", 8, "Delhi", "rahul@petcare.org"),
        volunteer(3, "Anita Singh", "Adoption Coordinator", 5, "Bangalore",
            "anita@petcare.org"),
        volunteer(4, "Vikash Gupta", "Fundraiser", 2, "Chennai", "vikash@petcare.org"),
        volunteer(5, "Meera Patel", "Transport Coordinator", 4, "Pune",
            "meera@petcare.org"),
    ];

    let donations = vec![
        donation(1, "Anonymous", 5000.0, "Food", "2024-01-15", "Monthly food supplies"),
        donation(2, "Ravi Mehta", 10000.0, "Medical", "2024-01-20",
            "Emergency medical fund"),
        donation(3, "Corporate Sponsor ABC", 25000.0, "General", "2024-01-25",
            "Shelter maintenance"),
        donation(4, "Sarah Johnson", 3000.0, "Toys", "2024-02-01",
            "Pet toys and enrichment"),
        donation(5, "Local Community Group", 8000.0, "Medical", "2024-02-05",
            "Vaccination drive"),
    ];

    Document {
        pets,
        volunteers,
        donations,
    }
}
