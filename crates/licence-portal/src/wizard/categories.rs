use serde::{Deserialize, Serialize};

/// One entry in the licence-category catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenceCategory {
    pub id: String,
    pub label: String,
    pub description: String,
}

/// The standard catalogue served when the backend list is unavailable and
/// by the demo adapters.
pub fn standard_catalogue() -> Vec<LicenceCategory> {
    fn entry(id: &str, label: &str, description: &str) -> LicenceCategory {
        LicenceCategory {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        }
    }

    vec![
        entry("A1", "Light Motorcycles", "Motorcycles up to 100cc"),
        entry("A", "Motorcycles", "Motorcycles of any capacity"),
        entry("B1", "Motor Tricycles", "Motor tricycles and quadricycles"),
        entry("B", "Light Vehicles", "Cars and dual-purpose vehicles up to 3,500kg"),
        entry("C1", "Light Lorries", "Lorries between 3,500kg and 17,000kg"),
        entry("C", "Heavy Lorries", "Lorries exceeding 17,000kg"),
    ]
}
