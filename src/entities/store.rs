//! Store entity - pet stores and veterinary clinics in the territory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::clock::Clock;
use crate::core::identity::EntityId;

/// Store category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreCategory {
    Vet,
    #[default]
    PetStore,
    Grooming,
    Breeding,
    Other,
}

impl StoreCategory {
    /// Normalize a raw import cell into a category.
    ///
    /// Accepts the vet aliases seen in the wild (`VET`, `VET_CLINIC`,
    /// `vet clinic`, `veterinary clinic`); everything else is treated as a
    /// pet store.
    pub fn from_import(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "vet" | "vet_clinic" | "vet clinic" | "veterinary clinic" => StoreCategory::Vet,
            _ => StoreCategory::PetStore,
        }
    }
}

impl std::fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreCategory::Vet => write!(f, "vet"),
            StoreCategory::PetStore => write!(f, "pet_store"),
            StoreCategory::Grooming => write!(f, "grooming"),
            StoreCategory::Breeding => write!(f, "breeding"),
            StoreCategory::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for StoreCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vet" => Ok(StoreCategory::Vet),
            "pet_store" | "pet-store" => Ok(StoreCategory::PetStore),
            "grooming" => Ok(StoreCategory::Grooming),
            "breeding" => Ok(StoreCategory::Breeding),
            "other" => Ok(StoreCategory::Other),
            _ => Err(format!("Unknown store category: {}", s)),
        }
    }
}

/// Species mix a store serves (vet-oriented, optional)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    CatOnly,
    DogOnly,
    MajorityDog,
    MajorityCat,
    #[serde(rename = "50_50")]
    FiftyFifty,
    Others,
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Species::CatOnly => write!(f, "cat_only"),
            Species::DogOnly => write!(f, "dog_only"),
            Species::MajorityDog => write!(f, "majority_dog"),
            Species::MajorityCat => write!(f, "majority_cat"),
            Species::FiftyFifty => write!(f, "50_50"),
            Species::Others => write!(f, "others"),
        }
    }
}

impl std::str::FromStr for Species {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cat_only" => Ok(Species::CatOnly),
            "dog_only" => Ok(Species::DogOnly),
            "majority_dog" => Ok(Species::MajorityDog),
            "majority_cat" => Ok(Species::MajorityCat),
            "50_50" | "fifty_fifty" => Ok(Species::FiftyFifty),
            "others" => Ok(Species::Others),
            _ => Err(format!("Unknown species mix: {}", s)),
        }
    }
}

/// Payment terms agreed with a store (vet-oriented, optional)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTerms {
    Consignment,
    AdvancedPayment,
    #[serde(rename = "30_days")]
    ThirtyDays,
    #[serde(rename = "60_days")]
    SixtyDays,
    #[serde(rename = "90_days")]
    NinetyDays,
    Others,
}

impl std::fmt::Display for PaymentTerms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentTerms::Consignment => write!(f, "consignment"),
            PaymentTerms::AdvancedPayment => write!(f, "advanced_payment"),
            PaymentTerms::ThirtyDays => write!(f, "30_days"),
            PaymentTerms::SixtyDays => write!(f, "60_days"),
            PaymentTerms::NinetyDays => write!(f, "90_days"),
            PaymentTerms::Others => write!(f, "others"),
        }
    }
}

impl std::str::FromStr for PaymentTerms {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "consignment" => Ok(PaymentTerms::Consignment),
            "advanced_payment" => Ok(PaymentTerms::AdvancedPayment),
            "30_days" => Ok(PaymentTerms::ThirtyDays),
            "60_days" => Ok(PaymentTerms::SixtyDays),
            "90_days" => Ok(PaymentTerms::NinetyDays),
            "others" => Ok(PaymentTerms::Others),
            _ => Err(format!("Unknown payment terms: {}", s)),
        }
    }
}

/// A pet store or veterinary clinic
///
/// The `(lowercased name, category)` pair is the dedup key used by CSV
/// import. Manual entry does not enforce uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: EntityId,
    pub name: String,
    pub category: StoreCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_category_name: Option<String>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// Person-in-charge details
    #[serde(default)]
    pub pic_info: String,
    /// Assigned salesperson name, loosely linked to the salesperson registry
    #[serde(default)]
    pub salesperson: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<PaymentTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_payment_terms: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default)]
    pub is_ex_customer: bool,
    /// Set once at creation and preserved across import updates
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Create a store with the required fields; the rest default to empty
    pub fn new(name: impl Into<String>, category: StoreCategory, created_at: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(crate::core::identity::EntityPrefix::Store),
            name: name.into(),
            category,
            other_category_name: None,
            region: String::new(),
            area: String::new(),
            state: String::new(),
            address: String::new(),
            city: String::new(),
            zip_code: String::new(),
            phone: String::new(),
            email: String::new(),
            pic_info: String::new(),
            salesperson: String::new(),
            species: None,
            other_species: None,
            payment_terms: None,
            other_payment_terms: None,
            is_new: true,
            is_ex_customer: false,
            created_at,
        }
    }

    /// Case-insensitive dedup key used by import reconciliation
    pub fn dedup_key(&self) -> (String, StoreCategory) {
        (self.name.trim().to_lowercase(), self.category)
    }

    /// Whether the "New" badge should display.
    ///
    /// Derived at read time: the flag must be set and the store created
    /// within the last 7 days of the given clock's now.
    pub fn displays_as_new(&self, clock: &impl Clock) -> bool {
        self.is_new && (clock.now() - self.created_at) < chrono::Duration::days(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::NaiveDate;

    #[test]
    fn test_category_import_aliases() {
        assert_eq!(StoreCategory::from_import("VET"), StoreCategory::Vet);
        assert_eq!(StoreCategory::from_import("VET_CLINIC"), StoreCategory::Vet);
        assert_eq!(StoreCategory::from_import("vet clinic"), StoreCategory::Vet);
        assert_eq!(
            StoreCategory::from_import("Veterinary Clinic"),
            StoreCategory::Vet
        );
        assert_eq!(
            StoreCategory::from_import("PET_STORE"),
            StoreCategory::PetStore
        );
        // Anything unrecognized falls back to pet store
        assert_eq!(
            StoreCategory::from_import("GROOMING"),
            StoreCategory::PetStore
        );
        assert_eq!(StoreCategory::from_import(""), StoreCategory::PetStore);
    }

    #[test]
    fn test_category_serde_tokens() {
        assert_eq!(
            serde_yml::to_string(&StoreCategory::PetStore).unwrap().trim(),
            "pet_store"
        );
        let cat: StoreCategory = serde_yml::from_str("vet").unwrap();
        assert_eq!(cat, StoreCategory::Vet);
    }

    #[test]
    fn test_species_fifty_fifty_token() {
        let sp: Species = serde_yml::from_str("\"50_50\"").unwrap();
        assert_eq!(sp, Species::FiftyFifty);
        let back = serde_yml::to_string(&Species::FiftyFifty).unwrap();
        let again: Species = serde_yml::from_str(&back).unwrap();
        assert_eq!(again, Species::FiftyFifty);
    }

    #[test]
    fn test_displays_as_new_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let clock = FixedClock::at_date(today);

        let mut store = Store::new("Pet Paradise", StoreCategory::PetStore, clock.now());
        assert!(store.displays_as_new(&clock));

        // 8 days later the badge expires even though the flag remains set
        let later = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        assert!(!store.displays_as_new(&later));

        // Clearing the flag hides the badge regardless of age
        store.is_new = false;
        assert!(!store.displays_as_new(&clock));
    }

    #[test]
    fn test_dedup_key_case_insensitive() {
        let clock = FixedClock::at_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let a = Store::new("  Pet Paradise ", StoreCategory::Vet, clock.now());
        let b = Store::new("pet paradise", StoreCategory::Vet, clock.now());
        assert_eq!(a.dedup_key(), b.dedup_key());
    }
}
