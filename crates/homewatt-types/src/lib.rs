//! Shared data model for household energy consumption estimates.
//!
//! This crate provides the types exchanged between the calculation engine
//! (homewatt-core), the SQLite store (homewatt-store) and the HTTP service
//! (homewatt-service).
//!
//! # Features
//!
//! - Registered devices and registration requests
//! - Per-calculation device usage and immutable snapshots
//! - Persisted calculation results
//! - Built-in and user-defined categories
//! - Input validation with typed errors
//!
//! # Example
//!
//! ```
//! use homewatt_types::{DeviceUsage, NewDevice};
//!
//! let tv = NewDevice::new("tv", "Samsung", "QLED Q80T", 150.0).with_usage(4.0, 7);
//! assert!(tv.validate().is_ok());
//!
//! let usage = DeviceUsage::new("tv", "Samsung", "QLED Q80T", 150.0);
//! assert_eq!(usage.hours_per_day(), 1.0);
//! assert_eq!(usage.days_per_week(), 7);
//! ```

pub mod error;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::{
    CalculationRecord, Category, CategoryRecord, DEFAULT_DAYS_PER_WEEK, DEFAULT_HOURS_PER_DAY,
    DeviceRecord, DeviceSnapshot, DeviceUsage, MAX_HOURS_PER_DAY, NewCategory, NewDevice,
    validate_days, validate_hours, validate_watts,
};

#[cfg(test)]
mod tests {
    use super::*;

    // --- Category ---

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("CLIMATE".parse::<Category>(), Ok(Category::Climate));
        assert_eq!(" lighting ".parse::<Category>(), Ok(Category::Lighting));
    }

    #[test]
    fn test_category_parse_unknown() {
        let err = "other".parse::<Category>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownCategory("other".to_string()));
    }

    #[test]
    fn test_category_into_new_category() {
        let new: NewCategory = Category::Kitchen.into();
        assert_eq!(new.value, "kitchen");
        assert_eq!(new.label, "Kitchen");
    }

    // --- NewDevice ---

    #[test]
    fn test_new_device_defaults() {
        let device = NewDevice::new("tv", "LG", "OLED C1", 100.0);
        assert_eq!(device.hours_per_day(), DEFAULT_HOURS_PER_DAY);
        assert_eq!(device.days_per_week(), DEFAULT_DAYS_PER_WEEK);
        assert!(device.validate().is_ok());
    }

    #[test]
    fn test_new_device_rejects_zero_watts() {
        let device = NewDevice::new("tv", "LG", "OLED C1", 0.0);
        assert_eq!(device.validate(), Err(ValidationError::InvalidWatts(0.0)));
    }

    #[test]
    fn test_new_device_rejects_nan_watts() {
        let device = NewDevice::new("tv", "LG", "OLED C1", f64::NAN);
        assert!(matches!(
            device.validate(),
            Err(ValidationError::InvalidWatts(_))
        ));
    }

    #[test]
    fn test_new_device_rejects_blank_brand() {
        let device = NewDevice::new("tv", "  ", "OLED C1", 100.0);
        assert_eq!(
            device.validate(),
            Err(ValidationError::MissingField { field: "brand" })
        );
    }

    #[test]
    fn test_new_device_usage_bounds() {
        let too_many_hours = NewDevice::new("tv", "LG", "C1", 100.0).with_usage(24.5, 7);
        assert_eq!(
            too_many_hours.validate(),
            Err(ValidationError::HoursOutOfRange(24.5))
        );

        let zero_days = NewDevice::new("tv", "LG", "C1", 100.0).with_usage(2.0, 0);
        assert_eq!(zero_days.validate(), Err(ValidationError::DaysOutOfRange(0)));

        let edges = NewDevice::new("fridge", "LG", "InstaView", 100.0).with_usage(24.0, 1);
        assert!(edges.validate().is_ok());

        let idle = NewDevice::new("fridge", "LG", "InstaView", 100.0).with_usage(0.0, 7);
        assert!(idle.validate().is_ok());
    }

    #[test]
    fn test_new_device_deserializes_wire_format() {
        let json = r#"{
            "type": "coffee",
            "brand": "Nespresso",
            "model": "Vertuo",
            "watts": 1350,
            "hoursPerDay": 0.25,
            "specifications": {"capacity": "1.1 L"}
        }"#;
        let device: NewDevice = serde_json::from_str(json).unwrap();
        assert_eq!(device.device_type, "coffee");
        assert_eq!(device.watts, 1350.0);
        assert_eq!(device.hours_per_day, Some(0.25));
        assert_eq!(device.days_per_week, None);
        assert_eq!(device.days_per_week(), 7);
        assert_eq!(device.specifications["capacity"], "1.1 L");
    }

    // --- DeviceUsage ---

    #[test]
    fn test_device_usage_allows_zero_watts() {
        let usage = DeviceUsage::new("lamp", "Philips", "Hue", 0.0);
        assert!(usage.validate().is_ok());
    }

    #[test]
    fn test_device_usage_rejects_negative_watts() {
        let usage = DeviceUsage::new("lamp", "Philips", "Hue", -5.0);
        assert_eq!(usage.validate(), Err(ValidationError::InvalidWatts(-5.0)));
    }

    #[test]
    fn test_device_usage_snapshot_applies_defaults() {
        let snapshot = DeviceUsage::new("tv", "Sony", "Bravia XR", 140.0).snapshot();
        assert_eq!(snapshot.hours_per_day, 1.0);
        assert_eq!(snapshot.days_per_week, 7);
        assert_eq!(snapshot.name, "Sony Bravia XR");
    }

    #[test]
    fn test_device_usage_keeps_explicit_name() {
        let usage = DeviceUsage::new("tv", "Sony", "Bravia XR", 140.0).with_name("Living room TV");
        assert_eq!(usage.snapshot().name, "Living room TV");
    }

    // --- Serialization ---

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snapshot = DeviceUsage::new("washingMachine", "LG", "TurboWash", 480.0)
            .with_usage(1.0, 3)
            .snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["type"], "washingMachine");
        assert_eq!(json["hoursPerDay"], 1.0);
        assert_eq!(json["daysPerWeek"], 3);
    }

    #[test]
    fn test_calculation_record_serializes_rfc3339() {
        let record = CalculationRecord {
            id: 7,
            total_consumption: 0.6,
            created_at: time::macros::datetime!(2024-05-01 12:00:00 UTC),
            devices: vec![],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalConsumption"], 0.6);
        assert_eq!(json["createdAt"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_device_record_display_name() {
        let mut record = DeviceRecord {
            id: 1,
            device_type: "tv".to_string(),
            brand: "LG".to_string(),
            model: "NanoCell".to_string(),
            watts: 130.0,
            hours_per_day: 3.0,
            days_per_week: 7,
            label: None,
            category: Some("entertainment".to_string()),
            description: None,
            specifications: Default::default(),
            created_at: time::OffsetDateTime::UNIX_EPOCH,
        };
        assert_eq!(record.display_name(), "LG NanoCell");

        record.label = Some("Bedroom TV".to_string());
        assert_eq!(record.display_name(), "Bedroom TV");
        assert_eq!(record.snapshot().name, "LG NanoCell");
    }

    #[test]
    fn test_new_category_validation() {
        assert!(NewCategory::new("garden", "Garden").validate().is_ok());
        assert_eq!(
            NewCategory::new("", "Garden").validate(),
            Err(ValidationError::MissingField { field: "value" })
        );
    }
}
