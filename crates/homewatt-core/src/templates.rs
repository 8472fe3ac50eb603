//! Built-in device template table.
//!
//! Each template describes one appliance type with representative brands,
//! models and their power draw. The table is compiled in and never mutated;
//! use [`template`] to look up an entry by type key.

use serde::Serialize;

use homewatt_types::Category;

/// A model and its typical power draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelSpec {
    /// Model name.
    pub name: &'static str,
    /// Power draw in watts.
    pub watts: f64,
}

/// A brand and the models listed for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrandModels {
    /// Manufacturer.
    pub brand: &'static str,
    /// Models for this brand.
    pub models: &'static [ModelSpec],
}

/// A descriptive usage window, e.g. "Evening 19:00-23:00".
///
/// Schedules are hints for the user. They are never fed into the energy
/// formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSchedule {
    /// Display label.
    pub label: &'static str,
    /// Start time, `HH:MM`.
    pub start: &'static str,
    /// End time, `HH:MM`.
    pub end: &'static str,
}

/// A compiled-in device type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTemplate {
    /// Type key (e.g. `washingMachine`).
    pub type_key: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Built-in category.
    pub category: Category,
    /// Representative power draw in watts.
    pub average_watts: f64,
    /// Representative brands and models.
    pub common_brands: &'static [BrandModels],
    /// Usage windows, possibly empty.
    pub common_schedules: &'static [UsageSchedule],
}

impl DeviceTemplate {
    /// The first schedule hint, if any.
    pub fn first_schedule(&self) -> Option<&'static UsageSchedule> {
        self.common_schedules.first()
    }

    /// Look up a model's wattage by brand and model name.
    pub fn model_watts(&self, brand: &str, model: &str) -> Option<f64> {
        self.common_brands
            .iter()
            .find(|b| b.brand == brand)?
            .models
            .iter()
            .find(|m| m.name == model)
            .map(|m| m.watts)
    }
}

const fn model(name: &'static str, watts: f64) -> ModelSpec {
    ModelSpec { name, watts }
}

const fn schedule(label: &'static str, start: &'static str, end: &'static str) -> UsageSchedule {
    UsageSchedule { label, start, end }
}

/// Every built-in template, in display order.
pub static DEVICE_TEMPLATES: &[DeviceTemplate] = &[
    DeviceTemplate {
        type_key: "tv",
        label: "Television",
        category: Category::Entertainment,
        average_watts: 150.0,
        common_brands: &[
            BrandModels {
                brand: "Samsung",
                models: &[
                    model("QLED Q80T", 150.0),
                    model("Neo QLED", 180.0),
                    model("The Frame", 120.0),
                ],
            },
            BrandModels {
                brand: "LG",
                models: &[
                    model("OLED C1", 100.0),
                    model("NanoCell", 130.0),
                    model("OLED G2", 110.0),
                ],
            },
            BrandModels {
                brand: "Sony",
                models: &[model("Bravia XR", 140.0), model("OLED A80J", 120.0)],
            },
        ],
        common_schedules: &[
            schedule("Afternoon", "14:00", "17:00"),
            schedule("Evening", "19:00", "23:00"),
        ],
    },
    DeviceTemplate {
        type_key: "refrigerator",
        label: "Refrigerator",
        category: Category::Kitchen,
        average_watts: 150.0,
        common_brands: &[
            BrandModels {
                brand: "LG",
                models: &[
                    model("InstaView", 100.0),
                    model("Door-in-Door", 120.0),
                    model("Side by Side", 150.0),
                ],
            },
            BrandModels {
                brand: "Samsung",
                models: &[model("Family Hub", 130.0), model("French Door", 140.0)],
            },
            BrandModels {
                brand: "Whirlpool",
                models: &[
                    model("Smart French Door", 125.0),
                    model("Side by Side", 135.0),
                ],
            },
        ],
        common_schedules: &[],
    },
    DeviceTemplate {
        type_key: "computer",
        label: "Computer",
        category: Category::Office,
        average_watts: 200.0,
        common_brands: &[
            BrandModels {
                brand: "Dell",
                models: &[
                    model("XPS Desktop", 460.0),
                    model("Alienware Aurora", 750.0),
                ],
            },
            BrandModels {
                brand: "HP",
                models: &[model("Pavilion Gaming", 500.0), model("OMEN", 650.0)],
            },
        ],
        common_schedules: &[
            schedule("Work", "09:00", "18:00"),
            schedule("Gaming", "20:00", "23:00"),
        ],
    },
    DeviceTemplate {
        type_key: "washingMachine",
        label: "Washing machine",
        category: Category::Cleaning,
        average_watts: 500.0,
        common_brands: &[
            BrandModels {
                brand: "Samsung",
                models: &[model("EcoBubble", 450.0), model("QuickDrive", 500.0)],
            },
            BrandModels {
                brand: "LG",
                models: &[model("TurboWash", 480.0), model("AI DD", 520.0)],
            },
        ],
        common_schedules: &[
            schedule("Morning", "09:00", "11:00"),
            schedule("Afternoon", "15:00", "17:00"),
        ],
    },
    DeviceTemplate {
        type_key: "airConditioner",
        label: "Air conditioner",
        category: Category::Climate,
        average_watts: 1500.0,
        common_brands: &[
            BrandModels {
                brand: "Daikin",
                models: &[
                    model("Inverter 12000BTU", 1100.0),
                    model("Inverter 18000BTU", 1600.0),
                ],
            },
            BrandModels {
                brand: "Carrier",
                models: &[
                    model("Inverter 12000BTU", 1200.0),
                    model("Split 18000BTU", 1800.0),
                ],
            },
        ],
        common_schedules: &[
            schedule("Hot afternoon", "13:00", "17:00"),
            schedule("Evening", "20:00", "23:00"),
        ],
    },
    DeviceTemplate {
        type_key: "microwave",
        label: "Microwave",
        category: Category::Kitchen,
        average_watts: 1200.0,
        common_brands: &[
            BrandModels {
                brand: "Panasonic",
                models: &[model("Inverter", 1200.0), model("Genius Sensor", 1250.0)],
            },
            BrandModels {
                brand: "Samsung",
                models: &[model("Smart Oven", 1400.0), model("Grill", 1500.0)],
            },
        ],
        common_schedules: &[
            schedule("Breakfast", "07:00", "09:00"),
            schedule("Lunch", "12:00", "14:00"),
            schedule("Dinner", "19:00", "21:00"),
        ],
    },
];

/// Look up a template by exact type key.
///
/// Returns `None` for unknown keys; callers decide whether that is an error.
///
/// ```
/// use homewatt_core::templates::template;
///
/// assert_eq!(template("tv").map(|t| t.label), Some("Television"));
/// assert!(template("toaster").is_none());
/// ```
pub fn template(type_key: &str) -> Option<&'static DeviceTemplate> {
    DEVICE_TEMPLATES.iter().find(|t| t.type_key == type_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_type_keys_are_unique() {
        let keys: HashSet<_> = DEVICE_TEMPLATES.iter().map(|t| t.type_key).collect();
        assert_eq!(keys.len(), DEVICE_TEMPLATES.len());
    }

    #[test]
    fn test_every_model_draws_power() {
        for template in DEVICE_TEMPLATES {
            assert!(template.average_watts > 0.0, "{}", template.type_key);
            for brand in template.common_brands {
                assert!(!brand.models.is_empty(), "{} {}", template.type_key, brand.brand);
                for model in brand.models {
                    assert!(model.watts > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_first_schedule() {
        assert_eq!(
            template("microwave").and_then(|t| t.first_schedule()).map(|s| s.label),
            Some("Breakfast")
        );
        assert!(template("refrigerator").and_then(|t| t.first_schedule()).is_none());
    }

    #[test]
    fn test_model_watts_lookup() {
        let ac = template("airConditioner").unwrap();
        assert_eq!(ac.model_watts("Carrier", "Inverter 12000BTU"), Some(1200.0));
        assert_eq!(ac.model_watts("Daikin", "Inverter 12000BTU"), Some(1100.0));
        assert_eq!(ac.model_watts("Carrier", "Window"), None);
    }
}
