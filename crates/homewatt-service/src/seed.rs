//! Sample data for a fresh database.

use rand::Rng;
use rand::seq::IndexedRandom;
use time::{Duration, OffsetDateTime};
use tracing::info;

use homewatt_core::{ConsumptionCalculator, Result};
use homewatt_store::Store;
use homewatt_types::{DeviceUsage, NewDevice};

/// Devices picked for each sample calculation.
pub const DEVICES_PER_CALCULATION: usize = 3;
/// Number of sample calculations, one per day going back from today.
pub const SAMPLE_CALCULATIONS: usize = 10;

struct Sample {
    device_type: &'static str,
    brand: &'static str,
    model: &'static str,
    name: &'static str,
    category: &'static str,
    watts: f64,
    hours_per_day: f64,
    days_per_week: u8,
}

const SAMPLES: [Sample; 8] = [
    Sample {
        device_type: "tv",
        brand: "Samsung",
        model: "QLED Q80T",
        name: "Samsung QLED Q80T television",
        category: "entertainment",
        watts: 150.0,
        hours_per_day: 4.0,
        days_per_week: 7,
    },
    Sample {
        device_type: "refrigerator",
        brand: "LG",
        model: "InstaView",
        name: "LG InstaView refrigerator",
        category: "kitchen",
        watts: 100.0,
        hours_per_day: 24.0,
        days_per_week: 7,
    },
    Sample {
        device_type: "washingMachine",
        brand: "Maytag",
        model: "MHW5630HW",
        name: "Maytag MHW5630HW washer",
        category: "cleaning",
        watts: 500.0,
        hours_per_day: 1.0,
        days_per_week: 3,
    },
    Sample {
        device_type: "computer",
        brand: "Dell",
        model: "XPS 8940",
        name: "Dell XPS 8940 computer",
        category: "office",
        watts: 460.0,
        hours_per_day: 8.0,
        days_per_week: 5,
    },
    Sample {
        device_type: "airConditioner",
        brand: "Samsung",
        model: "AR12",
        name: "Air conditioner",
        category: "climate",
        watts: 1500.0,
        hours_per_day: 6.0,
        days_per_week: 7,
    },
    Sample {
        device_type: "microwave",
        brand: "Panasonic",
        model: "NN-SN686S",
        name: "Panasonic NN-SN686S microwave",
        category: "kitchen",
        watts: 1200.0,
        hours_per_day: 0.5,
        days_per_week: 7,
    },
    Sample {
        device_type: "coffee",
        brand: "Nespresso",
        model: "Vertuo",
        name: "Nespresso Vertuo coffee maker",
        category: "kitchen",
        watts: 1350.0,
        hours_per_day: 0.25,
        days_per_week: 7,
    },
    Sample {
        device_type: "gameConsole",
        brand: "Sony",
        model: "PlayStation 5",
        name: "PlayStation 5 console",
        category: "entertainment",
        watts: 200.0,
        hours_per_day: 3.0,
        days_per_week: 5,
    },
];

impl Sample {
    fn new_device(&self) -> NewDevice {
        NewDevice::new(self.device_type, self.brand, self.model, self.watts)
            .with_usage(self.hours_per_day, self.days_per_week)
            .with_label(self.name)
            .with_category(self.category)
    }

    fn usage(&self) -> DeviceUsage {
        DeviceUsage::new(self.device_type, self.brand, self.model, self.watts)
            .with_usage(self.hours_per_day, self.days_per_week)
            .with_name(self.name)
    }
}

/// What a seed run inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub devices: usize,
    pub calculations: usize,
}

/// Insert the sample devices and calculations.
///
/// Existing rows are left in place, so running this twice doubles the data.
pub fn seed(store: &Store) -> Result<SeedSummary> {
    seed_with_rng(store, &mut rand::rng(), OffsetDateTime::now_utc())
}

/// [`seed`] with an explicit random source and reference time.
pub fn seed_with_rng<R: Rng + ?Sized>(
    store: &Store,
    rng: &mut R,
    now: OffsetDateTime,
) -> Result<SeedSummary> {
    for sample in &SAMPLES {
        store.create_device(&sample.new_device())?;
    }

    let calculator = ConsumptionCalculator::default();
    for day in 0..SAMPLE_CALCULATIONS {
        let usages: Vec<DeviceUsage> = SAMPLES
            .choose_multiple(rng, DEVICES_PER_CALCULATION)
            .map(Sample::usage)
            .collect();
        let snapshots = ConsumptionCalculator::snapshots(&usages)?;
        let report = calculator.compute(&snapshots)?;

        let created_at = now - Duration::days(day as i64);
        store.create_calculation_at(report.total_consumption, &snapshots, created_at)?;
    }

    let summary = SeedSummary {
        devices: SAMPLES.len(),
        calculations: SAMPLE_CALCULATIONS,
    };
    info!(
        devices = summary.devices,
        calculations = summary.calculations,
        "Seeded sample data"
    );
    Ok(summary)
}
