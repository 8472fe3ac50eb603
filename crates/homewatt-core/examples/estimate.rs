//! Example: Estimating Household Consumption
//!
//! This example builds the device catalog, filters it, selects a few
//! models into a calculation session and records the result in the
//! in-memory store.
//!
//! Run with: `cargo run --example estimate -- [RATE_PER_KWH]`

use std::env;

use homewatt_core::{
    CalculationSession, CalculationStore, DeviceStore, FilterSpec, HistoryRollup, MockStore,
    NewDevice, SeriesOrder, build_catalog, round2, tip_for_index,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let rate = match env::args().nth(1) {
        Some(arg) => arg.parse::<f64>()?,
        None => homewatt_core::calculator::DEFAULT_RATE,
    };

    let store = MockStore::with_default_categories()?;
    store.create_device(
        &NewDevice::new("coffeeMaker", "Nespresso", "Vertuo", 1350.0)
            .with_label("Coffee maker")
            .with_category("kitchen"),
    )?;

    let records = store.list_devices(&Default::default())?;
    let catalog = build_catalog(&records);

    let mut session = CalculationSession::with_rate(rate)?;
    session.set_filters(FilterSpec::new().category("kitchen"))?;

    println!("Kitchen catalog:");
    for entry in session.filtered_catalog(&catalog) {
        println!("  {:<24} avg {:>6} W", entry.label, entry.average_watts);
    }
    println!();

    let tv = session.select_model(&catalog, "default_tv", "Samsung", "QLED Q80T")?;
    session.update_usage(tv, 4.0, 7)?;
    let fridge = session.select_model(&catalog, "default_refrigerator", "LG", "InstaView")?;
    session.update_usage(fridge, 24.0, 7)?;
    session.select_model(&catalog, "custom_coffeeMaker", "Nespresso", "Vertuo")?;

    let recorded = session.calculate(&store)?;
    let report = &recorded.report;

    println!("Breakdown at {} per kWh:", report.rate);
    for device in &report.devices {
        println!(
            "  {:<24} {:>6} kWh/day  {:>5.1}%",
            device.name,
            round2(device.daily_kwh),
            device.share * 100.0
        );
    }
    println!();
    println!("Total:        {} kWh/day", round2(report.total_consumption));
    println!("Monthly cost: {}", round2(report.monthly_cost));
    println!();

    let history = HistoryRollup::new(&store);
    for point in history.series(SeriesOrder::Chronological)? {
        println!("  {}  {} kWh", point.date, round2(point.consumption));
    }
    println!(
        "Stored calculations: {}",
        store.list_calculations(None, true)?.len()
    );
    println!();
    println!("Tip: {}", tip_for_index(recorded.calculation.id as usize));

    Ok(())
}
