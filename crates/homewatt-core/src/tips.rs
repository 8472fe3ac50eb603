//! Household energy-saving tips.

/// The fixed tip list.
pub const TIPS: [&str; 10] = [
    "Replace incandescent bulbs with LEDs.",
    "Unplug appliances you are not using.",
    "Choose appliances with the highest energy efficiency rating.",
    "Use natural light whenever possible.",
    "Adjust the thermostat of your air conditioning and heating.",
    "Use timers to switch devices off automatically.",
    "Consider installing solar panels to reduce grid consumption.",
    "Wash clothes in cold water when possible.",
    "Use thermal curtains to keep the indoor temperature stable.",
    "Service your appliances regularly.",
];

/// A tip chosen at random.
pub fn random_tip() -> &'static str {
    TIPS[rand::random_range(0..TIPS.len())]
}

/// The tip at `index`, wrapping around the list.
pub fn tip_for_index(index: usize) -> &'static str {
    TIPS[index % TIPS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tip_for_index_wraps() {
        assert_eq!(tip_for_index(0), TIPS[0]);
        assert_eq!(tip_for_index(13), TIPS[3]);
    }

    #[test]
    fn test_random_tip_is_from_list() {
        for _ in 0..50 {
            assert!(TIPS.contains(&random_tip()));
        }
    }
}
