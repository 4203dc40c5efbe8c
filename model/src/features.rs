/// Number of columns the estimator is trained on.
pub const NUM_FEATURES: usize = 8;

/// Dataset column names, in the exact order the estimator consumes them.
///
/// Changing this list (or its order) invalidates every persisted artifact.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
];

/// Name of the dataset's target column.
pub const TARGET_NAME: &str = "MedHouseVal";

/// The target is expressed in units of $100,000.
pub const PRICE_SCALE: f64 = 100_000.0;

/// One block group's features, named after the dataset columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub med_inc: f64,
    pub house_age: f64,
    pub ave_rooms: f64,
    pub ave_bedrms: f64,
    pub population: f64,
    pub ave_occup: f64,
    pub latitude: f64,
    pub longitude: f64,
}

impl FeatureVector {
    /// Lays the fields out in `FEATURE_NAMES` order.
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.med_inc,
            self.house_age,
            self.ave_rooms,
            self.ave_bedrms,
            self.population,
            self.ave_occup,
            self.latitude,
            self.longitude,
        ]
    }

    /// Returns the value of the column called `name`, if it exists.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_array()[i])
    }
}

/// Converts a raw estimator output into a dollar amount.
#[inline]
pub fn scale_price(raw: f64) -> f64 {
    raw * PRICE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_follows_column_order() {
        let fv = FeatureVector {
            med_inc: 1.0,
            house_age: 2.0,
            ave_rooms: 3.0,
            ave_bedrms: 4.0,
            population: 5.0,
            ave_occup: 6.0,
            latitude: 7.0,
            longitude: 8.0,
        };

        assert_eq!(fv.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(fv.get("AveBedrms"), Some(4.0));
        assert_eq!(fv.get("Longitude"), Some(8.0));
        assert_eq!(fv.get("AveBedrooms"), None);
    }

    #[test]
    fn price_is_scaled_by_target_unit() {
        assert_eq!(scale_price(2.5), 250_000.0);
    }
}
