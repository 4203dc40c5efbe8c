use std::{fs::File, io::Read, path::Path};

use log::{info, warn};
use model::{FEATURE_NAMES, NUM_FEATURES, PRICE_SCALE, features::TARGET_NAME};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::Deserialize;

use crate::error::{Result, TrainErr};

/// Supported CSV exports of the California housing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Per-household averages, one column per model feature plus `MedHouseVal`.
    Frame,
    /// Raw block-group totals, features are derived while loading.
    BlockGroup,
}

const BLOCK_GROUP_COLUMNS: [&str; 9] = [
    "longitude",
    "latitude",
    "housing_median_age",
    "total_rooms",
    "total_bedrooms",
    "population",
    "households",
    "median_income",
    "median_house_value",
];

impl Layout {
    fn detect(headers: &csv::StringRecord) -> Option<Self> {
        let has = |name: &str| headers.iter().any(|h| h.trim() == name);

        if FEATURE_NAMES.iter().all(|&c| has(c)) && has(TARGET_NAME) {
            Some(Layout::Frame)
        } else if BLOCK_GROUP_COLUMNS.iter().all(|&c| has(c)) {
            Some(Layout::BlockGroup)
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FrameRecord {
    med_inc: f64,
    house_age: f64,
    ave_rooms: f64,
    ave_bedrms: f64,
    population: f64,
    ave_occup: f64,
    latitude: f64,
    longitude: f64,
    med_house_val: f64,
}

impl FrameRecord {
    fn into_row(self) -> ([f64; NUM_FEATURES], f64) {
        let features = [
            self.med_inc,
            self.house_age,
            self.ave_rooms,
            self.ave_bedrms,
            self.population,
            self.ave_occup,
            self.latitude,
            self.longitude,
        ];
        (features, self.med_house_val)
    }
}

#[derive(Debug, Deserialize)]
struct BlockGroupRecord {
    longitude: Option<f64>,
    latitude: Option<f64>,
    housing_median_age: Option<f64>,
    total_rooms: Option<f64>,
    total_bedrooms: Option<f64>,
    population: Option<f64>,
    households: Option<f64>,
    median_income: Option<f64>,
    median_house_value: Option<f64>,
}

impl BlockGroupRecord {
    /// Derives the per-household averages the model is trained on.
    ///
    /// Returns `None` for rows with a missing value or no households.
    fn into_row(self) -> Option<([f64; NUM_FEATURES], f64)> {
        let households = self.households.filter(|h| *h > 0.0)?;
        let features = [
            self.median_income?,
            self.housing_median_age?,
            self.total_rooms? / households,
            self.total_bedrooms? / households,
            self.population?,
            self.population? / households,
            self.latitude?,
            self.longitude?,
        ];
        Some((features, self.median_house_value? / PRICE_SCALE))
    }
}

/// An in-memory feature matrix with its targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<f64>,
}

impl Dataset {
    /// Creates a new dataset from aligned buffers.
    ///
    /// # Panics
    /// If `x` doesn't have one row per target.
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Self {
        assert_eq!(x.nrows(), y.len(), "x and y must have same length");
        Self { x, y }
    }

    /// Loads a CSV export from disk.
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("loading dataset from {}", path.display());
        Self::from_reader(File::open(path)?)
    }

    /// Parses a CSV export in either known layout.
    ///
    /// # Errors
    /// Returns `TrainErr::UnknownLayout` for an unrecognised header,
    /// `TrainErr::Csv` for malformed records and `TrainErr::EmptyDataset`
    /// when no row survives.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let layout = Layout::detect(&headers).ok_or_else(|| TrainErr::UnknownLayout {
            headers: headers.iter().map(String::from).collect(),
        })?;

        let mut data = Vec::new();
        let mut targets = Vec::new();
        let mut skipped = 0usize;

        match layout {
            Layout::Frame => {
                for record in reader.deserialize::<FrameRecord>() {
                    let (features, target) = record?.into_row();
                    data.extend_from_slice(&features);
                    targets.push(target);
                }
            }
            Layout::BlockGroup => {
                for record in reader.deserialize::<BlockGroupRecord>() {
                    match record?.into_row() {
                        Some((features, target)) => {
                            data.extend_from_slice(&features);
                            targets.push(target);
                        }
                        None => skipped += 1,
                    }
                }
            }
        }

        if skipped > 0 {
            warn!("skipped {skipped} incomplete rows");
        }
        if targets.is_empty() {
            return Err(TrainErr::EmptyDataset);
        }

        let x = Array2::from_shape_vec((targets.len(), NUM_FEATURES), data)?;
        info!("loaded {} samples ({layout:?} layout)", targets.len());

        Ok(Self::new(x, Array1::from(targets)))
    }

    /// Returns the rows listed in `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    #[inline]
    pub fn x(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    #[inline]
    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }
}
