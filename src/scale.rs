//! Frequency-ratio tables for the additive and bell partial banks.
//!
//! A scale maps a partial index to a frequency ratio applied to a root
//! frequency. The set is closed: selecting one by name substitutes the whole
//! table at once (it travels as a single enum value in a parameter message),
//! so the synthesis engine never observes a half-swapped table.

use crate::physics::ConfigError;

/// Named ratio table, re-selectable at control rate, read-only at audio rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scale {
    Major,
    Pentatonic,
    Chromatic,
    /// The natural overtone series: integer multiples of the root.
    OvertoneSeries,
    /// Bohlen-Pierce: 13 equal-ish divisions of the tritave, strongly
    /// inharmonic against a harmonic root. Good for bells.
    BohlenPierce,
}

impl Scale {
    /// Parse a scale name from the control surface.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "major" => Ok(Scale::Major),
            "pentatonic" => Ok(Scale::Pentatonic),
            "chromatic" => Ok(Scale::Chromatic),
            "overtone" | "overtone-series" => Ok(Scale::OvertoneSeries),
            "bohlen-pierce" => Ok(Scale::BohlenPierce),
            _ => Err(ConfigError::UnknownScale),
        }
    }

    /// The ratio sequence. Always non-empty, all ratios positive.
    pub fn ratios(self) -> &'static [f32] {
        match self {
            Scale::Major => &MAJOR,
            Scale::Pentatonic => &PENTATONIC,
            Scale::Chromatic => &CHROMATIC,
            Scale::OvertoneSeries => &OVERTONE_SERIES,
            Scale::BohlenPierce => &BOHLEN_PIERCE,
        }
    }

    /// Ratio for a partial index, cycling past the end of the table.
    #[inline]
    pub fn ratio(self, partial: usize) -> f32 {
        let table = self.ratios();
        table[partial % table.len()]
    }
}

static MAJOR: [f32; 36] = [
    1.000000, 1.125000, 1.250000, 1.333333, 1.500000, 1.666667, //
    1.875000, 2.000000, 2.250000, 2.500000, 2.666667, 3.000000, //
    3.333333, 3.750000, 4.000000, 4.500000, 5.000000, 5.333333, //
    6.000000, 6.666667, 7.500000, 8.000000, 9.000000, 10.000000, //
    10.666667, 12.000000, 13.333333, 15.000000, 16.000000, 18.000000, //
    20.000000, 21.333333, 24.000000, 26.666667, 30.000000, 32.000000,
];

static PENTATONIC: [f32; 26] = [
    1.000000, 1.125000, 1.250000, 1.500000, 1.666667, 2.000000, //
    2.250000, 2.500000, 3.000000, 3.333333, 4.000000, 4.500000, //
    5.000000, 6.000000, 6.666667, 8.000000, 9.000000, 10.000000, //
    12.000000, 13.333333, 16.000000, 18.000000, 20.000000, 24.000000, //
    26.666667, 32.000000,
];

static CHROMATIC: [f32; 61] = [
    1.000000, 1.066667, 1.125000, 1.285714, 1.250000, 1.333333, 1.406250, 1.500000, //
    1.600000, 1.666667, 1.750000, 1.875000, 2.000000, 2.133333, 2.250000, 2.571429, //
    2.500000, 2.666667, 2.812500, 3.000000, 3.200000, 3.333333, 3.500000, 3.750000, //
    4.000000, 4.266667, 4.500000, 5.142857, 5.000000, 5.333333, 5.625000, 6.000000, //
    6.400000, 6.666667, 7.000000, 7.500000, 8.000000, 8.533333, 9.000000, 10.285714, //
    10.000000, 10.666667, 11.250000, 12.000000, 12.800000, 13.333333, 14.000000, 15.000000, //
    16.000000, 17.066667, 18.000000, 20.571429, 20.000000, 21.333333, 22.500000, 24.000000, //
    25.600000, 26.666667, 28.000000, 30.000000, 32.000000,
];

static OVERTONE_SERIES: [f32; 64] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, //
    9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, //
    17.0, 18.0, 19.0, 20.0, 21.0, 22.0, 23.0, 24.0, //
    25.0, 26.0, 27.0, 28.0, 29.0, 30.0, 31.0, 32.0, //
    33.0, 34.0, 35.0, 36.0, 37.0, 38.0, 39.0, 40.0, //
    41.0, 42.0, 43.0, 44.0, 45.0, 46.0, 47.0, 48.0, //
    49.0, 50.0, 51.0, 52.0, 53.0, 54.0, 55.0, 56.0, //
    57.0, 58.0, 59.0, 60.0, 61.0, 62.0, 63.0, 64.0,
];

static BOHLEN_PIERCE: [f32; 40] = [
    1.000000, 1.080000, 1.190476, 1.285714, 1.400000, 1.530612, 1.666667, 1.800000, //
    1.960000, 2.142857, 2.333333, 2.520000, 2.777778, 3.000000, 3.240000, 3.571429, //
    3.857143, 4.200000, 4.591837, 5.000000, 5.400000, 5.880000, 6.428571, 7.000000, //
    7.560000, 8.333333, 9.000000, 9.720000, 10.714286, 11.571429, 12.600000, 13.775510, //
    15.000000, 16.200000, 17.640000, 19.285714, 21.000000, 22.680000, 25.000000, 27.000000,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_positive_and_nonempty() {
        for scale in [
            Scale::Major,
            Scale::Pentatonic,
            Scale::Chromatic,
            Scale::OvertoneSeries,
            Scale::BohlenPierce,
        ] {
            let ratios = scale.ratios();
            assert!(!ratios.is_empty());
            assert!(ratios.iter().all(|&r| r > 0.0));
        }
    }

    #[test]
    fn partial_index_cycles() {
        let len = Scale::Pentatonic.ratios().len();
        assert_eq!(Scale::Pentatonic.ratio(0), Scale::Pentatonic.ratio(len));
        assert_eq!(Scale::OvertoneSeries.ratio(2), 3.0);
    }

    #[test]
    fn name_lookup() {
        assert_eq!(Scale::from_name("bohlen-pierce"), Ok(Scale::BohlenPierce));
        assert_eq!(
            Scale::from_name("klingonian"),
            Err(ConfigError::UnknownScale)
        );
    }
}
