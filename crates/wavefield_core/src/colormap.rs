//! Named 256-entry colormap lookup tables.

use crate::data::NumericArray;
use crate::error::DataShapeError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Number of entries in every lookup table.
pub const COLORMAP_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColormapName {
    #[default]
    Viridis,
    Magma,
    Inferno,
    Plasma,
    #[serde(alias = "twilight_shifted")]
    Twilight,
    Turbo,
    Jet,
}

impl ColormapName {
    pub const ALL: [ColormapName; 7] = [
        ColormapName::Viridis,
        ColormapName::Magma,
        ColormapName::Inferno,
        ColormapName::Plasma,
        ColormapName::Twilight,
        ColormapName::Turbo,
        ColormapName::Jet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColormapName::Viridis => "viridis",
            ColormapName::Magma => "magma",
            ColormapName::Inferno => "inferno",
            ColormapName::Plasma => "plasma",
            ColormapName::Twilight => "twilight",
            ColormapName::Turbo => "turbo",
            ColormapName::Jet => "jet",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColormapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColormapName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "twilight_shifted" => Ok(ColormapName::Twilight),
            _ => ColormapName::ALL
                .into_iter()
                .find(|name| name.as_str() == s)
                .ok_or_else(|| anyhow!("Unknown colormap: {s}")),
        }
    }
}

/// One lookup table of RGB triples in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColormapTable {
    entries: Vec<[f32; 3]>,
}

impl ColormapTable {
    pub fn new(name: ColormapName, entries: Vec<[f32; 3]>) -> Result<Self, DataShapeError> {
        if entries.len() != COLORMAP_SIZE {
            return Err(DataShapeError::ColormapLength {
                name: name.to_string(),
                found: entries.len(),
            });
        }
        Ok(Self { entries })
    }

    fn from_array(name: ColormapName, array: &NumericArray) -> Result<Self, DataShapeError> {
        let rows = array.rows::<3>(name.as_str())?;
        let entries = rows
            .into_iter()
            .map(|[r, g, b]| [r as f32, g as f32, b as f32])
            .collect();
        Self::new(name, entries)
    }

    /// Looks up an entry, clamping the index into the table.
    pub fn color(&self, index: usize) -> [f32; 3] {
        self.entries[index.min(COLORMAP_SIZE - 1)]
    }

    pub fn entries(&self) -> &[[f32; 3]] {
        &self.entries
    }
}

/// Colormap tables keyed by name, as loaded from JSON.
pub type RawColormaps = HashMap<ColormapName, NumericArray>;

/// All seven tables; exactly one is active at a time via `Parameters::colormap`.
#[derive(Debug, Clone)]
pub struct ColormapSet {
    tables: Vec<ColormapTable>,
}

impl ColormapSet {
    pub fn from_raw(raw: &RawColormaps) -> Result<Self, DataShapeError> {
        let tables = ColormapName::ALL
            .into_iter()
            .map(|name| {
                let array = raw
                    .get(&name)
                    .ok_or_else(|| DataShapeError::MissingColormap(name.to_string()))?;
                ColormapTable::from_array(name, array)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tables })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawColormaps =
            serde_json::from_str(text).context("Failed to parse colormap JSON")?;
        let set = Self::from_raw(&raw).context("Colormaps failed shape validation")?;
        Ok(set)
    }

    pub fn table(&self, name: ColormapName) -> &ColormapTable {
        &self.tables[name.slot()]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Grayscale ramp offset per table so each colormap is distinguishable.
    pub(crate) fn ramp_colormaps() -> ColormapSet {
        let raw: RawColormaps = ColormapName::ALL
            .into_iter()
            .map(|name| {
                let offset = name.slot() as f64 * 0.01;
                let rows = (0..COLORMAP_SIZE)
                    .map(|i| {
                        let v = i as f64 / 255.0;
                        vec![v, offset, 1.0 - v]
                    })
                    .collect();
                (name, NumericArray::Nested(rows))
            })
            .collect();
        ColormapSet::from_raw(&raw).expect("ramp colormaps should load")
    }

    #[test]
    fn names_round_trip_through_strings() {
        for name in ColormapName::ALL {
            assert_eq!(name.as_str().parse::<ColormapName>().unwrap(), name);
        }
        assert_eq!(
            "twilight_shifted".parse::<ColormapName>().unwrap(),
            ColormapName::Twilight
        );
        assert!("rainbow".parse::<ColormapName>().is_err());
        assert_eq!(ColormapName::default(), ColormapName::Viridis);
    }

    #[test]
    fn table_rejects_wrong_length() {
        let err = ColormapTable::new(ColormapName::Jet, vec![[0.0; 3]; 255]).unwrap_err();
        assert_eq!(
            err,
            DataShapeError::ColormapLength {
                name: "jet".to_string(),
                found: 255,
            }
        );
    }

    #[test]
    fn set_requires_every_table() {
        let mut raw: RawColormaps = HashMap::new();
        raw.insert(
            ColormapName::Viridis,
            NumericArray::Flat(vec![0.5; COLORMAP_SIZE * 3]),
        );
        assert_eq!(
            ColormapSet::from_raw(&raw).unwrap_err(),
            DataShapeError::MissingColormap("magma".to_string())
        );
    }

    #[test]
    fn set_looks_up_by_name() {
        let set = ramp_colormaps();
        assert_eq!(set.table(ColormapName::Viridis).color(0), [0.0, 0.0, 1.0]);
        let top = set.table(ColormapName::Magma).color(255);
        assert_eq!(top[0], 1.0);
        assert!((top[1] - 0.01).abs() < 1e-6);
        assert_eq!(top[2], 0.0);
        assert_eq!(
            set.table(ColormapName::Jet).color(1000),
            set.table(ColormapName::Jet).color(255)
        );
    }

    #[test]
    fn from_json_accepts_twilight_shifted_key() {
        let table = format!("[{}]", vec!["[0.1,0.2,0.3]"; COLORMAP_SIZE].join(","));
        let body = ["viridis", "magma", "inferno", "plasma", "twilight_shifted", "turbo", "jet"]
            .iter()
            .map(|key| format!("\"{key}\": {table}"))
            .collect::<Vec<_>>()
            .join(",");
        let set = ColormapSet::from_json(&format!("{{{body}}}")).expect("colormaps should load");
        assert_eq!(set.table(ColormapName::Twilight).entries().len(), COLORMAP_SIZE);
    }
}
