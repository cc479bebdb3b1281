// src/models.rs
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;

/// The three economies tracked by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    CN,
    US,
    EU,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::CN, Region::US, Region::EU];

    pub fn code(&self) -> &'static str {
        match self {
            Region::CN => "CN",
            Region::US => "US",
            Region::EU => "EU",
        }
    }

    /// ISO3-style code used by the World Bank indicators API.
    pub fn world_bank_code(&self) -> &'static str {
        match self {
            Region::CN => "CHN",
            Region::US => "USA",
            Region::EU => "EUU",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::CN => "China",
            Region::US => "United States",
            Region::EU => "European Union",
        }
    }
}

/// One value per tracked region. Serialized with the region codes as keys;
/// a key missing from stored JSON comes back as `T::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ByRegion<T> {
    #[serde(rename = "CN", default)]
    pub cn: T,
    #[serde(rename = "US", default)]
    pub us: T,
    #[serde(rename = "EU", default)]
    pub eu: T,
}

impl<T> ByRegion<T> {
    pub fn get(&self, region: Region) -> &T {
        match region {
            Region::CN => &self.cn,
            Region::US => &self.us,
            Region::EU => &self.eu,
        }
    }

    pub fn get_mut(&mut self, region: Region) -> &mut T {
        match region {
            Region::CN => &mut self.cn,
            Region::US => &mut self.us,
            Region::EU => &mut self.eu,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Region, &T)> {
        Region::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroRecord {
    pub gdp_yoy: Option<f64>,
    pub cpi_yoy: Option<f64>,
    pub ppi_yoy: Option<f64>,
    pub policy_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tenor {
    Y1,
    Y5,
    Y10,
}

impl Tenor {
    pub const ALL: [Tenor; 3] = [Tenor::Y1, Tenor::Y5, Tenor::Y10];

    pub fn label(&self) -> &'static str {
        match self {
            Tenor::Y1 => "1y",
            Tenor::Y5 => "5y",
            Tenor::Y10 => "10y",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondQuote {
    pub value: Option<f64>,
    pub change_bp: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BondCurve {
    #[serde(rename = "1y")]
    pub y1: BondQuote,
    #[serde(rename = "5y")]
    pub y5: BondQuote,
    #[serde(rename = "10y")]
    pub y10: BondQuote,
}

impl BondCurve {
    pub fn get(&self, tenor: Tenor) -> &BondQuote {
        match tenor {
            Tenor::Y1 => &self.y1,
            Tenor::Y5 => &self.y5,
            Tenor::Y10 => &self.y10,
        }
    }

    pub fn get_mut(&mut self, tenor: Tenor) -> &mut BondQuote {
        match tenor {
            Tenor::Y1 => &mut self.y1,
            Tenor::Y5 => &mut self.y5,
            Tenor::Y10 => &mut self.y10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSlot {
    Mkt1,
    Mkt2,
}

impl MarketSlot {
    pub const ALL: [MarketSlot; 2] = [MarketSlot::Mkt1, MarketSlot::Mkt2];

    pub fn label(&self) -> &'static str {
        match self {
            MarketSlot::Mkt1 => "mkt1",
            MarketSlot::Mkt2 => "mkt2",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexQuote {
    pub level: Option<f64>,
    pub change_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSlots {
    pub mkt1: IndexQuote,
    pub mkt2: IndexQuote,
}

impl MarketSlots {
    pub fn get(&self, slot: MarketSlot) -> &IndexQuote {
        match slot {
            MarketSlot::Mkt1 => &self.mkt1,
            MarketSlot::Mkt2 => &self.mkt2,
        }
    }

    pub fn get_mut(&mut self, slot: MarketSlot) -> &mut IndexQuote {
        match slot {
            MarketSlot::Mkt1 => &mut self.mkt1,
            MarketSlot::Mkt2 => &mut self.mkt2,
        }
    }
}

pub type MacroSnapshot = ByRegion<MacroRecord>;
pub type BondsSnapshot = ByRegion<BondCurve>;
pub type StocksSnapshot = ByRegion<MarketSlots>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub pub_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub year: i32,
    #[serde(flatten)]
    pub cpi: ByRegion<Option<f64>>,
}

/// Yearly CPI per region, ordered by year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistorySeries {
    rows: BTreeMap<i32, ByRegion<Option<f64>>>,
}

impl HistorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, year: i32, region: Region) -> Option<f64> {
        self.rows.get(&year).and_then(|row| *row.get(region))
    }

    /// Sets one cell, creating the year row if needed.
    pub fn set(&mut self, year: i32, region: Region, value: Option<f64>) {
        *self.rows.entry(year).or_default().get_mut(region) = value;
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.rows.keys().next_back().copied()
    }

    pub fn rows(&self) -> Vec<HistoryRow> {
        self.rows
            .iter()
            .map(|(year, cpi)| HistoryRow { year: *year, cpi: cpi.clone() })
            .collect()
    }

    /// Outer join on year. A non-null incoming cell overwrites the stored one;
    /// years only present on one side are kept as they are.
    pub fn merge(&mut self, incoming: HistorySeries) {
        for (year, cpi) in incoming.rows {
            let row = self.rows.entry(year).or_default();
            for region in Region::ALL {
                if let Some(value) = cpi.get(region) {
                    *row.get_mut(region) = Some(*value);
                }
            }
        }
    }
}
