//! Shared domain types.
//!
//! The ordinal grade enums in this file are the single authoritative source for
//! the categorical option sets. Options metadata served to clients and the
//! encoder-artifact validation both derive from `ALL` here.


use serde::{Deserialize, Serialize};

/// Cut quality, worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cut {
    Fair,
    Good,
    #[serde(rename = "Very Good")]
    VeryGood,
    Premium,
    Ideal,
}

impl Cut {
    pub const ALL: [Cut; 5] = [Cut::Fair, Cut::Good, Cut::VeryGood, Cut::Premium, Cut::Ideal];

    pub fn label(self) -> &'static str {
        match self {
            Cut::Fair => "Fair",
            Cut::Good => "Good",
            Cut::VeryGood => "Very Good",
            Cut::Premium => "Premium",
            Cut::Ideal => "Ideal",
        }
    }
}

/// Color grade. `D` is the best (colorless), `J` the worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    D,
    E,
    F,
    G,
    H,
    I,
    J,
}

impl Color {
    pub const ALL: [Color; 7] = [Color::D, Color::E, Color::F, Color::G, Color::H, Color::I, Color::J];

    pub fn label(self) -> &'static str {
        match self {
            Color::D => "D",
            Color::E => "E",
            Color::F => "F",
            Color::G => "G",
            Color::H => "H",
            Color::I => "I",
            Color::J => "J",
        }
    }
}

/// Clarity grade, worst (`I1`) to best (`IF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Clarity {
    I1,
    SI2,
    SI1,
    VS2,
    VS1,
    VVS2,
    VVS1,
    IF,
}

impl Clarity {
    pub const ALL: [Clarity; 8] = [
        Clarity::I1,
        Clarity::SI2,
        Clarity::SI1,
        Clarity::VS2,
        Clarity::VS1,
        Clarity::VVS2,
        Clarity::VVS1,
        Clarity::IF,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Clarity::I1 => "I1",
            Clarity::SI2 => "SI2",
            Clarity::SI1 => "SI1",
            Clarity::VS2 => "VS2",
            Clarity::VS1 => "VS1",
            Clarity::VVS2 => "VVS2",
            Clarity::VVS1 => "VVS1",
            Clarity::IF => "IF",
        }
    }
}

/// The three categorical attributes of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Cut,
    Color,
    Clarity,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 3] = [CategoricalField::Cut, CategoricalField::Color, CategoricalField::Clarity];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Cut => "cut",
            CategoricalField::Color => "color",
            CategoricalField::Clarity => "clarity",
        }
    }

    /// Allowed labels in ordinal order (index 0 is the lowest grade).
    pub fn categories(self) -> Vec<&'static str> {
        match self {
            CategoricalField::Cut => Cut::ALL.iter().map(|c| c.label()).collect(),
            CategoricalField::Color => Color::ALL.iter().map(|c| c.label()).collect(),
            CategoricalField::Clarity => Clarity::ALL.iter().map(|c| c.label()).collect(),
        }
    }
}

/// The six numeric attributes of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Carat,
    Depth,
    Table,
    X,
    Y,
    Z,
}

impl NumericField {
    pub const ALL: [NumericField; 6] = [
        NumericField::Carat,
        NumericField::Depth,
        NumericField::Table,
        NumericField::X,
        NumericField::Y,
        NumericField::Z,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::Carat => "carat",
            NumericField::Depth => "depth",
            NumericField::Table => "table",
            NumericField::X => "x",
            NumericField::Y => "y",
            NumericField::Z => "z",
        }
    }

    /// Conventional (advisory) input range used by clients for slider bounds.
    ///
    /// The core does not reject values outside this range; only negative and
    /// non-finite values are contract violations.
    pub fn conventional_range(self) -> NumericRange {
        match self {
            NumericField::Carat => NumericRange::new(0.2, 5.0, 0.1, 1.0),
            NumericField::Depth => NumericRange::new(40.0, 80.0, 0.1, 62.5),
            NumericField::Table => NumericRange::new(40.0, 80.0, 0.1, 58.0),
            NumericField::X => NumericRange::new(3.0, 10.0, 0.1, 5.7),
            NumericField::Y => NumericRange::new(3.0, 10.0, 0.1, 5.7),
            NumericField::Z => NumericRange::new(2.0, 8.0, 0.1, 3.5),
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            NumericField::Carat => "ct",
            NumericField::Depth | NumericField::Table => "%",
            NumericField::X | NumericField::Y | NumericField::Z => "mm",
        }
    }
}

/// Advisory bounds for a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl NumericRange {
    pub const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self { min, max, step, default }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Any one of the nine raw attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Numeric(NumericField),
    Categorical(CategoricalField),
}

/// Every raw attribute, in the column order the model was trained on.
pub const FEATURE_COLUMNS: [Field; 9] = [
    Field::Numeric(NumericField::Carat),
    Field::Numeric(NumericField::Depth),
    Field::Numeric(NumericField::Table),
    Field::Numeric(NumericField::X),
    Field::Numeric(NumericField::Y),
    Field::Numeric(NumericField::Z),
    Field::Categorical(CategoricalField::Cut),
    Field::Categorical(CategoricalField::Color),
    Field::Categorical(CategoricalField::Clarity),
];

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Numeric(f) => f.name(),
            Field::Categorical(f) => f.name(),
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        FEATURE_COLUMNS.iter().copied().find(|f| f.name() == name)
    }
}

/// One gemstone's attributes, as supplied by a caller.
///
/// Categorical fields are kept as strings: membership is checked by the
/// encoder against its stored mapping, so an unknown value surfaces as a
/// typed error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub carat: f64,
    pub depth: f64,
    pub table: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub cut: String,
    pub color: String,
    pub clarity: String,
}

impl RawRecord {
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Carat => self.carat,
            NumericField::Depth => self.depth,
            NumericField::Table => self.table,
            NumericField::X => self.x,
            NumericField::Y => self.y,
            NumericField::Z => self.z,
        }
    }

    pub fn numeric_mut(&mut self, field: NumericField) -> &mut f64 {
        match field {
            NumericField::Carat => &mut self.carat,
            NumericField::Depth => &mut self.depth,
            NumericField::Table => &mut self.table,
            NumericField::X => &mut self.x,
            NumericField::Y => &mut self.y,
            NumericField::Z => &mut self.z,
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Cut => &self.cut,
            CategoricalField::Color => &self.color,
            CategoricalField::Clarity => &self.clarity,
        }
    }

    pub fn categorical_mut(&mut self, field: CategoricalField) -> &mut String {
        match field {
            CategoricalField::Cut => &mut self.cut,
            CategoricalField::Color => &mut self.color,
            CategoricalField::Clarity => &mut self.clarity,
        }
    }

    /// The documented API example: a 1.5ct Ideal/G/VS1 stone.
    pub fn example() -> Self {
        Self {
            carat: 1.5,
            depth: 62.5,
            table: 58.0,
            x: 7.2,
            y: 7.1,
            z: 4.5,
            cut: Cut::Ideal.label().to_string(),
            color: Color::G.label().to_string(),
            clarity: Clarity::VS1.label().to_string(),
        }
    }

    /// Record built from each numeric field's conventional default and the
    /// best grade of each categorical field.
    pub fn client_default() -> Self {
        let mut record = Self {
            carat: 0.0,
            depth: 0.0,
            table: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            cut: Cut::Ideal.label().to_string(),
            color: Color::D.label().to_string(),
            clarity: Clarity::IF.label().to_string(),
        };
        for field in NumericField::ALL {
            *record.numeric_mut(field) = field.conventional_range().default;
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_columns_cover_every_field_once() {
        let names: Vec<&str> = FEATURE_COLUMNS.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            ["carat", "depth", "table", "x", "y", "z", "cut", "color", "clarity"]
        );
        for name in names {
            assert_eq!(Field::from_name(name).map(|f| f.name()), Some(name));
        }
        assert_eq!(Field::from_name("price"), None);
    }

    #[test]
    fn grade_labels_match_serde_names() {
        for cut in Cut::ALL {
            let json = serde_json::to_string(&cut).unwrap();
            assert_eq!(json, format!("\"{}\"", cut.label()));
        }
        assert_eq!(CategoricalField::Cut.categories()[2], "Very Good");
        assert_eq!(CategoricalField::Clarity.categories().last(), Some(&"IF"));
    }

    #[test]
    fn client_default_sits_inside_ranges() {
        let record = RawRecord::client_default();
        for field in NumericField::ALL {
            let range = field.conventional_range();
            let v = record.numeric(field);
            assert!(v >= range.min && v <= range.max, "{field:?} default {v} outside range");
        }
        assert_eq!(record.cut, "Ideal");
    }
}
