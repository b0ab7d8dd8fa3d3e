use time::OffsetDateTime;

use crate::error::Result;
use crate::units::LengthUnit;

/// Global-section values written into every file.
#[derive(Debug, Clone, PartialEq)]
pub struct IgesSettings {
    pub units: LengthUnit,
    /// Free text of the start section.
    pub description: String,
    pub file_name: String,
    pub author: String,
    pub organization: String,
    pub product_id: String,
    pub system_id: String,
    /// `YYYYMMDD.HHMMSS`, used for both generation and modification dates.
    pub timestamp: String,
    /// Minimum user-intended resolution, in model units.
    pub resolution: f64,
    /// Approximate maximum coordinate value, in model units.
    pub max_coordinate: f64,
}

impl Default for IgesSettings {
    fn default() -> Self {
        Self {
            units: LengthUnit::Meters,
            description: "patchwork geometry export".into(),
            file_name: "model.igs".into(),
            author: String::new(),
            organization: String::new(),
            product_id: "patchwork".into(),
            system_id: concat!("patchwork ", env!("CARGO_PKG_VERSION")).into(),
            timestamp: "20000101.000000".into(),
            resolution: 1e-8,
            max_coordinate: 1000.0,
        }
    }
}

impl IgesSettings {
    /// Default settings stamped with the current UTC time.
    #[must_use]
    pub fn stamped_now() -> Self {
        Self {
            timestamp: format_timestamp(OffsetDateTime::now_utc()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: LengthUnit) -> Self {
        self.units = units;
        self
    }

    /// Sets the units from a name such as `"meters"` or `"mm"`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::IgesError::UnsupportedUnit`] for unknown names.
    pub fn with_units_str(self, units: &str) -> Result<Self> {
        Ok(self.with_units(units.parse()?))
    }

    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>, organization: impl Into<String>) -> Self {
        self.author = author.into();
        self.organization = organization.into();
        self
    }
}

fn format_timestamp(t: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}.{:02}{:02}{:02}",
        t.year(),
        u8::from(t.month()),
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}
