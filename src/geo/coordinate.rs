// Parsing of exiftool GPS coordinate strings
//
// Accepted forms (per value, hemisphere letter required):
//   52 deg 30' 36.00" N
//   52 deg 30' 36.00'' N
//   52°30'36" N
//   52.51 N

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{MediaCheckError, Result};

static DMS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s*(?P<deg>\d+(?:\.\d+)?)\s*(?:deg|°)?\s*(?:(?P<min>\d+(?:\.\d+)?)\s*')?\s*(?:(?P<sec>\d+(?:\.\d+)?)\s*(?:"|''))?\s*(?P<hemi>[NSEW])\s*,?\s*$"#,
    ).unwrap()
});

/// Latitude/longitude pair as exiftool prints them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub latitude: String,
    pub longitude: String,
}

impl Coordinate {
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
        }
    }

    /// Decimal degrees, (lat, lon)
    pub fn to_decimal(&self) -> Result<(f64, f64)> {
        let (lat, lat_hemi) = parse_component(&self.latitude)?;
        let (lon, lon_hemi) = parse_component(&self.longitude)?;

        let lat = match lat_hemi {
            'N' => lat,
            'S' => -lat,
            _ => {
                return Err(MediaCheckError::Coordinate(format!(
                    "latitude {} has longitude reference",
                    self.latitude
                )))
            }
        };
        let lon = match lon_hemi {
            'E' => lon,
            'W' => -lon,
            _ => {
                return Err(MediaCheckError::Coordinate(format!(
                    "longitude {} has latitude reference",
                    self.longitude
                )))
            }
        };

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(MediaCheckError::Coordinate(format!(
                "{} {} out of range",
                self.latitude, self.longitude
            )));
        }

        Ok((lat, lon))
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Absolute decimal degrees plus hemisphere letter.
fn parse_component(s: &str) -> Result<(f64, char)> {
    let caps = DMS_RE
        .captures(s)
        .ok_or_else(|| MediaCheckError::Coordinate(format!("can't parse {:?}", s)))?;

    let number = |name: &str| -> f64 {
        caps.name(name)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    let degrees = number("deg") + number("min") / 60.0 + number("sec") / 3600.0;
    let hemi = caps
        .name("hemi")
        .and_then(|m| m.as_str().chars().next())
        .unwrap_or('N');

    Ok((degrees, hemi))
}
