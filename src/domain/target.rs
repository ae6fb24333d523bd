use serde::{Deserialize, Serialize};

use crate::domain::AppError;
use crate::domain::rtml::Element;

/// A named sky position in sexagesimal notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub name: String,
    /// Right ascension, `HH:MM:SS.SS`.
    pub ra: String,
    /// Declination, `+/-DD:MM:SS.SS`.
    pub dec: String,
}

impl Target {
    pub fn new(name: impl Into<String>, ra: impl Into<String>, dec: impl Into<String>) -> Self {
        Self { name: name.into(), ra: ra.into(), dec: dec.into() }
    }

    /// Encode as an RTML `Target` fragment.
    ///
    /// Only the shape of each coordinate is checked; values are passed through untouched.
    pub fn encode(&self) -> Result<Element, AppError> {
        let [hours, minutes, seconds] = split_sexagesimal("RA", &self.ra)?;
        let [degrees, arcminutes, arcseconds] = split_sexagesimal("Dec", &self.dec)?;

        let right_ascension = Element::new("RightAscension")
            .child(Element::new("Hours").text(hours))
            .child(Element::new("Minutes").text(minutes))
            .child(Element::new("Seconds").text(seconds));
        let declination = Element::new("Declination")
            .child(Element::new("Degrees").text(degrees))
            .child(Element::new("Arcminutes").text(arcminutes))
            .child(Element::new("Arcseconds").text(arcseconds));

        let coordinates = Element::new("Coordinates")
            .child(right_ascension)
            .child(declination)
            .child(Element::new("Equinox").text("None"));

        Ok(Element::new("Target").attr("name", self.name.as_str()).child(coordinates))
    }
}

fn split_sexagesimal<'a>(axis: &str, value: &'a str) -> Result<[&'a str; 3], AppError> {
    let parts: Vec<&str> = value.trim().split(':').collect();
    match parts.as_slice() {
        [a, b, c] if !a.is_empty() && !b.is_empty() && !c.is_empty() => Ok([*a, *b, *c]),
        _ => Err(AppError::MalformedCoordinate {
            axis: axis.to_string(),
            value: value.to_string(),
        }),
    }
}
