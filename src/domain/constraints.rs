use serde::{Deserialize, Serialize};

use crate::domain::AppError;
use crate::domain::rtml::Element;

/// Scheduling constraints shared by every schedule fragment they are attached to.
///
/// All values are kept as entered; the service does its own numeric parsing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constraints {
    /// Maximum allowable airmass.
    pub air_mass: String,
    /// Maximum sky brightness (dark + X magnitudes).
    pub sky_bright: String,
    /// Maximum FWHM seeing in arcseconds.
    pub seeing: String,
    /// `yes` or `no`.
    pub photometric: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    /// `HH:MM` or `HH:MM:SS[.ss]`.
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
}

impl Constraints {
    /// Field names and values in declaration order.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("air_mass", self.air_mass.as_str()),
            ("sky_bright", self.sky_bright.as_str()),
            ("seeing", self.seeing.as_str()),
            ("photometric", self.photometric.as_str()),
            ("start_date", self.start_date.as_str()),
            ("start_time", self.start_time.as_str()),
            ("end_date", self.end_date.as_str()),
            ("end_time", self.end_time.as_str()),
        ]
    }

    /// Fails with the first empty field, in declaration order.
    pub fn check_complete(&self) -> Result<(), AppError> {
        match self.fields().into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(AppError::IncompleteConstraints { key: key.to_string() }),
            None => Ok(()),
        }
    }

    /// Encode the five RTML constraint fragments, in schedule order.
    pub fn encode(&self) -> Result<Vec<Element>, AppError> {
        self.check_complete()?;
        let clouds = cloud_clause(&self.photometric)?;
        let start = timestamp("start_time", &self.start_date, &self.start_time)?;
        let end = timestamp("end_time", &self.end_date, &self.end_time)?;

        let airmass = Element::new("AirmassConstraint").attr("maximum", self.air_mass.as_str());
        let sky = Element::new("SkyConstraint")
            .child(Element::new("Flux").text(self.sky_bright.as_str()))
            .child(Element::new("Units").text("magnitudes/square-arcsecond"));
        let seeing = Element::new("SeeingConstraint")
            .attr("maximum", self.seeing.as_str())
            .attr("units", "arcseconds");
        let extinction =
            Element::new("ExtinctionConstraint").child(Element::new("Clouds").text(clouds));
        let window = Element::new("DateTimeConstraint")
            .attr("type", "include")
            .child(
                Element::new("DateTimeStart")
                    .attr("system", "UT")
                    .attr("value", start),
            )
            .child(
                Element::new("DateTimeEnd")
                    .attr("system", "UT")
                    .attr("value", end),
            );

        Ok(vec![airmass, sky, seeing, extinction, window])
    }
}

fn cloud_clause(photometric: &str) -> Result<&'static str, AppError> {
    match photometric {
        "yes" => Ok("clear"),
        "no" => Ok("light"),
        other => Err(AppError::InvalidConstraintValue {
            key: "photometric".to_string(),
            value: other.to_string(),
        }),
    }
}

/// `<date>T<time>+00:00`, padding `HH:MM` out to whole seconds.
///
/// The time must be `HH:MM` or `HH:MM:SS[.ss]`; anything else is an invalid `key`.
fn timestamp(key: &str, date: &str, time: &str) -> Result<String, AppError> {
    let (date, time) = (date.trim(), time.trim());
    let fields: Vec<&str> = time.split(':').collect();
    if !(2..=3).contains(&fields.len()) || fields.iter().any(|f| f.is_empty()) {
        return Err(AppError::InvalidConstraintValue {
            key: key.to_string(),
            value: time.to_string(),
        });
    }
    if fields.len() == 2 {
        Ok(format!("{}T{}:00+00:00", date, time))
    } else {
        Ok(format!("{}T{}+00:00", date, time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints() -> Constraints {
        Constraints {
            air_mass: "2.0".into(),
            sky_bright: "2.0".into(),
            seeing: "1.2".into(),
            photometric: "yes".into(),
            start_date: "2020-02-18".into(),
            start_time: "18:00".into(),
            end_date: "2020-02-28".into(),
            end_time: "00:00:00.00".into(),
        }
    }

    #[test]
    fn encodes_five_fragments_in_order() {
        let fragments = constraints().encode().unwrap();
        let names: Vec<&str> = fragments.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "AirmassConstraint",
                "SkyConstraint",
                "SeeingConstraint",
                "ExtinctionConstraint",
                "DateTimeConstraint"
            ]
        );
        assert_eq!(fragments[0].attribute("maximum"), Some("2.0"));
        let units = fragments[1].path("Units").unwrap().text.as_deref();
        assert_eq!(units, Some("magnitudes/square-arcsecond"));
        assert_eq!(fragments[2].attribute("units"), Some("arcseconds"));
    }

    #[test]
    fn photometric_maps_to_cloud_clause() {
        let clouds = |c: &Constraints| {
            c.encode().unwrap()[3].path("Clouds").and_then(|e| e.text.clone()).unwrap()
        };
        assert_eq!(clouds(&constraints()), "clear");
        assert_eq!(clouds(&Constraints { photometric: "no".into(), ..constraints() }), "light");
    }

    #[test]
    fn rejects_unknown_photometric_flag() {
        let err = Constraints { photometric: "Yes".into(), ..constraints() }.encode().unwrap_err();
        let named =
            matches!(err, AppError::InvalidConstraintValue { ref key, .. } if key == "photometric");
        assert!(named);
    }

    #[test]
    fn window_is_utc_with_zero_offset() {
        let fragments = constraints().encode().unwrap();
        let window = &fragments[4];
        assert_eq!(window.attribute("type"), Some("include"));
        assert_eq!(
            window.find("DateTimeStart").unwrap().attribute("value"),
            Some("2020-02-18T18:00:00+00:00")
        );
        assert_eq!(
            window.find("DateTimeEnd").unwrap().attribute("value"),
            Some("2020-02-28T00:00:00.00+00:00")
        );
    }

    #[test]
    fn times_without_minutes_are_rejected() {
        for time in ["18", "18:", "18:00:00:00", ":30"] {
            let err =
                Constraints { start_time: time.into(), ..constraints() }.encode().unwrap_err();
            assert!(
                matches!(err, AppError::InvalidConstraintValue { ref key, ref value }
                    if key == "start_time" && value == time),
                "time {:?}",
                time
            );
        }

        let err =
            Constraints { end_time: "midnight".into(), ..constraints() }.encode().unwrap_err();
        let named =
            matches!(err, AppError::InvalidConstraintValue { ref key, .. } if key == "end_time");
        assert!(named);
    }

    #[test]
    fn first_empty_field_is_reported() {
        let err = Constraints { seeing: String::new(), end_time: String::new(), ..constraints() }
            .check_complete()
            .unwrap_err();
        match err {
            AppError::IncompleteConstraints { key } => assert_eq!(key, "seeing"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let c = Constraints { air_mass: "  ".into(), ..constraints() };
        assert!(matches!(c.encode(), Err(AppError::IncompleteConstraints { .. })));
    }

    #[test]
    fn deserializes_from_toml() {
        let c: Constraints = toml::from_str(
            r#"
air_mass = "2.0"
sky_bright = "2.0"
seeing = "1.2"
photometric = "yes"
start_date = "2020-02-18"
start_time = "18:00"
end_date = "2020-02-28"
end_time = "00:00:00.00"
"#,
        )
        .unwrap();
        assert_eq!(c, constraints());
    }
}
