//! Instrument-specific observation settings and their RTML schedule fragments.
//!
//! Every instrument rule validates the whole observation before emitting anything, so a
//! rejected setting never leaves a partially built group behind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::rtml::Element;
use crate::domain::{AppError, Constraints, Target};

/// Filters fitted to IO:O.
pub const IOO_FILTERS: &[&str] = &[
    "U",
    "R",
    "G",
    "I",
    "Z",
    "B",
    "V",
    "Halpha6566",
    "Halpha6634",
    "Halpha6705",
    "Halpha6755",
    "Halpha6822",
];

/// Filters fitted to Moptop.
pub const MOPTOP_FILTERS: &[&str] = &["B", "V", "R", "I", "L"];

/// Binning used by instruments without a configurable detector binning.
pub const DEFAULT_BINNING: &str = "1";

/// Supported instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Ioo,
    Ioi,
    Sprat,
    Frodo,
    Moptop,
}

impl Instrument {
    /// Name used in the `instrument` field of an observation.
    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Ioo => "IO:O",
            Instrument::Ioi => "IO:I",
            Instrument::Sprat => "Sprat",
            Instrument::Frodo => "Frodo",
            Instrument::Moptop => "Moptop",
        }
    }

    /// Allowed filter names, for multi-filter instruments.
    pub fn filters(&self) -> Option<&'static [&'static str]> {
        match self {
            Instrument::Ioo => Some(IOO_FILTERS),
            Instrument::Moptop => Some(MOPTOP_FILTERS),
            _ => None,
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sprat grating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grating {
    Red,
    Blue,
}

impl Grating {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "red" => Ok(Grating::Red),
            "blue" => Ok(Grating::Blue),
            other => Err(AppError::UnsupportedGrating(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grating::Red => "red",
            Grating::Blue => "blue",
        }
    }
}

/// FRODOspec arm resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    High,
    Low,
}

impl Resolution {
    pub fn parse(arm: FrodoArmColour, value: &str) -> Result<Self, AppError> {
        match value {
            "high" => Ok(Resolution::High),
            "low" => Ok(Resolution::Low),
            other => Err(AppError::UnsupportedResolution {
                arm: arm.as_str().to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::High => "high",
            Resolution::Low => "low",
        }
    }
}

/// Moptop half-wave plate rotor speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotorSpeed {
    Fast,
    Slow,
}

impl RotorSpeed {
    pub fn parse(filter: &str, value: &str) -> Result<Self, AppError> {
        match value {
            "fast" => Ok(RotorSpeed::Fast),
            "slow" => Ok(RotorSpeed::Slow),
            other => Err(AppError::UnsupportedRotorSpeed {
                filter: filter.to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RotorSpeed::Fast => "fast",
            RotorSpeed::Slow => "slow",
        }
    }
}

/// The two FRODOspec arms, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrodoArmColour {
    Blue,
    Red,
}

impl FrodoArmColour {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrodoArmColour::Blue => "Blue",
            FrodoArmColour::Red => "Red",
        }
    }
}

/// One IO:O filter request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterExposure {
    pub filter: String,
    /// Exposure time in seconds.
    pub exp_time: String,
    /// Number of exposures (multrun).
    pub exp_count: String,
}

impl FilterExposure {
    pub fn new(filter: &str, exp_time: &str, exp_count: &str) -> Self {
        Self { filter: filter.into(), exp_time: exp_time.into(), exp_count: exp_count.into() }
    }
}

/// One Moptop filter request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoptopFilter {
    pub filter: String,
    pub exp_time: String,
    pub rot_speed: String,
}

impl MoptopFilter {
    pub fn new(filter: &str, exp_time: &str, rot_speed: &str) -> Self {
        Self { filter: filter.into(), exp_time: exp_time.into(), rot_speed: rot_speed.into() }
    }
}

/// Settings for one FRODOspec arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrodoArm {
    pub exp_time: String,
    pub exp_count: String,
    pub resolution: String,
}

impl FrodoArm {
    pub fn new(exp_time: &str, exp_count: &str, resolution: &str) -> Self {
        Self {
            exp_time: exp_time.into(),
            exp_count: exp_count.into(),
            resolution: resolution.into(),
        }
    }
}

/// Instrument configuration for one observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instrument")]
pub enum ObservationSpec {
    /// Multi-filter optical imager; one schedule per filter.
    #[serde(rename = "IO:O")]
    Ioo { filters: Vec<FilterExposure>, binning: String },
    /// Single H-band infrared imager.
    #[serde(rename = "IO:I")]
    Ioi { exp_time: String, exp_count: String },
    /// Low resolution spectrograph.
    Sprat { exp_time: String, exp_count: String, grating: String },
    /// Dual-arm integral field spectrograph; always two schedules.
    Frodo { blue: FrodoArm, red: FrodoArm },
    /// Polarimeter; one schedule per filter, single exposure each.
    Moptop { filters: Vec<MoptopFilter> },
}

impl ObservationSpec {
    pub fn instrument(&self) -> Instrument {
        match self {
            ObservationSpec::Ioo { .. } => Instrument::Ioo,
            ObservationSpec::Ioi { .. } => Instrument::Ioi,
            ObservationSpec::Sprat { .. } => Instrument::Sprat,
            ObservationSpec::Frodo { .. } => Instrument::Frodo,
            ObservationSpec::Moptop { .. } => Instrument::Moptop,
        }
    }

    /// Check every instrument rule without building anything.
    pub fn validate(&self) -> Result<(), AppError> {
        let instrument = self.instrument();
        match self {
            ObservationSpec::Ioo { filters, binning } => {
                require(instrument, "binning", binning)?;
                require_any(instrument, filters)?;
                for f in filters {
                    check_filter(instrument, &f.filter)?;
                    require(instrument, "exp_time", &f.exp_time)?;
                    require(instrument, "exp_count", &f.exp_count)?;
                }
            }
            ObservationSpec::Moptop { filters } => {
                require_any(instrument, filters)?;
                for f in filters {
                    check_filter(instrument, &f.filter)?;
                    require(instrument, "exp_time", &f.exp_time)?;
                    RotorSpeed::parse(&f.filter, &f.rot_speed)?;
                }
            }
            ObservationSpec::Ioi { exp_time, exp_count } => {
                require(instrument, "exp_time", exp_time)?;
                require(instrument, "exp_count", exp_count)?;
            }
            ObservationSpec::Sprat { exp_time, exp_count, grating } => {
                require(instrument, "exp_time", exp_time)?;
                require(instrument, "exp_count", exp_count)?;
                Grating::parse(grating)?;
            }
            ObservationSpec::Frodo { blue, red } => {
                for (colour, arm) in [(FrodoArmColour::Blue, blue), (FrodoArmColour::Red, red)] {
                    require(instrument, &format!("exp_time_{}", colour.as_str()), &arm.exp_time)?;
                    require(instrument, &format!("exp_count_{}", colour.as_str()), &arm.exp_count)?;
                    Resolution::parse(colour, &arm.resolution)?;
                }
            }
        }
        Ok(())
    }

    /// Build the `Schedule` fragments for this observation, each embedding the target and
    /// constraint fragments.
    pub fn schedules(
        &self,
        target: &Target,
        constraints: &Constraints,
    ) -> Result<Vec<Element>, AppError> {
        self.validate()?;
        let parts = SharedParts { target: target.encode()?, constraints: constraints.encode()? };

        let schedules: Vec<Element> = match self {
            ObservationSpec::Ioo { filters, binning } => filters
                .iter()
                .map(|f| {
                    let setup = Element::new("Setup")
                        .child(Element::new("Filter").attr("type", f.filter.as_str()))
                        .child(detector(binning));
                    let device = device("IO:O", "camera", "optical", setup);
                    parts.schedule(device, &f.exp_count, &f.exp_time)
                })
                .collect(),
            ObservationSpec::Moptop { filters } => filters
                .iter()
                .map(|f| {
                    let speed = RotorSpeed::parse(&f.filter, &f.rot_speed)?;
                    let setup = Element::new("Setup")
                        .child(Element::new("Filter").attr("type", f.filter.as_str()))
                        .child(
                            Element::new("Device")
                                .attr("rotorSpeed", speed.as_str())
                                .attr("type", "half-wave_plate"),
                        );
                    let device = device("Moptop", "polarimeter", "optical", setup);
                    Ok(parts.schedule(device, "1", &f.exp_time))
                })
                .collect::<Result<_, AppError>>()?,
            ObservationSpec::Ioi { exp_time, exp_count } => {
                let setup = Element::new("Setup")
                    .child(Element::new("Filter").attr("type", "H"))
                    .child(detector(DEFAULT_BINNING));
                let device = device("IO:I", "camera", "infrared", setup);
                vec![parts.schedule(device, exp_count, exp_time)]
            }
            ObservationSpec::Sprat { exp_time, exp_count, grating } => {
                let grating = Grating::parse(grating)?;
                let setup = Element::new("Setup")
                    .child(Element::new("Grating").attr("name", grating.as_str()))
                    .child(detector(DEFAULT_BINNING));
                let device = device("Sprat", "spectrograph", "optical", setup);
                vec![parts.schedule(device, exp_count, exp_time)]
            }
            ObservationSpec::Frodo { blue, red } => {
                [(FrodoArmColour::Blue, blue), (FrodoArmColour::Red, red)]
                    .into_iter()
                    .map(|(colour, arm)| {
                        let resolution = Resolution::parse(colour, &arm.resolution)?;
                        let setup = Element::new("Setup")
                            .child(Element::new("Grating").attr("name", resolution.as_str()));
                        let name = format!("FrodoSpec-{}", colour.as_str());
                        let device = device(&name, "spectrograph", "optical", setup);
                        Ok(parts.schedule(device, &arm.exp_count, &arm.exp_time))
                    })
                    .collect::<Result<_, AppError>>()?
            }
        };

        Ok(schedules)
    }
}

struct SharedParts {
    target: Element,
    constraints: Vec<Element>,
}

impl SharedParts {
    fn schedule(&self, device: Element, count: &str, exp_time: &str) -> Element {
        let exposure = Element::new("Exposure")
            .attr("count", count)
            .child(Element::new("Value").attr("units", "seconds").text(exp_time));

        let mut schedule =
            Element::new("Schedule").child(device).child(exposure).child(self.target.clone());
        for constraint in &self.constraints {
            schedule.push(constraint.clone());
        }
        schedule
    }
}

fn device(name: &str, kind: &str, region: &str, setup: Element) -> Element {
    Element::new("Device")
        .attr("name", name)
        .attr("type", kind)
        .child(Element::new("SpectralRegion").text(region))
        .child(setup)
}

fn detector(binning: &str) -> Element {
    Element::new("Detector").child(
        Element::new("Binning")
            .child(Element::new("X").attr("units", "pixels").text(binning))
            .child(Element::new("Y").attr("units", "pixels").text(binning)),
    )
}

fn require(instrument: Instrument, field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::MissingField {
            instrument: instrument.name().to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_any<T>(instrument: Instrument, filters: &[T]) -> Result<(), AppError> {
    if filters.is_empty() {
        return Err(AppError::MissingField {
            instrument: instrument.name().to_string(),
            field: "filters".to_string(),
        });
    }
    Ok(())
}

fn check_filter(instrument: Instrument, filter: &str) -> Result<(), AppError> {
    let allowed = instrument.filters().unwrap_or_default();
    if !allowed.contains(&filter) {
        return Err(AppError::UnsupportedFilter {
            instrument: instrument.name().to_string(),
            filter: filter.to_string(),
        });
    }
    Ok(())
}
