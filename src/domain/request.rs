//! Top-level RTML request assembly.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::domain::rtml::{self, Element, Mode};
use crate::domain::{AccountConfig, AppError, Constraints, ObservationSpec, Target};

/// One observation in a group: instrument settings plus where and when.
///
/// `constraints` left as `None` inherit the group-level constraints at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
    #[serde(flatten)]
    pub spec: ObservationSpec,
}

impl Observation {
    pub fn new(target: Target, spec: ObservationSpec) -> Self {
        Self { target, constraints: None, spec }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }
}

/// Produces group uids of the form `<prefix>_<unix seconds>`.
///
/// Uids issued by one generator are strictly increasing even when two groups are built within
/// the same second.
#[derive(Debug)]
pub struct UidGenerator {
    prefix: String,
    last: Cell<i64>,
}

impl UidGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), last: Cell::new(i64::MIN) }
    }

    pub fn next(&self) -> String {
        self.next_at(chrono::Utc::now().timestamp())
    }

    pub fn next_at(&self, unix_seconds: i64) -> String {
        let value = unix_seconds.max(self.last.get().saturating_add(1));
        self.last.set(value);
        format!("{}_{}", self.prefix, value)
    }
}

/// Build a `mode="request"` document for a group of observations.
///
/// Every observation is validated before any fragment is kept; the first failure aborts the
/// whole group.
pub fn build_submission(
    account: &AccountConfig,
    uid: &str,
    observations: &[Observation],
    group_constraints: Option<&Constraints>,
) -> Result<Element, AppError> {
    if observations.is_empty() {
        return Err(AppError::EmptyGroup);
    }
    if let Some(constraints) = group_constraints {
        constraints.check_complete()?;
    }

    let mut document = rtml::root(Mode::Request, uid).child(project(account));
    for observation in observations {
        let constraints = observation
            .constraints
            .as_ref()
            .or(group_constraints)
            .ok_or_else(|| AppError::IncompleteConstraints { key: "constraints".to_string() })?;
        constraints.check_complete()?;

        for schedule in observation.spec.schedules(&observation.target, constraints)? {
            document.push(schedule);
        }
    }

    Ok(document)
}

/// Build a `mode="abort"` document cancelling the group `uid`.
pub fn build_cancellation(account: &AccountConfig, uid: &str) -> Element {
    let contact = Element::new("Contact")
        .child(Element::new("Username").text(account.username.as_str()))
        .child(Element::new("Name").text(""))
        .child(Element::new("Communication"));
    let project =
        Element::new("Project").attr("ProjectID", account.proposal.as_str()).child(contact);

    rtml::root(Mode::Abort, uid).child(project)
}

fn project(account: &AccountConfig) -> Element {
    let contact = Element::new("Contact")
        .child(Element::new("Username").text(account.username.as_str()))
        .child(Element::new("Name").text(account.username.as_str()));
    Element::new("Project").attr("ProjectID", account.proposal.as_str()).child(contact)
}
