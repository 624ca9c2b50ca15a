use std::fmt;

use chrono::NaiveDate;

use crate::model::{Appointment, AppointmentType};

/// A pairwise temporal rule: every appointment of `trigger` type must have a
/// `related` appointment in place relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub trigger: AppointmentType,
    pub related: AppointmentType,
    /// Half-width of the search window around the trigger, in days.
    pub window_days: i64,
    /// Raise a flag when no related appointment is found at all.
    pub require_related: bool,
    /// Minimum calendar-date gap between related and trigger.
    pub min_gap_days: Option<i64>,
    pub messages: RuleMessages,
}

/// Message templates for one rule. `{trigger_date}` and `{related_date}`
/// are replaced with the calendar dates of the two appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMessages {
    pub missing: &'static str,
    pub out_of_order: &'static str,
    pub too_soon: &'static str,
}

impl RuleMessages {
    fn for_kind(&self, kind: FlagKind) -> &'static str {
        match kind {
            FlagKind::Missing => self.missing,
            FlagKind::OutOfOrder => self.out_of_order,
            FlagKind::TooSoon => self.too_soon,
        }
    }
}

/// The fixed rule table. Adding a rule means adding a row here.
pub static RULES: &[Rule] = &[
    Rule {
        trigger: AppointmentType::Chemo,
        related: AppointmentType::Lab,
        window_days: 7,
        require_related: true,
        min_gap_days: Some(1),
        messages: RuleMessages {
            missing: "Critical Error: A Chemo on {trigger_date} has no Lab test scheduled within the prior 7 days.",
            out_of_order: "Order Error: Lab on {related_date} is AFTER Chemo on {trigger_date}.",
            // a one-day minimum only fails when both fall on the same date
            too_soon: "Timing Error: Lab on {related_date} is on the same day as Chemo on {trigger_date}. Must be at least 1 day prior.",
        },
    },
    Rule {
        trigger: AppointmentType::OncologyVisit,
        related: AppointmentType::Mammogram,
        window_days: 14,
        require_related: false,
        min_gap_days: Some(2),
        messages: RuleMessages {
            missing: "Critical Error: An Oncology Visit on {trigger_date} has no Mammogram scheduled within the prior 14 days.",
            out_of_order: "Order Error: Oncology Visit on {trigger_date} is BEFORE its related Mammogram on {related_date}.",
            too_soon: "Timing Error: Visit on {trigger_date} is too soon after Mammogram on {related_date} (requires 2-day gap for results).",
        },
    },
    Rule {
        trigger: AppointmentType::RadiationTherapy,
        related: AppointmentType::CtSimulation,
        window_days: 14,
        require_related: false,
        min_gap_days: None,
        messages: RuleMessages {
            missing: "Critical Error: A Radiation Therapy on {trigger_date} has no CT Simulation scheduled within the prior 14 days.",
            out_of_order: "Order Error: Radiation Therapy on {trigger_date} is BEFORE its planning CT Simulation on {related_date}.",
            too_soon: "Timing Error: Radiation Therapy on {trigger_date} is too soon after its planning CT Simulation on {related_date}.",
        },
    },
];

/// Rules whose trigger matches the given appointment type.
pub fn rules_for(kind: &AppointmentType) -> impl Iterator<Item = &'static Rule> + '_ {
    RULES.iter().filter(move |rule| &rule.trigger == kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// No related appointment inside the window.
    Missing,
    /// The related appointment is scheduled after the trigger.
    OutOfOrder,
    /// The related appointment precedes the trigger by too few days.
    TooSoon,
}

/// One detected rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Flag {
    pub kind: FlagKind,
    pub trigger: AppointmentType,
    pub trigger_date: NaiveDate,
    pub related: AppointmentType,
    pub related_date: Option<NaiveDate>,
    pub window_days: i64,
    pub min_gap_days: Option<i64>,
    /// Message template taken from the rule that raised the flag.
    pub template: &'static str,
}

impl Rule {
    /// Applies this rule to one trigger appointment given the related
    /// appointment found for it (if any).
    ///
    /// Ordering is checked before timing and only one flag is raised per
    /// trigger, so an appointment that is both out of order and too close
    /// only reports the ordering problem.
    pub fn evaluate(&self, trigger: &Appointment, related: Option<&Appointment>) -> Option<Flag> {
        let flag = |kind: FlagKind, related_date: Option<NaiveDate>| Flag {
            kind,
            trigger: self.trigger.clone(),
            trigger_date: trigger.date(),
            related: self.related.clone(),
            related_date,
            window_days: self.window_days,
            min_gap_days: self.min_gap_days,
            template: self.messages.for_kind(kind),
        };

        let Some(related) = related else {
            return self.require_related.then(|| flag(FlagKind::Missing, None));
        };

        if related.timestamp > trigger.timestamp {
            return Some(flag(FlagKind::OutOfOrder, Some(related.date())));
        }

        let gap_days = (trigger.date() - related.date()).num_days();
        match self.min_gap_days {
            Some(min_gap) if gap_days < min_gap => Some(flag(FlagKind::TooSoon, Some(related.date()))),
            _ => None,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let related_date = self
            .related_date
            .map(|d| d.to_string())
            .unwrap_or_default();
        let message = self
            .template
            .replace("{trigger_date}", &self.trigger_date.to_string())
            .replace("{related_date}", &related_date);
        f.write_str(&message)
    }
}
