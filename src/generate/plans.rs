use crate::model::AppointmentType;

/// A small building block of a treatment journey: appointment types booked
/// together, with the gap expected between consecutive steps.
#[derive(Debug, PartialEq, Eq)]
pub struct CarePlan {
    pub name: &'static str,
    pub steps: &'static [AppointmentType],
    pub min_gap_days: Option<i64>,
    pub max_gap_days: Option<i64>,
}

impl CarePlan {
    /// Gap used between steps when the plan does not specify one.
    pub fn min_gap(&self) -> i64 {
        self.min_gap_days.unwrap_or(1)
    }

    pub fn is_multi_step(&self) -> bool {
        self.steps.len() > 1
    }
}

pub static INITIAL_VISIT: CarePlan = CarePlan {
    name: "initial_visit",
    steps: &[AppointmentType::OncologyVisit],
    min_gap_days: None,
    max_gap_days: None,
};

pub static CHEMO_CYCLE: CarePlan = CarePlan {
    name: "chemo_cycle",
    steps: &[AppointmentType::Lab, AppointmentType::Chemo],
    min_gap_days: Some(0),
    max_gap_days: Some(2),
};

pub static IMAGING_FOLLOWUP: CarePlan = CarePlan {
    name: "imaging_followup",
    steps: &[AppointmentType::Mammogram, AppointmentType::OncologyVisit],
    min_gap_days: Some(2),
    max_gap_days: Some(7),
};

pub static RADIATION_PREP: CarePlan = CarePlan {
    name: "radiation_prep",
    steps: &[AppointmentType::CtSimulation, AppointmentType::RadiationTherapy],
    min_gap_days: Some(1),
    max_gap_days: Some(5),
};

/// One phase of a master plan, starting `weeks_after` weeks after the last
/// appointment of the previous phase.
#[derive(Debug)]
pub struct Phase {
    pub plan: &'static CarePlan,
    pub weeks_after: i64,
}

/// A longitudinal patient journey made of care-plan phases.
#[derive(Debug)]
pub struct MasterPlan {
    pub name: &'static str,
    pub phases: &'static [Phase],
}

pub static MASTER_PLANS: &[MasterPlan] = &[
    MasterPlan {
        name: "standard_chemo",
        phases: &[
            Phase { plan: &INITIAL_VISIT, weeks_after: 0 },
            Phase { plan: &CHEMO_CYCLE, weeks_after: 2 },
            Phase { plan: &CHEMO_CYCLE, weeks_after: 3 },
            Phase { plan: &CHEMO_CYCLE, weeks_after: 3 },
            Phase { plan: &CHEMO_CYCLE, weeks_after: 3 },
            Phase { plan: &IMAGING_FOLLOWUP, weeks_after: 6 },
        ],
    },
    MasterPlan {
        name: "radiation_regimen",
        phases: &[
            Phase { plan: &INITIAL_VISIT, weeks_after: 0 },
            Phase { plan: &RADIATION_PREP, weeks_after: 2 },
            // mid-radiation checkup
            Phase { plan: &INITIAL_VISIT, weeks_after: 3 },
            Phase { plan: &IMAGING_FOLLOWUP, weeks_after: 8 },
        ],
    },
    MasterPlan {
        name: "active_surveillance",
        phases: &[
            Phase { plan: &INITIAL_VISIT, weeks_after: 0 },
            Phase { plan: &IMAGING_FOLLOWUP, weeks_after: 24 },
            Phase { plan: &IMAGING_FOLLOWUP, weeks_after: 24 },
        ],
    },
];
