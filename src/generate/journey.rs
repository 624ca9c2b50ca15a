use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::personality::{Personality, FORGETFUL_ERROR_RATE};
use super::plans::{CarePlan, MasterPlan, MASTER_PLANS};
use crate::model::{Appointment, AppointmentType};

const BUSINESS_HOURS: std::ops::RangeInclusive<u32> = 8..=16;
const QUARTER_HOURS: [u32; 4] = [0, 15, 30, 45];
const MRN_RANGE: std::ops::RangeInclusive<u64> = 1_000_000..=9_999_999;

/// Every patient needs a distinct 7-digit MRN.
pub const MAX_PATIENTS: usize = 9_000_000;

/// Parameters of one generated dataset.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub patients: usize,
    /// Journeys start between 1 and 14 days after this date.
    pub today: NaiveDate,
    /// Personalities to draw schedulers from; empty means all of them.
    pub personalities: Vec<Personality>,
}

/// A booked step of a care plan.
pub type Booking = (NaiveDateTime, AppointmentType);

/// First weekday on or after `start` that the patient has nothing booked on.
pub fn next_available_day(start: NaiveDate, booked: &HashSet<NaiveDate>) -> NaiveDate {
    let mut day = start;
    while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) || booked.contains(&day) {
        day += Duration::days(1);
    }
    day
}

fn at_business_time<R: Rng + ?Sized>(rng: &mut R, day: NaiveDate) -> NaiveDateTime {
    let hour = rng.gen_range(BUSINESS_HOURS);
    let minute = *QUARTER_HOURS.choose(rng).unwrap_or(&0);
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    day.and_time(time)
}

/// Books every step of `plan` for one patient, starting no earlier than
/// `start`. Booked dates are recorded in `booked` so later phases avoid them.
pub fn schedule_phase<R: Rng + ?Sized>(
    rng: &mut R,
    personality: Personality,
    plan: &CarePlan,
    start: NaiveDate,
    booked: &mut HashSet<NaiveDate>,
) -> Vec<Booking> {
    let mut bookings: Vec<Booking> = Vec::with_capacity(plan.steps.len());

    match personality {
        Personality::Diligent => {
            let mut candidate = start;
            for step in plan.steps {
                let previous = bookings.last().map(|(t, _)| t.date());
                if let Some(previous) = previous {
                    candidate = previous + Duration::days(plan.min_gap());
                }
                let day = next_available_day(candidate, booked);
                if let (Some(previous), Some(max_gap)) = (previous, plan.max_gap_days) {
                    let gap = (day - previous).num_days();
                    if gap > max_gap {
                        debug!(plan = plan.name, gap, max_gap, "step booked beyond the plan's max gap");
                    }
                }
                bookings.push((at_business_time(rng, day), step.clone()));
                booked.insert(day);
            }
        }
        Personality::Hasty | Personality::Forgetful => {
            let mut candidate = start;
            for step in plan.steps {
                let day = next_available_day(candidate, booked);
                bookings.push((at_business_time(rng, day), step.clone()));
                booked.insert(day);
                candidate = day + Duration::days(rng.gen_range(2..=5));
            }

            if personality == Personality::Forgetful
                && plan.is_multi_step()
                && rng.gen_bool(FORGETFUL_ERROR_RATE)
            {
                make_forgetful_error(rng, plan, &mut bookings);
            }
        }
    }

    bookings
}

/// Breaks a plan the way a forgetful scheduler does: steps that need a gap
/// are crammed onto the first step's day, otherwise the steps are booked in
/// reverse order.
fn make_forgetful_error<R: Rng + ?Sized>(rng: &mut R, plan: &CarePlan, bookings: &mut [Booking]) {
    if plan.min_gap() > 0 {
        debug!(plan = plan.name, "forgetful scheduler booked the whole plan on one day");
        let base_day = bookings[0].0.date();
        for booking in bookings.iter_mut().skip(1) {
            booking.0 = at_business_time(rng, base_day);
        }
    } else {
        debug!(plan = plan.name, "forgetful scheduler reversed the plan");
        let mut times: Vec<NaiveDateTime> = bookings.iter().map(|(t, _)| *t).collect();
        times.reverse();
        for (booking, time) in bookings.iter_mut().zip(times) {
            booking.0 = time;
        }
    }
}

fn unique_number<R: Rng + ?Sized>(
    rng: &mut R,
    range: std::ops::RangeInclusive<u64>,
    taken: &mut HashSet<u64>,
) -> u64 {
    loop {
        let candidate = rng.gen_range(range.clone());
        if taken.insert(candidate) {
            return candidate;
        }
    }
}

/// Generates longitudinal journeys for `config.patients` patients.
///
/// Every patient gets a unique MRN, one scheduler personality and one master
/// plan. The result is sorted by patient, then timestamp. Callers must keep
/// `config.patients` at or below [`MAX_PATIENTS`].
pub fn generate_appointments<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
) -> Vec<Appointment> {
    let mut appointments = Vec::new();
    let mut patient_ids = HashSet::new();
    let mut appointment_ids = HashSet::new();

    for _ in 0..config.patients {
        let mrn = unique_number(rng, MRN_RANGE, &mut patient_ids);
        let personality = Personality::choose(rng, &config.personalities);
        let master_plan: &MasterPlan = MASTER_PLANS.choose(rng).unwrap_or(&MASTER_PLANS[0]);
        debug!(mrn, plan = master_plan.name, scheduler = %personality, "generating journey");

        let mut cursor = config.today + Duration::days(rng.gen_range(1..=14));
        let mut booked = HashSet::new();

        for phase in master_plan.phases {
            cursor += Duration::weeks(phase.weeks_after);
            let bookings = schedule_phase(rng, personality, phase.plan, cursor, &mut booked);

            if let Some((last, _)) = bookings.last() {
                cursor = last.date();
            }

            for (timestamp, appointment_type) in bookings {
                let id = unique_number(rng, 10_000_000..=99_999_999, &mut appointment_ids);
                appointments.push(Appointment {
                    id: format!("APT-{}", id),
                    patient_id: mrn.to_string(),
                    appointment_type,
                    timestamp,
                    scheduler_id: personality.scheduler_id().to_string(),
                });
            }
        }
    }

    appointments.sort_by(|a, b| {
        a.patient_id
            .cmp(&b.patient_id)
            .then(a.timestamp.cmp(&b.timestamp))
    });
    appointments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::scan_appointments;
    use crate::generate::plans::{CHEMO_CYCLE, IMAGING_FOLLOWUP, INITIAL_VISIT};
    use chrono::Timelike;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(personalities: Vec<Personality>) -> GeneratorConfig {
        GeneratorConfig {
            patients: 40,
            today: date(2024, 1, 1),
            personalities,
        }
    }

    #[test]
    fn patient_cap_matches_the_mrn_range() {
        let size = MRN_RANGE.end() - MRN_RANGE.start() + 1;
        assert_eq!(MAX_PATIENTS as u64, size);
    }

    #[test]
    fn next_available_day_skips_weekends_and_booked_days() {
        // 2024-01-06 is a Saturday
        let mut booked = HashSet::new();
        assert_eq!(next_available_day(date(2024, 1, 6), &booked), date(2024, 1, 8));
        booked.insert(date(2024, 1, 8));
        assert_eq!(next_available_day(date(2024, 1, 6), &booked), date(2024, 1, 9));
        assert_eq!(next_available_day(date(2024, 1, 3), &booked), date(2024, 1, 3));
    }

    #[test]
    fn bookings_fall_in_business_hours() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let t = at_business_time(&mut rng, date(2024, 1, 2));
            assert!((8..=16).contains(&t.hour()));
            assert_eq!(t.minute() % 15, 0);
            assert_eq!(t.second(), 0);
        }
    }

    #[test]
    fn diligent_honours_min_gap() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut booked = HashSet::new();
        let bookings = schedule_phase(
            &mut rng,
            Personality::Diligent,
            &IMAGING_FOLLOWUP,
            date(2024, 1, 2),
            &mut booked,
        );
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].1, AppointmentType::Mammogram);
        assert_eq!(bookings[0].0.date(), date(2024, 1, 2));
        assert_eq!(bookings[1].1, AppointmentType::OncologyVisit);
        assert_eq!(bookings[1].0.date(), date(2024, 1, 4));
        assert_eq!(booked.len(), 2);
    }

    #[test]
    fn diligent_chemo_cycle_lands_on_distinct_days() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut booked = HashSet::new();
        let bookings = schedule_phase(
            &mut rng,
            Personality::Diligent,
            &CHEMO_CYCLE,
            date(2024, 1, 5),
            &mut booked,
        );
        // Friday lab, chemo pushed past the weekend
        assert_eq!(bookings[0].0.date(), date(2024, 1, 5));
        assert_eq!(bookings[1].0.date(), date(2024, 1, 8));
    }

    #[test]
    fn hasty_leaves_spare_days_but_keeps_order() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let mut booked = HashSet::new();
            let bookings = schedule_phase(
                &mut rng,
                Personality::Hasty,
                &CHEMO_CYCLE,
                date(2024, 1, 2),
                &mut booked,
            );
            let gap = (bookings[1].0.date() - bookings[0].0.date()).num_days();
            assert!((2..=7).contains(&gap), "gap {gap}");
        }
    }

    #[test]
    fn single_step_plans_are_never_broken() {
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..50 {
            let mut booked = HashSet::new();
            let bookings = schedule_phase(
                &mut rng,
                Personality::Forgetful,
                &INITIAL_VISIT,
                date(2024, 1, 2),
                &mut booked,
            );
            assert_eq!(bookings.len(), 1);
            assert_eq!(bookings[0].0.date(), date(2024, 1, 2));
        }
    }

    #[test]
    fn same_seed_gives_same_dataset() {
        let cfg = config(Vec::new());
        let first = generate_appointments(&mut StdRng::seed_from_u64(42), &cfg);
        let second = generate_appointments(&mut StdRng::seed_from_u64(42), &cfg);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn dataset_is_sorted_with_unique_ids() {
        let appointments = generate_appointments(&mut StdRng::seed_from_u64(9), &config(Vec::new()));
        let ids: HashSet<&str> = appointments.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), appointments.len());

        for pair in appointments.windows(2) {
            let key = |a: &Appointment| (a.patient_id.clone(), a.timestamp);
            assert!(key(&pair[0]) <= key(&pair[1]));
        }

        let patients: HashSet<&str> = appointments.iter().map(|a| a.patient_id.as_str()).collect();
        assert_eq!(patients.len(), 40);
        assert!(appointments.iter().all(|a| a.id.starts_with("APT-") && a.id.len() == 12));
    }

    #[test]
    fn diligent_schedulers_produce_clean_data() {
        let cfg = config(vec![Personality::Diligent]);
        let appointments = generate_appointments(&mut StdRng::seed_from_u64(11), &cfg);
        let now = cfg.today.and_hms_opt(0, 0, 0).unwrap();
        let outcome = scan_appointments(&appointments, now, 400);
        assert_eq!(outcome.considered, appointments.len());
        assert!(outcome.flagged.is_empty(), "{:?}", outcome.flagged);
    }

    #[test]
    fn forgetful_schedulers_get_flagged() {
        let cfg = config(vec![Personality::Forgetful]);
        let appointments = generate_appointments(&mut StdRng::seed_from_u64(12), &cfg);
        let now = cfg.today.and_hms_opt(0, 0, 0).unwrap();
        let outcome = scan_appointments(&appointments, now, 400);
        assert!(!outcome.flagged.is_empty());
        assert!(outcome
            .flagged
            .iter()
            .all(|p| p.scheduler_id == "scheduler_C_forgetful"));
    }
}
