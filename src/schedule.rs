//! Ritual scheduling: which medications and skincare steps are due today,
//! and whether they have been done.

use crate::dates::{weekday_code, yesterday};
use crate::models::{
    MedFrequency, Medication, RitualStatus, SkinFrequency, SkincareItem, TimeOfDay,
};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence<'a> {
    Daily,
    EveryOtherDay,
    AsNeeded,
    SpecificDays(&'a [String]),
}

/// Anything with a recurring schedule and a single daily completion flag.
pub trait Ritual {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn time_of_day(&self) -> TimeOfDay;
    fn cadence(&self) -> Cadence<'_>;
    fn last_completed(&self) -> Option<NaiveDateTime>;
    fn set_last_completed(&mut self, at: Option<NaiveDateTime>);
}

impl Ritual for Medication {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    fn cadence(&self) -> Cadence<'_> {
        match self.frequency {
            MedFrequency::Daily => Cadence::Daily,
            MedFrequency::EveryOtherDay => Cadence::EveryOtherDay,
            MedFrequency::AsNeeded => Cadence::AsNeeded,
        }
    }

    fn last_completed(&self) -> Option<NaiveDateTime> {
        self.last_taken_date
    }

    fn set_last_completed(&mut self, at: Option<NaiveDateTime>) {
        self.last_taken_date = at;
    }
}

impl Ritual for SkincareItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn time_of_day(&self) -> TimeOfDay {
        self.time_of_day
    }

    fn cadence(&self) -> Cadence<'_> {
        match self.frequency {
            SkinFrequency::Daily => Cadence::Daily,
            SkinFrequency::EveryOtherDay => Cadence::EveryOtherDay,
            SkinFrequency::SpecificDays => {
                Cadence::SpecificDays(self.specific_days.as_deref().unwrap_or_default())
            }
        }
    }

    fn last_completed(&self) -> Option<NaiveDateTime> {
        self.last_used_date
    }

    fn set_last_completed(&mut self, at: Option<NaiveDateTime>) {
        self.last_used_date = at;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    NotDue,
    Pending,
    /// Done today. Still due, so the undo toggle stays available.
    Completed,
}

pub fn is_completed_today<R: Ritual + ?Sized>(item: &R, now: NaiveDateTime) -> bool {
    item.last_completed()
        .is_some_and(|at| at.date() == now.date())
}

pub fn is_due_today<R: Ritual + ?Sized>(item: &R, now: NaiveDateTime) -> bool {
    let today = now.date();
    match item.cadence() {
        Cadence::Daily | Cadence::AsNeeded => true,
        // Alternates from the most recent completion, not a fixed epoch.
        Cadence::EveryOtherDay => match item.last_completed() {
            Some(at) => at.date() != yesterday(today),
            None => true,
        },
        Cadence::SpecificDays(days) => {
            let code = weekday_code(today);
            days.iter().any(|day| day.trim().eq_ignore_ascii_case(code))
        }
    }
}

pub fn due_state<R: Ritual + ?Sized>(item: &R, now: NaiveDateTime) -> DueState {
    if !is_due_today(item, now) {
        DueState::NotDue
    } else if is_completed_today(item, now) {
        DueState::Completed
    } else {
        DueState::Pending
    }
}

/// Flips today's completion and returns the new state. Earlier days are untouched.
pub fn toggle_completion<R: Ritual + ?Sized>(item: &mut R, now: NaiveDateTime) -> bool {
    if is_completed_today(item, now) {
        item.set_last_completed(None);
        false
    } else {
        item.set_last_completed(Some(now));
        true
    }
}

/// Medications that count while surgery mode is on or off.
pub fn applicable(meds: &[Medication], surgery_mode: bool) -> impl Iterator<Item = &Medication> {
    meds.iter().filter(move |med| !surgery_mode || med.surgery_safe)
}

/// The first pending medication, earliest bucket first.
pub fn next_up(meds: &[Medication], surgery_mode: bool, now: NaiveDateTime) -> Option<&Medication> {
    applicable(meds, surgery_mode)
        .filter(|med| due_state(*med, now) == DueState::Pending)
        .min_by_key(|med| med.time_of_day)
}

/// Share of today's rituals already done, as a percentage.
pub fn compliance(
    meds: &[Medication],
    skincare: &[SkincareItem],
    surgery_mode: bool,
    now: NaiveDateTime,
) -> f64 {
    let mut total = 0usize;
    let mut done = 0usize;
    for med in applicable(meds, surgery_mode) {
        total += 1;
        done += usize::from(is_completed_today(med, now));
    }
    for item in skincare {
        total += 1;
        done += usize::from(is_completed_today(item, now));
    }
    if total == 0 {
        return 0.0;
    }
    done as f64 / total as f64 * 100.0
}

pub fn statuses(
    meds: &[Medication],
    skincare: &[SkincareItem],
    surgery_mode: bool,
    now: NaiveDateTime,
) -> Vec<RitualStatus> {
    let meds = meds.iter().map(|med| RitualStatus {
        id: med.id.clone(),
        name: med.name.clone(),
        is_medication: true,
        time_of_day: med.time_of_day,
        state: due_state(med, now),
        locked: surgery_mode && !med.surgery_safe,
    });
    let skincare = skincare.iter().map(|item| RitualStatus {
        id: item.id.clone(),
        name: item.name.clone(),
        is_medication: false,
        time_of_day: item.time_of_day,
        state: due_state(item, now),
        locked: false,
    });
    meds.chain(skincare).collect()
}

/// Marks a medication unsafe when its name contains any flagged name.
/// Returns how many were flagged.
pub fn apply_surgery_triage(meds: &mut [Medication], unsafe_names: &[String]) -> usize {
    let flagged: Vec<String> = unsafe_names
        .iter()
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect();
    let mut count = 0;
    for med in meds.iter_mut() {
        let name = med.name.to_lowercase();
        med.surgery_safe = !flagged.iter().any(|unsafe_name| name.contains(unsafe_name));
        count += usize::from(!med.surgery_safe);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MedicationType;
    use chrono::{Duration, NaiveDate};

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn med(id: &str, frequency: MedFrequency, time_of_day: TimeOfDay) -> Medication {
        Medication {
            id: id.to_string(),
            name: format!("Med {id}"),
            dose: "1 tab".to_string(),
            kind: MedicationType::Supplement,
            frequency,
            time_of_day,
            instructions: None,
            warning_label: None,
            surgery_safe: true,
            last_taken_date: None,
        }
    }

    fn serum(days: &[&str]) -> SkincareItem {
        SkincareItem {
            id: "s3".to_string(),
            name: "Retinol".to_string(),
            brand: "Kiehl's".to_string(),
            active_ingredient: None,
            note: None,
            time_of_day: TimeOfDay::Night,
            last_used_date: None,
            frequency: SkinFrequency::SpecificDays,
            specific_days: Some(days.iter().map(|day| day.to_string()).collect()),
        }
    }

    #[test]
    fn toggling_twice_restores_completion() {
        let now = at(10, 8);
        let mut item = med("1", MedFrequency::Daily, TimeOfDay::Morning);

        assert!(toggle_completion(&mut item, now));
        assert!(is_completed_today(&item, now));
        assert!(!toggle_completion(&mut item, now));
        assert!(!is_completed_today(&item, now));
        assert_eq!(item.last_taken_date, None);
    }

    #[test]
    fn toggling_replaces_an_older_completion() {
        let mut item = med("1", MedFrequency::Daily, TimeOfDay::Morning);
        item.last_taken_date = Some(at(9, 8));

        assert!(toggle_completion(&mut item, at(10, 9)));
        assert_eq!(item.last_taken_date, Some(at(10, 9)));
    }

    #[test]
    fn every_other_day_alternates_from_last_completion() {
        let mut item = med("4", MedFrequency::EveryOtherDay, TimeOfDay::Night);
        assert!(is_due_today(&item, at(10, 8)));

        item.last_taken_date = Some(at(10, 21));
        assert!(is_due_today(&item, at(10, 22)));
        assert_eq!(due_state(&item, at(10, 22)), DueState::Completed);
        assert!(!is_due_today(&item, at(11, 8)));
        assert_eq!(due_state(&item, at(11, 8)), DueState::NotDue);
        assert!(is_due_today(&item, at(12, 8)));
        assert_eq!(due_state(&item, at(12, 8)), DueState::Pending);
    }

    #[test]
    fn specific_days_follow_weekday_codes() {
        // 2026-03-09 is a Monday.
        let item = serum(&["Mon", "Thu"]);
        assert!(is_due_today(&item, at(9, 20)));
        assert!(!is_due_today(&item, at(10, 20)));
        assert!(is_due_today(&item, at(12, 20)));

        let mut never = serum(&[]);
        never.specific_days = None;
        assert!(!is_due_today(&never, at(9, 20)));
    }

    #[test]
    fn as_needed_is_always_due() {
        let item = med("9", MedFrequency::AsNeeded, TimeOfDay::Midday);
        for offset in 0..3 {
            assert!(is_due_today(&item, at(10, 12) + Duration::days(offset)));
        }
    }

    #[test]
    fn next_up_prefers_earlier_buckets_and_skips_paused() {
        let now = at(10, 9);
        let mut night = med("n", MedFrequency::Daily, TimeOfDay::Night);
        night.name = "Night".into();
        let mut morning = med("m", MedFrequency::Daily, TimeOfDay::Morning);
        morning.surgery_safe = false;
        let midday = med("d", MedFrequency::Daily, TimeOfDay::Midday);
        let meds = vec![night, morning, midday];

        assert_eq!(next_up(&meds, false, now).map(|m| m.id.as_str()), Some("m"));
        assert_eq!(next_up(&meds, true, now).map(|m| m.id.as_str()), Some("d"));
    }

    #[test]
    fn compliance_counts_applicable_meds_and_skincare() {
        let now = at(10, 9);
        let mut taken = med("1", MedFrequency::Daily, TimeOfDay::Morning);
        taken.last_taken_date = Some(now);
        let pending = med("2", MedFrequency::Daily, TimeOfDay::Morning);

        let percent = compliance(&[taken, pending], &[serum(&["Mon"])], false, now);
        assert!((percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(compliance(&[], &[], false, now), 0.0);
    }

    #[test]
    fn triage_flags_by_case_insensitive_name_fragment() {
        let mut meds = vec![
            med("1", MedFrequency::Daily, TimeOfDay::Morning),
            med("2", MedFrequency::Daily, TimeOfDay::Morning),
        ];
        meds[0].name = "Estrofem (Estradiol)".into();
        meds[1].name = "Vitamin C".into();

        let flagged = apply_surgery_triage(&mut meds, &["estrofem".to_string(), " ".to_string()]);
        assert_eq!(flagged, 1);
        assert!(!meds[0].surgery_safe);
        assert!(meds[1].surgery_safe);
    }
}
