//! Property tests for the calendar store and recurrence expander.

use calendar_engine::{
    expand_by_count, expand_until, format_date_time, Calendar, EditRequest, EditScope, Event,
    EventDraft, SeriesIdAllocator,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use proptest::prelude::*;

const SUBJECTS: [&str; 4] = ["Standup", "Review", "Lunch", "Gym"];

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

/// Events within four weeks of 2025-06-02, 15-minute granularity, up to 3h long.
fn arb_draft() -> impl Strategy<Value = EventDraft> {
    (0..SUBJECTS.len(), 0u32..28, 0u32..88, 0u32..12).prop_map(|(s, day, slot, len)| {
        let start = base() + Duration::days(day.into()) + Duration::minutes(i64::from(slot) * 15);
        let end = start + Duration::minutes(i64::from(len) * 15);
        EventDraft::new(SUBJECTS[s], start).with_end(end)
    })
}

fn arb_weekdays() -> impl Strategy<Value = Vec<Weekday>> {
    prop::collection::vec(0u8..7, 1..5).prop_map(|days| {
        days.into_iter()
            .map(|d| Weekday::try_from(d).unwrap())
            .collect()
    })
}

fn arb_instant() -> impl Strategy<Value = NaiveDateTime> {
    (0u32..28 * 96).prop_map(|slot| base() + Duration::minutes(i64::from(slot) * 15))
}

/// One step of a mutation sequence, applied to whichever event `pick` lands on.
#[derive(Debug, Clone)]
enum Step {
    Remove(prop::sample::Index),
    MoveStart(prop::sample::Index, EditScope, i64),
    Rename(prop::sample::Index, EditScope, usize),
}

fn arb_scope() -> impl Strategy<Value = EditScope> {
    prop_oneof![
        Just(EditScope::Single),
        Just(EditScope::Forward),
        Just(EditScope::Entire),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<prop::sample::Index>().prop_map(Step::Remove),
        (any::<prop::sample::Index>(), arb_scope(), -8i64..8)
            .prop_map(|(pick, scope, slots)| Step::MoveStart(pick, scope, slots * 15)),
        (any::<prop::sample::Index>(), arb_scope(), 0..SUBJECTS.len())
            .prop_map(|(pick, scope, s)| Step::Rename(pick, scope, s)),
    ]
}

fn edit_request(target: &Event, scope: EditScope, property: &str, value: String) -> EditRequest {
    EditRequest::new(scope, property, target.subject(), target.start(), value)
        .with_end(target.end())
}

/// Apply `step`; a rejected edit must leave the calendar untouched.
fn apply(calendar: &mut Calendar, step: &Step) -> Result<(), TestCaseError> {
    if calendar.is_empty() {
        return Ok(());
    }
    let before = calendar.events().to_vec();
    let request = match step {
        Step::Remove(pick) => {
            prop_assert!(calendar.remove(pick.get(&before)));
            prop_assert_eq!(calendar.len(), before.len() - 1);
            return Ok(());
        }
        Step::MoveStart(pick, scope, minutes) => {
            let target = pick.get(&before);
            let start = target.start() + Duration::minutes(*minutes);
            edit_request(target, *scope, "start", format_date_time(start))
        }
        Step::Rename(pick, scope, s) => {
            edit_request(pick.get(&before), *scope, "subject", SUBJECTS[*s].to_string())
        }
    };
    if calendar.try_edit(&request).is_err() {
        prop_assert_eq!(calendar.events(), before.as_slice());
    }
    Ok(())
}

fn build(drafts: Vec<EventDraft>) -> Calendar {
    let mut calendar = Calendar::new();
    for draft in drafts {
        calendar.create_event(draft).unwrap();
    }
    calendar
}

proptest! {
    #[test]
    fn stored_events_stay_sorted_and_unique(drafts in prop::collection::vec(arb_draft(), 0..40)) {
        let calendar = build(drafts);
        let events = calendar.events();
        for pair in events.windows(2) {
            prop_assert!(pair[0].start() <= pair[1].start());
            prop_assert!(!pair[0].same_identity(&pair[1]));
        }
    }

    #[test]
    fn order_survives_removals_and_edits(
        drafts in prop::collection::vec(arb_draft(), 0..15),
        weekdays in arb_weekdays(),
        count in 1u32..8,
        steps in prop::collection::vec(arb_step(), 1..25),
    ) {
        let mut calendar = build(drafts);
        let series = EventDraft::new("Standup", base() + Duration::hours(9))
            .with_end(base() + Duration::hours(9) + Duration::minutes(15));
        calendar.create_series_by_count(&series, &weekdays, count).unwrap();

        for step in &steps {
            apply(&mut calendar, step)?;
            for pair in calendar.events().windows(2) {
                prop_assert!(pair[0].start() <= pair[1].start(), "after {:?}", step);
                prop_assert!(!pair[0].same_identity(&pair[1]), "after {:?}", step);
            }
        }
    }

    #[test]
    fn adding_a_stored_event_again_is_rejected(
        drafts in prop::collection::vec(arb_draft(), 1..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut calendar = build(drafts);
        let before = calendar.events().to_vec();
        let again = pick.get(&before).clone();
        prop_assert!(!calendar.add(again));
        prop_assert_eq!(calendar.events(), before.as_slice());
    }

    #[test]
    fn range_query_matches_strict_overlap(
        drafts in prop::collection::vec(arb_draft(), 0..30),
        a in arb_instant(),
        b in arb_instant(),
    ) {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        let calendar = build(drafts);
        let expected: Vec<&Event> = calendar
            .events()
            .iter()
            .filter(|e| e.start() < to && e.end() > from)
            .collect();
        prop_assert_eq!(calendar.events_in_range(from, to), expected);
    }

    #[test]
    fn busy_at_agrees_with_half_open_intervals(
        drafts in prop::collection::vec(arb_draft(), 0..30),
        instant in arb_instant(),
    ) {
        let calendar = build(drafts);
        let expected = calendar
            .events()
            .iter()
            .any(|e| e.start() <= instant && instant < e.end());
        prop_assert_eq!(calendar.is_busy_at(instant), expected);
    }

    #[test]
    fn count_expansion_has_exact_size_and_allowed_weekdays(
        draft in arb_draft(),
        weekdays in arb_weekdays(),
        count in 1u32..30,
    ) {
        let (start, end) = draft.bounds();
        prop_assume!(start.date() == end.date());
        let mut ids = SeriesIdAllocator::new();
        let occurrences = expand_by_count(&draft, &weekdays, count, &mut ids).unwrap();

        prop_assert_eq!(occurrences.len(), count as usize);
        let series = occurrences[0].series_id();
        prop_assert!(series.is_some());
        for pair in occurrences.windows(2) {
            prop_assert!(pair[0].start() < pair[1].start());
        }
        for event in &occurrences {
            prop_assert!(weekdays.contains(&event.start().weekday()));
            prop_assert!(event.start().date() >= draft.start.date());
            prop_assert_eq!(event.start().time(), draft.start.time());
            prop_assert_eq!(event.series_id(), series);
        }
    }

    #[test]
    fn until_expansion_stays_within_window(
        draft in arb_draft(),
        weekdays in arb_weekdays(),
        weeks in 0i64..8,
    ) {
        let last = draft.start.date() + Duration::weeks(weeks);
        let mut ids = SeriesIdAllocator::new();
        if let Ok(occurrences) = expand_until(&draft, &weekdays, last, &mut ids) {
            prop_assert!(!occurrences.is_empty());
            for event in &occurrences {
                let date = event.start().date();
                prop_assert!(draft.start.date() <= date && date <= last);
                prop_assert!(weekdays.contains(&date.weekday()));
            }
        }
    }

    #[test]
    fn rejected_series_leaves_calendar_untouched(
        drafts in prop::collection::vec(arb_draft(), 1..20),
        pick in any::<prop::sample::Index>(),
        count in 1u32..6,
    ) {
        let mut calendar = build(drafts);
        let before = calendar.events().to_vec();
        let stored = pick.get(&before);
        prop_assume!(stored.start().date() == stored.end().date());

        // A series whose first occurrence is the stored event itself.
        let draft = EventDraft::new(stored.subject(), stored.start()).with_end(stored.end());
        let weekday = stored.start().weekday();
        prop_assert_eq!(calendar.create_series_by_count(&draft, &[weekday], count), Ok(false));
        prop_assert_eq!(calendar.events(), before.as_slice());
    }
}
