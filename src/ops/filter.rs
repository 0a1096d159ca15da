//! Visibility predicate for goals and projects.
//!
//! Every filter present in [`TreeOptions`] is ANDed together; absent filters
//! are skipped.

use crate::model::{Treeable, TreeOptions};

/// Build the composed predicate for `options`.
///
/// The returned closure borrows `options` and has no side effects.
pub fn build_predicate(options: &TreeOptions) -> impl Fn(&dyn Treeable) -> bool + '_ {
    move |entity: &dyn Treeable| matches(entity, options)
}

/// Whether `entity` is visible under `options`.
pub fn matches(entity: &dyn Treeable, options: &TreeOptions) -> bool {
    space_matches(entity, options)
        && champion_matches(entity, options)
        && reviewer_matches(entity, options)
        && status_visible(entity, options)
        && timeframe_matches(entity, options)
}

fn space_matches(entity: &dyn Treeable, options: &TreeOptions) -> bool {
    match &options.space_id {
        Some(space) => entity.space_id() == space,
        None => true,
    }
}

fn champion_matches(entity: &dyn Treeable, options: &TreeOptions) -> bool {
    match &options.person_id {
        Some(person) => entity.champion_id() == Some(person.as_str()),
        None => true,
    }
}

fn reviewer_matches(entity: &dyn Treeable, options: &TreeOptions) -> bool {
    match &options.reviewer_id {
        Some(reviewer) => entity.reviewer_id() == Some(reviewer.as_str()),
        None => true,
    }
}

/// Closed and archived entities bypass the status toggles; the consumer
/// flags them instead.
fn status_visible(entity: &dyn Treeable, options: &TreeOptions) -> bool {
    if entity.is_closed() || entity.is_archived() {
        return true;
    }
    options.shows_status(entity.status())
}

/// Entities without a timeframe are never excluded by the timeframe filter.
fn timeframe_matches(entity: &dyn Treeable, options: &TreeOptions) -> bool {
    match (&options.timeframe, entity.timeframe()) {
        (Some(bound), Some(tf)) => tf.overlaps(bound),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Goal, Project, Status, Timeframe};

    fn goal() -> Goal {
        let mut g = Goal::new("g1", "Grow revenue");
        g.space_id = "sales".into();
        g.champion_id = Some("alice".into());
        g.reviewer_id = Some("bob".into());
        g.timeframe = Timeframe::quarter(2025, 2);
        g
    }

    #[test]
    fn no_filters_passes_everything() {
        let opts = TreeOptions::default();
        assert!(matches(&goal(), &opts));
        assert!(matches(&Project::new("p1", "Ship"), &opts));
    }

    #[test]
    fn space_filter() {
        assert!(matches(&goal(), &TreeOptions::default().with_space("sales")));
        assert!(!matches(&goal(), &TreeOptions::default().with_space("eng")));
    }

    #[test]
    fn person_and_reviewer_are_independent_and_filters() {
        let g = goal();
        assert!(matches(&g, &TreeOptions::default().with_person("alice")));
        assert!(!matches(&g, &TreeOptions::default().with_person("bob")));
        assert!(matches(&g, &TreeOptions::default().with_reviewer("bob")));
        assert!(matches(
            &g,
            &TreeOptions::default().with_person("alice").with_reviewer("bob")
        ));
        assert!(!matches(
            &g,
            &TreeOptions::default().with_person("alice").with_reviewer("carol")
        ));
    }

    #[test]
    fn missing_champion_fails_person_filter() {
        let p = Project::new("p1", "Ship");
        assert!(!matches(&p, &TreeOptions::default().with_person("alice")));
    }

    #[test]
    fn status_toggles() {
        let opts = TreeOptions::default().with_statuses(true, false, false);
        assert!(matches(&goal(), &opts));
        assert!(!matches(&goal().with_status(Status::Paused), &opts));
        assert!(!matches(&goal().with_status(Status::Completed), &opts));

        let only_completed = TreeOptions::default().with_statuses(false, false, true);
        assert!(matches(&goal().with_status(Status::Completed), &only_completed));
        assert!(!matches(&goal(), &only_completed));
    }

    #[test]
    fn closed_and_archived_bypass_status_toggles() {
        let opts = TreeOptions::default().with_statuses(false, false, false);
        let mut closed = goal().with_status(Status::Completed);
        closed.closed = true;
        assert!(matches(&closed, &opts));

        let mut archived = Project::new("p1", "Old").with_status(Status::Paused);
        archived.archived = true;
        assert!(matches(&archived, &opts));
        assert!(!matches(&goal(), &opts));
    }

    #[test]
    fn timeframe_overlap() {
        let g = goal();
        let h1 = TreeOptions::default().with_timeframe(Timeframe::half(2025, 1).unwrap());
        let q3 = TreeOptions::default().with_timeframe(Timeframe::quarter(2025, 3).unwrap());
        assert!(matches(&g, &h1));
        assert!(!matches(&g, &q3));
    }

    #[test]
    fn entity_without_timeframe_passes_timeframe_filter() {
        let p = Project::new("p1", "Ship");
        let opts = TreeOptions::default().with_timeframe(Timeframe::year(2030).unwrap());
        assert!(matches(&p, &opts));
    }

    #[test]
    fn predicate_agrees_with_matches() {
        let opts = TreeOptions::default().with_space("sales").with_person("alice");
        let pred = build_predicate(&opts);
        let (hit, miss) = (goal(), Goal::new("g2", "Other"));
        let hit: &dyn Treeable = &hit;
        let miss: &dyn Treeable = &miss;
        assert!(pred(hit));
        assert!(!pred(miss));
    }
}
