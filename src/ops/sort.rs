use std::cmp::Ordering;

use crate::model::{SortColumn, SortDirection, Status, Treeable};
use crate::ops::tree::TreeNode;

/// Compare two entities for display order.
///
/// `direction` flips the primary key only. Missing progress or timeframe
/// sorts last in both directions, and ties are always broken by id
/// ascending, so the result is a total order.
pub fn compare(
    a: &dyn Treeable,
    b: &dyn Treeable,
    column: SortColumn,
    direction: SortDirection,
) -> Ordering {
    let primary = match column {
        SortColumn::Name => directed(name_key(a).cmp(&name_key(b)), direction),
        SortColumn::Progress => {
            missing_last(a.progress(), b.progress(), direction, |x, y| x.total_cmp(y))
        }
        SortColumn::Timeframe => {
            missing_last(a.timeframe(), b.timeframe(), direction, |x, y| {
                x.start.cmp(&y.start).then(x.end.cmp(&y.end))
            })
        }
        SortColumn::Status => directed(status_rank(a).cmp(&status_rank(b)), direction),
    };
    primary.then_with(|| a.id().cmp(b.id()))
}

/// Stable in-place sort of one sibling group
pub fn sort_nodes(nodes: &mut [TreeNode], column: SortColumn, direction: SortDirection) {
    nodes.sort_by(|a, b| compare(&a.entity, &b.entity, column, direction));
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

fn missing_last<T>(
    a: Option<T>,
    b: Option<T>,
    direction: SortDirection,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(cmp(&x, &y), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive, locale-independent: compares lowercased code points.
fn name_key(entity: &dyn Treeable) -> String {
    entity.name().to_lowercase()
}

fn status_rank(entity: &dyn Treeable) -> u8 {
    if entity.is_completed() {
        return 2;
    }
    match entity.status() {
        Status::Active => 0,
        Status::Paused => 1,
        Status::Completed => 2,
    }
}
