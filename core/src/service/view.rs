use std::cmp::{Ordering, Reverse};

use icu_normalizer::DecomposingNormalizerBorrowed;

use crate::model::task::Task;
use crate::model::view::{FilterMode, SortOrder};

/// The `(search, filter, sort)` inputs of the displayed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub search: String,
    pub filter: FilterMode,
    pub sort: SortOrder,
}

impl ViewQuery {
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        derive_view(tasks, &self.search, self.filter, self.sort)
    }
}

/// Completion filter, then case-insensitive search on `text`, then a stable
/// sort on `text`. The input slice is never reordered.
pub fn derive_view(tasks: &[Task], search: &str, filter: FilterMode, sort: SortOrder) -> Vec<Task> {
    let needle = search.to_lowercase();
    let mut view: Vec<Task> = tasks
        .iter()
        .filter(|t| filter.matches(t))
        .filter(|t| needle.is_empty() || t.text.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    // sort_by_cached_key is stable: equal texts keep collection order in both directions.
    match sort {
        SortOrder::Asc => view.sort_by_cached_key(|t| CollationKey::new(&t.text)),
        SortOrder::Desc => view.sort_by_cached_key(|t| Reverse(CollationKey::new(&t.text))),
    }
    view
}

/// Ordering that ignores accents and case first, then puts unaccented before
/// accented and lowercase before uppercase ("agua" < "Água" < "banana" and
/// "apple" < "Apple").
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

// Field order is comparison order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct CollationKey {
    base: Vec<char>,
    accents: Vec<Vec<char>>,
    upper: Vec<bool>,
}

impl CollationKey {
    fn new(text: &str) -> Self {
        let nfd = DecomposingNormalizerBorrowed::new_nfd();
        let mut key = CollationKey {
            base: Vec::new(),
            accents: Vec::new(),
            upper: Vec::new(),
        };
        for c in nfd.normalize_iter(text.chars()) {
            if is_combining_mark(c) {
                if let Some(marks) = key.accents.last_mut() {
                    marks.push(c);
                }
                continue;
            }
            key.base.extend(c.to_lowercase());
            key.accents.push(Vec::new());
            key.upper.push(c.is_uppercase());
        }
        key
    }
}

fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}
