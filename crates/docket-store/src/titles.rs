//! Title de-duplication.
//!
//! Older clients minted copies as "Copy of X" or "X (Copy)". Those artifacts
//! are stripped and the result made unique with a " (n)" suffix.

use std::collections::HashSet;

use docket_graph::{Assignment, CreatedBy, Template};
use once_cell::sync::Lazy;
use regex::Regex;

static COPY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Copy of\s+").unwrap_or_else(|err| unreachable!("invalid pattern: {err}"))
});

static COPY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\(Copy\)\s*$").unwrap_or_else(|err| unreachable!("invalid pattern: {err}"))
});

/// Whether `title` carries a copy artifact
#[must_use]
pub fn has_copy_artifact(title: &str) -> bool {
    let trimmed = title.trim();
    COPY_PREFIX.is_match(trimmed) || COPY_SUFFIX.is_match(trimmed)
}

/// Remove every leading "Copy of " and trailing " (Copy)", so stacked
/// markers such as "Copy of Copy of X" collapse to "X".
#[must_use]
pub fn strip_auto_copy_artifacts(title: &str) -> String {
    let mut current = title.trim().to_owned();
    loop {
        let without_prefix = COPY_PREFIX.replace(&current, "");
        let next = COPY_SUFFIX.replace(&without_prefix, "").trim().to_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// `base` if free, otherwise the first free `base (n)` for n >= 2.
/// A blank base becomes "Untitled".
#[must_use]
pub fn next_unique_title(base: &str, taken: &HashSet<String>) -> String {
    let base = match base.trim() {
        "" => "Untitled",
        trimmed => trimmed,
    };
    if !taken.contains(base) {
        return base.to_owned();
    }
    (2_u32..)
        .map(|n| format!("{base} ({n})"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_owned())
}

/// Rename the titles selected by `needs` in place; titles not selected are
/// reserved first. Returns whether anything changed.
fn dedupe<'a>(titles: impl Iterator<Item = (&'a mut String, bool)>) -> bool {
    let entries: Vec<(&mut String, bool)> = titles.collect();
    let mut taken: HashSet<String> = entries
        .iter()
        .filter(|(_, needs)| !needs)
        .map(|(title, _)| (**title).clone())
        .collect();

    let mut changed = false;
    for (title, needs) in entries {
        if !needs {
            continue;
        }
        let unique = next_unique_title(&strip_auto_copy_artifacts(title), &taken);
        taken.insert(unique.clone());
        if *title != unique {
            *title = unique;
            changed = true;
        }
    }
    changed
}

/// Strip copy artifacts from attorney template titles and from assignment
/// titles, keeping each collection's titles unique. Returns whether anything
/// changed; running it twice is a no-op the second time.
pub fn normalize_titles(templates: &mut [Template], assignments: &mut [Assignment]) -> bool {
    let templates_changed = dedupe(templates.iter_mut().map(|template| {
        let needs = template.created_by == CreatedBy::Attorney && has_copy_artifact(&template.title);
        (&mut template.title, needs)
    }));
    let assignments_changed = dedupe(assignments.iter_mut().map(|assignment| {
        let needs = has_copy_artifact(&assignment.title);
        (&mut assignment.title, needs)
    }));
    templates_changed || assignments_changed
}
