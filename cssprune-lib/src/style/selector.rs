use crate::class_set::ClassSet;

/// True for the characters a class token may contain: ASCII word characters and `-`.
fn is_class_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

/// Returns every class token in `selector`, in order of appearance.
///
/// A token is a `.` followed by one or more word characters or hyphens, so
/// `div.card.active > .title:hover` yields `card`, `active` and `title`.
pub fn class_names_in_selector(selector: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = selector;
    while let Some(dot) = rest.find('.') {
        let after = &rest[dot + 1..];
        let len = after
            .char_indices()
            .find(|&(_, ch)| !is_class_char(ch))
            .map(|(i, _)| i)
            .unwrap_or(after.len());
        if len > 0 {
            names.push(&after[..len]);
        }
        rest = &after[len..];
    }
    names
}

/// Splits a selector list on commas that are not nested inside `()` or `[]`.
pub fn split_selector_list(selector_list: &str) -> Vec<&str> {
    let mut selectors = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in selector_list.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                selectors.push(selector_list[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    selectors.push(selector_list[start..].trim());
    selectors.retain(|s| !s.is_empty());
    selectors
}

/// Decides whether a complete rule is kept for the given target classes.
///
/// `@keyframes` and `@font-face` rules are always kept. Any other rule is kept
/// when at least one class named anywhere in its selector list is a target;
/// the whole rule is kept even if other selectors in the list match nothing.
pub fn should_include(rule_text: &str, target: &ClassSet) -> bool {
    if rule_text.contains("@keyframes") || rule_text.contains("@font-face") {
        return true;
    }

    let selector_list = match rule_text.find('{') {
        Some(open) => rule_text[..open].trim(),
        None => return false,
    };
    if selector_list.is_empty() {
        return false;
    }

    split_selector_list(selector_list).into_iter().any(|selector| {
        class_names_in_selector(selector)
            .into_iter()
            .any(|class_name| target.contains(class_name))
    })
}
