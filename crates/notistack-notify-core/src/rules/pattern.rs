//! Key patterns derived from prefix/suffix filters.

use notistack_notify_model::FilterRule;

/// Build a pattern from a prefix and suffix.
///
/// The result is `prefix*suffix` with a doubled `**` collapsed to `*`, or an
/// empty string when both parts are empty.
#[must_use]
pub fn new_pattern(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() && suffix.is_empty() {
        return String::new();
    }
    let mut pattern = format!("{prefix}*{suffix}");
    while pattern.contains("**") {
        pattern = pattern.replace("**", "*");
    }
    pattern
}

/// Pattern of a filter rule list. Later rules override earlier ones of the
/// same name; names are compared case-insensitively.
#[must_use]
pub fn pattern_from_rules(rules: &[FilterRule]) -> String {
    let mut prefix = "";
    let mut suffix = "";
    for rule in rules {
        if rule.name.eq_ignore_ascii_case("prefix") {
            prefix = &rule.value;
        } else if rule.name.eq_ignore_ascii_case("suffix") {
            suffix = &rule.value;
        }
    }
    new_pattern(prefix, suffix)
}

/// Glob match where `*` matches any run of characters. No other
/// metacharacters or escapes.
#[must_use]
pub fn match_simple(pattern: &str, key: &str) -> bool {
    if pattern.is_empty() {
        return key.is_empty();
    }
    if pattern == "*" {
        return true;
    }

    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    let (mut p, mut k) = (0, 0);
    let mut star: Option<usize> = None;
    let mut resume = 0;

    while k < key.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            resume = k;
            p += 1;
        } else if p < pattern.len() && pattern[p] == key[k] {
            p += 1;
            k += 1;
        } else if let Some(s) = star {
            p = s + 1;
            resume += 1;
            k = resume;
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|c| *c == '*')
}
