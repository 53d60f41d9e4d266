//! BIDS entity handling for underscore-delimited identifiers.
//!
//! An identifier is the filename stem up to a descriptor tag, e.g.
//! `sub-01_ses-baseline_task-rest_run-001`. Tokens are classified by a
//! fixed entity vocabulary; nothing relies on token positions.

/// Recognized entity prefixes, in report column order.
pub const ENTITY_ORDER: [&str; 5] = ["sub", "ses", "task", "acq", "run"];

/// Split an identifier into `(key, value)` pairs for recognized entities.
///
/// Tokens without a dash or with an unrecognized key are skipped.
pub fn split_identifier(identifier: &str) -> Vec<(&str, &str)> {
    identifier
        .split('_')
        .filter_map(|token| token.split_once('-'))
        .filter(|(key, _)| ENTITY_ORDER.contains(key))
        .collect()
}

/// Value of one entity within an identifier, wherever it appears.
pub fn entity_value<'a>(identifier: &'a str, key: &str) -> Option<&'a str> {
    split_identifier(identifier)
        .into_iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Prefix of `name` up to the first occurrence of `tag` (the whole name
/// when the tag is absent). Used to derive scan identifiers from
/// filenames, e.g. `stem_before(name, "_desc-confounds")`.
pub fn stem_before<'a>(name: &'a str, tag: &str) -> &'a str {
    match name.find(tag) {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Subject label embedded in an identifier: the substring after the last
/// `sub-` marker, up to the next underscore.
pub fn subject_of(identifier: &str) -> Option<&str> {
    let after = identifier.rsplit("sub-").next()?;
    if after == identifier && !identifier.starts_with("sub-") {
        return None;
    }
    after.split('_').next()
}

/// Task label embedded in an identifier (after the last `_task-` tag, up
/// to the next underscore); the identifier itself when the tag is absent.
pub fn task_of(identifier: &str) -> &str {
    identifier
        .split("_task-")
        .last()
        .unwrap_or(identifier)
        .split('_')
        .next()
        .unwrap_or(identifier)
}

/// Report column header for an entity key. `sub` is conventionally
/// rendered as `participant_id`.
pub fn column_name(key: &str) -> &str {
    if key == "sub" {
        "participant_id"
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_in_vocabulary_order_independent_of_position() {
        let pairs = split_identifier("task-rest_sub-01_run-002");
        assert!(pairs.contains(&("sub", "01")));
        assert!(pairs.contains(&("task", "rest")));
        assert!(pairs.contains(&("run", "002")));
    }

    #[test]
    fn stem_cuts_at_tag() {
        assert_eq!(
            stem_before("sub-01_task-rest_desc-confounds_timeseries", "_desc-confounds"),
            "sub-01_task-rest"
        );
        assert_eq!(stem_before("sub-01_task-rest", "_space"), "sub-01_task-rest");
    }

    #[test]
    fn subject_extraction() {
        assert_eq!(subject_of("sub-test_task-rest_run-001"), Some("test"));
        assert_eq!(subject_of("task-rest_run-001"), None);
    }

    #[test]
    fn task_extraction() {
        assert_eq!(task_of("sub-01_ses-2_task-rest_run-001"), "rest");
        assert_eq!(task_of("sub-01_task-stuff"), "stuff");
    }
}
