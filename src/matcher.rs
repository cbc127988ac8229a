//! Fuzzy matching of mistyped command names.
//!
//! The best candidate is the label with the smallest Levenshtein distance to
//! the typed name across every command the sender may use. It is accepted only
//! below a threshold that grows with the candidate's length, so long names
//! tolerate more typos than short ones.

use crate::command::{CommandRegistry, KnownCommand};
use std::sync::Arc;
use tracing::debug;

/// Base edit distance a candidate must stay under
const BASE_THRESHOLD: usize = 3;

/// One extra typo is tolerated per this many characters of the candidate
const CHARS_PER_EXTRA_TYPO: usize = 4;

/// Acceptance threshold for a candidate label of `len` characters.
pub fn threshold(len: usize) -> usize {
    BASE_THRESHOLD + len / CHARS_PER_EXTRA_TYPO
}

/// Whether a candidate at `distance` from the input is close enough to suggest.
pub fn accepts(distance: usize, candidate: &str) -> bool {
    distance < threshold(candidate.chars().count())
}

/// Find the correction for `input`, or `None` if it is already a known label or
/// nothing usable is close enough.
pub fn find_correction<R, F>(registry: &R, input: &str, can_use: F) -> Option<String>
where
    R: CommandRegistry + ?Sized,
    F: Fn(&KnownCommand) -> bool,
{
    if registry.lookup(input).is_some() {
        // Valid command, nothing to correct.
        return None;
    }
    closest_label(input, &registry.commands(), can_use)
}

/// Scan `catalog` for the label closest to `input`.
///
/// Ties go to the first label seen: catalog order, then aliases before the
/// canonical name. An exact hit means the input is valid and yields `None`.
pub fn closest_label<F>(input: &str, catalog: &[Arc<KnownCommand>], can_use: F) -> Option<String>
where
    F: Fn(&KnownCommand) -> bool,
{
    if input.is_empty() {
        return None;
    }

    let mut best: Option<(usize, &str)> = None;
    for command in catalog {
        if !can_use(command) {
            continue;
        }
        for label in command.name_set() {
            let distance = strsim::levenshtein(input, label);
            if distance == 0 {
                return None;
            }
            match best {
                Some((min, _)) if distance >= min => {}
                _ => best = Some((distance, label)),
            }
        }
    }

    let (distance, label) = best?;
    if accepts(distance, label) {
        debug!("Matched '{}' to '{}' (distance {})", input, label, distance);
        Some(label.to_string())
    } else {
        debug!(
            "Closest label to '{}' is '{}' at distance {}, above threshold {}",
            input,
            label,
            distance,
            threshold(label.chars().count())
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command_map::CommandMap;

    fn catalog() -> CommandMap {
        CommandMap::from_catalog([
            KnownCommand::new("help").with_aliases(["?"]),
            KnownCommand::new("teleport")
                .with_aliases(["tp"])
                .with_permission("cmd.tp"),
            KnownCommand::new("version").with_aliases(["ver", "about"]),
        ])
    }

    fn everyone(_: &KnownCommand) -> bool {
        true
    }

    fn no_permissions(command: &KnownCommand) -> bool {
        command.permission.is_none()
    }

    #[test]
    fn test_threshold_grows_with_length() {
        assert_eq!(threshold(1), 3);
        assert_eq!(threshold(4), 4);
        assert_eq!(threshold(7), 4);
        assert_eq!(threshold(8), 5);
    }

    #[test]
    fn test_threshold_boundary_is_rejected() {
        // "help" has threshold 4
        assert!(accepts(3, "help"));
        assert!(!accepts(4, "help"));
    }

    #[test]
    fn test_known_labels_are_never_corrected() {
        let map = catalog();
        for command in map.commands() {
            for label in command.name_set() {
                assert_eq!(find_correction(&map, label, everyone), None);
                assert_eq!(find_correction(&map, label, no_permissions), None);
            }
        }
    }

    #[test]
    fn test_exact_match_in_catalog_short_circuits() {
        // Not bound in the map, but present in the catalog as an exact label
        let catalog = vec![
            Arc::new(KnownCommand::new("help")),
            Arc::new(KnownCommand::new("helper")),
        ];
        assert_eq!(closest_label("helper", &catalog, everyone), None);
    }

    #[test]
    fn test_transposed_letters_are_corrected() {
        let map = catalog();
        assert_eq!(
            find_correction(&map, "hepl", everyone),
            Some("help".to_string())
        );
    }

    #[test]
    fn test_forbidden_commands_are_never_suggested() {
        let map = catalog();
        let suggestion = find_correction(&map, "telport", no_permissions);
        assert_eq!(suggestion, None);

        let permitted = find_correction(&map, "telport", everyone);
        assert_eq!(permitted, Some("teleport".to_string()));
    }

    #[test]
    fn test_permission_filter_holds_for_any_input() {
        let map = catalog();
        for input in ["tpp", "t", "teleprt", "tele", "p", "xx"] {
            if let Some(label) = find_correction(&map, input, no_permissions) {
                assert!(label != "tp" && label != "teleport", "suggested {label}");
            }
        }
    }

    #[test]
    fn test_far_inputs_yield_nothing() {
        let map = catalog();
        assert_eq!(find_correction(&map, "qwertyuiop", everyone), None);
    }

    #[test]
    fn test_ties_go_to_first_label_seen() {
        let catalog = vec![
            Arc::new(KnownCommand::new("abcd")),
            Arc::new(KnownCommand::new("abce")),
        ];
        assert_eq!(
            closest_label("abcf", &catalog, everyone),
            Some("abcd".to_string())
        );

        let reversed = vec![Arc::clone(&catalog[1]), Arc::clone(&catalog[0])];
        assert_eq!(
            closest_label("abcf", &reversed, everyone),
            Some("abce".to_string())
        );
    }

    #[test]
    fn test_aliases_are_scanned_before_the_name() {
        let catalog = vec![Arc::new(KnownCommand::new("gmx").with_aliases(["gmy"]))];
        assert_eq!(
            closest_label("gmz", &catalog, everyone),
            Some("gmy".to_string())
        );
    }

    #[test]
    fn test_empty_catalog_and_empty_input() {
        assert_eq!(closest_label("help", &[], everyone), None);
        let map = catalog();
        assert_eq!(find_correction(&map, "", everyone), None);
        assert_eq!(find_correction(&map, "hepl", |_: &KnownCommand| false), None);
    }
}
