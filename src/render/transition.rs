//! Transition names.

use uuid::Uuid;

/// Mints opaque transition names.
///
/// Names are random; two updates meant to animate independently must each
/// ask for their own. Nothing tracks names in flight.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransitionNamer;

impl TransitionNamer {
    pub fn next_name(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_distinct() {
        let namer = TransitionNamer;
        let names: HashSet<_> = (0..64).map(|_| namer.next_name()).collect();
        assert_eq!(names.len(), 64);
    }

    #[test]
    fn names_are_opaque_tokens() {
        let name = TransitionNamer.next_name();
        assert_eq!(name.len(), 32);
        assert!(name.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
