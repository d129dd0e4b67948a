//! Rule expressions: compound AND/OR checks over role/permission atoms.
//!
//! A rule is an OR-sequence of groups; a group is an AND-sequence of atoms.
//! In text form, `,` separates OR groups and any of `+`, `|`, `&` joins the
//! atoms of a group, so `"admin,editor+verified"` reads "admin OR
//! (editor AND verified)". An atom may carry an explicit kind prefix
//! (`r:` role, `p:` permission); without one its kind is decided by the
//! calling entry point (role for `is`, permission for `can`).

use rolegate_core::{DomainError, DomainResult, Slug, SlugNormalizer};

/// Separators joining the AND-atoms inside one OR group.
const AND_SEPARATORS: [char; 3] = ['+', '|', '&'];

/// Kind of an atomic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    /// Explicit role check (`r:` prefix).
    Role,
    /// Explicit permission check (`p:` prefix).
    Permission,
    /// No prefix: the entry point supplies the kind.
    Contextual,
}

/// One atomic check: a kind and a normalized slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub kind: AtomKind,
    pub slug: Slug,
}

/// Input form of a rule expression: free text or pre-structured
/// OR-of-AND groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleExpr {
    Text(String),
    Groups(Vec<Vec<String>>),
}

impl From<&str> for RuleExpr {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RuleExpr {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Vec<String>>> for RuleExpr {
    fn from(value: Vec<Vec<String>>) -> Self {
        Self::Groups(value)
    }
}

impl From<Vec<Vec<&str>>> for RuleExpr {
    fn from(value: Vec<Vec<&str>>) -> Self {
        Self::Groups(
            value
                .into_iter()
                .map(|group| group.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}

/// A parsed rule: OR over groups, AND within a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule(Vec<Vec<Atom>>);

impl Rule {
    /// Parse a rule expression, normalizing every atom slug.
    ///
    /// An empty expression parses to an empty rule (which evaluates to
    /// `false`). A non-empty expression containing an empty atom or group,
    /// or an unknown kind prefix, is a caller error and fails with
    /// [`DomainError::MalformedRule`].
    pub fn parse(expr: &RuleExpr, normalizer: &SlugNormalizer) -> DomainResult<Self> {
        match expr {
            RuleExpr::Text(text) => {
                if text.trim().is_empty() {
                    return Ok(Self(Vec::new()));
                }
                text.split(',')
                    .map(|group| {
                        group
                            .split(AND_SEPARATORS)
                            .map(|atom| parse_atom(atom, normalizer))
                            .collect::<DomainResult<Vec<_>>>()
                    })
                    .collect::<DomainResult<Vec<_>>>()
                    .map(Self)
            }
            RuleExpr::Groups(groups) => {
                if groups.is_empty() {
                    return Ok(Self(Vec::new()));
                }
                groups
                    .iter()
                    .map(|group| {
                        if group.is_empty() {
                            return Err(DomainError::malformed_rule("empty rule group"));
                        }
                        group
                            .iter()
                            .map(|atom| parse_atom(atom, normalizer))
                            .collect::<DomainResult<Vec<_>>>()
                    })
                    .collect::<DomainResult<Vec<_>>>()
                    .map(Self)
            }
        }
    }

    pub fn groups(&self) -> &[Vec<Atom>] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate all atoms across groups (for pre-evaluation validation).
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.0.iter().flatten()
    }

    /// Evaluate the rule: OR over groups, AND within a group.
    ///
    /// Short-circuits both ways: the first true group decides the rule, the
    /// first false atom decides its group. An empty rule is `false`.
    pub fn evaluate(&self, mut test: impl FnMut(&Atom) -> bool) -> bool {
        self.0
            .iter()
            .any(|group| group.iter().all(|atom| test(atom)))
    }
}

fn parse_atom(raw: &str, normalizer: &SlugNormalizer) -> DomainResult<Atom> {
    let raw = raw.trim();
    let (kind, rest) = match raw.split_once(':') {
        Some(("r", rest)) | Some(("role", rest)) => (AtomKind::Role, rest),
        Some(("p", rest)) | Some(("permission", rest)) => (AtomKind::Permission, rest),
        Some((prefix, _)) => {
            return Err(DomainError::malformed_rule(format!(
                "unknown kind prefix {prefix:?} (expected \"r\" or \"p\")"
            )));
        }
        None => (AtomKind::Contextual, raw),
    };

    let slug = normalizer.normalize(rest);
    if slug.as_str().is_empty() {
        return Err(DomainError::malformed_rule(format!(
            "empty atom in rule segment {raw:?}"
        )));
    }

    Ok(Atom { kind, slug })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> DomainResult<Rule> {
        Rule::parse(&RuleExpr::from(text), &SlugNormalizer::default())
    }

    #[test]
    fn single_atom() {
        let rule = parse("admin").unwrap();
        assert_eq!(rule.groups().len(), 1);
        assert_eq!(rule.groups()[0][0].kind, AtomKind::Contextual);
        assert_eq!(rule.groups()[0][0].slug.as_str(), "admin");
    }

    #[test]
    fn comma_separates_or_groups() {
        let rule = parse("admin,editor").unwrap();
        assert_eq!(rule.groups().len(), 2);
        assert!(rule.groups().iter().all(|g| g.len() == 1));
    }

    #[test]
    fn plus_pipe_ampersand_join_and_atoms() {
        for text in ["admin+verified", "admin|verified", "admin&verified"] {
            let rule = parse(text).unwrap();
            assert_eq!(rule.groups().len(), 1);
            assert_eq!(rule.groups()[0].len(), 2);
        }
    }

    #[test]
    fn mixed_expression() {
        // admin OR (editor AND verified)
        let rule = parse("admin,editor+verified").unwrap();
        assert_eq!(rule.groups().len(), 2);
        assert_eq!(rule.groups()[1].len(), 2);
    }

    #[test]
    fn kind_prefixes() {
        let rule = parse("r:admin,p:edit.posts").unwrap();
        assert_eq!(rule.groups()[0][0].kind, AtomKind::Role);
        assert_eq!(rule.groups()[1][0].kind, AtomKind::Permission);
        assert_eq!(rule.groups()[1][0].slug.as_str(), "edit.posts");
    }

    #[test]
    fn long_form_prefixes() {
        let rule = parse("role:admin+permission:edit").unwrap();
        assert_eq!(rule.groups()[0][0].kind, AtomKind::Role);
        assert_eq!(rule.groups()[0][1].kind, AtomKind::Permission);
    }

    #[test]
    fn atom_slugs_are_normalized() {
        let rule = parse("Admin Users,p:Edit Posts").unwrap();
        assert_eq!(rule.groups()[0][0].slug.as_str(), "admin.users");
        assert_eq!(rule.groups()[1][0].slug.as_str(), "edit.posts");
    }

    #[test]
    fn unknown_prefix_is_malformed() {
        assert!(matches!(
            parse("x:admin"),
            Err(DomainError::MalformedRule(_))
        ));
    }

    #[test]
    fn empty_atom_is_malformed() {
        assert!(matches!(parse("admin,,editor"), Err(DomainError::MalformedRule(_))));
        assert!(matches!(parse("admin+"), Err(DomainError::MalformedRule(_))));
        assert!(matches!(parse("r:"), Err(DomainError::MalformedRule(_))));
    }

    #[test]
    fn empty_expression_parses_to_empty_rule() {
        let rule = parse("").unwrap();
        assert!(rule.is_empty());
        assert!(!rule.evaluate(|_| true));
    }

    #[test]
    fn structured_groups() {
        let expr = RuleExpr::from(vec![vec!["admin"], vec!["editor", "verified"]]);
        let rule = Rule::parse(&expr, &SlugNormalizer::default()).unwrap();
        assert_eq!(rule.groups().len(), 2);
        assert_eq!(rule.groups()[1].len(), 2);
    }

    #[test]
    fn structured_empty_group_is_malformed() {
        let expr = RuleExpr::from(Vec::<Vec<String>>::from([vec![]]));
        assert!(matches!(
            Rule::parse(&expr, &SlugNormalizer::default()),
            Err(DomainError::MalformedRule(_))
        ));
    }

    #[test]
    fn evaluation_or_of_and() {
        let rule = parse("admin,editor+verified").unwrap();
        let holds = |held: &[&str]| {
            rule.evaluate(|atom| held.contains(&atom.slug.as_str()))
        };
        assert!(holds(&["admin"]));
        assert!(holds(&["editor", "verified"]));
        assert!(!holds(&["editor"]));
        assert!(!holds(&["verified"]));
        assert!(!holds(&[]));
    }

    #[test]
    fn evaluation_short_circuits_on_first_true_group() {
        let rule = parse("admin,editor").unwrap();
        let mut calls = 0;
        let result = rule.evaluate(|_| {
            calls += 1;
            true
        });
        assert!(result);
        assert_eq!(calls, 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: parsing arbitrary text never panics, and a parsed
            /// rule has no empty groups or empty atom slugs.
            #[test]
            fn parse_never_panics(text in "\\PC{0,64}") {
                if let Ok(rule) = parse(&text) {
                    for group in rule.groups() {
                        prop_assert!(!group.is_empty());
                        for atom in group {
                            prop_assert!(!atom.slug.as_str().is_empty());
                        }
                    }
                }
            }

            /// Property: a rule of OR-joined single atoms is true exactly
            /// when any atom tests true.
            #[test]
            fn or_rule_matches_any(slugs in prop::collection::vec("[a-z]{1,8}", 1..5), pick in 0usize..5) {
                let text = slugs.join(",");
                let rule = parse(&text).unwrap();
                let held = slugs.get(pick % slugs.len()).unwrap().clone();
                prop_assert!(rule.evaluate(|atom| atom.slug.as_str() == held));
                prop_assert!(!rule.evaluate(|_| false));
            }
        }
    }
}
