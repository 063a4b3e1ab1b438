//! Per-route headsign merge rules.
//!
//! When two trip variants of a route end up in the same direction, their
//! headsigns have to collapse into one. For routes listed in the rule table
//! the canonical headsign comes from the first rule whose member set covers
//! both candidates. Routes outside the table are left to the caller.

use std::collections::HashMap;

use crate::domain::RouteId;

/// Two headsigns of a route with no rule covering both.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unexpected trips to merge on route {route}: {first:?} & {second:?}")]
pub struct UnexpectedMerge {
    pub route: RouteId,
    pub first: String,
    pub second: String,
}

/// A headsign and the identifier it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripHeadsign {
    pub value: String,
    pub id: u32,
}

impl TripHeadsign {
    pub fn new(value: impl Into<String>, id: u32) -> Self {
        Self {
            value: value.into(),
            id,
        }
    }
}

/// A set of equivalent headsigns and the one to show for all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRule {
    members: Vec<String>,
    canonical: String,
}

impl MergeRule {
    pub fn new(members: &[&str], canonical: &str) -> Self {
        Self {
            members: members.iter().map(|m| m.to_string()).collect(),
            canonical: canonical.to_string(),
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// True when both candidates are members of this rule.
    pub fn covers(&self, first: &str, second: &str) -> bool {
        self.contains(first) && self.contains(second)
    }

    fn contains(&self, headsign: &str) -> bool {
        self.members.iter().any(|m| m == headsign)
    }
}

/// Route → ordered merge rules.
#[derive(Debug, Clone, Default)]
pub struct HeadsignRules {
    routes: HashMap<RouteId, Vec<MergeRule>>,
}

impl HeadsignRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to a route. Rules are tried in the order added.
    pub fn with_rule(mut self, route: u64, members: &[&str], canonical: &str) -> Self {
        self.routes
            .entry(RouteId::new(route))
            .or_default()
            .push(MergeRule::new(members, canonical));
        self
    }

    pub fn rules_for(&self, route: RouteId) -> Option<&[MergeRule]> {
        self.routes.get(&route).map(Vec::as_slice)
    }

    pub fn routes(&self) -> impl Iterator<Item = RouteId> + '_ {
        self.routes.keys().copied()
    }
}

/// Resolves headsign conflicts with a fixed rule table.
#[derive(Debug, Clone, Default)]
pub struct HeadsignMerger {
    rules: HeadsignRules,
}

impl HeadsignMerger {
    pub fn new(rules: HeadsignRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &HeadsignRules {
        &self.rules
    }

    /// Merge `other` into `target` for a route.
    ///
    /// Returns `Ok(None)` when the route has no rules, `Ok(Some(_))` with the
    /// canonical value under `target`'s identifier when a rule matches, and
    /// [`UnexpectedMerge`] when the route has rules but none covers the pair.
    pub fn merge(
        &self,
        route: RouteId,
        target: &TripHeadsign,
        other: &TripHeadsign,
    ) -> Result<Option<TripHeadsign>, UnexpectedMerge> {
        let Some(rules) = self.rules.rules_for(route) else {
            return Ok(None);
        };

        rules
            .iter()
            .find(|rule| rule.covers(&target.value, &other.value))
            .map(|rule| Some(TripHeadsign::new(rule.canonical(), target.id)))
            .ok_or_else(|| UnexpectedMerge {
                route,
                first: target.value.clone(),
                second: other.value.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgencyConfig;

    fn merger() -> HeadsignMerger {
        AgencyConfig::default().headsign_merger()
    }

    fn merge(route: u64, a: &str, b: &str) -> Result<Option<TripHeadsign>, UnexpectedMerge> {
        merger().merge(RouteId::new(route), &TripHeadsign::new(a, 7), &TripHeadsign::new(b, 9))
    }

    fn merged(route: u64, a: &str, b: &str) -> String {
        merge(route, a, b).unwrap().unwrap().value
    }

    #[test]
    fn route_370_merges_to_nord() {
        assert_eq!(merged(370, "St-Amable", "Ste-Julie"), "Nord");
        assert_eq!(merged(370, "Nord", "St-Amable"), "Nord");
        assert_eq!(merged(370, "Ste-Julie", "Nord"), "Nord");
    }

    #[test]
    fn route_700_merges_to_sorel_tracy() {
        assert_eq!(merged(700, "Longueuil", "Sorel-Tracy"), "Sorel-Tracy");
        assert_eq!(merged(700, "Sorel-Tracy", "Longueuil"), "Sorel-Tracy");
    }

    #[test]
    fn route_720_has_two_rules() {
        assert_eq!(merged(720, "Longueuil", "Sud"), "Sud");
        assert_eq!(merged(720, "Varennes", "Nord"), "Nord");
    }

    #[test]
    fn routes_721_722_724_match_720() {
        for route in [721, 722, 724] {
            assert_eq!(merged(route, "Varennes", "Nord"), "Nord");
            assert_eq!(merged(route, "Sud", "Longueuil"), "Sud");
        }
    }

    #[test]
    fn route_723_uses_ireq() {
        assert_eq!(merged(723, "Varennes (IREQ)", "Nord"), "Nord");
        assert_eq!(merged(723, "Longueuil", "Sud"), "Sud");
        assert!(merge(723, "Varennes", "Nord").is_err());
    }

    #[test]
    fn route_731_rejects_pairs_outside_its_table() {
        assert_eq!(merged(731, "Longueuil", "Sud"), "Sud");
        assert_eq!(
            merge(731, "Varennes", "Nord").unwrap_err(),
            UnexpectedMerge {
                route: RouteId::new(731),
                first: "Varennes".into(),
                second: "Nord".into(),
            }
        );
    }

    #[test]
    fn pairs_across_rules_are_rejected() {
        assert!(merge(720, "Varennes", "Sud").is_err());
    }

    #[test]
    fn unknown_route_is_left_alone() {
        assert_eq!(merge(999, "A", "B").unwrap(), None);
    }

    #[test]
    fn merged_keeps_target_id() {
        let result = merge(700, "Longueuil", "Sorel-Tracy").unwrap().unwrap();
        assert_eq!(result, TripHeadsign::new("Sorel-Tracy", 7));
    }

    #[test]
    fn first_matching_rule_wins() {
        let merger = HeadsignMerger::new(
            HeadsignRules::new()
                .with_rule(1, &["A", "B"], "first")
                .with_rule(1, &["A", "B", "C"], "second"),
        );
        let result = merger
            .merge(RouteId::new(1), &TripHeadsign::new("A", 0), &TripHeadsign::new("B", 0))
            .unwrap()
            .unwrap();
        assert_eq!(result.value, "first");

        let result = merger
            .merge(RouteId::new(1), &TripHeadsign::new("C", 0), &TripHeadsign::new("A", 0))
            .unwrap()
            .unwrap();
        assert_eq!(result.value, "second");
    }

    #[test]
    fn error_display() {
        let err = merge(731, "Varennes", "Nord").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unexpected trips to merge on route 731: \"Varennes\" & \"Nord\""
        );
    }
}
