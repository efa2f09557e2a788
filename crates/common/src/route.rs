//! Randomized greedy chaining of beacons into a practice route.
//!
//! The builder extends a path one random eligible hop at a time, with no
//! lookahead or backtracking. It guarantees a connected route under the
//! hop constraint, not a short or exhaustive one.

use rand::Rng;
use serde::Serialize;

use crate::beacon::Beacon;
use crate::geodesy::distance;

/// An ordered, duplicate-free chain of beacons.
///
/// Holds copies of the store's records, so later deletions in the store do
/// not affect an already produced route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub beacons: Vec<Beacon>,
    pub requested: usize,
}

impl Route {
    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    /// True when the walk ran out of reachable beacons before `requested`.
    pub fn is_partial(&self) -> bool {
        self.beacons.len() < self.requested
    }

    /// Distance of every hop, in route order.
    pub fn hop_distances(&self) -> Vec<f64> {
        self.beacons
            .windows(2)
            .map(|pair| distance(pair[0].position(), pair[1].position()))
            .collect()
    }

    pub fn total_distance(&self) -> f64 {
        self.hop_distances().iter().sum()
    }
}

/// Chains `candidates` into a route of at most `desired_count` beacons.
///
/// # Behavior
///
/// - Picks the first beacon uniformly at random and removes it from the pool
/// - Repeatedly picks, uniformly at random, one pooled beacon within
///   `max_hop_m` of the route's last beacon and moves it into the route
/// - Stops once `desired_count` is reached, the pool is exhausted, or no
///   pooled beacon is within reach (a normal early end, see [`Route::is_partial`])
///
/// An empty `candidates` slice yields an empty route; reporting that is up
/// to the caller.
///
/// # Arguments
///
/// * `candidates` - Eligible beacons, typically the catchment around the origin
/// * `max_hop_m` - Maximum distance between consecutive beacons, in meters
/// * `desired_count` - Upper bound on the route length
/// * `rng` - Random source; seed it for reproducible routes
pub fn build<R: Rng + ?Sized>(
    candidates: &[Beacon],
    max_hop_m: f64,
    desired_count: usize,
    rng: &mut R,
) -> Route {
    let mut route = Route {
        beacons: Vec::with_capacity(desired_count.min(candidates.len())),
        requested: desired_count,
    };
    if candidates.is_empty() || desired_count == 0 {
        return route;
    }

    let mut pool: Vec<Beacon> = candidates.to_vec();
    let first = pool.remove(rng.gen_range(0..pool.len()));
    tracing::debug!(id = %first.id, "Route start picked");
    route.beacons.push(first);

    while route.beacons.len() < desired_count && !pool.is_empty() {
        let Some(last) = route.beacons.last().map(Beacon::position) else {
            break;
        };

        let reachable: Vec<usize> = pool
            .iter()
            .enumerate()
            .filter(|(_, b)| distance(last, b.position()) <= max_hop_m)
            .map(|(i, _)| i)
            .collect();

        if reachable.is_empty() {
            tracing::debug!(
                placed = route.beacons.len(),
                pooled = pool.len(),
                "No beacon within hop distance, route ends early"
            );
            break;
        }

        let next = pool.remove(reachable[rng.gen_range(0..reachable.len())]);
        tracing::debug!(id = %next.id, "Route extended");
        route.beacons.push(next);
    }

    route
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::fixture as beacon;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    // Points roughly 1.1 km apart along a meridian.
    fn ladder(n: usize) -> Vec<Beacon> {
        (0..n)
            .map(|i| beacon(&format!("b{i}"), 40.0 + 0.01 * i as f64, -3.0))
            .collect()
    }

    #[test]
    fn empty_candidates_give_empty_route() {
        let mut rng = StdRng::seed_from_u64(1);
        let route = build(&[], 1000.0, 5, &mut rng);
        assert!(route.is_empty());
        assert!(route.is_partial());
    }

    #[test]
    fn desired_count_one_returns_a_single_candidate() {
        let candidates = ladder(6);
        let mut rng = StdRng::seed_from_u64(7);
        let route = build(&candidates, 10_000.0, 1, &mut rng);
        assert_eq!(route.len(), 1);
        assert!(candidates.contains(&route.beacons[0]));
        assert!(!route.is_partial());
    }

    #[test]
    fn isolated_beacons_end_the_route_after_the_first_pick() {
        // Every pair is ~55 km apart.
        let candidates = vec![
            beacon("a", 40.0, -3.0),
            beacon("b", 40.5, -3.0),
            beacon("c", 41.0, -3.0),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let route = build(&candidates, 1000.0, 3, &mut rng);
        assert_eq!(route.len(), 1);
        assert!(route.is_partial());
    }

    #[test]
    fn single_candidate_cannot_hop_to_itself() {
        let candidates = vec![beacon("only", 40.0, -3.0)];
        let mut rng = StdRng::seed_from_u64(0);
        let route = build(&candidates, 10_000.0, 4, &mut rng);
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn generous_hop_uses_every_candidate_once() {
        let candidates = ladder(5);
        let mut rng = StdRng::seed_from_u64(11);
        let route = build(&candidates, 100_000.0, 10, &mut rng);
        assert_eq!(route.len(), 5);
        let ids: HashSet<&str> = route.beacons.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn same_seed_gives_same_route() {
        let candidates = ladder(8);
        let a = build(&candidates, 2500.0, 5, &mut StdRng::seed_from_u64(99));
        let b = build(&candidates, 2500.0, 5, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn hop_distances_and_total_agree() {
        let route = Route {
            beacons: ladder(3),
            requested: 3,
        };
        let hops = route.hop_distances();
        assert_eq!(hops.len(), 2);
        assert!((route.total_distance() - hops[0] - hops[1]).abs() < 1e-9);
        assert!((hops[0] - 1111.95).abs() < 1.0);
    }

    fn candidate_set() -> impl Strategy<Value = Vec<Beacon>> {
        prop::collection::vec((40.0f64..40.05, -3.05f64..-3.0), 0..20).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lng))| beacon(&format!("p{i}"), lat, lng))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn routes_respect_length_hop_and_uniqueness(
            candidates in candidate_set(),
            max_hop in 100.0f64..3000.0,
            desired in 1usize..12,
            seed in any::<u64>(),
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let route = build(&candidates, max_hop, desired, &mut rng);

            prop_assert!(route.len() <= desired.min(candidates.len()));
            prop_assert_eq!(route.is_empty(), candidates.is_empty());
            for hop in route.hop_distances() {
                prop_assert!(hop <= max_hop);
            }
            let ids: HashSet<&str> = route.beacons.iter().map(|b| b.id.as_str()).collect();
            prop_assert_eq!(ids.len(), route.len());
        }
    }
}
