//! Post-ranking rebalancing so one attribute value does not dominate the top N.
//!
//! Both strategies expect their input sorted by score, best first, and
//! place at most `limit` candidates. Each output position is filled
//! exactly once, so placement always terminates whatever spacing is
//! requested. Score-based placement takes the best candidate whose group
//! still leaves a spacing-respecting order for the remaining slots. Only
//! when no candidate satisfies the spacing at a position is the
//! constraint relaxed, for that position alone.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::Scored;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiversificationSpec {
    /// Candidates sharing any value of `column` end up at least `spacing` positions apart
    ScoreBased { column: String, spacing: usize },
    /// Slots split by each group's share of the pool; group = first value of `column`
    Proportional { column: String, spacing_budget: usize },
}

impl DiversificationSpec {
    pub fn column(&self) -> &str {
        match self {
            DiversificationSpec::ScoreBased { column, .. }
            | DiversificationSpec::Proportional { column, .. } => column,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.column().trim().is_empty() {
            return Err("diversification column must not be empty".to_string());
        }
        Ok(())
    }

    pub fn apply(&self, candidates: Vec<Scored>, limit: usize) -> Vec<Scored> {
        match self {
            DiversificationSpec::ScoreBased { column, spacing } => {
                score_based(candidates, column, *spacing, limit)
            }
            DiversificationSpec::Proportional { column, spacing_budget } => {
                proportional(candidates, column, *spacing_budget, limit)
            }
        }
    }
}

/// Move the chosen indices out of `candidates`, in placement order
fn take_in_order(candidates: Vec<Scored>, order: &[usize]) -> Vec<Scored> {
    let mut slots: Vec<Option<Scored>> = candidates.into_iter().map(Some).collect();
    order.iter().filter_map(|&i| slots[i].take()).collect()
}

fn score_based(candidates: Vec<Scored>, column: &str, spacing: usize, limit: usize) -> Vec<Scored> {
    let window = spacing.saturating_sub(1);
    let target = limit.min(candidates.len());
    if window == 0 {
        return candidates.into_iter().take(target).collect();
    }

    // Candidates with the same value set form one signature; queues keep score order.
    // Multi-valued columns are exploded: every value is a group.
    let mut value_ids: HashMap<String, usize> = HashMap::new();
    let mut by_values: HashMap<Vec<usize>, usize> = HashMap::new();
    let mut signatures: Vec<Vec<usize>> = Vec::new();
    let mut queues: Vec<VecDeque<usize>> = Vec::new();
    for (i, c) in candidates.iter().enumerate() {
        let mut values: Vec<usize> = c
            .candidate
            .column(column)
            .into_iter()
            .map(|v| {
                let next = value_ids.len();
                *value_ids.entry(v).or_insert(next)
            })
            .collect();
        values.sort_unstable();
        values.dedup();
        let sig = match by_values.get(&values) {
            Some(&sig) => sig,
            None => {
                by_values.insert(values.clone(), signatures.len());
                signatures.push(values);
                queues.push(VecDeque::new());
                signatures.len() - 1
            }
        };
        queues[sig].push_back(i);
    }

    let schedule = Schedule {
        signatures,
        value_count: value_ids.len(),
        window,
    };
    let mut recent: VecDeque<usize> = VecDeque::with_capacity(window + 1);
    let mut placed: Vec<usize> = Vec::with_capacity(target);
    let mut relaxed = 0usize;

    while placed.len() < target {
        let counts: Vec<usize> = queues.iter().map(VecDeque::len).collect();
        let slots_after = target - placed.len() - 1;

        let mut eligible: Vec<usize> = (0..queues.len())
            .filter(|&s| counts[s] > 0 && !schedule.blocked(s, &recent))
            .collect();
        eligible.sort_by_key(|&s| queues[s][0]);

        let pick = eligible
            .iter()
            .copied()
            .find(|&s| schedule.fits_after(s, &counts, &recent, slots_after))
            .or_else(|| {
                let per_value = schedule.value_counts(&counts);
                eligible.iter().copied().max_by(|&a, &b| {
                    schedule
                        .priority(a, &counts, &per_value)
                        .cmp(&schedule.priority(b, &counts, &per_value))
                        .then(queues[b][0].cmp(&queues[a][0]))
                })
            })
            .or_else(|| {
                relaxed += 1;
                (0..queues.len())
                    .filter(|&s| counts[s] > 0)
                    .min_by_key(|&s| queues[s][0])
            });

        let Some(sig) = pick else {
            break;
        };
        if let Some(index) = queues[sig].pop_front() {
            placed.push(index);
        }
        schedule.push(&mut recent, sig);
    }

    if relaxed > 0 {
        tracing::debug!(
            column = %column,
            spacing,
            relaxed,
            "Spacing relaxed where the pool could not satisfy it"
        );
    }

    take_in_order(candidates, &placed)
}

/// Spacing bookkeeping over value signatures
struct Schedule {
    /// Sorted value ids of each signature
    signatures: Vec<Vec<usize>>,
    value_count: usize,
    window: usize,
}

impl Schedule {
    fn blocked(&self, sig: usize, recent: &VecDeque<usize>) -> bool {
        let values = &self.signatures[sig];
        recent
            .iter()
            .any(|&r| self.signatures[r].iter().any(|v| values.contains(v)))
    }

    fn push(&self, recent: &mut VecDeque<usize>, sig: usize) {
        recent.push_back(sig);
        while recent.len() > self.window {
            recent.pop_front();
        }
    }

    /// Members left per exploded value
    fn value_counts(&self, counts: &[usize]) -> Vec<usize> {
        let mut per_value = vec![0; self.value_count];
        for (sig, &count) in counts.iter().enumerate() {
            for &v in &self.signatures[sig] {
                per_value[v] += count;
            }
        }
        per_value
    }

    /// Most crowded value first, then the signature's own backlog
    fn priority(&self, sig: usize, counts: &[usize], per_value: &[usize]) -> (usize, usize) {
        let crowded = self.signatures[sig].iter().map(|&v| per_value[v]).max().unwrap_or(0);
        (crowded, counts[sig])
    }

    /// Whether `slots` more positions can still be filled without breaking
    /// spacing once `sig` is placed.
    ///
    /// Simulates the schedule that always places the eligible signature
    /// with the most crowded value. For single-valued columns that schedule
    /// never idles when any order can avoid it.
    fn fits_after(
        &self,
        sig: usize,
        counts: &[usize],
        recent: &VecDeque<usize>,
        slots: usize,
    ) -> bool {
        if slots == 0 {
            return true;
        }
        let mut counts = counts.to_vec();
        counts[sig] -= 1;
        let mut per_value = self.value_counts(&counts);
        let mut recent = recent.clone();
        self.push(&mut recent, sig);

        // No value left twice: only the recent window can block anyone
        if counts.iter().all(|&c| c <= 1) && per_value.iter().all(|&c| c <= 1) {
            let open = (0..counts.len())
                .filter(|&s| counts[s] > 0 && !self.blocked(s, &recent))
                .count();
            if open >= slots {
                return true;
            }
        }

        for _ in 0..slots {
            let next = (0..counts.len())
                .filter(|&s| counts[s] > 0 && !self.blocked(s, &recent))
                .max_by(|&a, &b| {
                    self.priority(a, &counts, &per_value)
                        .cmp(&self.priority(b, &counts, &per_value))
                        .then(b.cmp(&a))
                });
            let Some(next) = next else {
                return false;
            };
            counts[next] -= 1;
            for &v in &self.signatures[next] {
                per_value[v] -= 1;
            }
            self.push(&mut recent, next);
        }
        true
    }
}

fn proportional(
    candidates: Vec<Scored>,
    column: &str,
    spacing_budget: usize,
    limit: usize,
) -> Vec<Scored> {
    let total = candidates.len();
    if total == 0 {
        return candidates;
    }

    // Groups in first-seen order, which is best-score order
    let mut keys: Vec<String> = Vec::new();
    let mut queues: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (i, c) in candidates.iter().enumerate() {
        let key = c.candidate.column(column).into_iter().next().unwrap_or_default();
        if !queues.contains_key(&key) {
            keys.push(key.clone());
        }
        queues.entry(key).or_default().push_back(i);
    }

    let mut queues: Vec<VecDeque<usize>> = keys.iter().filter_map(|k| queues.remove(k)).collect();
    let weights: Vec<f64> = queues.iter().map(|q| q.len() as f64 / total as f64).collect();
    let spacing = (spacing_budget / queues.len()).max(1);

    let mut placed_count = vec![0usize; queues.len()];
    let mut last_position: Vec<Option<usize>> = vec![None; queues.len()];
    let mut placed: Vec<usize> = Vec::with_capacity(limit.min(total));

    for position in 0..limit.min(total) {
        let mut choice: Option<(usize, f64)> = None;
        for enforce_spacing in [true, false] {
            for (g, queue) in queues.iter().enumerate() {
                if queue.is_empty() {
                    continue;
                }
                let too_close = last_position[g].is_some_and(|last| position - last < spacing);
                if enforce_spacing && too_close {
                    continue;
                }
                let deficit = weights[g] * (position + 1) as f64 - placed_count[g] as f64;
                // Ties go to the earlier group
                if choice.map_or(true, |(_, best)| deficit > best + 1e-12) {
                    choice = Some((g, deficit));
                }
            }
            if choice.is_some() {
                break;
            }
        }

        let Some((g, _)) = choice else {
            break;
        };
        if let Some(index) = queues[g].pop_front() {
            placed.push(index);
            placed_count[g] += 1;
            last_position[g] = Some(position);
        }
    }

    take_in_order(candidates, &placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rules::test_support::{record, strings};
    use crate::models::{CandidateRecord, Location};

    fn city(id: &str, city: &str, score: f64) -> Scored {
        Scored::new(
            CandidateRecord {
                location: Some(Location { city: Some(city.into()), ..Default::default() }),
                ..record(id)
            },
            score,
        )
    }

    fn shares(a: &[String], b: &[String]) -> bool {
        a.iter().any(|v| b.contains(v))
    }

    fn ids(candidates: &[Scored]) -> Vec<&str> {
        candidates.iter().map(|c| c.candidate.user_id.as_str()).collect()
    }

    fn positions_apart(out: &[Scored], column: &str, spacing: usize) -> bool {
        for i in 0..out.len() {
            for j in (i + 1)..out.len() {
                let a = out[i].candidate.column(column);
                let b = out[j].candidate.column(column);
                if shares(&a, &b) && j - i < spacing {
                    return false;
                }
            }
        }
        true
    }

    #[test]
    fn test_score_based_interleaves_groups() {
        let pool = vec![
            city("a1", "berlin", 0.9),
            city("a2", "berlin", 0.8),
            city("a3", "berlin", 0.7),
            city("b1", "paris", 0.6),
            city("b2", "paris", 0.5),
            city("c1", "rome", 0.4),
        ];
        let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing: 2 };

        let out = spec.apply(pool, 10);
        assert_eq!(ids(&out), vec!["a1", "b1", "a2", "b2", "a3", "c1"]);
        assert!(positions_apart(&out, "city", 2));
    }

    #[test]
    fn test_score_based_respects_spacing_when_feasible() {
        let mut pool = Vec::new();
        for (i, c) in ["x", "y", "z"].iter().enumerate() {
            for k in 0..3 {
                pool.push(city(&format!("{}{}", c, k), c, 1.0 - (i * 3 + k) as f64 * 0.05));
            }
        }
        pool.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());

        let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing: 3 };
        let out = spec.apply(pool, 9);
        assert_eq!(out.len(), 9);
        assert!(positions_apart(&out, "city", 3));
    }

    /// One candidate per character, best score first; the character is the city
    fn pool_of(cities: &str) -> Vec<Scored> {
        cities
            .chars()
            .enumerate()
            .map(|(i, c)| city(&format!("{}{}", c, i), &c.to_string(), 1.0 - i as f64 * 0.01))
            .collect()
    }

    fn cities_of(out: &[Scored]) -> String {
        out.iter()
            .map(|c| c.candidate.column("city").concat())
            .collect()
    }

    fn spaced(order: &[char], spacing: usize) -> bool {
        (0..order.len()).all(|i| {
            ((i + 1)..order.len()).all(|j| order[i] != order[j] || j - i >= spacing)
        })
    }

    fn arrangement_exists(left: &mut Vec<char>, placed: &mut Vec<char>, spacing: usize) -> bool {
        if left.is_empty() {
            return true;
        }
        for i in 0..left.len() {
            let c = left[i];
            if left[..i].contains(&c) {
                continue;
            }
            let start = placed.len().saturating_sub(spacing - 1);
            if placed[start..].contains(&c) {
                continue;
            }
            left.remove(i);
            placed.push(c);
            let found = arrangement_exists(left, placed, spacing);
            placed.pop();
            left.insert(i, c);
            if found {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_score_based_holds_back_crowded_group() {
        let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing: 2 };
        let out = spec.apply(pool_of("xyzxyy"), 10);
        assert_eq!(cities_of(&out), "xyzyxy");
        assert!(positions_apart(&out, "city", 2));

        let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing: 3 };
        let out = spec.apply(pool_of("zxxy"), 10);
        assert_eq!(cities_of(&out), "xzyx");
        assert!(positions_apart(&out, "city", 3));
    }

    #[test]
    fn test_score_based_spaces_every_arrangeable_pool() {
        let letters = ['x', 'y', 'z'];
        for len in 1..=6u32 {
            for code in 0..3usize.pow(len) {
                let mut rest = code;
                let cities: String = (0..len)
                    .map(|_| {
                        let c = letters[rest % 3];
                        rest /= 3;
                        c
                    })
                    .collect();
                for spacing in 2..=3 {
                    let mut left: Vec<char> = cities.chars().collect();
                    if !arrangement_exists(&mut left, &mut Vec::new(), spacing) {
                        continue;
                    }
                    let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing };
                    let out: Vec<char> =
                        cities_of(&spec.apply(pool_of(&cities), 10)).chars().collect();
                    assert!(
                        spaced(&out, spacing),
                        "{} spacing {} gave {:?}",
                        cities,
                        spacing,
                        out
                    );
                }
            }
        }
    }

    #[test]
    fn test_score_based_relaxes_when_impossible() {
        let pool = vec![
            city("a1", "berlin", 0.9),
            city("a2", "berlin", 0.8),
            city("a3", "berlin", 0.7),
        ];
        let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing: 5 };

        let out = spec.apply(pool, 10);
        assert_eq!(ids(&out), vec!["a1", "a2", "a3"]);
    }

    #[test]
    fn test_score_based_explodes_multi_valued_columns() {
        let pool = vec![
            Scored::new(CandidateRecord { skills: strings(&["rust", "go"]), ..record("a") }, 0.9),
            Scored::new(CandidateRecord { skills: strings(&["go"]), ..record("b") }, 0.8),
            Scored::new(CandidateRecord { skills: strings(&["python"]), ..record("c") }, 0.7),
        ];
        let spec = DiversificationSpec::ScoreBased { column: "skills".into(), spacing: 2 };

        let out = spec.apply(pool, 3);
        assert_eq!(ids(&out), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_score_based_honours_limit() {
        let pool = vec![city("a", "berlin", 0.9), city("b", "paris", 0.8), city("c", "rome", 0.7)];
        let spec = DiversificationSpec::ScoreBased { column: "city".into(), spacing: 2 };
        assert_eq!(spec.apply(pool, 2).len(), 2);
    }

    #[test]
    fn test_proportional_allocates_by_share() {
        let pool = vec![
            city("d1", "berlin", 0.9),
            city("d2", "berlin", 0.8),
            city("d3", "berlin", 0.7),
            city("d4", "berlin", 0.6),
            city("m1", "paris", 0.5),
            city("m2", "paris", 0.4),
        ];
        let spec = DiversificationSpec::Proportional { column: "city".into(), spacing_budget: 0 };

        let out = spec.apply(pool, 6);
        assert_eq!(ids(&out), vec!["d1", "m1", "d2", "d3", "m2", "d4"]);
    }

    #[test]
    fn test_proportional_empty_pool() {
        let spec = DiversificationSpec::Proportional { column: "city".into(), spacing_budget: 4 };
        assert!(spec.apply(Vec::new(), 5).is_empty());
    }
}
