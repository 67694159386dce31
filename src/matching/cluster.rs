use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::normalize::NormalizedRecord;
use crate::TARGET_MATCH;

use super::blocking::BlockIndex;
use super::similarity::token_sort_similarity;
use super::types::{DuplicateGroup, MatchConfig, MatchMode};

/// Partition the table into duplicate groups.
///
/// One sequential pass in table order. Each unvisited record becomes a seed:
/// a seed with a domain pulls in its whole domain block; a domain-less seed
/// with a phone pulls in the phone-block members whose name scores at or
/// above the threshold against the seed; a record with neither key forms a
/// singleton. Every emitted member is marked visited and never reseeds.
///
/// In the default [`MatchMode::Seeded`] mode phone matches are star-shaped:
/// members are compared only against the seed, never against each other, so
/// two members can share a group without clearing the threshold between
/// themselves. [`MatchMode::Transitive`] replaces the pass with a union-find
/// closure over all matching pairs.
pub fn find_duplicate_groups(
    records: &[NormalizedRecord],
    config: &MatchConfig,
) -> Vec<DuplicateGroup> {
    let groups = match config.mode {
        MatchMode::Seeded => seeded_pass(records, config.threshold),
        MatchMode::Transitive => transitive_closure(records, config.threshold),
    };

    info!(
        target: TARGET_MATCH,
        "Clustering produced {} groups ({} with more than one member) from {} records",
        groups.len(),
        groups.iter().filter(|g| g.len() > 1).count(),
        records.len()
    );

    groups
}

fn seeded_pass(records: &[NormalizedRecord], threshold: u8) -> Vec<DuplicateGroup> {
    let index = BlockIndex::build(records);
    let by_id: HashMap<usize, &NormalizedRecord> =
        records.iter().map(|r| (r.id(), r)).collect();

    let mut visited: HashSet<usize> = HashSet::new();
    let mut groups = Vec::new();

    for seed in records {
        if visited.contains(&seed.id()) {
            continue;
        }

        let member_ids: Vec<usize> = match &seed.domain {
            Some(domain) if !domain.is_empty() => index.domain_block(domain).to_vec(),
            _ if !seed.phone_norm.is_empty() => index
                .phone_block(&seed.phone_norm)
                .iter()
                .copied()
                .filter(|id| {
                    let candidate = by_id[id];
                    let score = token_sort_similarity(&seed.name_norm, &candidate.name_norm);
                    if score >= threshold {
                        true
                    } else {
                        debug!(
                            target: TARGET_MATCH,
                            "Rejected phone-block candidate {} for seed {}: name score {} < {}",
                            id,
                            seed.id(),
                            score,
                            threshold
                        );
                        false
                    }
                })
                .collect(),
            // No usable blocking key: the record stands alone.
            _ => vec![seed.id()],
        };

        visited.extend(&member_ids);
        groups.push(build_group(member_ids, &by_id));
    }

    groups
}

fn transitive_closure(records: &[NormalizedRecord], threshold: u8) -> Vec<DuplicateGroup> {
    let index = BlockIndex::build(records);
    let by_id: HashMap<usize, &NormalizedRecord> =
        records.iter().map(|r| (r.id(), r)).collect();
    let positions: HashMap<usize, usize> = records
        .iter()
        .enumerate()
        .map(|(pos, r)| (r.id(), pos))
        .collect();

    let mut dsu = UnionFind::new(records.len());

    // Domain equality is already transitive; union each block wholesale.
    for record in records {
        if let Some(domain) = &record.domain {
            if !domain.is_empty() {
                let block = index.domain_block(domain);
                for id in block {
                    dsu.union(positions[&record.id()], positions[id]);
                }
            }
        }
    }

    // Phone blocks merge pairwise on name similarity, closing chains the
    // seeded pass leaves open.
    for record in records {
        if record.phone_norm.is_empty() {
            continue;
        }
        for id in index.phone_block(&record.phone_norm) {
            if *id <= record.id() {
                continue;
            }
            let other = by_id[id];
            if token_sort_similarity(&record.name_norm, &other.name_norm) >= threshold {
                dsu.union(positions[&record.id()], positions[id]);
            }
        }
    }

    // Emit groups in table order of their first member.
    let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut root_order = Vec::new();
    for (pos, record) in records.iter().enumerate() {
        let root = dsu.find(pos);
        let entry = by_root.entry(root).or_default();
        if entry.is_empty() {
            root_order.push(root);
        }
        entry.push(record.id());
    }

    root_order
        .into_iter()
        .map(|root| build_group(by_root.remove(&root).unwrap_or_default(), &by_id))
        .collect()
}

fn build_group(
    mut member_ids: Vec<usize>,
    by_id: &HashMap<usize, &NormalizedRecord>,
) -> DuplicateGroup {
    member_ids.sort_unstable();
    member_ids.dedup();

    let members = member_ids.iter().map(|id| by_id[id].clone()).collect();

    DuplicateGroup {
        ids: member_ids,
        members,
    }
}

/// Union by size with path halving.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
