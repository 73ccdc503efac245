use super::*;

use crate::node::NodeId;
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Brute-force longest-prefix reference.
type Model<K> = BTreeMap<(K, u32), u64>;

fn model_longest<K: Key>(m: &Model<K>, key: K, bits: u32) -> Option<(K, u32, u64)> {
    m.iter()
        .filter(|((k, b), _)| *b <= bits && key.mask(*b) == *k)
        .max_by_key(|((_, b), _)| *b)
        .map(|((k, b), v)| (*k, *b, *v))
}

fn tree_longest<K: Key>(t: &Radix<K, u64>, key: K, bits: u32) -> Option<(K, u32, u64)> {
    t.find(key, bits)
        .unwrap()
        .map(|n| (n.key(), n.bits(), *n.value().unwrap()))
}

/// Check every structural invariant of a 32-bit tree.
fn validate_tree<V>(t: &Radix32<V>) {
    let root = t.node(NodeId::ROOT);
    assert!(root.parent.is_none(), "root must not have a parent");

    let mut stack = vec![(NodeId::ROOT, 0u32, 0u32)];
    let mut reachable = 0usize;
    let mut entries = 0usize;

    while let Some((id, depth, path)) = stack.pop() {
        reachable += 1;
        let node = t.node(id);

        if let Some(e) = &node.entry {
            entries += 1;
            assert_eq!(e.key, e.key.mask(e.bits), "stored key must be masked");
            assert!(
                e.bits >= depth,
                "entry /{} sits below its length at depth {depth}",
                e.bits
            );
            assert_eq!(e.key.mask(depth), path, "entry is off its own path");
            if !node.is_leaf() {
                assert_eq!(e.bits, depth, "internal entry must sit at its exact depth");
            }
        }

        if id != NodeId::ROOT && node.entry.is_none() {
            assert!(!node.is_leaf(), "empty leaf survived at depth {depth}");
            if let Some(only) = node.only_child() {
                assert!(
                    !t.node(only).is_leaf(),
                    "empty node at depth {depth} only leads to a leaf"
                );
            }
        }

        for (dir, child) in node.branch.iter().enumerate() {
            if let Some(child) = *child {
                assert!(depth < 32, "node below full key width");
                assert_eq!(t.node(child).parent, Some(id), "broken parent link");
                stack.push((child, depth + 1, path | ((dir as u32) << (31 - depth))));
            }
        }
    }

    assert_eq!(entries, t.len(), "entry count must match Radix::len");
    assert_eq!(reachable, t.node_count(), "unreachable live nodes");
    assert_eq!(
        t.nodes.iter().filter(|n| n.is_none()).count(),
        t.free.len(),
        "free list must track released slots"
    );
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u32, u32, u64),
    Remove(u32, u32),
    Find(u32, u32),
}

/// Keys drawn from a narrow space so prefixes nest and collide often.
fn key_strategy() -> impl Strategy<Value = u32> + Clone {
    prop_oneof![
        3 => (0u32..4, 0u32..4, 0u32..4, any::<u8>())
            .prop_map(|(a, b, c, d)| (a << 30) | (b << 22) | (c << 14) | (u32::from(d) << 6)),
        1 => any::<u32>(),
    ]
}

fn bits_strategy() -> impl Strategy<Value = u32> + Clone {
    prop_oneof![1u32..=8, 8u32..=16, 16u32..=24, 24u32..=32]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let bits = bits_strategy();
    let op = prop_oneof![
        45 => (key.clone(), bits.clone(), any::<u64>()).prop_map(|(k, b, v)| Op::Insert(k, b, v)),
        25 => (key.clone(), bits.clone()).prop_map(|(k, b)| Op::Remove(k, b)),
        15 => (key.clone(), bits).prop_map(|(k, b)| Op::Find(k, b)),
        15 => key.prop_map(|k| Op::Find(k, 32)),
    ];
    prop::collection::vec(op, 0..=600)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_model(ops in ops_strategy()) {
        let mut t: Radix32<u64> = Radix32::new();
        let mut m: Model<u32> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, bits, value) => {
                    let node = t.insert(key, bits, value).unwrap();
                    prop_assert_eq!(node.key(), key.mask(bits));
                    prop_assert_eq!(node.bits(), bits);
                    prop_assert_eq!(node.value(), Some(&value));
                    m.insert((key.mask(bits), bits), value);
                }
                Op::Remove(key, bits) => {
                    let got = t
                        .remove(key, bits)
                        .unwrap()
                        .map(|e| (e.key(), e.bits(), e.into_value()));
                    let expected = m
                        .remove(&(key.mask(bits), bits))
                        .map(|v| (key.mask(bits), bits, v));
                    prop_assert_eq!(got, expected);
                    // Nothing stale is left behind for the removed prefix.
                    prop_assert_eq!(tree_longest(&t, key, bits), model_longest(&m, key, bits));
                }
                Op::Find(key, bits) => {
                    prop_assert_eq!(tree_longest(&t, key, bits), model_longest(&m, key, bits));
                }
            }

            prop_assert_eq!(t.len(), m.len());
        }

        validate_tree(&t);
        let mut got: Vec<_> = t
            .entries()
            .map(|e| (e.key(), e.bits(), *e.value()))
            .collect();
        got.sort();
        let expected: Vec<_> = m.iter().map(|((k, b), v)| (*k, *b, *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_structure_holds_after_every_remove(
        inserts in prop::collection::vec((key_strategy(), bits_strategy()), 1..=120),
    ) {
        let mut t: Radix32<u64> = Radix32::new();
        for (i, (key, bits)) in inserts.iter().enumerate() {
            t.insert(*key, *bits, i as u64).unwrap();
        }
        validate_tree(&t);

        for (key, bits) in &inserts {
            t.remove(*key, *bits).unwrap();
            validate_tree(&t);
        }
        prop_assert!(t.is_empty());
        prop_assert_eq!(t.node_count(), 1);
    }

    #[test]
    fn prop_bfs_is_level_ordered(
        inserts in prop::collection::vec((key_strategy(), bits_strategy()), 0..=200),
    ) {
        let mut t: Radix32<u64> = Radix32::new();
        for (i, (key, bits)) in inserts.into_iter().enumerate() {
            t.insert(key, bits, i as u64).unwrap();
        }
        let depths: Vec<u32> = t.bfs().map(|v| v.depth).collect();
        prop_assert_eq!(depths.len(), t.node_count());
        prop_assert!(depths.windows(2).all(|w| w[0] <= w[1]));
    }
}

/// Visit every ordering of `items` (Heap's algorithm).
fn permutations<T: Clone>(items: &[T], mut f: impl FnMut(&[T])) {
    let mut perm = items.to_vec();
    let mut c = vec![0usize; perm.len()];
    f(&perm);
    let mut i = 1;
    while i < perm.len() {
        if c[i] < i {
            let j = if i % 2 == 0 { 0 } else { c[i] };
            perm.swap(j, i);
            f(&perm);
            c[i] += 1;
            i = 1;
        } else {
            c[i] = 0;
            i += 1;
        }
    }
}

const PREFIXES: [(u32, u32); 6] = [
    (0x0A00_0000, 8),
    (0x0A14_0000, 14),
    (0x0A15_0000, 16),
    (0x0A15_0000, 24),
    (0xC0A8_0000, 16),
    (0xC0A8_0200, 24),
];

const QUERIES: [u32; 8] = [
    0x0A15_0001, // 10.21.0.1
    0x0A15_0101, // 10.21.1.1
    0x0A14_0102, // 10.20.1.2
    0x0A13_0001, // 10.19.0.1
    0xC0A8_0203, // 192.168.2.3
    0xC0A8_0303, // 192.168.3.3
    0xE600_0001, // 230.0.0.1
    0x0800_0001, // 8.0.0.1
];

fn check_queries(t: &Radix32<u64>, m: &Model<u32>) {
    for query in QUERIES {
        assert_eq!(
            tree_longest(t, query, 32),
            model_longest(m, query, 32),
            "query {query:#010x}"
        );
    }
    for (key, bits) in PREFIXES {
        assert_eq!(
            t.get(key, bits).unwrap().copied(),
            m.get(&(key, bits)).copied(),
            "exact {key:#010x}/{bits}"
        );
    }
}

#[test]
fn exhaustive_insert_order() {
    permutations(&PREFIXES, |perm| {
        let mut t: Radix32<u64> = Radix32::new();
        let mut m: Model<u32> = BTreeMap::new();
        for &(key, bits) in perm {
            let v = u64::from(bits) * 1000 + u64::from(key >> 16);
            t.insert(key, bits, v).unwrap();
            m.insert((key, bits), v);
        }
        validate_tree(&t);
        check_queries(&t, &m);
    });
}

#[test]
fn exhaustive_remove_order() {
    let mut base_tree: Radix32<u64> = Radix32::new();
    let mut base_model: Model<u32> = BTreeMap::new();
    for (i, &(key, bits)) in PREFIXES.iter().enumerate() {
        base_tree.insert(key, bits, i as u64).unwrap();
        base_model.insert((key, bits), i as u64);
    }

    permutations(&PREFIXES, |perm| {
        let mut t = base_tree.clone();
        let mut m = base_model.clone();
        for &(key, bits) in perm {
            let removed = t.remove(key, bits).unwrap().map(Entry::into_value);
            assert_eq!(removed, m.remove(&(key, bits)));
            validate_tree(&t);
            check_queries(&t, &m);
        }
        assert!(t.is_empty());
        assert_eq!(t.node_count(), 1);
        assert!(t.root().is_leaf());
    });
}

#[test]
fn randomized_wide_keys() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    let mut t: Radix64<u64> = Radix64::new();
    let mut m: Model<u64> = BTreeMap::new();

    for _ in 0..20_000 {
        // Two random top bits keep the prefixes overlapping.
        let key = (rng.gen_range(0u64..4) << 62) | (rng.gen::<u64>() >> 20);
        let bits = rng.gen_range(1..=64);
        match rng.gen_range(0..100) {
            0..=49 => {
                let v: u64 = rng.gen();
                t.insert(key, bits, v).unwrap();
                m.insert((key.mask(bits), bits), v);
            }
            50..=74 => {
                let got = t.remove(key, bits).unwrap().map(Entry::into_value);
                assert_eq!(got, m.remove(&(key.mask(bits), bits)));
            }
            _ => {
                assert_eq!(tree_longest(&t, key, 64), model_longest(&m, key, 64));
            }
        }
    }

    assert_eq!(t.len(), m.len());
    for (&(key, bits), &v) in &m {
        assert_eq!(t.get(key, bits).unwrap(), Some(&v));
    }
}
