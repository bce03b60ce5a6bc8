use std::collections::HashSet;
use std::time::{Duration, Instant};

use samehash::config::{Goal, SearchConfig};
use samehash::digest::{FnHasher, SaylerHasher, StringHasher};
use samehash::worker::WorkerState;
use samehash::{coordinator, sequential, ConfigError, SearchError, SearchReport};

fn config(symbols: &str, length: usize, workers: usize, goal: Goal) -> SearchConfig {
    SearchConfig::default()
        .with_alphabet(symbols.parse().unwrap())
        .with_length(length)
        .with_workers(workers)
        .with_goal(goal)
        .with_poll_interval(Duration::from_millis(1))
}

/// Every group must be made of distinct strings that really share the group's digest
fn assert_consistent<H: StringHasher>(report: &SearchReport<H::Digest>, hasher: &H) {
    for group in report.pairs.iter().chain(&report.triples) {
        let distinct: HashSet<&String> = group.members().iter().collect();
        assert_eq!(distinct.len(), group.len(), "duplicate member in {:?}", group);
        assert!(group.len() >= 2);

        for member in group.members() {
            assert_eq!(&hasher.digest(member), group.digest(), "{} in {:?}", member, group);
        }
    }

    assert!(report.pairs.iter().all(|group| group.is_pair()));
    assert!(report.triples.iter().all(|group| group.is_triple()));
}

fn sum_mod_four(input: &str) -> u32 {
    input.bytes().map(u32::from).sum::<u32>() % 4
}

#[test]
fn four_digests_over_sixteen_strings() {
    let hasher = FnHasher::new(sum_mod_four);

    // Sixteen strings over four digests always hold a pair, however the rows are split
    for workers in 1..=8 {
        let search = config("abcd", 2, workers, Goal::Pairs(1));
        let report = coordinator::run(&search, FnHasher::new(sum_mod_four)).unwrap();

        assert!(report.goal_met, "no pair with {} worker(s)", workers);
        assert!(!report.is_empty());
        assert_consistent(&report, &hasher);
        assert!(report.worker_states.iter().all(WorkerState::is_terminal));
    }
}

#[test]
fn overlapping_pairs_become_a_triple() {
    // With a constant hash the first two reports of the single worker share "aa"
    let hasher = FnHasher::new(|_: &str| 0u8);
    let report = coordinator::run(&config("abcd", 2, 1, Goal::Triples(1)), hasher).unwrap();

    assert!(report.goal_met);
    assert!(report.pairs.is_empty());
    assert_eq!(report.triples.len(), 1);
    assert_eq!(report.triples[0].len(), 3);
    assert_eq!(report.triples[0].members(), &["aa", "ab", "ac"]);
}

#[test]
fn several_triples_across_workers() {
    let hasher = FnHasher::new(sum_mod_four);
    let search = config("abcdefgh", 3, 3, Goal::Triples(3));
    let report = coordinator::run(&search, FnHasher::new(sum_mod_four)).unwrap();

    assert!(report.goal_met);
    assert!(report.triples.len() >= 3);
    assert_consistent(&report, &hasher);
}

#[test]
fn injective_hash_terminates_empty() {
    let hasher = FnHasher::new(|input: &str| input.to_owned());
    let report = coordinator::run(&config("abcde", 3, 3, Goal::Pairs(1)), hasher).unwrap();

    assert!(!report.goal_met);
    assert!(report.is_empty());
    assert_eq!(report.reissues, 0);
    assert_eq!(report.worker_states, vec![WorkerState::Exhausted; 3]);

    // Every pair of the 125 strings, each compared once
    assert_eq!(report.comparisons, 125 * 124 / 2);
}

#[test]
fn meeting_the_goal_stops_the_other_workers() {
    // Only "aaaa" and "aaab" collide, and they are the first pair of the first worker. The other
    // workers have billions of comparisons ahead of them.
    let hasher = FnHasher::new(|input: &str| match input {
        "aaab" => String::from("aaaa"),
        other => other.to_owned(),
    });
    let search = config("abcdefghijklmnopqrstuvwxyz", 4, 3, Goal::Pairs(1));

    let started = Instant::now();
    let report = coordinator::run(&search, hasher).unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(report.goal_met);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].members(), &["aaaa", "aaab"]);
    assert_eq!(report.reissues, 0);
    assert_eq!(
        report.worker_states,
        vec![WorkerState::Found, WorkerState::Cancelled, WorkerState::Cancelled]
    );
}

fn first_equals_last(input: &str) -> String {
    match input {
        "dd" => String::from("aa"),
        other => other.to_owned(),
    }
}

#[test]
fn pairs_across_worker_rows_are_found() {
    // "aa" is in the first worker's rows and "dd" in the last worker's
    for workers in 1..=16 {
        let search = config("abcd", 2, workers, Goal::Pairs(1));
        let report = coordinator::run(&search, FnHasher::new(first_equals_last)).unwrap();
        assert!(report.goal_met, "missed the pair with {} worker(s)", workers);
        assert_eq!(report.pairs[0].members(), &["aa", "dd"]);
    }
}

#[test]
fn unreachable_goal_returns_partial_results() {
    // Only "aa" and "bb" collide, a triple can never be found
    let hasher = FnHasher::new(|input: &str| match input {
        "aa" | "bb" => String::from("x"),
        other => other.to_owned(),
    });
    let report = coordinator::run(&config("ab", 2, 1, Goal::Triples(1)), hasher).unwrap();

    assert!(!report.goal_met);
    assert_eq!(report.pairs.len(), 1);
    assert_eq!(report.pairs[0].members(), &["aa", "bb"]);
    assert!(report.triples.is_empty());
}

#[test]
fn every_worker_faulting_does_not_hang() {
    let hasher = FnHasher::new(|input: &str| -> u8 { panic!("refusing to hash {}", input) });
    let report = coordinator::run(&config("abc", 2, 3, Goal::Pairs(1)), hasher).unwrap();

    assert_eq!(report.faults.len(), 3);
    assert_eq!(report.worker_states, vec![WorkerState::Faulted; 3]);
    assert!(report.is_empty());
}

#[test]
fn more_workers_than_strings() {
    let hasher = FnHasher::new(|_: &str| 0u8);
    let report = coordinator::run(&config("ab", 1, 4, Goal::Pairs(1)), hasher).unwrap();

    assert!(report.goal_met);
    assert_eq!(report.pairs[0].members(), &["a", "b"]);
}

#[test]
fn oversized_space_fails_before_searching() {
    let hasher = FnHasher::new(|_: &str| 0u8);
    let search = config("abcdefghijklmnopqrstuvwxyz", 20, 2, Goal::Pairs(1));
    let result = coordinator::run(&search, hasher);

    match result {
        Err(SearchError::Config(ConfigError::PartitionOverflow { alphabet_size, length })) => {
            assert_eq!((alphabet_size, length), (26, 20));
        }
        other => panic!("expected an overflow error, got {:?}", other.map(|r| r.comparisons)),
    }
}

#[test]
fn parallel_search_agrees_with_sequential_search() {
    // The workers together cover every pair of the space, so they find a collision exactly when
    // one exists
    for width in 1..=2 {
        for workers in 1..=3 {
            let hasher = SaylerHasher::new(width).unwrap();
            let search = config("abc", 3, workers, Goal::Pairs(1));

            let parallel = coordinator::run(&search, hasher).unwrap();
            let reference = sequential::find_collisions(&search, &hasher).unwrap();

            let context = format!("width {}, {} worker(s)", width, workers);
            assert_eq!(parallel.goal_met, reference.goal_met, "{}", context);
            assert_consistent(&parallel, &hasher);
            assert_consistent(&reference, &hasher);
        }
    }
}

#[test]
fn sayler_collisions_are_real_md5_prefix_collisions() {
    let hasher = SaylerHasher::new(1).unwrap();
    let report = coordinator::run(&config("abcdefgh", 3, 2, Goal::Pairs(2)), hasher).unwrap();

    assert!(report.goal_met);
    for group in report.pairs.iter().chain(&report.triples) {
        let rendered: Vec<String> = group
            .members()
            .iter()
            .map(|member| format!("{:x}", md5::compute(member.as_bytes())))
            .collect();
        for hex in &rendered[1..] {
            assert_eq!(hex[..1], rendered[0][..1]);
            assert_eq!(hex[31..], rendered[0][31..]);
        }
    }
}
