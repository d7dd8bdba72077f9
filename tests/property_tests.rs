//! Property-based tests for matcher, buffer and debounce invariants.
//!
//! Tests validate:
//! 1. Every view is a subsequence of the buffer, with ranges inside the display text
//! 2. Views agree with the matcher applied to the same (query, buffer)
//! 3. The buffer never exceeds its cap and keeps the newest lines
//! 4. A burst of debounce triggers fires at least once and at most once per window

use cull::coordinator::debounce::Debouncer;
use cull::matcher::Registry;
use cull::{Config, Coordinator, Line, LineId};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn lines(texts: &[String]) -> Vec<Arc<Line>> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Arc::new(Line::new(LineId::new(i as u64), t.clone())))
        .collect()
}

fn text_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-cA-C ]{0,8}", 0..40)
}

fn query_strategy() -> impl Strategy<Value = String> {
    "[a-cA-C ]{0,4}"
}

// ===== Property 1: Views are subsets of the input =====

proptest! {
    #[test]
    fn matches_are_an_ordered_subsequence(texts in text_strategy(), query in query_strategy()) {
        let buffer = lines(&texts);
        let registry = Registry::builtin();
        for name in registry.names() {
            let matcher = registry.get(name).unwrap();
            let matches = matcher.filter(&query, &buffer);

            let ids: Vec<u64> = matches.iter().map(|m| m.id().get()).collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]), "{} keeps buffer order", name);

            for m in &matches {
                let line = &buffer[m.id().get() as usize];
                prop_assert!(Arc::ptr_eq(m.line(), line), "match traces back to its line");
                for range in m.ranges() {
                    prop_assert!(range.start < range.end && range.end <= m.display().len());
                    prop_assert!(m.display().is_char_boundary(range.start));
                    prop_assert!(m.display().is_char_boundary(range.end));
                }
                prop_assert!(
                    m.ranges().windows(2).all(|w| w[0].end < w[1].start),
                    "ranges sorted and merged: {:?}", m.ranges()
                );
            }
        }
    }

    #[test]
    fn every_term_occurs_in_accepted_lines(texts in text_strategy(), query in query_strategy()) {
        let buffer = lines(&texts);
        let matcher = Registry::builtin().get("IgnoreCase").unwrap();
        let accepted = matcher.filter(&query, &buffer);
        for m in &accepted {
            let display = m.display().to_lowercase();
            for term in query.split_whitespace() {
                prop_assert!(display.contains(&term.to_lowercase()));
            }
        }
        let rejected = buffer.len() - accepted.len();
        let expected_rejected = texts
            .iter()
            .filter(|t| {
                let t = t.to_lowercase();
                !query.split_whitespace().all(|term| t.contains(&term.to_lowercase()))
            })
            .count();
        prop_assert_eq!(rejected, expected_rejected);
    }

    #[test]
    fn empty_query_is_identity(texts in text_strategy()) {
        let buffer = lines(&texts);
        let matches = Registry::builtin().default_matcher().filter("", &buffer);
        prop_assert_eq!(matches.len(), buffer.len());
        prop_assert!(matches.iter().all(|m| m.is_unfiltered()));
    }
}

// ===== Property 2: Published views match a real (query, buffer) pair =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn published_view_matches_matcher_output(
        texts in text_strategy(),
        query in query_strategy(),
        matcher in prop::sample::select(vec!["IgnoreCase", "CaseSensitive", "SmartCase"]),
    ) {
        let coordinator = Coordinator::start(Config {
            initial_matcher: matcher.to_string(),
            query: query.clone(),
            ..Config::default()
        }).unwrap();
        coordinator.feed_lines(&texts);

        // Drive a pass through the public surface: a redundant request
        // is fine, the published view is what counts.
        let mut terminal = cull::terminal::ScriptedTerminal::new()
            .key(crossterm::event::KeyCode::Esc);
        coordinator.run(&mut terminal).unwrap();

        let view = coordinator.view();
        let expected = Registry::builtin()
            .get(matcher)
            .unwrap()
            .filter(&query, &coordinator.buffer());
        let got: Vec<u64> = view.matches().iter().map(|m| m.id().get()).collect();
        let want: Vec<u64> = expected.iter().map(|m| m.id().get()).collect();
        prop_assert_eq!(got, want);
        prop_assert_eq!(view.query(), query.as_str());
    }
}

// ===== Property 3: Buffer cap =====

proptest! {
    #[test]
    fn buffer_never_exceeds_cap(
        batches in prop::collection::vec(prop::collection::vec("[a-z]{1,5}", 0..10), 1..10),
        cap in 0usize..15,
    ) {
        let coordinator = Coordinator::start(Config {
            buffer_size: cap,
            ..Config::default()
        }).unwrap();
        let mut all = Vec::new();
        for batch in &batches {
            coordinator.feed_lines(batch);
            all.extend(batch.iter().cloned());
            if cap > 0 {
                prop_assert!(coordinator.buffer_len() <= cap);
            }
        }

        let kept = if cap == 0 { all.len() } else { all.len().min(cap) };
        let buffer = coordinator.buffer();
        let texts: Vec<&str> = buffer.iter().map(|l| l.display()).collect();
        let newest: Vec<&str> = all[all.len() - kept..].iter().map(String::as_str).collect();
        prop_assert_eq!(texts, newest, "buffer holds the newest lines in order");

        let ids: Vec<u64> = buffer.iter().map(|l| l.id().get()).collect();
        let expected: Vec<u64> = ((all.len() - kept) as u64..all.len() as u64).collect();
        prop_assert_eq!(ids, expected, "ordinals are input positions");
    }
}

// ===== Property 4: Debounce =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn burst_fires_once(triggers in 1usize..50) {
        let debouncer = Debouncer::new("burst", Duration::from_millis(30));
        let fired = Arc::new(AtomicUsize::new(0));
        let mut accepted = 0;
        for _ in 0..triggers {
            let fired = Arc::clone(&fired);
            if debouncer.schedule(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }) {
                accepted += 1;
            }
        }
        prop_assert_eq!(accepted, 1, "first trigger wins, the rest are no-ops");

        thread::sleep(Duration::from_millis(150));
        prop_assert_eq!(fired.load(Ordering::SeqCst), 1);
        prop_assert!(!debouncer.is_pending());
    }
}
