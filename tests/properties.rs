use futures::executor::block_on;
use jungle_jump::highscores::{LeaderboardTable, MAX_HIGH_SCORES};
use jungle_jump::persistence::{
    ChunkedStore, MemoryBackend, decode, encode, join_chunks, split_into_chunks,
};
use jungle_jump::sim::{SessionState, TickInput, autopilot, step};
use jungle_jump::{Difficulty, Tuning};
use proptest::prelude::*;

fn name() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,10}"
}

fn note() -> impl Strategy<Value = String> {
    "[0-9]{1,3}\\.[0-9]{2}s"
}

fn runs() -> impl Strategy<Value = Vec<(String, u64, String)>> {
    prop::collection::vec((name(), 0u64..1_000_000, note()), 0..30)
}

proptest! {
    #[test]
    fn codec_inverts_any_string(s in any::<String>()) {
        let encoded = encode(&s).unwrap();
        prop_assert!(encoded.bytes().all(|b| b.is_ascii_alphanumeric() || b"+/=".contains(&b)));
        prop_assert_eq!(decode::<String>(&encoded).unwrap(), s);
    }

    #[test]
    fn chunks_rejoin_to_input(s in any::<String>(), max_len in 1usize..80) {
        let chunks = split_into_chunks(&s, max_len);
        prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= max_len));
        prop_assert_eq!(chunks.len(), s.chars().count().div_ceil(max_len));
        prop_assert_eq!(join_chunks(chunks), s);
    }

    #[test]
    fn table_stays_bounded_and_sorted(runs in runs()) {
        let mut table = LeaderboardTable::new();
        for (name, score, note) in &runs {
            table.add(name, *score, note).unwrap();
            prop_assert!(table.len() <= MAX_HIGH_SCORES);
            prop_assert!(table.entries().windows(2).all(|w| w[0].score >= w[1].score));
        }
        prop_assert_eq!(table.len(), runs.len().min(MAX_HIGH_SCORES));
    }

    #[test]
    fn table_text_round_trips(runs in runs()) {
        let mut table = LeaderboardTable::new();
        for (name, score, note) in &runs {
            table.add(name, *score, note).unwrap();
        }
        let mut parsed = LeaderboardTable::new();
        parsed.deserialize(&table.serialize()).unwrap();
        prop_assert_eq!(parsed, table);
    }

    #[test]
    fn full_table_rejects_scores_at_or_below_minimum(runs in runs(), below in 0u64..1_000) {
        let mut table = LeaderboardTable::new();
        for (name, score, note) in &runs {
            table.add(name, *score, note).unwrap();
        }
        prop_assume!(table.is_full());

        let score = table.last_score().saturating_sub(below);
        let before = table.clone();
        prop_assert_eq!(table.add("late", score, "0.00s"), Ok(false));
        prop_assert_eq!(table, before);
    }

    #[test]
    fn store_round_trips_through_small_values(s in ".{0,400}", limit in 8usize..64) {
        let store = ChunkedStore::new(MemoryBackend::with_limit(limit));
        block_on(store.set("k", &s)).unwrap();
        prop_assert_eq!(block_on(store.get::<String>("k")).unwrap(), s);
        for key in store.backend().keys() {
            let value = store.backend().peek(&key).unwrap();
            prop_assert!(value.chars().count() <= limit);
        }
    }

    #[test]
    fn simulation_is_deterministic(seed in any::<u64>(), hard in any::<bool>()) {
        let difficulty = if hard { Difficulty::Hard } else { Difficulty::Easy };
        let tuning = Tuning::for_difficulty(difficulty);
        let mut a = SessionState::new(tuning, seed);
        let mut b = SessionState::new(tuning, seed);

        for _ in 0..600 {
            let input = TickInput { target_x: autopilot::target_x(&a) };
            step(&mut a, &input);
            step(&mut b, &input);
        }
        prop_assert_eq!(a.score, b.score);
        prop_assert_eq!(a.player, b.player);
        prop_assert_eq!(a.platforms, b.platforms);
    }

    #[test]
    fn session_invariants_hold_every_tick(seed in any::<u64>(), targets in prop::collection::vec(0f32..600.0, 1..400)) {
        let mut state = SessionState::new(Tuning::default(), seed);
        let mut last_camera = state.camera_offset;
        let mut last_score = state.score;

        for target_x in targets {
            step(&mut state, &TickInput { target_x });

            prop_assert!(state.camera_offset <= last_camera);
            prop_assert!(state.score >= last_score);
            prop_assert_eq!(state.score % 10, 0);
            prop_assert!(state.player.vel.x.abs() <= state.tuning.max_speed_x);
            prop_assert!(state.platforms.iter().filter(|p| p.is_bedrock()).count() <= 1);
            last_camera = state.camera_offset;
            last_score = state.score;
        }
    }
}
