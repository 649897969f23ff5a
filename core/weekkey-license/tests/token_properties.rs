//! Property-based tests for token derivation.
//!
//! These verify properties issuer and validator rely on:
//! - Derivation is deterministic
//! - Tokens repeat with the pool size as period
//! - The current week's token is always accepted
//! - Normalization makes acceptance case- and whitespace-insensitive

mod common;

use common::letters_config;
use proptest::prelude::*;
use weekkey_license::{normalize_candidate, previous_week, TokenScheme, KEYWORD_COUNT};

fn scheme() -> TokenScheme {
    TokenScheme::from_config(&letters_config()).unwrap()
}

fn week_strategy() -> impl Strategy<Value = u32> {
    1u32..=53
}

proptest! {
    #[test]
    fn derivation_is_deterministic(week in week_strategy()) {
        let scheme = scheme();
        prop_assert_eq!(scheme.token_for_week(week), scheme.token_for_week(week));
    }

    #[test]
    fn period_is_pool_size(week in 1u32..=1000) {
        let scheme = scheme();
        prop_assert_eq!(
            scheme.token_for_week(week),
            scheme.token_for_week(week + KEYWORD_COUNT as u32)
        );
    }

    #[test]
    fn token_has_four_words(week in week_strategy()) {
        let token = scheme().token_for_week(week);
        prop_assert_eq!(token.as_str().split('-').count(), 4);
    }

    #[test]
    fn valid_set_has_current_and_previous(week in week_strategy()) {
        let scheme = scheme();
        let valid = scheme.valid_tokens_for_week(week);
        prop_assert_eq!(valid.len(), 2);
        prop_assert_eq!(&valid[0], &scheme.token_for_week(week));
        prop_assert_eq!(&valid[1], &scheme.token_for_week(previous_week(week)));
    }

    #[test]
    fn two_weeks_back_rejected(week in 3u32..=52) {
        let scheme = scheme();
        let stale = scheme.token_for_week(week - 2);
        prop_assert!(!scheme.accepts(stale.as_str(), week));
    }

    #[test]
    fn case_and_whitespace_insensitive(
        week in week_strategy(),
        lead in "[ \t\n]{0,3}",
        trail in "[ \t\n]{0,3}",
    ) {
        let scheme = scheme();
        let token = scheme.token_for_week(week);
        let typed = format!("{lead}{}{trail}", token.as_str().to_lowercase());
        prop_assert!(scheme.accepts(&normalize_candidate(&typed), week));
    }
}
