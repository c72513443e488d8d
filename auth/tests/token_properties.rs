//! Property tests for session tokens.

#![allow(clippy::unwrap_used)]

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use carto_auth::{AccountId, AuthError, Identity, Role, TokenAuthority};
use carto_testing::ManualClock;
use chrono::{DateTime, Duration};
use proptest::prelude::*;
use std::sync::Arc;

const START: i64 = 1_735_689_600_000;

fn authority(clock: &ManualClock) -> TokenAuthority {
    TokenAuthority::new(Some("property-secret"), Duration::days(7), Arc::new(clock.clone()))
}

fn identity_strategy() -> impl Strategy<Value = Identity> {
    prop_oneof![
        Just(Identity::admin()),
        Just(Identity::user()),
        any::<u128>().prop_map(|bits| Identity::account(AccountId(uuid::Uuid::from_u128(bits)))),
    ]
}

proptest! {
    #[test]
    fn issued_tokens_verify_until_expiry(
        identity in identity_strategy(),
        elapsed in 0_i64..Duration::days(7).num_milliseconds(),
    ) {
        let clock = ManualClock::at_millis(START);
        let auth = authority(&clock);
        let token = auth.issue(identity.role, identity.account_id).unwrap();

        clock.set(DateTime::from_timestamp_millis(START + elapsed).unwrap());
        prop_assert_eq!(auth.verify(&token.value), Ok(identity));

        clock.set(DateTime::from_timestamp_millis(token.expires_at + elapsed).unwrap());
        prop_assert_eq!(auth.verify(&token.value), Err(AuthError::InvalidToken { reason: "expired" }));
    }

    #[test]
    fn any_changed_character_invalidates(
        identity in identity_strategy(),
        index in any::<prop::sample::Index>(),
        replacement in prop::sample::select(
            "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_".chars().collect::<Vec<_>>()
        ),
    ) {
        let clock = ManualClock::at_millis(START);
        let auth = authority(&clock);
        let token = auth.issue(identity.role, identity.account_id).unwrap().value;

        let position = index.index(token.len());
        let original = token.as_bytes()[position] as char;
        prop_assume!(original != '.' && original != replacement);

        let mut tampered = token.clone();
        tampered.replace_range(position..=position, &replacement.to_string());

        // Trailing base64 characters can carry unused bits; changing only
        // those decodes to the same bytes and stays valid. Everything else
        // must be rejected.
        let (payload, signature) = tampered.split_once('.').unwrap();
        let (orig_payload, orig_signature) = token.split_once('.').unwrap();
        let same_bytes = URL_SAFE_NO_PAD.decode(payload).ok() == URL_SAFE_NO_PAD.decode(orig_payload).ok()
            && URL_SAFE_NO_PAD.decode(signature).ok() == URL_SAFE_NO_PAD.decode(orig_signature).ok();
        prop_assume!(!same_bytes);

        let rejected = matches!(auth.verify(&tampered), Err(AuthError::InvalidToken { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn admin_tokens_never_carry_an_account(bits in any::<u128>()) {
        let clock = ManualClock::at_millis(START);
        let auth = authority(&clock);
        let token = auth.issue(Role::Admin, Some(AccountId(uuid::Uuid::from_u128(bits)))).unwrap();
        prop_assert_eq!(auth.verify(&token.value), Ok(Identity::admin()));
    }
}
