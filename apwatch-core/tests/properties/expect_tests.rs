//! Property-based tests for login expect rules

use apwatch_core::automation::{CueKind, ExpectEngine, ExpectRule, default_login_rules};
use proptest::prelude::*;

// ========== Strategies ==========

/// Banner text a device prints before its login prompt
fn arb_banner() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("\r\nUser Access Verification\r\n\r\n".to_string()),
        Just("Welcome to core-sw\r\n".to_string()),
        "[A-Za-z0-9 ]{0,40}\r\n",
    ]
}

fn arb_username_prompt() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("User: ".to_string()),
        Just("Username:".to_string()),
        Just("login: ".to_string()),
        Just("USERNAME: ".to_string()),
    ]
}

fn arb_password_prompt() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Password: ".to_string()),
        Just("password:".to_string()),
        Just("PASSWORD:  ".to_string()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========== Default login cues ==========

    #[test]
    fn username_prompt_selects_username_rule(
        banner in arb_banner(),
        prompt in arb_username_prompt(),
    ) {
        let engine = ExpectEngine::from_rules(default_login_rules()).unwrap();
        let output = format!("{banner}{prompt}");
        let rule = engine.match_output(&output);
        prop_assert!(rule.is_some(), "no rule matched {:?}", output);
        prop_assert_eq!(rule.unwrap().cue, CueKind::Username);
    }

    #[test]
    fn password_prompt_selects_password_rule(
        banner in arb_banner(),
        prompt in arb_password_prompt(),
    ) {
        let engine = ExpectEngine::from_rules(default_login_rules()).unwrap();
        let output = format!("{banner}{prompt}");
        let rule = engine.match_output(&output);
        prop_assert!(rule.is_some(), "no rule matched {:?}", output);
        prop_assert_eq!(rule.unwrap().cue, CueKind::Password);
    }

    #[test]
    fn prompt_must_end_the_output(
        prompt in arb_password_prompt(),
        tail in "[a-z]{1,10}",
    ) {
        let engine = ExpectEngine::from_rules(default_login_rules()).unwrap();
        let output = format!("{prompt}{tail}");
        prop_assert!(engine.match_output(&output).is_none());
    }

    // ========== Priority ==========
    //
    // When several rules match, the highest priority wins and equal
    // priorities keep configuration order.

    #[test]
    fn highest_priority_rule_is_selected(
        priorities in prop::collection::vec(-100i32..100i32, 2..6)
    ) {
        let mut engine = ExpectEngine::new();
        for (i, &priority) in priorities.iter().enumerate() {
            let rule = ExpectRule::new("more", format!("response_{i}")).with_priority(priority);
            engine.add_rule(rule).unwrap();
        }

        let max_priority = *priorities.iter().max().unwrap();
        let first_with_max = priorities.iter().position(|&p| p == max_priority).unwrap();

        let matched = engine.match_output("--more--").unwrap();
        prop_assert_eq!(matched.priority, max_priority);
        prop_assert_eq!(matched.response.clone(), format!("response_{first_with_max}"));
    }

    #[test]
    fn disabled_rules_never_match(pattern in "[a-z]{3,10}") {
        let rule = ExpectRule::new(pattern.clone(), "x").with_enabled(false);
        let engine = ExpectEngine::from_rules(vec![rule]).unwrap();
        prop_assert!(engine.match_output(&pattern).is_none());
    }

    #[test]
    fn password_response_renders_secret(password in "[A-Za-z0-9!@#]{1,20}") {
        let rule = ExpectRule::password("Password:");
        prop_assert_eq!(rule.render_response("admin", &password), password);
    }
}
