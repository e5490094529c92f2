//! Device sessions against scripted fake consoles

use std::sync::Arc;
use std::time::Duration;

use apwatch_core::session::{SessionOutcome, SessionPlan};
use apwatch_core::transcript::DeviceTranscript;
use apwatch_core::{DeviceConfig, SessionError};

use super::{
    AP_LISTING, Behaviour, ScriptedConnector, Step, TEST_DEADLINE, controller_config,
    controller_script, expect, runner, say, switch_config, switch_script,
};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const ECHO: u8 = 1;
const SUPPRESS_GO_AHEAD: u8 = 3;

async fn run(connector: &Arc<ScriptedConnector>, device: &DeviceConfig) -> DeviceTranscript {
    let plan = Arc::new(SessionPlan::compile(device).expect("valid device"));
    tokio::time::timeout(TEST_DEADLINE, runner(connector).run(plan))
        .await
        .expect("session should settle")
}

fn failure(segment: &DeviceTranscript) -> &SessionError {
    match &segment.outcome {
        SessionOutcome::Failed(err) => err,
        SessionOutcome::Completed => panic!("expected a failed session"),
    }
}

#[tokio::test]
async fn test_controller_session_completes() {
    let connector = Arc::new(
        ScriptedConnector::new().with_device("ctrl", Behaviour::Script(controller_script())),
    );

    let segment = run(&connector, &controller_config("ctrl")).await;

    assert_eq!(segment.outcome, SessionOutcome::Completed);
    assert_eq!(segment.device, "controller");
    assert!(segment.text.contains("ap_01# show aps"));
    assert!(segment.text.contains("Client List"));
    assert!(segment.text.contains("max-clients-threshold 5"));

    let sent = String::from_utf8(connector.received("ctrl")).unwrap();
    let order = ["admin\r\n", "s3cret\r\n", "show aps\r\n", "show clients\r\n", "exit\r\n"];
    let positions: Vec<usize> = order.iter().map(|s| sent.find(s).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "sent: {sent:?}");
}

#[tokio::test]
async fn test_password_only_session_completes() {
    let connector =
        Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Script(switch_script())));

    let segment = run(&connector, &switch_config("sw")).await;

    assert_eq!(segment.outcome, SessionOutcome::Completed);
    assert!(segment.text.contains("Pool utilization: 37.50%"));
    let sent = String::from_utf8(connector.received("sw")).unwrap();
    assert!(!sent.contains("admin"));
}

#[tokio::test]
async fn test_telnet_options_are_refused_and_stripped() {
    let mut script = vec![
        Step::Say(vec![IAC, DO, ECHO, IAC, WILL, SUPPRESS_GO_AHEAD]),
        Step::Await(vec![IAC, WONT, ECHO]),
        Step::Await(vec![IAC, DONT, SUPPRESS_GO_AHEAD]),
    ];
    script.extend(switch_script());
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Script(script)));

    let segment = run(&connector, &switch_config("sw")).await;

    assert_eq!(segment.outcome, SessionOutcome::Completed);
    assert!(!segment.text.contains('\u{FFFD}'));
    assert!(segment.text.starts_with("\r\nPassword: "));
}

#[tokio::test(start_paused = true)]
async fn test_multibyte_banner_split_across_reads() {
    let banner = "Bienvenue au café\r\n".as_bytes();
    let split = banner.len() - 3;
    let mut script = vec![
        Step::Say(banner[..split].to_vec()),
        Step::Pause(Duration::from_millis(50)),
        Step::Say(banner[split..].to_vec()),
    ];
    script.extend(switch_script());
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Script(script)));

    let segment = run(&connector, &switch_config("sw")).await;

    assert_eq!(segment.outcome, SessionOutcome::Completed);
    assert!(segment.text.starts_with("Bienvenue au café\r\n"));
    assert!(!segment.text.contains('\u{FFFD}'));
}

#[tokio::test]
async fn test_rejected_credentials_fail_after_max_attempts() {
    let rejected = "\r\n% Authentication failed\r\nPassword: ";
    let script = vec![
        say("\r\nPassword: "),
        expect("sw-pass\r\n"),
        say(rejected),
        expect("sw-pass\r\n"),
        say(rejected),
        expect("sw-pass\r\n"),
        say("\r\n% Authentication failed\r\n"),
        Step::Hang,
    ];
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Script(script)));

    let segment = run(&connector, &switch_config("sw")).await;

    assert_eq!(failure(&segment), &SessionError::LoginRejected { attempts: 3 });
    let sent = String::from_utf8(connector.received("sw")).unwrap();
    assert_eq!(sent.matches("sw-pass").count(), 3);
}

#[tokio::test]
async fn test_retry_after_single_rejection_succeeds() {
    let mut script = vec![
        say("\r\nPassword: "),
        expect("sw-pass\r\n"),
        say("\r\nIncorrect password\r\nPassword: "),
    ];
    script.extend(switch_script().into_iter().skip(1));
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Script(script)));

    let segment = run(&connector, &switch_config("sw")).await;

    assert_eq!(segment.outcome, SessionOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_before_prompt() {
    let script = vec![say("Welcome to the controller\r\n"), Step::Hang];
    let connector =
        Arc::new(ScriptedConnector::new().with_device("ctrl", Behaviour::Script(script)));

    let segment = run(&connector, &controller_config("ctrl")).await;

    assert!(matches!(
        failure(&segment),
        SessionError::SessionTimeout { state } if state == "logging in"
    ));
    assert!(segment.text.contains("Welcome"));
}

#[tokio::test(start_paused = true)]
async fn test_overall_deadline_stops_chatty_device() {
    // Re-asks for the user name every 4s, so the idle deadline never fires
    let mut script = Vec::new();
    for _ in 0..20 {
        script.push(say("User: "));
        script.push(expect("admin\r\n"));
        script.push(Step::Pause(Duration::from_secs(4)));
    }
    script.push(Step::Hang);
    let device = controller_config("ctrl").with_timeouts(5, 10, 20);
    let connector =
        Arc::new(ScriptedConnector::new().with_device("ctrl", Behaviour::Script(script)));

    let segment = run(&connector, &device).await;

    assert!(matches!(
        failure(&segment),
        SessionError::SessionTimeout { state } if state == "awaiting password prompt"
    ));
    let sent = String::from_utf8(connector.received("ctrl")).unwrap();
    assert!(sent.matches("admin").count() >= 4);
}

#[tokio::test]
async fn test_refused_connection() {
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Refuse));

    let segment = run(&connector, &switch_config("sw")).await;

    assert!(matches!(
        failure(&segment),
        SessionError::TransportConnectFailure { host, port: 23, .. } if host == "sw"
    ));
    assert!(segment.text.is_empty());
    assert_eq!(connector.connects("sw"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_connect_timeout() {
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Blackhole));

    let segment = run(&connector, &switch_config("sw")).await;

    assert!(matches!(
        failure(&segment),
        SessionError::TransportConnectFailure { reason, .. } if reason.contains("5s")
    ));
}

#[tokio::test]
async fn test_device_hangs_up_mid_command() {
    let script = vec![
        say("\r\nPassword: "),
        expect("sw-pass\r\n"),
        say("\r\ncore-sw> "),
        expect("show ip dhcp pool\r\n"),
        say("show ip dhcp pool\r\nPool LAN :\r\n"),
    ];
    let connector = Arc::new(ScriptedConnector::new().with_device("sw", Behaviour::Script(script)));

    let segment = run(&connector, &switch_config("sw")).await;

    assert!(matches!(
        failure(&segment),
        SessionError::TransportClosed { state } if state == "executing command 1"
    ));
    assert!(segment.text.contains("Pool LAN"));
}

#[tokio::test(start_paused = true)]
async fn test_silent_logout_still_completes() {
    let mut script = controller_script();
    script.push(Step::Hang);
    let connector =
        Arc::new(ScriptedConnector::new().with_device("ctrl", Behaviour::Script(script)));

    let segment = run(&connector, &controller_config("ctrl")).await;

    assert_eq!(segment.outcome, SessionOutcome::Completed);
    assert!(segment.text.contains(AP_LISTING.trim_end()));
}
