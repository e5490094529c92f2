//! Scripted fake devices for the integration tests
//!
//! A [`ScriptedConnector`] hands out the client half of an in-memory
//! duplex pipe and plays a [`Step`] script on the other half, so sessions
//! run through the real runner without sockets.

mod push_server_tests;
mod session_tests;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use apwatch_core::DeviceConfig;
use apwatch_core::session::{Connector, SessionRunner, Transport};
use async_trait::async_trait;
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

const PIPE_CAPACITY: usize = 64 * 1024;

/// One step of a fake device
#[derive(Debug, Clone)]
pub enum Step {
    /// Write these bytes to the session
    Say(Vec<u8>),
    /// Read until the received bytes contain this sequence
    Await(Vec<u8>),
    /// Stay silent for a while
    Pause(Duration),
    /// Read and discard until the session closes its end
    Hang,
}

/// Writes `text`
pub fn say(text: &str) -> Step {
    Step::Say(text.as_bytes().to_vec())
}

/// Waits for `text` from the session
pub fn expect(text: &str) -> Step {
    Step::Await(text.as_bytes().to_vec())
}

/// Fake device behaviour for one host
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Accept and play the script, then close
    Script(Vec<Step>),
    /// Refuse the connection
    Refuse,
    /// Never answer the connect
    Blackhole,
}

/// Connector that plays a script per host and counts connects
#[derive(Debug, Default)]
pub struct ScriptedConnector {
    devices: Mutex<HashMap<String, Behaviour>>,
    connects: Mutex<HashMap<String, usize>>,
    received: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(self, host: &str, behaviour: Behaviour) -> Self {
        self.devices
            .lock()
            .unwrap()
            .insert(host.to_string(), behaviour);
        self
    }

    pub fn connects(&self, host: &str) -> usize {
        self.connects.lock().unwrap().get(host).copied().unwrap_or(0)
    }

    /// Everything the session wrote to `host`, across connections
    pub fn received(&self, host: &str) -> Vec<u8> {
        self.received
            .lock()
            .unwrap()
            .get(host)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, host: &str, _port: u16) -> std::io::Result<Box<dyn Transport>> {
        *self
            .connects
            .lock()
            .unwrap()
            .entry(host.to_string())
            .or_default() += 1;

        let behaviour = self.devices.lock().unwrap().get(host).cloned();
        match behaviour {
            Some(Behaviour::Script(steps)) => {
                let (client, device) = tokio::io::duplex(PIPE_CAPACITY);
                let received = Arc::clone(&self.received);
                let host = host.to_string();
                tokio::spawn(play(device, steps, received, host));
                Ok(Box::new(client))
            }
            Some(Behaviour::Blackhole) => std::future::pending().await,
            Some(Behaviour::Refuse) | None => Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }
}

async fn play(
    mut device: DuplexStream,
    steps: Vec<Step>,
    received: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    host: String,
) {
    let mut pending: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 1024];

    for step in steps {
        match step {
            Step::Say(bytes) => {
                if device.write_all(&bytes).await.is_err() {
                    return;
                }
            }
            Step::Await(needle) => loop {
                if let Some(pos) = find(&pending, &needle) {
                    pending.drain(..pos + needle.len());
                    break;
                }
                match device.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => {
                        record(&received, &host, &chunk[..n]);
                        pending.extend_from_slice(&chunk[..n]);
                    }
                }
            },
            Step::Pause(duration) => tokio::time::sleep(duration).await,
            Step::Hang => loop {
                match device.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => record(&received, &host, &chunk[..n]),
                }
            },
        }
    }
    // Script done: the device hangs up
}

fn record(received: &Mutex<HashMap<String, Vec<u8>>>, host: &str, bytes: &[u8]) {
    received
        .lock()
        .unwrap()
        .entry(host.to_string())
        .or_default()
        .extend_from_slice(bytes);
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

pub fn runner(connector: &Arc<ScriptedConnector>) -> SessionRunner {
    SessionRunner::new(Arc::clone(connector) as Arc<dyn Connector>)
}

/// Controller that asks for user name and password
pub fn controller_config(host: &str) -> DeviceConfig {
    DeviceConfig::new("controller", host)
        .with_credentials(
            Some("admin".to_string()),
            SecretString::from("s3cret".to_string()),
        )
        .with_commands([
            "show aps",
            "show clients",
            "show amp-audit | include (ssid-profile|max-clients-threshold)",
        ])
        .with_timeouts(5, 10, 60)
}

/// Switch that only asks for a password
pub fn switch_config(host: &str) -> DeviceConfig {
    DeviceConfig::new("switch", host)
        .with_credentials(None, SecretString::from("sw-pass".to_string()))
        .with_commands(["show ip dhcp pool"])
        .with_timeouts(5, 10, 60)
}

pub const AP_LISTING: &str = "\
show aps\r
\r
All APs\r
-------\r
Name   Group  IP Address  Type  IPv6  Flags  Clients  Uptime  ESSIDs      Outer IP  Channel  Power\r
----   -----  ----------  ----  ----  -----  -------  ------  ------      --------  -------  -----\r
ap_01  hq     10.0.0.11   315   --    2      4        3d      corp,guest  N/A       6        12\r
ap_02  hq     10.0.0.12   315   --    2      0        3d      -           N/A       11       9\r
ap_17  hq     10.0.0.27   315   --    2      0        1d      corp        N/A       1        6\r
ap_01# ";

pub const CLIENT_LIST: &str = "\
show clients\r
\r
Client List\r
-----------\r
Name      IP Address  MAC Address        OS       ESSID  Access Point  Channel  Type\r
----      ----------  -----------        --       -----  ------------  -------  ----\r
phone-1   10.1.0.21   aa:bb:cc:00:00:01  iOS      corp   ap_01         6        GN\r
phone-2   10.1.0.22   aa:bb:cc:00:00:02  Android  corp   ap_01         6        GN\r
laptop 1  10.1.0.23   aa:bb:cc:00:00:03  Win 10   corp   ap_01         6        GN\r
guest-1   10.2.0.10   aa:bb:cc:00:00:04  iOS      guest  ap_01         6        GN\r
roamer    10.1.0.40   aa:bb:cc:00:00:06  iOS      corp   ap_17         1        GN\r
\r
ap_01# ";

pub const AUDIT: &str = "\
show amp-audit | include (ssid-profile|max-clients-threshold)\r
wlan ssid-profile corp\r
 max-clients-threshold 10\r
\r
wlan ssid-profile guest\r
 max-clients-threshold 5\r
ap_01# ";

pub const DHCP_POOL: &str = "\
show ip dhcp pool\r
Pool LAN :\r
 Total addresses                : 254\r
 Leased addresses               : 95\r
 Pool utilization: 37.50%\r
core-sw# ";

/// Full controller conversation
pub fn controller_script() -> Vec<Step> {
    vec![
        say("\r\nUser Access Verification\r\n\r\nUser: "),
        expect("admin\r\n"),
        say("Password: "),
        expect("s3cret\r\n"),
        say("\r\nap_01# "),
        expect("show aps\r\n"),
        say(AP_LISTING),
        expect("show clients\r\n"),
        say(CLIENT_LIST),
        expect("max-clients-threshold)\r\n"),
        say(AUDIT),
        expect("exit\r\n"),
    ]
}

/// Full switch conversation
pub fn switch_script() -> Vec<Step> {
    vec![
        say("\r\nPassword: "),
        expect("sw-pass\r\n"),
        say("\r\ncore-sw> "),
        expect("show ip dhcp pool\r\n"),
        say(DHCP_POOL),
        expect("exit\r\n"),
    ]
}

/// Generous bound for tests that should finish quickly
pub const TEST_DEADLINE: Duration = Duration::from_secs(30);
