//! Telnet byte filter
//!
//! Device consoles listen on the telnet port and open with option
//! negotiation. The session engine works on plain text, so incoming bytes
//! pass through [`TelnetFilter`] which removes IAC sequences and produces
//! the replies that refuse every offered option. Escaped `IAC IAC` becomes a
//! single 0xFF data byte.

/// Default telnet port
pub const DEFAULT_TELNET_PORT: u16 = 23;

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FilterState {
    #[default]
    Data,
    CarriageReturn,
    Iac,
    Negotiation(u8),
    Subnegotiation,
    SubnegotiationIac,
}

/// Output of one [`TelnetFilter::feed`] call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filtered {
    /// Payload bytes with all telnet commands removed
    pub data: Vec<u8>,
    /// Negotiation replies to write back to the device
    pub replies: Vec<u8>,
}

/// Streaming IAC filter
///
/// State is kept between calls so a sequence split across two reads is
/// still recognised.
#[derive(Debug, Clone, Default)]
pub struct TelnetFilter {
    state: FilterState,
}

impl TelnetFilter {
    /// Creates a filter in the data state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters one chunk of received bytes
    pub fn feed(&mut self, input: &[u8]) -> Filtered {
        let mut out = Filtered {
            data: Vec::with_capacity(input.len()),
            replies: Vec::new(),
        };

        for &byte in input {
            self.state = match self.state {
                FilterState::Data => Self::data_byte(byte, &mut out.data),
                // CR NUL is a bare carriage return on the wire
                FilterState::CarriageReturn if byte == 0 => FilterState::Data,
                FilterState::CarriageReturn => Self::data_byte(byte, &mut out.data),
                FilterState::Iac => match byte {
                    IAC => {
                        out.data.push(IAC);
                        FilterState::Data
                    }
                    DO | DONT | WILL | WONT => FilterState::Negotiation(byte),
                    SB => FilterState::Subnegotiation,
                    _ => FilterState::Data,
                },
                FilterState::Negotiation(verb) => {
                    match verb {
                        DO => out.replies.extend_from_slice(&[IAC, WONT, byte]),
                        WILL => out.replies.extend_from_slice(&[IAC, DONT, byte]),
                        _ => {}
                    }
                    FilterState::Data
                }
                FilterState::Subnegotiation => match byte {
                    IAC => FilterState::SubnegotiationIac,
                    _ => FilterState::Subnegotiation,
                },
                FilterState::SubnegotiationIac => match byte {
                    SE => FilterState::Data,
                    _ => FilterState::Subnegotiation,
                },
            };
        }

        out
    }

    fn data_byte(byte: u8, data: &mut Vec<u8>) -> FilterState {
        match byte {
            IAC => FilterState::Iac,
            b'\r' => {
                data.push(byte);
                FilterState::CarriageReturn
            }
            _ => {
                data.push(byte);
                FilterState::Data
            }
        }
    }
}
