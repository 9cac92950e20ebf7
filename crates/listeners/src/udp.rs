//! UdpListener - `<topic> <payload>` lines over UDP
//!
//! Each datagram may carry several newline-separated lines. A topic is
//! `[<base_topic>/]<node>/<field>`; the payload must parse as a number.
//! Malformed lines are logged and dropped.

use std::fmt;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};

use contracts::{
    settings, ContractError, InitError, Listener, Reading, ReadingSet, Settings,
};
use tracing::{debug, instrument, warn};

const MAX_DATAGRAM: usize = 65_507;

/// Listener receiving readings as UDP text lines
pub struct UdpListener {
    name: String,
    socket: Option<UdpSocket>,
    base_topic: Option<String>,
    buffer: ReadingSet,
    // Receive buffer, reused across runs
    datagram: Box<[u8]>,
}

impl fmt::Debug for UdpListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpListener")
            .field("name", &self.name)
            .field("socket", &self.socket)
            .field("base_topic", &self.base_topic)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl UdpListener {
    /// Registered type name
    pub const TYPE_NAME: &'static str = "udp";

    /// Bind the socket named by the `bind` init setting
    #[instrument(name = "udp_listener_bind", skip(init))]
    pub fn bind(name: &str, init: &Settings) -> Result<Self, InitError> {
        let addr = settings::get_str(init, "bind")
            .map_err(|e| InitError::from_contract(name, e))?
            .ok_or_else(|| InitError::new(name, "missing 'bind' setting"))?;

        let socket = UdpSocket::bind(addr)
            .map_err(|e| InitError::new(name, format!("cannot bind '{addr}': {e}")))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| InitError::new(name, e.to_string()))?;

        debug!(listener = %name, addr = %addr, "UdpListener bound");

        Ok(Self {
            name: name.to_string(),
            socket: Some(socket),
            base_topic: None,
            buffer: ReadingSet::new(),
            datagram: vec![0u8; MAX_DATAGRAM].into_boxed_slice(),
        })
    }

    pub(crate) fn construct(
        name: &str,
        init: &Settings,
    ) -> Result<Box<dyn Listener>, InitError> {
        Ok(Box::new(Self::bind(name, init)?))
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn accept_datagram(&mut self, len: usize) {
        let text = String::from_utf8_lossy(&self.datagram[..len]);
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            match parse_line(line, self.base_topic.as_deref()) {
                Ok(reading) => self.buffer.push(reading),
                Err(reason) => {
                    warn!(listener = %self.name, line = %line, "{reason} - ignoring")
                }
            }
        }
    }
}

/// Parse one `<topic> <payload>` line into a reading
///
/// Returns a human-readable reason when the line is rejected.
pub fn parse_line(line: &str, base_topic: Option<&str>) -> Result<Reading, String> {
    let (topic, payload) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| "Missing payload".to_string())?;

    let subtopic = match base_topic.filter(|b| !b.is_empty()) {
        Some(base) => topic
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| format!("Topic {topic} outside {base}"))?,
        None => topic,
    };

    let mut parts = subtopic.split('/');
    let (node, field) = match (parts.next(), parts.next(), parts.next()) {
        (Some(node), Some(field), None) => (node, field),
        _ => return Err("Couldn't extract node/input".to_string()),
    };

    let payload = payload.trim();
    let value: f64 = payload
        .parse()
        .map_err(|_| format!("Error parsing value {payload}"))?;

    Ok(Reading::new(node, field, value))
}

impl Listener for UdpListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> Result<(), ContractError> {
        let Some(socket) = self.socket.take() else {
            return Err(ContractError::listener(&self.name, "socket closed"));
        };

        loop {
            match socket.recv_from(&mut self.datagram) {
                Ok((len, _peer)) => self.accept_datagram(len),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    // ICMP errors surface here on some platforms
                    warn!(listener = %self.name, error = %e, "UDP receive failed");
                    break;
                }
            }
        }

        self.socket = Some(socket);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<ReadingSet>, ContractError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.buffer)))
    }

    fn apply_runtime_settings(&mut self, runtime: &Settings) -> Result<(), ContractError> {
        self.base_topic = settings::get_str(runtime, "base_topic")?.map(str::to_string);
        Ok(())
    }

    fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(listener = %self.name, "UdpListener closed");
        Ok(())
    }
}
