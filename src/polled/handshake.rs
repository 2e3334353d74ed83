// src/polled/handshake.rs

use super::PolledAnalyzer;
use crate::common::{
    error::AnalyzerError,
    hal_traits::{DatagramLink, Delay},
    response::parse_ack_reply,
};
use crate::device::ConnectStatus;

impl<L, D> PolledAnalyzer<L, D>
where
    L: DatagramLink,
    D: Delay,
{
    /// Opens the socket and runs the identify exchange with the retry budget.
    ///
    /// `Idle -> Attempting -> {Connected, Failed}`. A failed handshake releases
    /// the socket it opened; the returned status names the failure kind of the
    /// last attempt.
    pub(super) fn run_handshake(&mut self) -> ConnectStatus {
        // A second connect starts from a clean session
        self.transport.close();
        self.identity.clear();

        let (address, port) = {
            let (a, p) = self.endpoint();
            (a.to_string(), p)
        };
        if let Err(e) = self.transport.open(&address, port, self.descriptor.timeout) {
            tracing::warn!(device = %self.descriptor.device_type, error = %e, "cannot create socket");
            return ConnectStatus::NotFound;
        }

        let max_attempts = self.descriptor.max_attempts;
        let mut last_error = AnalyzerError::Timeout;

        for attempt in 1..=max_attempts {
            match self.identify_once() {
                Ok(()) => {
                    tracing::info!(
                        device = %self.descriptor.device_type,
                        identity = %self.identity,
                        status = %self.status,
                        attempt,
                        "analyzer connected"
                    );
                    return ConnectStatus::Connected;
                }
                Err(e) => {
                    tracing::debug!(device = %self.descriptor.device_type, attempt, error = %e, "handshake attempt failed");
                    last_error = e;
                }
            }

            if attempt < max_attempts {
                self.delay.delay(self.descriptor.retry_backoff);
            }
        }

        self.transport.close();
        let status = exhausted_status(&last_error);
        tracing::warn!(
            device = %self.descriptor.device_type,
            attempts = max_attempts,
            %status,
            "handshake gave up"
        );
        status
    }

    /// One exchange; on ACK records identity, status and alarm.
    fn identify_once(&mut self) -> Result<(), AnalyzerError> {
        let reply = self.transport.exchange()?;
        let ack = parse_ack_reply(reply, &self.descriptor.layout)?;
        self.identity = ack.identity_string();
        self.status = ack.status_char();
        self.alarm = Some(ack.alarm_string());
        Ok(())
    }
}

/// Maps the failure of the final attempt onto the caller-visible status.
fn exhausted_status(last_error: &AnalyzerError) -> ConnectStatus {
    match last_error {
        AnalyzerError::Timeout => ConnectStatus::TimeoutExhausted,
        AnalyzerError::ProtocolMismatch => ConnectStatus::NoAckExhausted,
        _ => ConnectStatus::TransportErrorExhausted,
    }
}
