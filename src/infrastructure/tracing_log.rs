use tracing::{error, info};

use crate::domain::ports::RelayLog;

/// Writes invocation log lines through `tracing`, so they pick up the
/// request-id span installed by the Lambda service.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRelayLog;

impl RelayLog for TracingRelayLog {
    fn info(&self, line: &str) {
        info!("{}", line);
    }

    fn error(&self, line: &str) {
        error!("{}", line);
    }
}
