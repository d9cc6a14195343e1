use crate::common::{DomainError, DomainResult};
use crate::domains::fleet::FleetCommandActor;
use crate::domains::path_planning::Coord;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// One line of the text protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    StartTask,
    SubmitTask { pickup: Coord, delivery: Coord },
    Snapshot,
    Stats,
    Quit,
}

/// Parse a protocol line. Blank lines yield `None`.
///
/// ```text
/// start_task
/// task <px> <py> <dx> <dy>
/// snapshot
/// stats
/// quit
/// ```
pub fn parse_request(line: &str) -> DomainResult<Option<ClientRequest>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let request = match verb {
        "start_task" => ClientRequest::StartTask,
        "snapshot" => ClientRequest::Snapshot,
        "stats" => ClientRequest::Stats,
        "quit" | "exit" => ClientRequest::Quit,
        "task" => {
            let numbers = words
                .by_ref()
                .map(|w| w.parse::<i32>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| invalid(format!("bad coordinate: {}", e)))?;
            let &[px, py, dx, dy] = numbers.as_slice() else {
                return Err(invalid("usage: task <px> <py> <dx> <dy>".to_string()));
            };
            ClientRequest::SubmitTask {
                pickup: Coord::new(px, py),
                delivery: Coord::new(dx, dy),
            }
        }
        other => return Err(invalid(format!("unknown command '{}'", other))),
    };
    if !matches!(request, ClientRequest::SubmitTask { .. }) && words.next().is_some() {
        return Err(invalid(format!("'{}' takes no arguments", verb)));
    }
    Ok(Some(request))
}

fn invalid(reason: String) -> DomainError {
    DomainError::InvalidCommand { reason }
}

/// Reads requests line by line and forwards them to the fleet service.
/// Replies (snapshots, statistics, parse errors) go to `replies`.
pub struct LineCommandSource {
    actor: FleetCommandActor,
}

impl LineCommandSource {
    pub fn new(actor: FleetCommandActor) -> Self {
        Self { actor }
    }

    /// Runs until EOF, `quit`, or the service goes away.
    pub async fn run<R, W>(&self, reader: R, mut replies: W) -> Result<(), String>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.map_err(|e| e.to_string())? {
            let request = match parse_request(&line) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => {
                    write_line(&mut replies, &format!("error: {}", e)).await?;
                    continue;
                }
            };
            tracing::debug!("client request: {:?}", request);

            match request {
                ClientRequest::StartTask => self.actor.start_task().await?,
                ClientRequest::SubmitTask { pickup, delivery } => {
                    self.actor.submit_task(pickup, delivery).await?
                }
                ClientRequest::Snapshot => {
                    let snapshot = self.actor.snapshot().await?;
                    let json = serde_json::to_string(&snapshot).map_err(|e| e.to_string())?;
                    write_line(&mut replies, &json).await?;
                }
                ClientRequest::Stats => {
                    let stats = self.actor.statistics().await?;
                    let json = serde_json::to_string(&stats).map_err(|e| e.to_string())?;
                    write_line(&mut replies, &json).await?;
                }
                ClientRequest::Quit => {
                    self.actor.shutdown().await?;
                    break;
                }
            }
        }
        Ok(())
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> Result<(), String> {
    writer
        .write_all(format!("{}\n", line).as_bytes())
        .await
        .map_err(|e| e.to_string())?;
    writer.flush().await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_protocol_lines() {
        assert_eq!(parse_request("start_task").unwrap(), Some(ClientRequest::StartTask));
        assert_eq!(parse_request("   ").unwrap(), None);
        assert_eq!(
            parse_request("task 0 3 8 8").unwrap(),
            Some(ClientRequest::SubmitTask {
                pickup: Coord::new(0, 3),
                delivery: Coord::new(8, 8),
            })
        );
        assert_eq!(parse_request("quit").unwrap(), Some(ClientRequest::Quit));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_request("task 1 2 3").is_err());
        assert!(parse_request("task a b c d").is_err());
        assert!(parse_request("dance").is_err());
        assert!(parse_request("snapshot now").is_err());
    }
}
