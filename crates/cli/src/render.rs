//! Terminal rendering of job events.

use std::io::Write;

use shortify_core::{JobEvent, JobState};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

/// How one event shows up in the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum Line {
    /// Replaces the current progress line.
    Progress(String),
    /// Ends the progress line.
    EndProgress,
    /// A full line of text.
    Text(String),
}

pub fn describe(event: &JobEvent) -> Option<Line> {
    match event {
        JobEvent::StateChanged(state) => match state {
            JobState::Acquiring => Some(Line::Text("Reading input...".to_string())),
            JobState::Converting => Some(Line::Text("Converting...".to_string())),
            JobState::Done => Some(Line::Text("Done.".to_string())),
            JobState::Failed => Some(Line::Text("Failed.".to_string())),
            JobState::Idle => None,
        },
        JobEvent::Progress(shown) => Some(Line::Progress(format!("Progress: {}", shown.percent))),
        JobEvent::ProgressHidden => Some(Line::EndProgress),
        JobEvent::Published(handle) => Some(Line::Text(format!("Result ready at {}", handle))),
        JobEvent::Notice(message) => Some(Line::Text(message.clone())),
    }
}

/// Prints events until the orchestrator goes away.
pub async fn render_events(mut rx: broadcast::Receiver<JobEvent>, json: bool) {
    let mut stderr = std::io::stderr();
    let mut progress_open = false;

    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Event renderer lagged");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        if json {
            if let Ok(line) = serde_json::to_string(&event) {
                println!("{}", line);
            }
            continue;
        }

        match describe(&event) {
            Some(Line::Progress(text)) => {
                let _ = write!(stderr, "\r{}", text);
                let _ = stderr.flush();
                progress_open = true;
            }
            Some(Line::EndProgress) if progress_open => {
                let _ = writeln!(stderr);
                progress_open = false;
            }
            Some(Line::Text(text)) => {
                if progress_open {
                    let _ = writeln!(stderr);
                    progress_open = false;
                }
                let _ = writeln!(stderr, "{}", text);
            }
            _ => {}
        }
    }

    if progress_open {
        let _ = writeln!(stderr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortify_core::progress::ProgressReporter;

    #[test]
    fn test_describe_progress() {
        let mut reporter = ProgressReporter::new();
        reporter.start();
        let event = JobEvent::Progress(reporter.on_sample(0.425));
        assert_eq!(
            describe(&event),
            Some(Line::Progress("Progress: 42.50%".to_string()))
        );
    }

    #[test]
    fn test_describe_states() {
        assert_eq!(describe(&JobEvent::StateChanged(JobState::Idle)), None);
        assert_eq!(
            describe(&JobEvent::StateChanged(JobState::Converting)),
            Some(Line::Text("Converting...".to_string()))
        );
        assert_eq!(describe(&JobEvent::ProgressHidden), Some(Line::EndProgress));
    }

    #[test]
    fn test_describe_notice_verbatim() {
        let notice = "Please select a video to process or paste a video link.";
        assert_eq!(
            describe(&JobEvent::Notice(notice.to_string())),
            Some(Line::Text(notice.to_string()))
        );
    }

    #[tokio::test]
    async fn test_render_stops_when_sender_dropped() {
        let (tx, rx) = broadcast::channel(8);
        tx.send(JobEvent::StateChanged(JobState::Acquiring)).unwrap();
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(1), render_events(rx, true))
            .await
            .unwrap();
    }
}
