//! Runs assistant calls off the UI thread and hands finished replies back.
//!
//! The UI loop submits jobs and drains completions once per frame; it never
//! blocks on the network.

use std::sync::Arc;

use log::debug;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{Assistant, AssistantError, ExplainRequest, SummaryRequest};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Explain,
    Summary,
}

#[derive(Debug, Clone)]
pub enum Job {
    Explain { id: RequestId, request: ExplainRequest },
    Summary { id: RequestId, request: SummaryRequest },
}

impl Job {
    pub fn id(&self) -> RequestId {
        match self {
            Job::Explain { id, .. } | Job::Summary { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub id: RequestId,
    pub kind: JobKind,
    pub text: String,
}

pub struct Dispatcher {
    runtime: Runtime,
    assistant: Arc<Assistant>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl Dispatcher {
    pub fn new(assistant: Assistant) -> Result<Self, AssistantError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("assistant")
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            assistant: Arc::new(assistant),
            tx,
            rx,
        })
    }

    pub fn submit(&self, job: Job) {
        debug!("dispatching assistant job {}", job.id());
        let assistant = Arc::clone(&self.assistant);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let completion = match job {
                Job::Explain { id, request } => Completion {
                    id,
                    kind: JobKind::Explain,
                    text: assistant.explain(&request).await,
                },
                Job::Summary { id, request } => Completion {
                    id,
                    kind: JobKind::Summary,
                    text: assistant.summarize(&request).await,
                },
            };
            // The receiver only goes away at shutdown.
            let _ = tx.send(completion);
        });
    }

    /// Replies that arrived since the last call, in completion order.
    pub fn drain(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(c) = self.rx.try_recv() {
            done.push(c);
        }
        done
    }

    #[cfg(test)]
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<Completion> {
        let rx = &mut self.rx;
        self.runtime
            .block_on(async move { tokio::time::timeout(timeout, rx.recv()).await.ok().flatten() })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::assistant::fake::FakeBackend;
    use crate::core::tree::{Bundle, Locale};
    use crate::report::summary::SummaryPayload;

    fn summary_job(id: RequestId) -> Job {
        let bundle = Bundle::load(Locale::En).unwrap();
        Job::Summary {
            id,
            request: SummaryRequest {
                payload: SummaryPayload {
                    path_text: String::new(),
                    site_block: String::new(),
                },
                locale: Locale::En,
                strings: bundle.strings.assistant,
            },
        }
    }

    #[test]
    fn test_completion_carries_job_id() {
        let assistant = Assistant::new(Arc::new(FakeBackend::text("plan")));
        let mut d = Dispatcher::new(assistant).unwrap();
        d.submit(summary_job(7));
        let c = d.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(
            c,
            Completion {
                id: 7,
                kind: JobKind::Summary,
                text: "plan".into()
            }
        );
        assert!(d.drain().is_empty());
    }

    #[test]
    fn test_failures_still_complete() {
        let assistant = Assistant::new(Arc::new(FakeBackend::failing("down")));
        let mut d = Dispatcher::new(assistant).unwrap();
        d.submit(summary_job(1));
        let c = d.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(c.text, "Service error while generating final report.");
    }
}
