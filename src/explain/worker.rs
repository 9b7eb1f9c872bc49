use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::explain::ExplanationProvider;

pub type Ticket = u64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextRequest {
    Explanation { table: u32, sample_factor: u32 },
    Motivation { child_name: String, achievement: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub ticket: Ticket,
    pub text: String,
}

/// Runs provider calls on one background thread fed by a request channel.
/// Results come back tagged with the ticket handed out at request time so
/// the caller can drop replies that arrive after the learner has moved on.
/// Requests that queue up behind a slow call are coalesced; only the newest
/// one is served.
pub struct ExplanationWorker {
    jobs: mpsc::Sender<(Ticket, TextRequest)>,
    rx: mpsc::Receiver<Delivery>,
    next_ticket: Ticket,
}

impl ExplanationWorker {
    pub fn new(provider: Arc<dyn ExplanationProvider>) -> Self {
        let (jobs, job_rx) = mpsc::channel::<(Ticket, TextRequest)>();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let (ticket, request) = job_rx.try_iter().last().unwrap_or(job);
                let text = match request {
                    TextRequest::Explanation {
                        table,
                        sample_factor,
                    } => provider.table_explanation(table, sample_factor),
                    TextRequest::Motivation {
                        child_name,
                        achievement,
                    } => provider.motivational_message(&child_name, &achievement),
                };
                if tx.send(Delivery { ticket, text }).is_err() {
                    return;
                }
            }
        });

        Self {
            jobs,
            rx,
            next_ticket: 1,
        }
    }

    pub fn request(&mut self, request: TextRequest) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        if self.jobs.send((ticket, request)).is_err() {
            debug!(ticket, "text worker is gone, request dropped");
        }
        ticket
    }

    /// All deliveries that have arrived so far, oldest first.
    pub fn poll(&self) -> Vec<Delivery> {
        self.rx.try_iter().collect()
    }
}
