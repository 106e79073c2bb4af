//! Process supervision for a single job run.

use std::{
    io::{self, Read},
    process::{Child, Command, Stdio},
    sync::Arc,
    thread::{self, JoinHandle},
};

use log::{debug, warn};

use crate::{
    message::Message,
    ping::PingDispatcher,
    queue::MessageQueue,
    reassembler::LineReassembler,
    severity::Severity,
};

use super::{JobOutcome, JobSpec, SYSTEM_PREFIX};

/// Runs one configured job. Cheap to clone; every clone shares the queue and
/// the ping dispatcher, and runs may overlap.
#[derive(Clone, Debug)]
pub struct JobExecutor {
    job: Arc<JobSpec>,
    job_name: Arc<str>,
    queue: MessageQueue,
    pings: PingDispatcher,
}

impl JobExecutor {
    pub fn new(job: JobSpec, queue: MessageQueue, pings: PingDispatcher) -> Self {
        Self {
            job_name: Arc::from(job.name.as_str()),
            job: Arc::new(job),
            queue,
            pings,
        }
    }

    pub fn job(&self) -> &JobSpec {
        &self.job
    }

    /// Run the command to completion and report the outcome.
    ///
    /// Blocks until the process exits and both output streams are drained.
    /// The ping, if any, is still in flight when this returns.
    pub fn run(&self) -> JobOutcome {
        self.system(Severity::Info, format!("{SYSTEM_PREFIX} Starting job"));

        let outcome = self.execute();
        debug!("job {} finished: {outcome:?}", self.job_name);
        self.system(outcome.severity(), outcome.to_string());

        let url = if outcome.is_success() {
            self.job.ping_success.as_deref()
        } else {
            self.job.ping_failure.as_deref()
        };
        let queue = self.queue.clone();
        let job_name = Arc::clone(&self.job_name);
        self.pings.dispatch(url, move |url, err| {
            let text = format!("{SYSTEM_PREFIX} Ping to URL {url:?} caused an error: {err}");
            if let Err(queue_err) = queue.enqueue(Message::new(job_name, Severity::Error, text)) {
                warn!("ping failure for {url} not reported: {queue_err}");
            }
        });
        outcome
    }

    fn execute(&self) -> JobOutcome {
        let mut child = match Command::new(&self.job.command)
            .args(&self.job.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => return JobOutcome::ExecutionError(err.to_string()),
        };

        let pumps = match self.start_pumps(&mut child) {
            Ok(pumps) => pumps,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return JobOutcome::ExecutionError(err.to_string());
            }
        };
        for pump in pumps {
            if pump.join().is_err() {
                warn!("job {}: output reader panicked", self.job_name);
            }
        }

        match child.wait() {
            Ok(status) => JobOutcome::from_status(status),
            Err(err) => JobOutcome::ExecutionError(err.to_string()),
        }
    }

    fn start_pumps(&self, child: &mut Child) -> io::Result<Vec<JoinHandle<()>>> {
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(self.pump("stdout", stdout, Severity::Info)?);
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(self.pump("stderr", stderr, Severity::Error)?);
        }
        Ok(pumps)
    }

    /// Copy one pipe into its own reassembler until EOF.
    fn pump<R>(&self, stream: &'static str, mut pipe: R, severity: Severity) -> io::Result<JoinHandle<()>>
    where
        R: Read + Send + 'static,
    {
        let mut sink = LineReassembler::new(Arc::clone(&self.job_name), severity, self.queue.clone());
        let job_name = Arc::clone(&self.job_name);
        thread::Builder::new()
            .name(format!("{job_name}-{stream}"))
            .spawn(move || {
                let copied = io::copy(&mut pipe, &mut sink).and_then(|_| sink.finish());
                if let Err(err) = copied {
                    warn!("job {job_name}: {stream} capture stopped: {err}");
                    // Keep draining so the child never blocks on a full pipe.
                    let _ = io::copy(&mut pipe, &mut io::sink());
                }
            })
    }

    fn system(&self, severity: Severity, text: String) {
        let message = Message::new(Arc::clone(&self.job_name), severity, text);
        if let Err(err) = self.queue.enqueue(message) {
            warn!("job {}: status line dropped: {err}", self.job_name);
        }
    }
}
