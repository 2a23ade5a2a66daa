#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepClass {
    Critical,
    BestEffort,
}

impl StepClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::BestEffort => "best-effort",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: String,
    pub class: StepClass,
    pub status: StepStatus,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    CompletedDegraded,
    Aborted,
}

impl RunOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedDegraded => "completed-degraded",
            Self::Aborted => "aborted",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog {
    records: Vec<StepRecord>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        step: &str,
        class: StepClass,
        status: StepStatus,
        message: impl Into<String>,
    ) {
        self.records.push(StepRecord {
            step: step.to_string(),
            class,
            status,
            message: message.into(),
        });
    }

    pub fn succeeded(&mut self, step: &str, class: StepClass, message: impl Into<String>) {
        self.record(step, class, StepStatus::Succeeded, message);
    }

    pub fn failed(&mut self, step: &str, class: StepClass, message: impl Into<String>) {
        self.record(step, class, StepStatus::Failed, message);
    }

    pub fn skipped(&mut self, step: &str, class: StepClass, message: impl Into<String>) {
        self.record(step, class, StepStatus::Skipped, message);
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn step_status(&self, step: &str) -> Option<StepStatus> {
        self.records
            .iter()
            .rev()
            .find(|record| record.step == step)
            .map(|record| record.status)
    }

    pub fn has_failures(&self) -> bool {
        self.records
            .iter()
            .any(|record| record.status == StepStatus::Failed)
    }

    pub fn render_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| {
                format!(
                    "{} [{}] {}: {}",
                    record.status.as_str(),
                    record.class.as_str(),
                    record.step,
                    record.message
                )
            })
            .collect()
    }
}
