use cf_network::Mode;

#[derive(Debug, Clone, PartialEq)]
pub enum RunStage {
    LoadingPlant,
    CompilingNetwork,
    LoadingDesign,
    Solving,
    SavingDesign,
    RunningStudy,
    SavingStudy,
    Completed,
}

/// Position inside a running study.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudyProgress {
    pub study: String,
    pub index: usize,
    pub points: usize,
    /// Swept value in user units.
    pub value: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunProgressEvent {
    pub mode: Mode,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub study: Option<StudyProgress>,
}

impl RunProgressEvent {
    pub fn stage(mode: Mode, stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            mode,
            stage,
            elapsed_wall_s,
            message,
            study: None,
        }
    }
}
