//! The five fixed pipeline steps.

use crate::pipeline::prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    ExtractCoreFacts,
    Chronology,
    MeasuresAndConsequences,
    FollowUp,
    FinalAssembly,
}

impl PipelineStep {
    /// Every step, in execution order.
    pub const ALL: [PipelineStep; 5] = [
        PipelineStep::ExtractCoreFacts,
        PipelineStep::Chronology,
        PipelineStep::MeasuresAndConsequences,
        PipelineStep::FollowUp,
        PipelineStep::FinalAssembly,
    ];

    /// Steps whose output feeds the context of later steps.
    pub const RESEARCH: [PipelineStep; 4] = [
        PipelineStep::ExtractCoreFacts,
        PipelineStep::Chronology,
        PipelineStep::MeasuresAndConsequences,
        PipelineStep::FollowUp,
    ];

    /// Progress label reported before the step runs.
    pub fn label(self) -> &'static str {
        match self {
            PipelineStep::ExtractCoreFacts => "Schritt 1/5: Stammdaten extrahieren",
            PipelineStep::Chronology => "Schritt 2/5: Ereignisse chronologisch ordnen",
            PipelineStep::MeasuresAndConsequences => {
                "Schritt 3/5: Maßnahmen und Konsequenzen analysieren"
            }
            PipelineStep::FollowUp => "Schritt 4/5: Folgemaßnahmen festlegen",
            PipelineStep::FinalAssembly => "Schritt 5/5: Endgültigen Bericht erstellen",
        }
    }

    /// Heading of the step's context block: the label text after the colon.
    pub fn title(self) -> &'static str {
        let label = self.label();
        label
            .split_once(':')
            .map(|(_, title)| title.trim())
            .unwrap_or(label)
    }

    pub fn build_prompt(self, report: &str, context: &str) -> String {
        match self {
            PipelineStep::ExtractCoreFacts => prompts::extract_core_facts(report),
            PipelineStep::Chronology => prompts::chronology(report, context),
            PipelineStep::MeasuresAndConsequences => {
                prompts::measures_and_consequences(report, context)
            }
            PipelineStep::FollowUp => prompts::follow_up(report, context),
            PipelineStep::FinalAssembly => prompts::final_assembly(context),
        }
    }
}
