//! Report formalization — runs the five prompt steps against the text generator.
//!
//! Flow: extract core facts → chronology → measures & consequences →
//!       follow-up → final assembly (template fill, case id injected).
//!
//! Each research step appends its output to the context; every later step sees
//! the whole context plus the original report. The final step's raw output is
//! the formal report.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::llm_client::{LlmError, TextGenerator};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::prompts::case_id_instruction;
use crate::pipeline::steps::PipelineStep;

/// Normalized, user-readable failure of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("API key is not set. Please set the GEMINI_API_KEY environment variable.")]
    Configuration,

    #[error("The AI model is currently busy. Please try again in a few moments.")]
    ServiceOverloaded,

    #[error("Your API key is not valid. Please check it and try again.")]
    InvalidCredential,

    #[error(
        "Failed to generate the report. The AI service may be unavailable or there's a network issue."
    )]
    GenerationFailed,
}

impl PipelineError {
    /// Classifies a low-level failure by the markers in its description.
    pub fn classify(err: &LlmError) -> Self {
        if matches!(err, LlmError::MissingApiKey) {
            return PipelineError::Configuration;
        }
        let description = err.to_string();
        if description.contains("503") || description.to_lowercase().contains("overloaded") {
            PipelineError::ServiceOverloaded
        } else if description.contains("API key not valid") {
            PipelineError::InvalidCredential
        } else {
            PipelineError::GenerationFailed
        }
    }
}

/// Receives the label of each step just before its generation call is issued.
pub trait ProgressSink: Send {
    fn step_started(&mut self, label: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(&str) + Send,
{
    fn step_started(&mut self, label: &str) {
        self(label)
    }
}

#[derive(Clone)]
pub struct ReportPipeline {
    generator: Arc<dyn TextGenerator>,
    model: String,
}

impl ReportPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>, model: impl Into<String>) -> Self {
        Self {
            generator,
            model: model.into(),
        }
    }

    /// Turns an informal report into the formal one for `case_id`.
    ///
    /// Any failing step aborts the run; nothing partial is returned.
    pub async fn run(
        &self,
        informal_report: &str,
        case_id: &str,
        progress: &mut dyn ProgressSink,
    ) -> Result<String, PipelineError> {
        if !self.generator.is_configured() {
            error!("Generation credential missing, refusing to start pipeline");
            return Err(PipelineError::Configuration);
        }

        info!(
            "Formalizing report for case {} ({} steps, model {})",
            case_id,
            PipelineStep::ALL.len(),
            self.model
        );

        let mut context = PipelineContext::new();

        for step in PipelineStep::RESEARCH {
            progress.step_started(step.label());
            let output = self
                .run_step(step, informal_report, &context.render())
                .await?;
            context.push(step.title(), output);
            debug!("Context now holds {} blocks", context.block_count());
        }

        let final_step = PipelineStep::FinalAssembly;
        progress.step_started(final_step.label());
        let final_context = format!("{}{}", context.render(), case_id_instruction(case_id));
        let formal_report = self
            .run_step(final_step, informal_report, &final_context)
            .await?;

        info!("Formal report for case {} assembled", case_id);
        Ok(formal_report)
    }

    async fn run_step(
        &self,
        step: PipelineStep,
        informal_report: &str,
        context: &str,
    ) -> Result<String, PipelineError> {
        info!("{}", step.label());

        let prompt = step.build_prompt(informal_report, context);
        self.generator
            .generate(&self.model, &prompt)
            .await
            .map_err(|e| {
                error!("{} failed: {e}", step.label());
                PipelineError::classify(&e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Returns its prompt unchanged.
    struct EchoGenerator;

    #[async_trait]
    impl TextGenerator for EchoGenerator {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }
    }

    /// Answers call n with "Ausgabe n" and records every prompt.
    /// Optionally fails on one call with an error built by `failure`.
    struct ScriptedGenerator {
        prompts: Mutex<Vec<String>>,
        fail_on: Option<(usize, fn() -> LlmError)>,
    }

    impl ScriptedGenerator {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        fn failing_on(call: usize, failure: fn() -> LlmError) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on: Some((call, failure)),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String, LlmError> {
            let call = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len() - 1
            };
            match self.fail_on {
                Some((fail_call, failure)) if fail_call == call => Err(failure()),
                _ => Ok(format!("Ausgabe {}", call + 1)),
            }
        }
    }

    struct UnconfiguredGenerator;

    #[async_trait]
    impl TextGenerator for UnconfiguredGenerator {
        fn is_configured(&self) -> bool {
            false
        }

        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, LlmError> {
            panic!("generate must not be called without a credential");
        }
    }

    const INFORMAL: &str = "Häftling X schlug Beamten Y im Hof um 14:00";

    fn overloaded() -> LlmError {
        LlmError::Api {
            status: 503,
            message: "The model is overloaded. Please try again later.".to_string(),
        }
    }

    async fn run_with(
        generator: Arc<dyn TextGenerator>,
        case_id: &str,
    ) -> (Result<String, PipelineError>, Vec<String>) {
        let pipeline = ReportPipeline::new(generator, "test-model");
        let mut labels = Vec::new();
        let result = pipeline
            .run(INFORMAL, case_id, &mut |label: &str| {
                labels.push(label.to_string())
            })
            .await;
        (result, labels)
    }

    #[tokio::test]
    async fn test_reports_every_step_in_order() {
        let (result, labels) = run_with(Arc::new(ScriptedGenerator::new()), "CASE-1").await;

        assert!(result.is_ok());
        let expected: Vec<String> = PipelineStep::ALL
            .iter()
            .map(|s| s.label().to_string())
            .collect();
        assert_eq!(labels, expected);
    }

    #[tokio::test]
    async fn test_output_is_raw_final_step_text() {
        let (result, _) = run_with(Arc::new(ScriptedGenerator::new()), "CASE-1").await;
        assert_eq!(result.unwrap(), "Ausgabe 5");
    }

    #[tokio::test]
    async fn test_later_prompts_contain_all_previous_blocks_in_order() {
        let generator = Arc::new(ScriptedGenerator::new());
        let (result, _) = run_with(generator.clone(), "CASE-1").await;
        assert!(result.is_ok());

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 5);

        let blocks: Vec<String> = PipelineStep::RESEARCH
            .iter()
            .enumerate()
            .map(|(i, step)| format!("**{}**:\nAusgabe {}\n\n", step.title(), i + 1))
            .collect();

        for (k, prompt) in prompts.iter().enumerate().skip(1) {
            let mut last_position = 0;
            for block in &blocks[..k] {
                let position = prompt
                    .find(block.as_str())
                    .unwrap_or_else(|| panic!("prompt {} lacks block {block:?}", k + 1));
                assert!(position >= last_position, "blocks out of order in prompt {}", k + 1);
                last_position = position;
            }
        }
    }

    #[tokio::test]
    async fn test_first_prompt_has_no_context_and_final_prompt_has_no_raw_report() {
        let generator = Arc::new(ScriptedGenerator::new());
        run_with(generator.clone(), "CASE-1").await.0.unwrap();

        let prompts = generator.prompts();
        assert!(prompts[0].contains(INFORMAL));
        assert!(!prompts[0].contains("Ausgabe"));
        for prompt in &prompts[1..4] {
            assert!(prompt.contains(INFORMAL));
        }
        assert!(!prompts[4].contains(INFORMAL));
        assert!(prompts[4].contains("CASE-1"));
    }

    #[tokio::test]
    async fn test_failure_aborts_at_failing_step() {
        for failing in 0..5 {
            let generator = Arc::new(ScriptedGenerator::failing_on(failing, overloaded));
            let (result, labels) = run_with(generator.clone(), "CASE-1").await;

            assert_eq!(result, Err(PipelineError::ServiceOverloaded));
            assert_eq!(labels.len(), failing + 1);
            assert_eq!(
                labels.last().map(String::as_str),
                Some(PipelineStep::ALL[failing].label())
            );
            assert_eq!(generator.prompts().len(), failing + 1);
        }
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_step() {
        let (result, labels) = run_with(Arc::new(UnconfiguredGenerator), "CASE-1").await;
        assert_eq!(result, Err(PipelineError::Configuration));
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn test_echo_run_carries_case_id_into_final_text() {
        let (result, _) = run_with(Arc::new(EchoGenerator), "CASE-001").await;
        let formal = result.unwrap();

        assert!(formal.contains("CASE-001"));
        assert!(formal.contains("Fallnummer"));
        assert!(formal.contains("VORFALLBERICHT"));
    }

    #[test]
    fn test_classify_overload_markers() {
        assert_eq!(
            PipelineError::classify(&overloaded()),
            PipelineError::ServiceOverloaded
        );
        let overloaded_text = LlmError::Api {
            status: 500,
            message: "Model Overloaded".to_string(),
        };
        assert_eq!(
            PipelineError::classify(&overloaded_text),
            PipelineError::ServiceOverloaded
        );
    }

    #[test]
    fn test_classify_invalid_key() {
        let err = LlmError::Api {
            status: 400,
            message: "API key not valid. Please pass a valid API key.".to_string(),
        };
        assert_eq!(
            PipelineError::classify(&err),
            PipelineError::InvalidCredential
        );
    }

    #[test]
    fn test_classify_everything_else_as_generic() {
        assert_eq!(
            PipelineError::classify(&LlmError::EmptyContent),
            PipelineError::GenerationFailed
        );
        let err = LlmError::Api {
            status: 404,
            message: "models/unknown is not found".to_string(),
        };
        assert_eq!(PipelineError::classify(&err), PipelineError::GenerationFailed);
        assert_eq!(
            PipelineError::classify(&LlmError::MissingApiKey),
            PipelineError::Configuration
        );
    }

    #[tokio::test]
    async fn test_generic_failure_message_hides_details() {
        let generator = Arc::new(ScriptedGenerator::failing_on(2, || LlmError::EmptyContent));
        let (result, _) = run_with(generator, "CASE-1").await;
        let err = result.unwrap_err();
        assert_eq!(err, PipelineError::GenerationFailed);
        assert!(!err.to_string().contains("empty content"));
    }
}
