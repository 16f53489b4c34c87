use super::*;
use crate::constants::NUM_LABELS;
use crate::explain::{AttributionEngine, PredictFn, TokenAttribution};
use crate::model::{LexiconModel, MockSentimentModel, ModelError};
use crate::pipeline::Label;

const REVIEW: &str = "I love this film. The ending was bad and terrible.";

fn analyzer_with(max_tokens_per_chunk: usize) -> SentimentAnalyzer {
    SentimentAnalyzer::new(
        Arc::new(LexiconModel::new()),
        AnalyzerConfig {
            max_tokens_per_chunk,
            ..AnalyzerConfig::default()
        },
    )
    .unwrap()
}

fn analyzed(outcome: AnalysisOutcome) -> DocumentAnalysis {
    match outcome {
        AnalysisOutcome::Analyzed(analysis) => analysis,
        AnalysisOutcome::NoContent => panic!("expected an analyzed document"),
    }
}

/// Attributes a constant score to every token it is asked about.
struct ConstantEngine;

impl AttributionEngine for ConstantEngine {
    fn explain(&self, texts: &[String]) -> Result<Vec<TokenAttribution>, ExplainError> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut tokens = vec!["<s>".to_string()];
                tokens.extend(text.split_whitespace().map(|w| format!("Ġ{w}")));
                tokens.push("</s>".to_string());
                let values = vec![[0.25; NUM_LABELS]; tokens.len()];
                TokenAttribution { tokens, values }
            })
            .collect())
    }
}

struct ConstantEngineFactory;

impl AttributionEngineFactory for ConstantEngineFactory {
    fn build(
        &self,
        _predict: PredictFn,
        _output_names: [&'static str; NUM_LABELS],
    ) -> Box<dyn AttributionEngine> {
        Box::new(ConstantEngine)
    }
}

#[test]
fn test_default_config() {
    let config = AnalyzerConfig::default();

    assert_eq!(config.max_tokens_per_chunk, 450);
    assert_eq!(config.explain_batch_size, 16);
}

#[test]
fn test_zero_chunk_size_is_rejected() {
    let result = SentimentAnalyzer::new(
        Arc::new(LexiconModel::new()),
        AnalyzerConfig {
            max_tokens_per_chunk: 0,
            ..AnalyzerConfig::default()
        },
    );

    assert!(matches!(result, Err(PipelineError::InvalidChunkSize)));
}

#[test]
fn test_empty_text_has_no_content() {
    let model = Arc::new(MockSentimentModel::new());
    let analyzer =
        SentimentAnalyzer::new(model.clone(), AnalyzerConfig::default()).unwrap();

    assert_eq!(analyzer.analyze("", 20).unwrap(), AnalysisOutcome::NoContent);
    assert_eq!(analyzer.analyze(" \n\t ", 20).unwrap(), AnalysisOutcome::NoContent);
    assert_eq!(model.prediction_count(), 0);
}

#[test]
fn test_single_chunk_document() {
    let analysis = analyzed(analyzer_with(450).analyze("What a wonderful day", 20).unwrap());

    assert_eq!(analysis.chunks.len(), 1);
    assert_eq!(analysis.verdict.chunk_count, 1);
    assert_eq!(analysis.verdict.predicted_label, Label::Positive);
    assert_eq!(analysis.ranking, vec![0]);
    assert_eq!(analysis.summaries.len(), 1);
    assert_eq!(analysis.summaries[0].preview, "What a wonderful day");
}

#[test]
fn test_multi_chunk_document() {
    let analysis = analyzed(analyzer_with(5).analyze(REVIEW, 2).unwrap());

    assert_eq!(analysis.chunks.len(), 3);
    assert_eq!(analysis.verdict.chunk_count, 3);
    assert_eq!(analysis.verdict.predicted_label, Label::Negative);
    assert!(analysis.verdict.probabilities.is_normalized());
    assert_eq!(analysis.ranking, vec![1, 2, 0]);

    let previews: Vec<&str> = analysis.summaries.iter().map(|s| s.preview.as_str()).collect();
    assert_eq!(previews, vec!["The ending was bad and", "terrible."]);
    assert!(
        analysis
            .summaries
            .iter()
            .all(|s| s.predicted_label == Label::Negative)
    );
}

#[test]
fn test_chunks_reassemble_document() {
    let analysis = analyzed(analyzer_with(3).analyze(REVIEW, 20).unwrap());

    let joined: String = analysis.chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(joined, REVIEW);
    for (i, chunk) in analysis.chunks.iter().enumerate() {
        assert_eq!(chunk.index, i);
    }
}

#[test]
fn test_top_n_clamps_to_chunk_count() {
    let analysis = analyzed(analyzer_with(5).analyze(REVIEW, 100).unwrap());

    assert_eq!(analysis.summaries.len(), 3);
    assert_eq!(analysis.summaries[2].chunk_index, 0);
    assert_eq!(analysis.summaries[2].predicted_label, Label::Positive);
}

#[test]
fn test_top_n_zero_keeps_verdict() {
    let analysis = analyzed(analyzer_with(5).analyze(REVIEW, 0).unwrap());

    assert!(analysis.summaries.is_empty());
    assert_eq!(analysis.verdict.chunk_count, 3);
}

#[test]
fn test_prediction_failure_fails_whole_document() {
    let analyzer = SentimentAnalyzer::new(
        Arc::new(MockSentimentModel::failing_after(1)),
        AnalyzerConfig {
            max_tokens_per_chunk: 5,
            ..AnalyzerConfig::default()
        },
    )
    .unwrap();

    let err = analyzer.analyze(REVIEW, 20).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Prediction {
            index: 1,
            source: ModelError::InferenceFailed { .. }
        }
    ));
}

#[test]
fn test_scripted_logits_drive_verdict() {
    let model = MockSentimentModel::new()
        .with_logits("alpha", [0.0, 3.0, 0.0])
        .with_logits("beta", [0.0, 2.0, 0.0]);
    let analyzer = SentimentAnalyzer::new(
        Arc::new(model),
        AnalyzerConfig {
            max_tokens_per_chunk: 1,
            ..AnalyzerConfig::default()
        },
    )
    .unwrap();

    let analysis = analyzed(analyzer.analyze("beta alpha", 20).unwrap());

    assert_eq!(analysis.verdict.predicted_label, Label::Neutral);
    assert_eq!(analysis.ranking, vec![1, 0]);
}

#[test]
fn test_explain_uses_occlusion_by_default() {
    let analyzer = analyzer_with(450);

    let explanation = analyzer.explain("what a wonderful day", 2).unwrap();

    assert_eq!(explanation.predicted_label, Label::Positive);
    assert_eq!(explanation.top_word_contributions.len(), 2);
    assert_eq!(explanation.top_word_contributions[0].word, "wonderful");
    assert!(explanation.top_word_contributions[0].score > 0.0);
}

#[test]
fn test_explain_with_custom_engine() {
    let analyzer = SentimentAnalyzer::with_engine_factory(
        Arc::new(LexiconModel::new()),
        AnalyzerConfig::default(),
        Box::new(ConstantEngineFactory),
    )
    .unwrap();

    let explanation = analyzer.explain("plain words here", 15).unwrap();

    let words: Vec<&str> = explanation
        .top_word_contributions
        .iter()
        .map(|c| c.word.as_str())
        .collect();
    assert_eq!(words, vec!["plain", "words", "here"]);
    assert!(
        explanation
            .top_word_contributions
            .iter()
            .all(|c| (c.score - 0.25).abs() < 1e-6)
    );
}

#[test]
fn test_explain_failure_surfaces_model_error() {
    let analyzer = SentimentAnalyzer::new(
        Arc::new(MockSentimentModel::failing()),
        AnalyzerConfig::default(),
    )
    .unwrap();

    assert!(matches!(
        analyzer.explain("anything", 5),
        Err(ExplainError::Model(_))
    ));
}

#[test]
fn test_stub_flag_follows_model() {
    assert!(analyzer_with(10).is_stub());
}
