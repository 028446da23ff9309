//! Analyzer wiring the text heuristics to the model backends.

use super::types::{AnalysisOutcome, Answer, Sentiment};
use super::{key_points, qa, questions, sentiment, summary};
use crate::models::{ModelSet, SummaryRequest};

/// Summarizes, questions, and sentiment-tags document text.
///
/// Holds read-only model handles; build it once at startup and share it. Every operation is a
/// function of its inputs and never returns an error: fallbacks are reported through
/// [`AnalysisOutcome`].
#[derive(Clone)]
pub struct Analyzer {
    models: ModelSet,
}

impl Analyzer {
    /// Wrap a set of loaded models.
    pub fn new(models: ModelSet) -> Self {
        Self { models }
    }

    /// Abstractive summary, windowed for long documents.
    pub async fn summarize(&self, text: &str) -> AnalysisOutcome<String> {
        let Some(input) = summary::model_input(text) else {
            return AnalysisOutcome::Degraded {
                value: summary::TOO_SHORT_MESSAGE.to_string(),
                reason: format!("text has fewer than {} words", summary::MIN_WORDS),
            };
        };

        let request = SummaryRequest {
            text: input,
            max_length: summary::SUMMARY_MAX_LENGTH,
            min_length: summary::SUMMARY_MIN_LENGTH,
        };
        match self.models.summarizer.summarize(request).await {
            Ok(generated) if !generated.trim().is_empty() => AnalysisOutcome::Success(generated),
            Ok(_) => AnalysisOutcome::Degraded {
                value: summary::fallback_summary(text),
                reason: "summarization model returned an empty summary".into(),
            },
            Err(error) => {
                tracing::warn!(error = %error, "Summarization failed; using leading sentences");
                AnalysisOutcome::Degraded {
                    value: summary::fallback_summary(text),
                    reason: format!("summarization model failed: {error}"),
                }
            }
        }
    }

    /// Up to five representative sentences sampled across the document.
    pub fn extract_key_points(&self, text: &str) -> AnalysisOutcome<Vec<String>> {
        match key_points::sample_key_points(text) {
            Some(points) => AnalysisOutcome::Success(points),
            None => AnalysisOutcome::Degraded {
                value: vec![key_points::NO_KEY_POINTS.to_string()],
                reason: "no sentence fragment of suitable length".into(),
            },
        }
    }

    /// Canned follow-up questions for the document.
    pub fn suggested_questions(&self, text: &str) -> Vec<String> {
        questions::suggest_questions(text)
    }

    /// Document sentiment from up to three 300-word chunks.
    pub async fn analyze_sentiment(&self, text: &str) -> AnalysisOutcome<Sentiment> {
        let chunks = sentiment::split_into_chunks(text, sentiment::CHUNK_WORDS);
        if chunks.is_empty() {
            return AnalysisOutcome::Degraded {
                value: Sentiment::neutral(),
                reason: "no chunk long enough to classify".into(),
            };
        }

        let attempted = chunks.len().min(sentiment::MAX_CHUNKS);
        let mut results = Vec::with_capacity(attempted);
        let mut last_error = None;
        for (index, chunk) in chunks.iter().take(sentiment::MAX_CHUNKS).enumerate() {
            match self.models.sentiment.classify(chunk).await {
                Ok(classification) => results.push(classification),
                Err(error) => {
                    tracing::warn!(chunk = index, error = %error, "Sentiment chunk skipped");
                    last_error = Some(error.to_string());
                }
            }
        }

        let Some(aggregated) = sentiment::aggregate(&results) else {
            return AnalysisOutcome::Failed {
                reason: last_error.unwrap_or_else(|| "no chunk could be classified".into()),
            };
        };

        let skipped = attempted - results.len();
        if skipped > 0 {
            AnalysisOutcome::Degraded {
                value: aggregated,
                reason: format!("{skipped} of {attempted} chunks could not be classified"),
            }
        } else {
            AnalysisOutcome::Success(aggregated)
        }
    }

    /// Answer `question` from the most relevant part of `context`.
    pub async fn answer_question(&self, question: &str, context: &str) -> AnalysisOutcome<Answer> {
        let Some(relevant) = qa::select_context(question, context).usable() else {
            return AnalysisOutcome::Degraded {
                value: qa::not_found(),
                reason: "no relevant context for the question".into(),
            };
        };

        let span = match self
            .models
            .question_answerer
            .answer(question, &relevant)
            .await
        {
            Ok(span) => span,
            Err(error) => {
                tracing::warn!(error = %error, "Question answering failed");
                return AnalysisOutcome::Failed {
                    reason: error.to_string(),
                };
            }
        };

        AnalysisOutcome::Success(Answer {
            answer: qa::expand_answer(&span.answer, &relevant),
            confidence: span.score,
            explanation: qa::explain_confidence(span.score).to_string(),
            context_used: qa::context_preview(&relevant),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::OutcomeStatus;
    use crate::models::{
        AnswerSpan, Classification, ModelError, QuestionAnswerer, SentimentClassifier, Summarizer,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted backend recording what the analyzer sends.
    #[derive(Default)]
    struct ScriptedModels {
        summary: Option<String>,
        answer: Option<AnswerSpan>,
        sentiments: Mutex<Vec<Result<Classification, ModelError>>>,
        seen_summary_input: Mutex<Option<String>>,
        seen_context: Mutex<Option<String>>,
        classify_calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for ScriptedModels {
        async fn summarize(&self, request: SummaryRequest) -> Result<String, ModelError> {
            *self.seen_summary_input.lock().unwrap() = Some(request.text);
            self.summary
                .clone()
                .ok_or_else(|| ModelError::InferenceFailed("summarizer offline".into()))
        }
    }

    #[async_trait]
    impl QuestionAnswerer for ScriptedModels {
        async fn answer(&self, _question: &str, context: &str) -> Result<AnswerSpan, ModelError> {
            *self.seen_context.lock().unwrap() = Some(context.to_string());
            self.answer
                .clone()
                .ok_or_else(|| ModelError::ProviderUnavailable("qa offline".into()))
        }
    }

    #[async_trait]
    impl SentimentClassifier for ScriptedModels {
        async fn classify(&self, _text: &str) -> Result<Classification, ModelError> {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            let mut queue = self.sentiments.lock().unwrap();
            if queue.is_empty() {
                return Err(ModelError::InferenceFailed("no scripted result".into()));
            }
            queue.remove(0)
        }
    }

    fn analyzer(models: ScriptedModels) -> (Analyzer, std::sync::Arc<ScriptedModels>) {
        let models = std::sync::Arc::new(models);
        let set = ModelSet {
            summarizer: models.clone(),
            question_answerer: models.clone(),
            sentiment: models.clone(),
        };
        (Analyzer::new(set), models)
    }

    fn positive(score: f64) -> Result<Classification, ModelError> {
        Ok(Classification {
            label: "POSITIVE".into(),
            score,
        })
    }

    fn prose(words: usize) -> String {
        (0..words)
            .map(|index| if index % 10 == 9 { "word." } else { "word" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[tokio::test]
    async fn short_text_returns_fixed_message_without_model_call() {
        let (analyzer, models) = analyzer(ScriptedModels {
            summary: Some("unused".into()),
            ..Default::default()
        });
        let outcome = analyzer.summarize("The cat sat on the mat. It was happy.").await;
        assert_eq!(outcome.status(), OutcomeStatus::Degraded);
        assert_eq!(
            outcome.value().map(String::as_str),
            Some("Text too short to summarize effectively.")
        );
        assert!(models.seen_summary_input.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn summary_model_failure_falls_back_to_sentences() {
        let (analyzer, _) = analyzer(ScriptedModels::default());
        let text = "The first sentence of this report is long. The second sentence adds detail. \
                    Third sentence continues the story. Fourth sentence wraps it up nicely. \
                    Fifth sentence closes the introduction. Sixth sentence is never used here.";
        let outcome = analyzer.summarize(text).await;
        assert_eq!(outcome.status(), OutcomeStatus::Degraded);
        let summary = outcome.value().expect("fallback");
        assert!(summary.starts_with("The first sentence of this report is long. The second"));
        assert!(!summary.contains("Sixth"));
    }

    #[tokio::test]
    async fn long_text_sends_capped_excerpt() {
        let (analyzer, models) = analyzer(ScriptedModels {
            summary: Some("Condensed.".into()),
            ..Default::default()
        });
        let outcome = analyzer.summarize(&prose(900)).await;
        assert_eq!(outcome, AnalysisOutcome::Success("Condensed.".into()));
        let input = models.seen_summary_input.lock().unwrap().clone().expect("input");
        assert_eq!(input.split_whitespace().count(), 450);
    }

    #[tokio::test]
    async fn sentiment_of_empty_text_is_neutral() {
        let (analyzer, _) = analyzer(ScriptedModels::default());
        let outcome = analyzer.analyze_sentiment("").await;
        let sentiment = outcome.value().expect("neutral");
        assert_eq!(sentiment.label, "NEUTRAL");
        assert_eq!(sentiment.score, 0.5);
    }

    #[tokio::test]
    async fn sentiment_skips_failed_chunks() {
        let (analyzer, models) = analyzer(ScriptedModels {
            sentiments: Mutex::new(vec![
                positive(0.8),
                Err(ModelError::InferenceFailed("timeout".into())),
                positive(1.0),
                Ok(Classification {
                    label: "NEGATIVE".into(),
                    score: 0.99,
                }),
            ]),
            ..Default::default()
        });
        // four chunks; only the first three are classified
        let outcome = analyzer.analyze_sentiment(&prose(1000)).await;
        assert_eq!(outcome.status(), OutcomeStatus::Degraded);
        let sentiment = outcome.value().expect("sentiment");
        assert_eq!(sentiment.label, "POSITIVE");
        assert!((sentiment.score - 0.9).abs() < 1e-9);
        assert_eq!(models.classify_calls.load(Ordering::SeqCst), 3);
        assert_eq!(models.sentiments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sentiment_fails_when_every_chunk_fails() {
        let (analyzer, _) = analyzer(ScriptedModels::default());
        let outcome = analyzer.analyze_sentiment(&prose(100)).await;
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        assert_eq!(outcome.resolve(|_| Sentiment::error()).label, "ERROR");
    }

    #[tokio::test]
    async fn answer_is_expanded_and_explained() {
        let (analyzer, models) = analyzer(ScriptedModels {
            answer: Some(AnswerSpan {
                answer: "sat on the mat".into(),
                score: 0.85,
            }),
            ..Default::default()
        });
        let outcome = analyzer
            .answer_question("What did the cat do?", "The cat sat on the mat.")
            .await;
        let answer = outcome.value().expect("answer");
        assert_eq!(answer.answer, "The cat sat on the mat.");
        assert!(answer.explanation.starts_with("High confidence"));
        assert_eq!(answer.context_used, "The cat sat on the mat.");
        assert_eq!(
            models.seen_context.lock().unwrap().as_deref(),
            Some("The cat sat on the mat.")
        );
    }

    #[tokio::test]
    async fn unusable_context_returns_not_found() {
        let (analyzer, models) = analyzer(ScriptedModels::default());
        let text = "Unrelated short bit. Another tiny one. \
                    Our office cat sat on a mat today. Yes. No. Maybe so.";
        let outcome = analyzer
            .answer_question("Where did the office cat sit?", text)
            .await;
        let answer = outcome.value().expect("placeholder");
        assert_eq!(answer.confidence, 0.0);
        assert_eq!(answer.answer, qa::NO_ANSWER);
        assert!(models.seen_context.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn qa_model_failure_is_reported_as_failed() {
        let (analyzer, _) = analyzer(ScriptedModels::default());
        let outcome = analyzer
            .answer_question("What did the cat do?", "The cat sat on the mat.")
            .await;
        assert_eq!(outcome.status(), OutcomeStatus::Failed);
        let answer = outcome.resolve(Answer::error);
        assert!(answer.answer.starts_with("Error processing question:"));
    }
}
