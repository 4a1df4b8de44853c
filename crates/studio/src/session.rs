use tracing::{debug, info, warn};

use crate::category::GarmentCategory;
use crate::prompt::{expand_prompt, is_blank};
use crate::protocol::{RelayRequest, RelaySuccess};
use crate::relay::RelayClientError;

/// Prompt summaries in the recent-pattern list are cut to this many characters.
pub const RECENT_PROMPT_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub category: GarmentCategory,
}

/// Hosted image produced by one successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub image_url: String,
    pub host_id: String,
    pub mime_type: String,
}

impl From<RelaySuccess> for GenerationResult {
    fn from(s: RelaySuccess) -> Self {
        Self {
            image_url: s.image_url,
            host_id: s.host_id,
            mime_type: s.mime_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("prompt is empty")]
    Empty,
    #[error("a generation is already in progress")]
    Busy,
}

/// User-facing notice for a failed generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailureNotice {
    /// The relay answered but did not produce an image.
    Rejected,
    /// The relay could not be reached or its reply could not be read.
    Transport,
}

impl FailureNotice {
    pub fn message(self) -> &'static str {
        match self {
            Self::Rejected => "Failed to generate texture. Please try again.",
            Self::Transport => "An error occurred while generating the texture. Please try again.",
        }
    }
}

impl std::fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// An accepted submission. `seq` must be handed back to [`StudioSession::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub seq: u64,
    pub request: GenerationRequest,
    pub relay_request: RelayRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Ready(GenerationResult),
    Failed(FailureNotice),
    /// Not the in-flight submission; ignored.
    Stale,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Generating,
    Ready,
}

/// Entry of the "Recent Patterns" sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentPattern {
    pub image_url: String,
    pub summary: String,
    pub category: GarmentCategory,
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: u64,
    request: GenerationRequest,
}

/// Generation state of one studio.
///
/// One submission may be in flight at a time. A failure keeps the previous result.
#[derive(Debug, Clone, Default)]
pub struct StudioSession {
    category: GarmentCategory,
    result: Option<(GenerationResult, GenerationRequest)>,
    in_flight: Option<InFlight>,
    next_seq: u64,
    notice: Option<FailureNotice>,
}

impl StudioSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self) -> GarmentCategory {
        self.category
    }

    pub fn set_category(&mut self, category: GarmentCategory) {
        self.category = category;
    }

    pub fn status(&self) -> SessionStatus {
        if self.in_flight.is_some() {
            SessionStatus::Generating
        } else if self.result.is_some() {
            SessionStatus::Ready
        } else {
            SessionStatus::Idle
        }
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the submit control is enabled for `prompt`.
    pub fn can_submit(&self, prompt: &str) -> bool {
        !self.is_generating() && !is_blank(prompt)
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_generating() {
            "Generating..."
        } else {
            "Generate Pattern"
        }
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref().map(|(r, _)| r)
    }

    /// Starts a generation for `prompt` in the current category.
    pub fn submit(&mut self, prompt: &str) -> Result<Submission, SubmitError> {
        if is_blank(prompt) {
            return Err(SubmitError::Empty);
        }
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }

        self.next_seq += 1;
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            category: self.category,
        };
        let relay_request = RelayRequest {
            prompt: expand_prompt(prompt, self.category),
        };
        self.in_flight = Some(InFlight {
            seq: self.next_seq,
            request: request.clone(),
        });
        self.notice = None;
        debug!("generation #{} submitted ({})", self.next_seq, self.category);

        Ok(Submission {
            seq: self.next_seq,
            request,
            relay_request,
        })
    }

    /// Applies the outcome of submission `seq`.
    pub fn complete(
        &mut self,
        seq: u64,
        outcome: Result<GenerationResult, RelayClientError>,
    ) -> Completion {
        let Some(in_flight) = self.in_flight.take_if(|f| f.seq == seq) else {
            debug!("dropping completion for generation #{seq}");
            return Completion::Stale;
        };

        match outcome {
            Ok(result) => {
                info!("generation #{seq} ready: {}", result.image_url);
                self.result = Some((result.clone(), in_flight.request));
                Completion::Ready(result)
            }
            Err(err) => {
                warn!("generation #{seq} failed: {err}");
                let notice = err.notice();
                self.notice = Some(notice);
                Completion::Failed(notice)
            }
        }
    }

    /// Pending failure notice, cleared once read.
    pub fn take_notice(&mut self) -> Option<FailureNotice> {
        self.notice.take()
    }

    pub fn recent_pattern(&self) -> Option<RecentPattern> {
        let (result, request) = self.result.as_ref()?;
        Some(RecentPattern {
            image_url: result.image_url.clone(),
            summary: summarize_prompt(&request.prompt),
            category: request.category,
        })
    }
}

fn summarize_prompt(prompt: &str) -> String {
    if prompt.chars().count() > RECENT_PROMPT_CHARS {
        let cut: String = prompt.chars().take(RECENT_PROMPT_CHARS).collect();
        format!("{cut}...")
    } else {
        prompt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn result(url: &str) -> GenerationResult {
        GenerationResult {
            image_url: url.to_string(),
            host_id: "h".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[test]
    fn blank_prompt_is_rejected() {
        let mut s = StudioSession::new();
        assert_eq!(s.submit("   "), Err(SubmitError::Empty));
        assert!(!s.can_submit(""));
        assert_eq!(s.status(), SessionStatus::Idle);
    }

    #[test]
    fn second_submission_waits_for_first() {
        let mut s = StudioSession::new();
        let first = s.submit("a").unwrap();
        assert_eq!(s.status(), SessionStatus::Generating);
        assert_eq!(s.submit("b"), Err(SubmitError::Busy));
        assert_eq!(s.submit_label(), "Generating...");

        assert_eq!(
            s.complete(first.seq, Ok(result("u1"))),
            Completion::Ready(result("u1"))
        );
        let second = s.submit("b").unwrap();
        assert!(second.seq > first.seq);
        s.complete(second.seq, Ok(result("u2")));
        assert_eq!(s.result().map(|r| r.image_url.as_str()), Some("u2"));
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut s = StudioSession::new();
        let first = s.submit("a").unwrap();
        s.complete(first.seq, Ok(result("u1")));
        let second = s.submit("b").unwrap();
        assert_eq!(s.complete(first.seq, Ok(result("old"))), Completion::Stale);
        assert!(s.is_generating());
        s.complete(second.seq, Ok(result("u2")));
        assert_eq!(s.result().unwrap().image_url, "u2");
    }

    #[test]
    fn failure_keeps_previous_result() {
        let mut s = StudioSession::new();
        let a = s.submit("a").unwrap();
        s.complete(a.seq, Ok(result("u1")));

        let b = s.submit("b").unwrap();
        let c = s.complete(b.seq, Err(RelayClientError::Transport("down".to_string())));
        assert_eq!(c, Completion::Failed(FailureNotice::Transport));
        assert_eq!(s.status(), SessionStatus::Ready);
        assert_eq!(s.result().unwrap().image_url, "u1");
        assert_eq!(
            s.take_notice().map(FailureNotice::message),
            Some("An error occurred while generating the texture. Please try again.")
        );
        assert_eq!(s.take_notice(), None);
    }

    #[test]
    fn failure_without_result_returns_to_idle() {
        let mut s = StudioSession::new();
        let a = s.submit("a").unwrap();
        s.complete(a.seq, Err(RelayClientError::MissingImage("x".to_string())));
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(s.recent_pattern().is_none());
    }

    #[test]
    fn submission_expands_prompt_for_category() {
        let mut s = StudioSession::new();
        s.set_category(GarmentCategory::Kebaya);
        let sub = s.submit("blue ocean batik").unwrap();
        assert_eq!(sub.request.category, GarmentCategory::Kebaya);
        assert_eq!(
            sub.relay_request.prompt,
            expand_prompt("blue ocean batik", GarmentCategory::Kebaya)
        );
    }

    #[test]
    fn recent_pattern_truncates_prompt() {
        let mut s = StudioSession::new();
        s.set_category(GarmentCategory::Dress);
        let long = "elegant monochrome batik with geometric patterns";
        let sub = s.submit(long).unwrap();
        s.complete(sub.seq, Ok(result("u")));
        s.set_category(GarmentCategory::Shirt);

        let recent = s.recent_pattern().unwrap();
        assert_eq!(recent.summary, "elegant monochrome batik with ...");
        assert_eq!(recent.category, GarmentCategory::Dress);
        assert_eq!(recent.image_url, "u");
    }
}
