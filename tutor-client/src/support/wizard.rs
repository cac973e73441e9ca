//! Support Creation Wizard
//!
//! A finite-state machine over seven ordered steps. The wizard owns a single
//! [`SupportDraft`] and a [`WizardState`]; each step carries its own
//! validation rule so ordering and rules can be tested independently of any
//! UI.
//!
//! ```text
//! Subject → Course → Objectives → Level → Details → Avatar → Review → Submitted
//! ```
//!
//! Only `Subject` (title + subject) and `Objectives` (learning objective)
//! have hard requirements; `Details` additionally rejects malformed or
//! inverted dates when dates were entered. Advancing from `Review` submits.

use std::fmt;

use shared::ValidationError;
use shared::models::{
    OTHER_SUBJECT, Support, SupportCreateRequest, is_known_subject, normalize_keywords,
};
use shared::validation::{
    MAX_LONG_TEXT_LEN, MAX_SHORT_TEXT_LEN, MAX_TITLE_LEN, validate_date_range,
    validate_required_text,
};

use super::repository::SupportRepository;
use crate::{ClientError, ClientResult};

/// Wizard steps in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    Subject,
    Course,
    Objectives,
    Level,
    Details,
    Avatar,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        Self::Subject,
        Self::Course,
        Self::Objectives,
        Self::Level,
        Self::Details,
        Self::Avatar,
        Self::Review,
    ];

    pub const FIRST: WizardStep = Self::Subject;

    /// Zero-based position
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Subject => "Subject",
            Self::Course => "Course",
            Self::Objectives => "Objectives",
            Self::Level => "Level",
            Self::Details => "Details",
            Self::Avatar => "Avatar",
            Self::Review => "Review",
        }
    }

    /// Check the fields this step is responsible for
    pub fn validate(self, draft: &SupportDraft) -> Result<(), ValidationError> {
        match self {
            Self::Subject => {
                validate_required_text(&draft.title, "title", MAX_TITLE_LEN)?;
                let subject = draft
                    .subject
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| ValidationError::field("subject", "a subject must be selected"))?;
                if !is_known_subject(subject) {
                    return Err(ValidationError::field(
                        "subject",
                        format!("'{subject}' is not in the subject catalog; choose {OTHER_SUBJECT} instead"),
                    ));
                }
                if subject == OTHER_SUBJECT {
                    validate_required_text(
                        draft.custom_subject.as_deref().unwrap_or_default(),
                        "custom_subject",
                        MAX_SHORT_TEXT_LEN,
                    )?;
                }
                Ok(())
            }
            Self::Objectives => validate_required_text(
                draft.learning_objective.as_deref().unwrap_or_default(),
                "learning_objective",
                MAX_LONG_TEXT_LEN,
            ),
            Self::Details => {
                validate_date_range(draft.start_date.as_deref(), draft.end_date.as_deref())
            }
            Self::Course | Self::Level | Self::Avatar | Self::Review => Ok(()),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// In-progress Support payload
///
/// Every field is optional here; required-field invariants are enforced
/// only when the draft is turned into a [`SupportCreateRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportDraft {
    pub title: String,
    pub short_description: Option<String>,
    pub subject: Option<String>,
    pub custom_subject: Option<String>,
    pub course_id: Option<String>,
    pub learning_objective: Option<String>,
    pub learning_type: Option<String>,
    pub level: Option<String>,
    pub content_language: Option<String>,
    pub estimated_duration: Option<String>,
    pub access_type: Option<String>,
    pub keywords: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub avatar_id: Option<String>,
    /// Chat started together with the Support; makes it `active` on creation
    pub chat_id: Option<String>,
}

impl SupportDraft {
    /// Add a keyword (trimmed). Blank and duplicate keywords are ignored.
    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.is_empty() || self.keywords.iter().any(|k| k.eq_ignore_ascii_case(keyword)) {
            return false;
        }
        self.keywords.push(keyword.to_string());
        true
    }

    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        let before = self.keywords.len();
        self.keywords.retain(|k| !k.eq_ignore_ascii_case(keyword.trim()));
        self.keywords.len() != before
    }

    /// First unmet requirement across all steps, in step order
    pub fn validate(&self) -> Result<(), ValidationError> {
        WizardStep::ALL
            .iter()
            .try_for_each(|step| step.validate(self))
    }

    /// Build the create payload: trims text, drops blanks, then checks the
    /// create-time invariants.
    pub fn to_request(&self) -> Result<SupportCreateRequest, ValidationError> {
        self.validate()?;

        let subject = clean(&self.subject).unwrap_or_default();
        let custom_subject = if subject == OTHER_SUBJECT {
            clean(&self.custom_subject)
        } else {
            None
        };

        let request = SupportCreateRequest {
            title: self.title.trim().to_string(),
            short_description: clean(&self.short_description),
            subject,
            custom_subject,
            course_id: clean(&self.course_id),
            learning_objective: clean(&self.learning_objective),
            learning_type: clean(&self.learning_type),
            level: clean(&self.level),
            content_language: clean(&self.content_language),
            estimated_duration: clean(&self.estimated_duration),
            access_type: clean(&self.access_type),
            keywords: Some(normalize_keywords(&self.keywords)).filter(|k| !k.is_empty()),
            start_date: clean(&self.start_date),
            end_date: clean(&self.end_date),
            avatar_id: clean(&self.avatar_id),
            chat_id: clean(&self.chat_id),
        };
        request.validate()?;
        Ok(request)
    }
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Where the wizard is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardState {
    /// Collecting input on a step
    Editing(WizardStep),
    /// Terminal: the draft was turned into a Support
    Submitted { support_id: String },
}

/// Result of [`SupportWizard::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved to the given step
    Moved(WizardStep),
    /// Advanced past `Review`; the Support was created
    Submitted(Support),
}

/// Multi-step Support creation
///
/// Single owner: every mutating call takes `&mut self`.
#[derive(Debug)]
pub struct SupportWizard<R> {
    repository: R,
    draft: SupportDraft,
    state: WizardState,
}

impl<R: SupportRepository> SupportWizard<R> {
    pub fn new(repository: R) -> Self {
        Self::with_draft(repository, SupportDraft::default())
    }

    /// Start from a prefilled draft (e.g. a course page's "request support" link)
    pub fn with_draft(repository: R, draft: SupportDraft) -> Self {
        Self {
            repository,
            draft,
            state: WizardState::Editing(WizardStep::FIRST),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Active step, `None` once submitted
    pub fn current_step(&self) -> Option<WizardStep> {
        match self.state {
            WizardState::Editing(step) => Some(step),
            WizardState::Submitted { .. } => None,
        }
    }

    /// Id of the created Support, once submitted
    pub fn submitted_id(&self) -> Option<&str> {
        match &self.state {
            WizardState::Submitted { support_id } => Some(support_id),
            WizardState::Editing(_) => None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self.state, WizardState::Submitted { .. })
    }

    /// 1-based position and total step count
    pub fn progress(&self) -> (usize, usize) {
        let total = WizardStep::ALL.len();
        match self.state {
            WizardState::Editing(step) => (step.index() + 1, total),
            WizardState::Submitted { .. } => (total, total),
        }
    }

    pub fn draft(&self) -> &SupportDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut SupportDraft {
        &mut self.draft
    }

    pub fn into_draft(self) -> SupportDraft {
        self.draft
    }

    fn editing_step(&self, action: &str) -> ClientResult<WizardStep> {
        match &self.state {
            WizardState::Editing(step) => Ok(*step),
            WizardState::Submitted { support_id } => Err(ClientError::InvalidState(format!(
                "cannot {action}: support {support_id} was already submitted"
            ))),
        }
    }

    /// Validate the active step without moving
    pub fn validate_current(&self) -> ClientResult<()> {
        let step = self.editing_step("validate")?;
        step.validate(&self.draft).map_err(ClientError::from)
    }

    /// Validate the active step and move forward; from `Review` this submits.
    pub async fn advance(&mut self) -> ClientResult<Advance> {
        let step = self.editing_step("advance")?;
        step.validate(&self.draft)?;

        match step.next() {
            Some(next) => {
                self.state = WizardState::Editing(next);
                tracing::debug!(from = %step, to = %next, "Wizard advanced");
                Ok(Advance::Moved(next))
            }
            None => self.submit().await.map(Advance::Submitted),
        }
    }

    /// Move back one step, keeping all entered data
    pub fn retreat(&mut self) -> ClientResult<WizardStep> {
        let step = self.editing_step("go back")?;
        let previous = step.previous().ok_or_else(|| {
            ClientError::InvalidState(format!("{step} is the first step"))
        })?;
        self.state = WizardState::Editing(previous);
        Ok(previous)
    }

    /// Jump back to an earlier step (Review "edit" links). Forward jumps are
    /// rejected because they would skip validation.
    pub fn jump_to(&mut self, target: WizardStep) -> ClientResult<()> {
        let step = self.editing_step("jump")?;
        if target > step {
            return Err(ClientError::InvalidState(format!(
                "cannot jump forward from {step} to {target}"
            )));
        }
        self.state = WizardState::Editing(target);
        Ok(())
    }

    /// Submit the draft from `Review`
    ///
    /// On failure the wizard stays on `Review` with the draft intact, so the
    /// call can be repeated. After success the wizard is terminal and any
    /// further submission is rejected.
    pub async fn submit(&mut self) -> ClientResult<Support> {
        let step = self.editing_step("submit")?;
        if step != WizardStep::Review {
            return Err(ClientError::InvalidState(format!(
                "submit is only available from {}, currently on {step}",
                WizardStep::Review
            )));
        }

        let request = self.draft.to_request()?;
        match self.repository.create(&request).await {
            Ok(support) => {
                tracing::info!(support_id = %support.id, "Support wizard submitted");
                self.state = WizardState::Submitted {
                    support_id: support.id.clone(),
                };
                Ok(support)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Support submission failed, draft kept for retry");
                Err(e)
            }
        }
    }
}
