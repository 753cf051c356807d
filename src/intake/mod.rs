pub mod form;
pub mod parser;

use std::sync::Arc;

pub use form::FormSubmission;

use crate::correlation::TOKEN_PARAM;
use crate::store::{StoreError, SubmissionStore};
use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum IntakeOutcome {
    /// The submission belongs to a form this service does not track.
    Ignored,
    Created { token: Token, redirect_url: String },
}

/// Records landing-page submissions and hands back the survey redirect.
pub struct IntakeHandler {
    store: Arc<dyn SubmissionStore>,
    target_form: String,
    survey_url: String,
}

impl IntakeHandler {
    pub fn new(store: Arc<dyn SubmissionStore>, target_form: String, survey_url: String) -> Self {
        Self {
            store,
            target_form,
            survey_url,
        }
    }

    pub fn target_form(&self) -> &str {
        &self.target_form
    }

    pub async fn handle(&self, submission: &FormSubmission) -> Result<IntakeOutcome, StoreError> {
        if submission.form_name != self.target_form {
            tracing::debug!(form = %submission.form_name, "Ignoring submission for untracked form");
            return Ok(IntakeOutcome::Ignored);
        }

        let token = Token::generate();
        self.store.insert(&token, &submission.fields).await?;

        let redirect_url = redirect_target(&self.survey_url, &token);
        tracing::info!(submission_id = %token, "Landing form captured");

        Ok(IntakeOutcome::Created {
            token,
            redirect_url,
        })
    }
}

/// Append `submission_id=<token>` to `base`, keeping any existing query and
/// fragment intact.
pub fn redirect_target(base: &str, token: &Token) -> String {
    let (head, fragment) = match base.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (base, None),
    };

    let param = form_urlencoded::Serializer::new(String::new())
        .append_pair(TOKEN_PARAM, token.as_str())
        .finish();

    let separator = match head.find('?') {
        None => "?",
        Some(_) if head.ends_with('?') || head.ends_with('&') => "",
        Some(_) => "&",
    };

    let mut url = format!("{head}{separator}{param}");
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::models::{FieldValue, Fields, Submission};
    use crate::store::MemorySubmissionStore;

    fn handler(store: Arc<dyn SubmissionStore>) -> IntakeHandler {
        IntakeHandler::new(
            store,
            "LandingPageLead".to_string(),
            "https://site.example/rg-sales-software-version/".to_string(),
        )
    }

    fn lead() -> FormSubmission {
        let mut fields = Fields::new();
        fields.insert("first_name".into(), FieldValue::Scalar("Ann".into()));
        fields.insert("email".into(), FieldValue::Scalar("a@x.com".into()));
        FormSubmission {
            form_name: "LandingPageLead".into(),
            fields,
        }
    }

    #[tokio::test]
    async fn creates_submission_and_redirect() {
        let store = Arc::new(MemorySubmissionStore::new());
        let outcome = handler(store.clone()).handle(&lead()).await.unwrap();

        let IntakeOutcome::Created {
            token,
            redirect_url,
        } = outcome
        else {
            panic!("expected a created submission");
        };
        assert_eq!(
            redirect_url,
            format!("https://site.example/rg-sales-software-version/?submission_id={token}")
        );

        let stored = store.find(&token).await.unwrap().unwrap();
        assert_eq!(stored.primary_payload, lead().fields);
        assert!(stored.secondary_payload.is_none());
    }

    #[tokio::test]
    async fn each_submission_gets_a_new_token() {
        let store = Arc::new(MemorySubmissionStore::new());
        let intake = handler(store.clone());
        let a = intake.handle(&lead()).await.unwrap();
        let b = intake.handle(&lead()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn other_forms_are_ignored() {
        let store = Arc::new(MemorySubmissionStore::new());
        let mut form = lead();
        form.form_name = "Newsletter".into();

        let outcome = handler(store.clone()).handle(&form).await.unwrap();
        assert_eq!(outcome, IntakeOutcome::Ignored);
        assert!(store.is_empty());
    }

    struct UnavailableStore;

    #[async_trait]
    impl SubmissionStore for UnavailableStore {
        async fn insert(&self, _: &Token, _: &Fields) -> Result<Submission, StoreError> {
            Err(StoreError::Timeout)
        }
        async fn find(&self, _: &Token) -> Result<Option<Submission>, StoreError> {
            Err(StoreError::Timeout)
        }
        async fn update_secondary(&self, _: &Token, _: &Value) -> Result<u64, StoreError> {
            Err(StoreError::Timeout)
        }
        async fn list(&self) -> Result<Vec<Submission>, StoreError> {
            Err(StoreError::Timeout)
        }
        async fn delete(&self, _: &Token) -> Result<bool, StoreError> {
            Err(StoreError::Timeout)
        }
    }

    #[tokio::test]
    async fn store_failure_is_propagated() {
        let result = handler(Arc::new(UnavailableStore)).handle(&lead()).await;
        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[test]
    fn redirect_appends_to_existing_query() {
        let token = Token::parse("abc").unwrap();
        assert_eq!(
            redirect_target("https://s.example/p?lang=en", &token),
            "https://s.example/p?lang=en&submission_id=abc"
        );
        assert_eq!(
            redirect_target("https://s.example/p?", &token),
            "https://s.example/p?submission_id=abc"
        );
    }

    #[test]
    fn redirect_keeps_fragment_last() {
        let token = Token::parse("abc").unwrap();
        assert_eq!(
            redirect_target("https://s.example/p#start", &token),
            "https://s.example/p?submission_id=abc#start"
        );
    }
}
