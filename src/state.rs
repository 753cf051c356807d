use std::sync::Arc;

use crate::config::Config;
use crate::intake::IntakeHandler;
use crate::rate_limit::LoginRateLimiter;
use crate::reconcile::WebhookReconciler;
use crate::store::SubmissionStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SubmissionStore>,
    pub intake: IntakeHandler,
    pub reconciler: WebhookReconciler,
    pub login_limiter: LoginRateLimiter,
}
