mod field_value;
mod submission;
mod webhook_delivery;

pub use field_value::{FieldValue, Fields};
pub(crate) use field_value::scalar_text;
pub use submission::Submission;
pub use webhook_delivery::WebhookDelivery;
