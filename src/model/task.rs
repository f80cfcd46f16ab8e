//! Work items claimed by providers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use super::document::DocumentStatus;
use super::ids::Slug;

/// Status reported to the platform when finishing a task.
pub type LogStatus = DocumentStatus;

/// A task to run for a provider.
///
/// `order` holds the task parameters; their schema depends on the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub slug: Slug,
    #[serde(default)]
    pub order: Map<String, JsonValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_from_json() {
        let task: Task =
            serde_json::from_value(json!({"slug": "task-1", "order": {"language": "fr"}})).unwrap();
        assert_eq!(task.slug.as_str(), "task-1");
        assert_eq!(task.order["language"], "fr");
        assert!(serde_json::from_value::<Task>(json!({"slug": "task 1"})).is_err());
    }

    #[test]
    fn test_log_status_codes() {
        assert_eq!(serde_json::to_value(LogStatus::Error).unwrap(), json!("500"));
        assert_eq!(LogStatus::Success.code(), "200");
    }
}
