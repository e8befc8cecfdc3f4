use crate::clipboard::Clipboard;
use crate::error::PipelineError;

/// One step of a pipeline run.
///
/// Stages are configured at setup and then process any number of
/// clipboards; `process` must not change the stage itself.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, clipboard: &mut Clipboard) -> Result<(), PipelineError>;
}

/// Run `stages` in order against `clipboard`, stopping at the first
/// failure. Items published by earlier stages stay on the clipboard.
pub fn run_stages(stages: &[&dyn Stage], clipboard: &mut Clipboard) -> Result<(), PipelineError> {
    for stage in stages {
        tracing::debug!(stage = stage.name(), "Running stage");
        if let Err(e) = stage.process(clipboard) {
            tracing::error!(stage = stage.name(), error = %e, "Stage failed");
            return Err(e);
        }
        tracing::debug!(stage = stage.name(), items = clipboard.len(), "Stage complete");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;
    use crate::property_set::PropertySet;

    struct Publish {
        key: &'static str,
        calls: AtomicUsize,
    }

    impl Publish {
        fn new(key: &'static str) -> Self {
            Self {
                key,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Stage for Publish {
        fn name(&self) -> &'static str {
            "Publish"
        }

        fn process(&self, clipboard: &mut Clipboard) -> Result<(), PipelineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            clipboard.put(self.key, PropertySet::new());
            Ok(())
        }
    }

    struct Fail;

    impl Stage for Fail {
        fn name(&self) -> &'static str {
            "Fail"
        }

        fn process(&self, _clipboard: &mut Clipboard) -> Result<(), PipelineError> {
            Err(PipelineError::MissingInput("'anything'".to_string()))
        }
    }

    #[test]
    fn stages_run_in_order() {
        let first = Publish::new("a");
        let second = Publish::new("b");
        let mut clipboard = Clipboard::new();
        run_stages(&[&first, &second], &mut clipboard).unwrap();
        assert!(clipboard.contains("a") && clipboard.contains("b"));
    }

    #[test]
    fn first_failure_stops_the_run() {
        let before = Publish::new("a");
        let after = Publish::new("b");
        let mut clipboard = Clipboard::new();

        let result = run_stages(&[&before, &Fail, &after], &mut clipboard);

        assert_matches!(result, Err(PipelineError::MissingInput(_)));
        assert!(clipboard.contains("a"));
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
    }
}
