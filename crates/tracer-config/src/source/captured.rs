use tracing::debug;

use super::MapSource;

/// Lowest-ranked source: defaults inferred from the running process.
#[derive(Debug, Clone, Copy)]
pub struct CapturedEnvironment;

impl CapturedEnvironment {
    /// Capture defaults from the current process.
    ///
    /// Today this is the default service name, taken from the executable's
    /// file stem. Anything that cannot be determined is simply absent.
    #[must_use]
    pub fn detect() -> MapSource {
        let service = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .filter(|s| !s.is_empty());
        debug!(service = ?service, "captured environment defaults");
        MapSource::captured(service.map(|s| ("service".to_owned(), s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ConfigOrigin, PropertySource};

    #[test]
    fn test_detect_is_captured_origin() {
        let source = CapturedEnvironment::detect();
        assert_eq!(source.origin(), ConfigOrigin::CapturedEnvironment);
        // Test binaries always have a file stem.
        assert!(source.get("service").is_some());
    }
}
