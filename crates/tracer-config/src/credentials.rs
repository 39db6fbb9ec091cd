//! Credential resolution.
//!
//! Credentials are never read from process properties, which other users on
//! the host can see. A `*-file` setting naming a readable, non-empty file
//! replaces the directly configured value. The API key additionally falls
//! back through two older generations of profiler-specific settings, read
//! from the environment only.

use std::path::Path;

use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::keys;
use crate::resolve::Resolver;
use crate::source::ConfigOrigin;
use crate::types::Credentials;

/// One generation of API key settings.
struct KeyGeneration {
    key: &'static str,
    file: &'static str,
    environment_only: bool,
}

const API_KEY_GENERATIONS: &[KeyGeneration] = &[
    KeyGeneration {
        key: keys::API_KEY,
        file: keys::API_KEY_FILE,
        environment_only: false,
    },
    KeyGeneration {
        key: keys::PROFILING_API_KEY_OLD,
        file: keys::PROFILING_API_KEY_FILE_OLD,
        environment_only: true,
    },
    KeyGeneration {
        key: keys::PROFILING_API_KEY_VERY_OLD,
        file: keys::PROFILING_API_KEY_FILE_VERY_OLD,
        environment_only: true,
    },
];

/// Resolve every credential.
#[must_use]
pub fn resolve(resolver: &Resolver) -> Credentials {
    Credentials {
        api_key: resolve_api_key(resolver),
        application_key: resolve_application_key(resolver),
    }
}

/// API key: the first generation that yields a key wins.
#[must_use]
pub fn resolve_api_key(resolver: &Resolver) -> Option<String> {
    API_KEY_GENERATIONS.iter().find_map(|generation| {
        let direct = if generation.environment_only {
            resolver.get_string_from(ConfigOrigin::Environment, generation.key)
        } else {
            resolver.get_string_excluding(generation.key, ConfigOrigin::Process, &[])
        };
        let key = from_file(resolver, generation.file).or(direct);
        if key.is_some() {
            debug!(setting = generation.key, "api key resolved");
        }
        key
    })
}

/// Application key: `application-key`, replaced by `application-key-file`.
#[must_use]
pub fn resolve_application_key(resolver: &Resolver) -> Option<String> {
    let direct =
        resolver.get_string_excluding(keys::APPLICATION_KEY, ConfigOrigin::Process, &[]);
    from_file(resolver, keys::APPLICATION_KEY_FILE).or(direct)
}

/// Trimmed contents of the file named by `setting`. Unreadable files are
/// reported; empty files count as absent.
fn from_file(resolver: &Resolver, setting: &str) -> Option<String> {
    let path = resolver.get_string(setting, &[])?;
    match read_trimmed(Path::new(&path)) {
        Ok(contents) if contents.is_empty() => {
            debug!(setting, path = %path, "credential file is empty, ignoring");
            None
        },
        Ok(contents) => Some(contents),
        Err(e) => {
            resolver.report(Diagnostic::UnreadableFile {
                setting: setting.to_owned(),
                path,
                reason: e.to_string(),
            });
            None
        },
    }
}

fn read_trimmed(path: &Path) -> std::io::Result<String> {
    Ok(std::fs::read_to_string(path)?.trim().to_owned())
}
