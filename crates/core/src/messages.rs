//! Failure-detail message rendering.
//!
//! Localisation proper lives outside this slice; the pipeline only needs a
//! seam it can hand a message key and arguments to. [`StaticMessages`] is the
//! built-in English catalogue used when no localised source is wired in.

/// Message key for the invalid-format detail. Arguments: the identifier
/// value, then the expected format (description or raw regex).
pub const INVALID_FORMAT_KEY: &str = "patient_identifier.error.invalid_format";

/// Renders failure detail text from a key plus positional arguments.
pub trait MessageSource: Send + Sync {
    /// Render the message for `key`, substituting `{0}`, `{1}`, ... with
    /// `args`. Unknown keys render as the key itself so failures stay
    /// reportable when a catalogue is incomplete.
    fn message(&self, key: &str, args: &[&str]) -> String;
}

/// Built-in English message catalogue.
#[derive(Debug, Default)]
pub struct StaticMessages;

impl MessageSource for StaticMessages {
    fn message(&self, key: &str, args: &[&str]) -> String {
        let template = match key {
            INVALID_FORMAT_KEY => "identifier \"{0}\" does not match: \"{1}\"",
            _ => key,
        };
        substitute(template, args)
    }
}

/// Replace `{n}` placeholders with the n-th argument.
fn substitute(template: &str, args: &[&str]) -> String {
    let mut rendered = template.to_owned();
    for (i, arg) in args.iter().enumerate() {
        rendered = rendered.replace(&format!("{{{i}}}"), arg);
    }
    rendered
}
