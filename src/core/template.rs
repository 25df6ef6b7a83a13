//! Template resolution
//!
//! A template name is resolved by trying an ordered list of candidate names
//! against a [`TemplateSource`]. The bundle's own template reference is tried
//! first, then the caller's default view name (with the configured prefix).
//! Each candidate comes from one [`CandidateRule`].

use crate::adapters::TemplateSource;
use crate::domain::{Bundle, BundleError, OutputFormat, Result};
use std::io::Read;

/// One way of deriving a candidate name from a template reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateRule {
    /// The name unchanged
    AsGiven,
    /// The name without its extension
    StripExtension,
    /// The name with the output suffix appended
    AppendSuffix,
    /// The name without its extension, then with the suffix appended
    ReplaceExtension,
}

impl CandidateRule {
    /// Applies the rule to `name`
    pub fn apply(&self, name: &str, suffix: &str) -> String {
        match self {
            CandidateRule::AsGiven => name.to_string(),
            CandidateRule::StripExtension => strip_extension(name).to_string(),
            CandidateRule::AppendSuffix => format!("{name}{suffix}"),
            CandidateRule::ReplaceExtension => format!("{}{suffix}", strip_extension(name)),
        }
    }
}

/// Rules applied to the bundle's template reference
pub const TEMPLATE_RULES: &[CandidateRule] = &[
    CandidateRule::AsGiven,
    CandidateRule::StripExtension,
    CandidateRule::AppendSuffix,
];

/// Rules applied to the default view name
pub const VIEW_RULES: &[CandidateRule] = &[
    CandidateRule::AsGiven,
    CandidateRule::StripExtension,
    CandidateRule::AppendSuffix,
    CandidateRule::ReplaceExtension,
];

/// Removes the extension of the last path segment
///
/// A dot inside a directory name is not an extension.
///
/// ```
/// use bundle_export::core::template::strip_extension;
///
/// assert_eq!(strip_extension("sales/report.xlsx"), "sales/report");
/// assert_eq!(strip_extension("v1.2/report"), "v1.2/report");
/// ```
pub fn strip_extension(name: &str) -> &str {
    let segment_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    match name[segment_start..].rfind('.') {
        Some(dot) => &name[..segment_start + dot],
        None => name,
    }
}

/// File name without directories or extension
///
/// ```
/// use bundle_export::core::template::base_name;
///
/// assert_eq!(base_name("sales/2024/report.xlsx"), "report");
/// assert_eq!(base_name("report"), "report");
/// ```
pub fn base_name(name: &str) -> &str {
    let stripped = strip_extension(name);
    let segment_start = stripped.rfind(['/', '\\']).map_or(0, |i| i + 1);
    &stripped[segment_start..]
}

/// A template that was found and loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Candidate name that matched
    pub name: String,
    /// Template contents
    pub bytes: Vec<u8>,
}

impl ResolvedTemplate {
    /// Base name of the matched template, used when the bundle has no filename
    pub fn base_name(&self) -> &str {
        base_name(&self.name)
    }
}

/// Resolves template references through the candidate chain
pub struct TemplateResolver<'s, S: TemplateSource + ?Sized> {
    source: &'s S,
    view_prefix: &'s str,
    suffix: &'static str,
}

impl<'s, S: TemplateSource + ?Sized> TemplateResolver<'s, S> {
    /// Creates a resolver over `source`
    ///
    /// `view_prefix` is prepended to default view names; the suffix is the
    /// extension of `format`.
    pub fn new(source: &'s S, view_prefix: &'s str, format: OutputFormat) -> Self {
        Self {
            source,
            view_prefix,
            suffix: format.extension(),
        }
    }

    /// Candidate names in the order they are tried
    ///
    /// A name produced by more than one rule keeps its first position.
    pub fn candidates(&self, template_name: Option<&str>, default_view_name: &str) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        let mut push = |name: String| {
            if !name.is_empty() && !candidates.contains(&name) {
                candidates.push(name);
            }
        };

        if let Some(template) = template_name.map(str::trim).filter(|t| !t.is_empty()) {
            for rule in TEMPLATE_RULES {
                push(rule.apply(template, self.suffix));
            }
        }

        let view = format!("{}{}", self.view_prefix, default_view_name.trim());
        for rule in VIEW_RULES {
            push(rule.apply(&view, self.suffix));
        }

        candidates
    }

    /// Finds and loads the template for `bundle`
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::TemplateNotFound`] when no candidate exists,
    /// or [`BundleError::Io`] when the matching template cannot be read.
    pub fn resolve(&self, bundle: &Bundle, default_view_name: &str) -> Result<ResolvedTemplate> {
        let candidates = self.candidates(bundle.template_name.as_deref(), default_view_name);

        for candidate in &candidates {
            if !self.source.exists(candidate) {
                tracing::trace!(candidate = %candidate, "Template candidate not found");
                continue;
            }

            let mut bytes = Vec::new();
            self.source
                .open(candidate)
                .and_then(|mut reader| reader.read_to_end(&mut bytes))
                .map_err(|e| {
                    BundleError::Io(format!("Failed to read template '{candidate}': {e}"))
                })?;

            tracing::debug!(template = %candidate, size = bytes.len(), "Resolved template");
            return Ok(ResolvedTemplate {
                name: candidate.clone(),
                bytes,
            });
        }

        tracing::warn!(candidates = ?candidates, "No template candidate exists");
        Err(BundleError::TemplateNotFound { candidates })
    }
}
