mod accessibility;
mod duplicate_ids;
mod hardcoded_text;
mod local_suppress;
mod manifest_typo;
mod property_escape;
mod registration;
mod scroll_view;
mod set_javascript;
mod sparse_arrays;
mod toast;
mod too_deep_layout;
mod view_constructor;
mod wrong_call;

pub use accessibility::CONTENT_DESCRIPTION;
pub use duplicate_ids::DUPLICATE_IDS;
pub use hardcoded_text::HARDCODED_TEXT;
pub use local_suppress::LOCAL_SUPPRESS;
pub use manifest_typo::MANIFEST_TYPO;
pub use property_escape::PROPERTY_ESCAPE;
pub use registration::REGISTERED;
pub use scroll_view::SCROLL_VIEW_COUNT;
pub use set_javascript::SET_JAVASCRIPT_ENABLED;
pub use sparse_arrays::USE_SPARSE_ARRAYS;
pub use toast::SHOW_TOAST;
pub use too_deep_layout::TOO_DEEP_LAYOUT;
pub use view_constructor::VIEW_CONSTRUCTOR;
pub use wrong_call::WRONG_CALL;

use super::Detector;
use crate::config::Config;
use crate::error::Result;

/// Returns all built-in detectors, in registration order.
///
/// Detectors with per-rule settings read them from `config` here, so a
/// malformed `[rules.<Id>]` table fails before any file is checked.
pub fn all_detectors(config: &Config) -> Result<Vec<Box<dyn Detector>>> {
    Ok(vec![
        Box::new(scroll_view::ScrollViewCountDetector),
        Box::new(accessibility::ContentDescriptionDetector),
        Box::new(hardcoded_text::HardcodedTextDetector),
        Box::new(duplicate_ids::DuplicateIdDetector),
        Box::new(too_deep_layout::TooDeepLayoutDetector::from_config(config)?),
        Box::new(manifest_typo::ManifestTypoDetector),
        Box::new(registration::RegistrationDetector),
        Box::new(set_javascript::SetJavaScriptEnabledDetector),
        Box::new(toast::ToastDetector),
        Box::new(sparse_arrays::SparseArrayDetector),
        Box::new(view_constructor::ViewConstructorDetector),
        Box::new(local_suppress::LocalSuppressDetector),
        Box::new(wrong_call::WrongCallDetector),
        Box::new(property_escape::PropertyEscapeDetector),
    ])
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::dispatch::VisitorRegistry;
    use crate::rules::IssueRegistry;

    #[test]
    fn builtin_set_registers_and_dispatches() {
        let detectors = all_detectors(&Config::default()).unwrap();
        let registry = IssueRegistry::for_detectors(&detectors).unwrap();
        assert_eq!(registry.len(), 16);
        assert!(VisitorRegistry::build(&detectors).is_ok());
        assert!(registry.lookup("ScrollViewCount").is_some());
    }

    #[test]
    fn malformed_rule_settings_fail_early() {
        let config: Config = toml::from_str("[rules.TooDeepLayout]\nmax_depth = \"x\"\n").unwrap();
        assert!(all_detectors(&config).is_err());
    }
}
