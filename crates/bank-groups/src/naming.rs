//! Group naming rule and classifier overrides

/// Default group name for a file on `platform`.
///
/// The initialization bank ships in its own group so it can be delivered
/// ahead of everything else.
pub fn group_for(platform: &str, is_init_bank: bool) -> String {
    if is_init_bank {
        format!("Data_{platform}_InitBank")
    } else {
        format!("Data_{platform}")
    }
}

/// Override hook consulted before the default naming rule.
///
/// Returning `None` declines, letting the next classifier (or the default
/// rule) decide.
pub trait GroupClassifier: Send + Sync {
    fn classify(&self, file_name: &str, platform: &str, language: &str) -> Option<String>;
}

impl<F> GroupClassifier for F
where
    F: Fn(&str, &str, &str) -> Option<String> + Send + Sync,
{
    fn classify(&self, file_name: &str, platform: &str, language: &str) -> Option<String> {
        self(file_name, platform, language)
    }
}

/// Resolve the group name for a file: classifiers in registration order,
/// first non-declining answer wins, default rule otherwise.
pub fn resolve_group_name(
    classifiers: &[Box<dyn GroupClassifier>],
    file_name: &str,
    platform: &str,
    language: &str,
    is_init_bank: bool,
) -> String {
    classifiers
        .iter()
        .find_map(|c| c.classify(file_name, platform, language))
        .unwrap_or_else(|| group_for(platform, is_init_bank))
}
