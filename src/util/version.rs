pub const APP_NAME: &str = "Torn Travel Bot";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");

const USER_AGENT_PRODUCT: &str = "torn-travel-bot";

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// User agent sent with every provider request.
pub fn user_agent() -> String {
    let version = version_label();
    format!(
        "{}/{}",
        USER_AGENT_PRODUCT,
        version.trim_start_matches(|ch| ch == 'v' || ch == 'V')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_has_no_version_prefix() {
        let agent = user_agent();
        assert!(agent.starts_with("torn-travel-bot/"));
        assert!(!agent.contains("/v"));
    }

    #[test]
    fn label_falls_back_to_package_version() {
        if GIT_TAG.is_none() {
            assert_eq!(version_label(), format!("v{APP_VERSION}"));
        }
    }
}
