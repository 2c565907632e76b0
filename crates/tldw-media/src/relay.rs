//! Relay services that fetch a URL on the caller's behalf.

/// Placeholder replaced by the percent-encoded source URL.
pub const URL_PLACEHOLDER: &str = "{url}";

/// A fetch relay.
pub trait Relay: Send + Sync {
    /// Name of the relay (for logging and metrics)
    fn name(&self) -> &str;

    /// URL that makes the relay fetch `source`.
    fn wrap(&self, source: &str) -> String;
}

/// Relay described by a URL template such as
/// `https://relay.example/raw?url={url}`.
///
/// A template without the placeholder gets the encoded URL appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTemplate {
    name: String,
    template: String,
}

impl RelayTemplate {
    /// The relay is named after the template's host and path, so two
    /// relays on one host still log and count separately.
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let name = url::Url::parse(&template.replace(URL_PLACEHOLDER, ""))
            .ok()
            .and_then(|u| {
                let host = u.host_str()?;
                let path = u.path().trim_end_matches('/');
                Some(format!("{host}{path}"))
            })
            .unwrap_or_else(|| template.clone());
        Self { name, template }
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Relay for RelayTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn wrap(&self, source: &str) -> String {
        let encoded = urlencoding::encode(source);
        if self.template.contains(URL_PLACEHOLDER) {
            self.template.replace(URL_PLACEHOLDER, &encoded)
        } else {
            format!("{}{}", self.template, encoded)
        }
    }
}
