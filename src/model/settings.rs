use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Spreadsheet web-app URL that receives every punch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "https://script.google.com/macros/s/XXXX/exec", nullable = true)]
    pub google_sheet_url: Option<String>,
}

impl AppSettings {
    /// The webhook target, if one is configured. Blank strings count as unset.
    pub fn webhook_url(&self) -> Option<&str> {
        self.google_sheet_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_is_not_configured() {
        let settings = AppSettings {
            google_sheet_url: Some("   ".into()),
        };
        assert_eq!(settings.webhook_url(), None);
        assert_eq!(AppSettings::default().webhook_url(), None);
    }

    #[test]
    fn empty_document_parses_to_default() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, AppSettings::default());
    }
}
