use serde::{Deserialize, Serialize};

/// Canonical cookie notice produced by the spreadsheet extractor.
///
/// The localizer itself works on any JSON tree; these types only describe
/// the shape the extractor promises so deviations can be reported.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NoticeDocument {
    pub notice_table: Vec<CategoryBlock>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryBlock {
    /// Token such as `StrictlynecessaryCategoryName`
    pub cookie_category: String,

    pub category_description: String,

    #[serde(default)]
    pub cookie_list: Vec<CookieRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CookieRecord {
    #[serde(rename = "Cookie subgroup")]
    pub subgroup: String,

    #[serde(rename = "Cookies")]
    pub cookies: String,

    #[serde(rename = "Cookies used")]
    pub cookies_used: String,

    /// Plain text, a token, or a compound like `395 CookiePolicyTableDays`
    #[serde(rename = "Lifespan")]
    pub lifespan: String,
}
