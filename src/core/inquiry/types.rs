use serde::{Deserialize, Serialize};

/// A consulting request as submitted by the lead form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewInquiry {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryRecord {
    pub id: i64,
    pub timestamp: String,
    pub brand: String,
    pub keyword: String,
    pub name: String,
    pub contact: String,
    pub message: String,
}
