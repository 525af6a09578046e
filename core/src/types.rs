//! Shared primitive types used across the entire reporting core.

/// An application (promoted game) name, exactly as it appears in the dataset.
pub type AppName = String;

/// An ad-network campaign identifier.
pub type CampaignId = String;

/// An ad-network creative identifier.
pub type CreativeId = String;

/// A calendar day. All dataset rows are day-granular.
pub type Day = chrono::NaiveDate;
