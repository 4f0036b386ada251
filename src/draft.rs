use crate::geo::Coordinates;
use crate::models::{ComplaintDraft, GeoAddress, ImageAttachment};

/// Every editable field, in display order.
pub const FIELDS: &[&str] = &[
    "title",
    "description",
    "latitude",
    "longitude",
    "locality",
    "city",
    "state",
    "department",
];

/// Fields that must be non-empty before a draft can be submitted.
pub const REQUIRED_FIELDS: &[&str] = &[
    "title",
    "description",
    "latitude",
    "longitude",
    "locality",
    "department",
];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

/// Owns the draft being edited and which field currently has focus.
/// Field access goes through names so callers can drive edits from
/// flags or prompts without knowing the struct layout.
#[derive(Debug, Default)]
pub struct DraftStore {
    draft: ComplaintDraft,
    active_field: Option<&'static str>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ComplaintDraft {
        &self.draft
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "title" => &self.draft.title,
            "description" => &self.draft.description,
            "latitude" => &self.draft.latitude,
            "longitude" => &self.draft.longitude,
            "locality" => &self.draft.locality,
            "city" => &self.draft.city,
            "state" => &self.draft.state,
            "department" => &self.draft.department,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<(), UnknownField> {
        let slot = match name {
            "title" => &mut self.draft.title,
            "description" => &mut self.draft.description,
            "latitude" => &mut self.draft.latitude,
            "longitude" => &mut self.draft.longitude,
            "locality" => &mut self.draft.locality,
            "city" => &mut self.draft.city,
            "state" => &mut self.draft.state,
            "department" => &mut self.draft.department,
            _ => return Err(UnknownField(name.to_string())),
        };
        *slot = value.into();
        Ok(())
    }

    pub fn set_image(&mut self, image: Option<ImageAttachment>) {
        self.draft.image = image;
    }

    pub fn focus(&mut self, name: &str) -> Result<(), UnknownField> {
        let canonical = FIELDS
            .iter()
            .find(|field| **field == name)
            .copied()
            .ok_or_else(|| UnknownField(name.to_string()))?;
        self.active_field = Some(canonical);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.active_field = None;
    }

    pub fn active_field(&self) -> Option<&'static str> {
        self.active_field
    }

    /// Fills both coordinate fields. Address details arrive separately
    /// through [`DraftStore::apply_address`], so a draft can hold a
    /// position before the lookup finishes.
    pub fn apply_coordinates(&mut self, coords: Coordinates) {
        self.draft.latitude = coords.latitude.to_string();
        self.draft.longitude = coords.longitude.to_string();
    }

    pub fn apply_address(&mut self, address: &GeoAddress) {
        self.draft.locality = address.locality.clone();
        self.draft.city = address.city.clone();
        self.draft.state = address.state.clone();
    }

    pub fn missing_required(&self) -> Vec<&'static str> {
        self.draft.missing_required()
    }

    /// Returns the draft to a blank slate, dropping any attachment.
    pub fn reset(&mut self) {
        self.draft = ComplaintDraft::default();
        self.active_field = None;
    }
}
