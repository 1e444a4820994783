use reqwest::multipart::{Form, Part};

use crate::features::reports::models::ReportDraft;
use crate::modules::camera::Photo;

pub const FIELD_LATITUDE: &str = "location[latitude]";
pub const FIELD_LONGITUDE: &str = "location[longitude]";
pub const FIELD_ADDRESS: &str = "location[address]";
pub const FIELD_IMAGE: &str = "image";

/// Transmissible form of a report: text fields in order, plus the optional photo
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPayload {
    pub fields: Vec<(&'static str, String)>,
    pub image: Option<Photo>,
}

impl ReportPayload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(field, _)| *field).collect()
    }

    pub fn has_location(&self) -> bool {
        self.fields
            .iter()
            .any(|(field, _)| field.starts_with("location["))
    }

    /// `multipart/form-data` body for the backend
    pub fn into_multipart(self) -> reqwest::Result<Form> {
        let mut form = self
            .fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        if let Some(photo) = self.image {
            let filename = photo.filename();
            let content_type = photo.content_type();
            let part = Part::bytes(photo.bytes)
                .file_name(filename)
                .mime_str(content_type)?;
            form = form.part(FIELD_IMAGE, part);
        }

        Ok(form)
    }
}

/// Flattens a draft into a payload. Optional parts are left out entirely when absent.
pub fn build(draft: &ReportDraft) -> ReportPayload {
    let mut fields = vec![
        ("name", draft.name.clone()),
        ("phone", draft.phone.clone()),
        ("dusun", draft.dusun.clone()),
        ("rt", draft.rt.clone()),
        ("title", draft.title.clone()),
        ("description", draft.description.clone()),
        ("category", draft.category.to_string()),
    ];

    if let Some(location) = &draft.location {
        fields.push((FIELD_LATITUDE, location.latitude.to_string()));
        fields.push((FIELD_LONGITUDE, location.longitude.to_string()));
        if let Some(address) = location.address.as_ref().filter(|a| !a.is_empty()) {
            fields.push((FIELD_ADDRESS, address.clone()));
        }
    }

    ReportPayload {
        fields,
        image: draft.photo.clone(),
    }
}
