use std::path::Path;

use serde::Deserialize;

/// Municipal departments a complaint can be routed to.
pub const DEPARTMENTS: &[&str] = &[
    "Water Supply Department",
    "Sanitation & Waste Management Department",
    "Sewerage & Drainage Department",
    "Electricity / Street Lighting Department",
    "Roads & Public Works Department (PWD)",
    "Traffic Management Department",
    "Transport Department",
    "Health Department",
    "Fire & Emergency Services",
    "Town Planning / Building Department",
    "Revenue / Tax Department",
    "Encroachment / Enforcement Department",
    "Parks & Horticulture Department",
    "Pollution Control / Environment Department",
    "Animal Control / Veterinary Department",
    "Grievance Redressal / Complaint Cell",
    "Disaster Management Department",
    "Women & Child Safety Department",
    "Other",
];

/// A complaint as the user is drafting it. All fields are kept as the
/// strings that go on the wire; coordinates are formatted before they
/// land here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintDraft {
    pub title: String,
    pub description: String,
    pub latitude: String,
    pub longitude: String,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub department: String,
    pub image: Option<ImageAttachment>,
}

impl ComplaintDraft {
    /// Names of required fields that are still empty, in submission order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        if self.latitude.is_empty() {
            missing.push("latitude");
        }
        if self.longitude.is_empty() {
            missing.push("longitude");
        }
        if self.locality.is_empty() {
            missing.push("locality");
        }
        if self.department.is_empty() {
            missing.push("department");
        }
        missing
    }
}

/// An image selected for upload, held in memory until submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let mime_type =
            mime_for_extension(path.extension().and_then(|e| e.to_str())).to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// One-line description shown after the user picks a file.
    pub fn preview(&self) -> String {
        format!(
            "{} ({}, {})",
            self.file_name,
            self.mime_type,
            format_size(self.bytes.len())
        )
    }
}

fn mime_for_extension(ext: Option<&str>) -> &'static str {
    match ext.map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let b = bytes as f64;
    if b >= MIB {
        format!("{:.1} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Resolved address details for a coordinate pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoAddress {
    pub locality: String,
    pub city: String,
    pub state: String,
}

/// Reply body of the complaint registration endpoint. The server may
/// omit keys: absent `success` means failure, absent `message` means
/// no detail.
#[derive(Debug, Deserialize)]
pub struct RegisterReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Reply body of the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub user: serde_json::Value,
    #[serde(default)]
    pub message: String,
}

/// Outcome of an accepted complaint submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
}
