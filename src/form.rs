use std::path::Path;

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};

use crate::api::PortalClient;
use crate::draft::DraftStore;
use crate::error::ApiError;
use crate::geo::LocationResolver;
use crate::models::{ImageAttachment, SubmissionResult, DEPARTMENTS};
use crate::status::{Severity, StatusLine};

/// Submission phase of the form. While `Submitting`, further submit
/// requests are ignored so one interaction cannot produce two POSTs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormPhase {
    #[default]
    Idle,
    Submitting,
}

/// The complaint form: the draft being edited, a transient status
/// line and the submit state machine.
#[derive(Default)]
pub struct ComplaintForm {
    store: DraftStore,
    status: StatusLine,
    phase: FormPhase,
}

fn field_label(name: &str) -> &str {
    match name {
        "title" => "Title",
        "description" => "Description",
        "latitude" => "Latitude",
        "longitude" => "Longitude",
        "locality" => "Locality",
        "city" => "City",
        "state" => "State",
        "department" => "Department",
        _ => name,
    }
}

impl ComplaintForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DraftStore {
        &mut self.store
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Marks a submission as in flight. Returns false when one
    /// already is, in which case the caller must not submit.
    pub fn try_begin_submit(&mut self) -> bool {
        if self.phase == FormPhase::Submitting {
            return false;
        }
        self.phase = FormPhase::Submitting;
        true
    }

    pub fn finish_submit(&mut self) {
        self.phase = FormPhase::Idle;
    }

    /// Submits the draft once. Returns `None` when a submission is
    /// already in flight. On acceptance the draft is reset; on any
    /// failure it is kept so the user can fix and resubmit.
    pub async fn submit(
        &mut self,
        client: &PortalClient,
    ) -> Option<Result<SubmissionResult, ApiError>> {
        if !self.try_begin_submit() {
            return None;
        }
        let outcome = client.register_complaint(self.store.draft()).await;
        match &outcome {
            Ok(result) => {
                self.store.reset();
                if result.message.is_empty() {
                    self.status.set_info("Complaint registered successfully!");
                } else {
                    self.status.set_info(result.message.clone());
                }
            }
            Err(ApiError::Validation { missing }) => {
                self.status.set_error(format!(
                    "Please provide all required fields: {}",
                    missing.join(", ")
                ));
            }
            Err(ApiError::Rejected { message }) => {
                self.status.set_error(message.clone());
            }
            Err(ApiError::Transport(err)) => {
                log::warn!("complaint submission failed: {}", err);
                self.status.set_error("Something went wrong!");
            }
        }
        self.finish_submit();
        Some(outcome)
    }

    /// Fills the location fields from the resolver. Coordinates land
    /// first; the draft keeps them even when the address lookup fails.
    pub async fn capture_location(&mut self, resolver: &LocationResolver) {
        let coords = match resolver.current_position().await {
            Ok(coords) => coords,
            Err(err) => {
                self.status.set_error(err.to_string());
                return;
            }
        };
        self.store.apply_coordinates(coords);

        match resolver.reverse_geocode(coords).await {
            Ok(record) => {
                self.store.apply_address(&record.to_geo_address());
                self.status
                    .set_info("Location and address details captured successfully!");
            }
            Err(err) => {
                log::warn!("could not resolve address: {}", err);
                self.status.set_info(
                    "Location coordinates captured. Address details could not be retrieved.",
                );
            }
        }
    }

    /// Prints the live status message, if any.
    pub fn print_status(&mut self) {
        if let Some((severity, text)) = self.status.current() {
            match severity {
                Severity::Info => println!("{}", text),
                Severity::Error => eprintln!("{}", text),
            }
        }
    }

    fn prompt_field(&mut self, name: &'static str, required: bool) -> Result<()> {
        self.store.focus(name)?;
        let current = self.store.field(name).unwrap_or("").to_string();
        let mut input = Input::<String>::new().with_prompt(field_label(name));
        if !current.is_empty() {
            input = input.default(current);
        }
        if !required {
            input = input.allow_empty(true);
        }
        let value = input.interact_text()?;
        self.store.set_field(name, value)?;
        self.store.blur();
        Ok(())
    }

    fn prompt_department(&mut self) -> Result<()> {
        self.store.focus("department")?;
        let current = self.store.field("department").unwrap_or("");
        let default = DEPARTMENTS.iter().position(|d| *d == current).unwrap_or(0);
        let picked = Select::new()
            .with_prompt("Department")
            .items(DEPARTMENTS)
            .default(default)
            .interact()?;
        self.store.set_field("department", DEPARTMENTS[picked])?;
        self.store.blur();
        Ok(())
    }

    fn print_summary(&self) {
        let draft = self.store.draft();
        println!("Title:       {}", draft.title);
        println!("Description: {}", draft.description);
        println!("Location:    {}, {}", draft.latitude, draft.longitude);
        println!("Locality:    {}", draft.locality);
        if !draft.city.is_empty() {
            println!("City:        {}", draft.city);
        }
        if !draft.state.is_empty() {
            println!("State:       {}", draft.state);
        }
        println!("Department:  {}", draft.department);
        if let Some(image) = &draft.image {
            println!("Image:       {}", image.preview());
        }
    }

    /// Walks the whole form on the terminal: fields, optional location
    /// capture and image, then a confirmed submit with retry on
    /// failure.
    pub async fn run_interactive(
        &mut self,
        resolver: &LocationResolver,
        client: &PortalClient,
    ) -> Result<()> {
        self.prompt_field("title", true)?;
        self.prompt_field("description", true)?;

        if Confirm::new()
            .with_prompt("Capture current location?")
            .default(true)
            .interact()?
        {
            self.capture_location(resolver).await;
            self.print_status();
        }

        self.prompt_field("latitude", true)?;
        self.prompt_field("longitude", true)?;
        self.prompt_field("locality", true)?;
        self.prompt_field("city", false)?;
        self.prompt_field("state", false)?;
        self.prompt_department()?;

        if Confirm::new()
            .with_prompt("Attach an image?")
            .default(false)
            .interact()?
        {
            let path: String = Input::new().with_prompt("Image path").interact_text()?;
            match ImageAttachment::from_path(Path::new(&path)).await {
                Ok(attachment) => {
                    println!("Attached {}", attachment.preview());
                    self.store.set_image(Some(attachment));
                }
                Err(err) => {
                    log::warn!("could not read {}: {}", path, err);
                    eprintln!("Could not read image, continuing without one.");
                }
            }
        }

        loop {
            println!();
            self.print_summary();
            if !Confirm::new()
                .with_prompt("Submit this complaint?")
                .default(true)
                .interact()?
            {
                println!("Cancelled.");
                return Ok(());
            }

            match self.submit(client).await {
                Some(Ok(_)) => {
                    self.print_status();
                    return Ok(());
                }
                Some(Err(ApiError::Validation { missing })) => {
                    self.print_status();
                    for name in missing {
                        if name == "department" {
                            self.prompt_department()?;
                        } else {
                            self.prompt_field(name, true)?;
                        }
                    }
                }
                Some(Err(err)) => {
                    self.print_status();
                    if !Confirm::new()
                        .with_prompt("Try again?")
                        .default(false)
                        .interact()?
                    {
                        return Err(err.into());
                    }
                }
                None => anyhow::bail!("a submission is already in flight"),
            }
        }
    }
}
