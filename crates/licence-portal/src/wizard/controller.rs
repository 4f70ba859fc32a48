use serde::{Deserialize, Serialize};

use super::domain::{ApplicationRecord, FieldValue};

/// Ordered wizard steps. Review and later screens are not steps; the
/// wizard ends when the terminal step submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    PersonalDetails,
    SupportingRecords,
    LicenceCategories,
}

pub const TOTAL_STEPS: u8 = 3;

impl WizardStep {
    pub const fn index(self) -> u8 {
        match self {
            WizardStep::PersonalDetails => 1,
            WizardStep::SupportingRecords => 2,
            WizardStep::LicenceCategories => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::PersonalDetails => "Personal Details",
            WizardStep::SupportingRecords => "Supporting Records",
            WizardStep::LicenceCategories => "Licence Categories",
        }
    }

    fn from_index(index: u8) -> Self {
        match index {
            1 => WizardStep::PersonalDetails,
            2 => WizardStep::SupportingRecords,
            _ => WizardStep::LicenceCategories,
        }
    }

    pub const fn is_terminal(self) -> bool {
        self.index() == TOTAL_STEPS
    }
}

/// Forward/backward pointer over the step list plus the shared record.
///
/// Navigation at the boundaries is a silent no-op; only `submit` away from
/// the terminal step is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardController {
    current_step: WizardStep,
    record: ApplicationRecord,
}

impl WizardController {
    pub fn new(record: ApplicationRecord) -> Self {
        Self {
            current_step: WizardStep::PersonalDetails,
            record,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ApplicationRecord {
        &mut self.record
    }

    /// Advances one step; no-op at the terminal step.
    pub fn next(&mut self) {
        if !self.current_step.is_terminal() {
            self.current_step = WizardStep::from_index(self.current_step.index() + 1);
        }
    }

    /// Steps back; no-op at step 1.
    pub fn back(&mut self) {
        if self.current_step.index() > 1 {
            self.current_step = WizardStep::from_index(self.current_step.index() - 1);
        }
    }

    /// Merges one field into the record.
    pub fn update_field(&mut self, key: impl Into<String>, value: FieldValue) {
        self.record.merge_field(key, value);
    }

    /// Toggles one licence-category selection.
    pub fn toggle_category(&mut self, id: &str) {
        self.record.toggle_category(id);
    }

    /// Hands the record to the caller unchanged. Only the terminal step may
    /// submit.
    pub fn submit(&self) -> Result<ApplicationRecord, WizardError> {
        if !self.current_step.is_terminal() {
            return Err(WizardError::NotAtFinalStep {
                current: self.current_step.index(),
            });
        }
        Ok(self.record.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("submit is only available from step {TOTAL_STEPS}, currently at step {current}")]
    NotAtFinalStep { current: u8 },
    #[error("supporting records are still outstanding")]
    RecordsOutstanding,
}
