use crate::{Error, Result};

/// Default upper bound, in characters, for names and descriptions.
pub const DEFAULT_MAX_TEXT_LEN: usize = 1024;

/// Argument limits shared by the store and every front end that validates on
/// its behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum length of a list name or todo description, in characters.
    pub max_text_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_text_len: DEFAULT_MAX_TEXT_LEN,
        }
    }
}

impl Limits {
    /// Checks a required text field: it must be non-empty and no longer than
    /// [`Limits::max_text_len`] characters.
    ///
    /// ```
    /// use checklist::{Error, Limits};
    ///
    /// let limits = Limits { max_text_len: 4 };
    /// assert!(limits.check_text("name", "TODO").is_ok());
    /// assert!(matches!(
    ///     limits.check_text("name", ""),
    ///     Err(Error::InvalidArgument { field: "name", .. })
    /// ));
    /// ```
    pub fn check_text(&self, field: &'static str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(Error::invalid_argument(field, "must not be empty"));
        }

        let len = value.chars().count();
        if len > self.max_text_len {
            return Err(Error::invalid_argument(
                field,
                format!(
                    "must be at most {} characters, got {}",
                    self.max_text_len, len
                ),
            ));
        }

        Ok(())
    }

    /// Same as [`Limits::check_text`] for fields that may be omitted.
    pub fn check_optional_text(&self, field: &'static str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => self.check_text(field, value),
            None => Ok(()),
        }
    }
}
