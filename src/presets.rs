//! Built-in schemas.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::document::NodeRef;
use crate::error::ShapeError;
use crate::schema::Schema;

/// Schemas shipped with the crate, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    UserAdditionalInfo,
}

impl Preset {
    pub const ALL: [Preset; 1] = [Preset::UserAdditionalInfo];

    pub fn name(self) -> &'static str {
        match self {
            Self::UserAdditionalInfo => "user-additional-info",
        }
    }

    pub fn schema(self) -> Result<Schema, ShapeError> {
        match self {
            Self::UserAdditionalInfo => user_additional_info(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| format!("unknown preset: {s}"))
    }
}

/// Schema of the `additional_info` column of a user profile.
pub fn user_additional_info() -> Result<Schema, ShapeError> {
    let role = Regex::new(r"^(admin|user|employee)$")?;
    let rgba = Regex::new(r"^rgba\(\d{1,3}, \d{1,3}, \d{1,3}, (0|1|0?\.\d+)\)$")?;

    let color = |key: &'static str| {
        let rgba = rgba.clone();
        Schema::rule(move |value| match text_or_null(value) {
            Some(None) => Ok(()),
            Some(Some(s)) if rgba.is_match(s) => Ok(()),
            _ => Err(format!("\"{key}\" must be a valid RGBA code or null")),
        })
    };

    Ok(Schema::object([
        ("description", Schema::string()),
        (
            "metadata",
            Schema::object([
                (
                    "role",
                    Schema::rule(move |value| {
                        match value.and_then(NodeRef::as_str) {
                            Some(s) if role.is_match(s) => Ok(()),
                            _ => Err("\"role\" must be admin, user or employee".to_string()),
                        }
                    }),
                ),
                (
                    "configs",
                    Schema::object([
                        ("darkTheme", boolean_or_null("darkTheme")),
                        (
                            "colorPreferences",
                            Schema::object([
                                ("header_and_footer", color("header_and_footer")),
                                ("border_profile_photo", color("border_profile_photo")),
                            ]),
                        ),
                        ("notifications", boolean_or_null("notifications")),
                    ]),
                ),
                (
                    "social_links",
                    Schema::object([
                        ("github", url("github", "https://github.com/")),
                        ("linkedin", url("linkedin", "https://www.linkedin.com/in/")),
                        (
                            "meta_interprise",
                            Schema::object([
                                ("instagram", url("instagram", "https://www.instagram.com/")),
                                ("facebook", url("facebook", "https://www.facebook.com/")),
                            ]),
                        ),
                        ("twitter", url("twitter", "https://twitter.com/")),
                    ]),
                ),
            ]),
        ),
    ]))
}

/// `Some(None)` for null, `Some(Some(s))` for strings, `None` otherwise.
fn text_or_null(value: Option<NodeRef<'_>>) -> Option<Option<&str>> {
    let node = value?;
    if node.is_null() {
        Some(None)
    } else {
        node.as_str().map(Some)
    }
}

fn boolean_or_null(key: &'static str) -> Schema {
    Schema::rule(move |value| match value {
        Some(node) if node.is_null() || node.as_bool().is_some() => Ok(()),
        _ => Err(format!("\"{key}\" must be a boolean or null")),
    })
}

fn url(key: &'static str, prefix: &'static str) -> Schema {
    Schema::rule(move |value| match text_or_null(value) {
        Some(None) => Ok(()),
        Some(Some(s)) if s.starts_with(prefix) => Ok(()),
        _ => Err(format!("\"{key}\" must be a URL of the form \"{prefix}...\" or null")),
    })
}
