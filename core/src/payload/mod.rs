//! Payload grammars for the supported content types
//!
//! Each [`PayloadRequest`] variant maps to exactly one output string:
//! raw text, a URL, an iCalendar VEVENT block, a vCard 3.0 block, or a
//! `WIFI:` provisioning string. Field values are substituted into the
//! templates verbatim; delimiter characters (`;`, `:`, newline) inside
//! user input are NOT escaped, matching the behavior scanners in the
//! wild expect from this application's output.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Wi-Fi security token carried in the `T:` field of a WIFI string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiSecurity {
    Wpa,
    Wep,
    /// Open network, emitted as the literal token `nopass`
    Open,
}

impl WifiSecurity {
    /// The literal token used in the WIFI grammar.
    pub fn token(&self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Open => "nopass",
        }
    }

    /// Parse a security token, case-insensitively.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "wpa" => Ok(WifiSecurity::Wpa),
            "wep" => Ok(WifiSecurity::Wep),
            "nopass" | "open" | "none" => Ok(WifiSecurity::Open),
            other => Err(Error::Validation(format!(
                "unknown Wi-Fi security '{}' (expected WPA, WEP or nopass)",
                other
            ))),
        }
    }
}

/// Stable tag identifying a payload variant in history/analytics rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    Text,
    Url,
    Event,
    Contact,
    Wifi,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Text => "text",
            PayloadKind::Url => "url",
            PayloadKind::Event => "event",
            PayloadKind::Contact => "contact",
            PayloadKind::Wifi => "wifi",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(PayloadKind::Text),
            "url" => Ok(PayloadKind::Url),
            "event" => Ok(PayloadKind::Event),
            "contact" => Ok(PayloadKind::Contact),
            "wifi" => Ok(PayloadKind::Wifi),
            other => Err(Error::Validation(format!("unknown payload kind '{}'", other))),
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to encode one of the supported content types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadRequest {
    /// Raw text, encoded unmodified
    PlainText(String),

    /// A URL; `https://` is prepended when no scheme is present
    Url(String),

    /// A calendar event, emitted as a minimal iCalendar VEVENT
    Event {
        /// `YYYY-MM-DD`
        date: String,
        /// `HH:MM` (24-hour)
        time: String,
        summary: String,
        location: String,
    },

    /// A contact card, emitted as a minimal vCard 3.0
    Contact {
        name: String,
        phone: String,
        email: String,
    },

    /// Wi-Fi provisioning credentials
    Wifi {
        ssid: String,
        password: String,
        security: WifiSecurity,
    },
}

impl PayloadRequest {
    /// The kind tag stored alongside history/analytics rows.
    pub fn kind(&self) -> PayloadKind {
        match self {
            PayloadRequest::PlainText(_) => PayloadKind::Text,
            PayloadRequest::Url(_) => PayloadKind::Url,
            PayloadRequest::Event { .. } => PayloadKind::Event,
            PayloadRequest::Contact { .. } => PayloadKind::Contact,
            PayloadRequest::Wifi { .. } => PayloadKind::Wifi,
        }
    }

    /// Check that every required field is non-empty.
    ///
    /// The Wi-Fi password is required unless the network is open.
    pub fn validate(&self) -> Result<()> {
        match self {
            PayloadRequest::PlainText(text) => require("text", text),
            PayloadRequest::Url(url) => require("url", url),
            PayloadRequest::Event {
                date,
                time,
                summary,
                location,
            } => {
                require("date", date)?;
                require("time", time)?;
                require("summary", summary)?;
                require("location", location)
            }
            PayloadRequest::Contact { name, phone, email } => {
                require("name", name)?;
                require("phone", phone)?;
                require("email", email)
            }
            PayloadRequest::Wifi {
                ssid,
                password,
                security,
            } => {
                require("ssid", ssid)?;
                if *security != WifiSecurity::Open {
                    require("password", password)?;
                }
                Ok(())
            }
        }
    }

    /// Produce the exact string to encode.
    ///
    /// Validates first; a missing required field aborts with
    /// [`Error::Validation`] and no payload is produced. Field values
    /// are substituted verbatim, without delimiter escaping.
    pub fn format(&self) -> Result<String> {
        self.validate()?;

        Ok(match self {
            PayloadRequest::PlainText(text) => text.clone(),
            PayloadRequest::Url(url) => {
                if url.starts_with("http://") || url.starts_with("https://") {
                    url.clone()
                } else {
                    format!("https://{}", url)
                }
            }
            PayloadRequest::Event {
                date,
                time,
                summary,
                location,
            } => format!(
                "BEGIN:VEVENT\nSUMMARY:{}\nLOCATION:{}\nDTSTART:{}T{}00\nEND:VEVENT",
                summary,
                location,
                date.replace('-', ""),
                time.replace(':', ""),
            ),
            PayloadRequest::Contact { name, phone, email } => format!(
                "BEGIN:VCARD\nVERSION:3.0\nN:{}\nTEL:{}\nEMAIL:{}\nEND:VCARD",
                name, phone, email
            ),
            PayloadRequest::Wifi {
                ssid,
                password,
                security,
            } => format!("WIFI:S:{};T:{};P:{};;", ssid, security.token(), password),
        })
    }

    /// Rebuild a request from a stored history row.
    ///
    /// Best-effort split-based parsing of the formatted grammars, used
    /// to regenerate past codes. Not a validating parser: fields the
    /// stored content lacks come back empty.
    pub fn parse(kind: PayloadKind, content: &str) -> Result<Self> {
        let request = match kind {
            PayloadKind::Text => PayloadRequest::PlainText(content.to_string()),
            PayloadKind::Url => PayloadRequest::Url(content.to_string()),
            PayloadKind::Event => {
                // Unescaped substitution means the stamp may hold
                // arbitrary text; only split it back apart when it
                // looks like the digits the formatter emits.
                let (date, time) = match field_after(content, "DTSTART:") {
                    Some(stamp) => match stamp.split_once('T') {
                        Some((d, t)) if d.len() == 8 && leading_digits(d, 8) && leading_digits(t, 4) => (
                            format!("{}-{}-{}", &d[..4], &d[4..6], &d[6..8]),
                            format!("{}:{}", &t[..2], &t[2..4]),
                        ),
                        _ => (String::new(), String::new()),
                    },
                    None => (String::new(), String::new()),
                };
                PayloadRequest::Event {
                    date,
                    time,
                    summary: field_after(content, "SUMMARY:").unwrap_or_default(),
                    location: field_after(content, "LOCATION:").unwrap_or_default(),
                }
            }
            PayloadKind::Contact => PayloadRequest::Contact {
                name: field_after(content, "N:").unwrap_or_default(),
                phone: field_after(content, "TEL:").unwrap_or_default(),
                email: field_after(content, "EMAIL:").unwrap_or_default(),
            },
            PayloadKind::Wifi => {
                let security = wifi_field(content, "T:")
                    .map(|t| WifiSecurity::parse(&t))
                    .transpose()?
                    .unwrap_or(WifiSecurity::Wpa);
                PayloadRequest::Wifi {
                    ssid: wifi_field(content, "S:").unwrap_or_default(),
                    password: wifi_field(content, "P:").unwrap_or_default(),
                    security,
                }
            }
        };
        Ok(request)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::Validation(format!("missing required field '{}'", field)))
    } else {
        Ok(())
    }
}

/// Whether the first `n` bytes of `s` exist and are ASCII digits.
///
/// Checking bytes keeps the follow-up slicing on char boundaries.
fn leading_digits(s: &str, n: usize) -> bool {
    s.len() >= n && s.bytes().take(n).all(|b| b.is_ascii_digit())
}

/// Value of the first line starting with `marker`.
fn field_after(content: &str, marker: &str) -> Option<String> {
    content
        .lines()
        .find_map(|line| line.strip_prefix(marker))
        .map(str::to_string)
}

/// Text following `marker` up to the next `;` (WIFI grammar).
fn wifi_field(content: &str, marker: &str) -> Option<String> {
    let rest = &content[content.find(marker)? + marker.len()..];
    Some(rest.split(';').next().unwrap_or("").to_string())
}
